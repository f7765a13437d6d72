//! Streaming content hashing

use crate::cancel::CancellationToken;
use crate::error::FingerprintError;
use crate::types::{DigestValue, HashAlgorithm};
use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Read size for file hashing. Memory use per file is bounded by this.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Incremental hash state for one of the supported algorithms
#[derive(Clone)]
pub enum Accumulator {
    Md5(Md5),
    Sha1(Sha1),
    Sha256(Sha256),
    Sha512(Sha512),
}

impl Accumulator {
    pub fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Md5 => Accumulator::Md5(Md5::new()),
            HashAlgorithm::Sha1 => Accumulator::Sha1(Sha1::new()),
            HashAlgorithm::Sha256 => Accumulator::Sha256(Sha256::new()),
            HashAlgorithm::Sha512 => Accumulator::Sha512(Sha512::new()),
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        match self {
            Accumulator::Md5(h) => h.update(data),
            Accumulator::Sha1(h) => h.update(data),
            Accumulator::Sha256(h) => h.update(data),
            Accumulator::Sha512(h) => h.update(data),
        }
    }

    pub fn finalize(self) -> DigestValue {
        match self {
            Accumulator::Md5(h) => DigestValue::from_bytes(&h.finalize()),
            Accumulator::Sha1(h) => DigestValue::from_bytes(&h.finalize()),
            Accumulator::Sha256(h) => DigestValue::from_bytes(&h.finalize()),
            Accumulator::Sha512(h) => DigestValue::from_bytes(&h.finalize()),
        }
    }
}

impl HashAlgorithm {
    /// Fresh incremental hash state for this algorithm
    pub fn accumulator(self) -> Accumulator {
        Accumulator::new(self)
    }
}

/// Digest of an in-memory byte slice
pub fn digest_bytes(algorithm: HashAlgorithm, data: &[u8]) -> DigestValue {
    let mut acc = algorithm.accumulator();
    acc.update(data);
    acc.finalize()
}

/// Stream a reader to its end in `CHUNK_SIZE` reads.
///
/// The token, when given, is checked before every read.
pub fn digest_reader<R: Read>(
    mut reader: R,
    algorithm: HashAlgorithm,
    cancel: Option<&CancellationToken>,
) -> io::Result<DigestValue> {
    let mut acc = algorithm.accumulator();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        if cancel.is_some_and(CancellationToken::is_cancelled) {
            return Err(io::Error::new(io::ErrorKind::Interrupted, "cancelled"));
        }
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        acc.update(&buf[..n]);
    }
    Ok(acc.finalize())
}

/// Hex digest of a file's bytes
pub fn digest_file(path: &Path, algorithm: HashAlgorithm) -> Result<DigestValue, FingerprintError> {
    digest_file_cancellable(path, algorithm, None)
}

/// [`digest_file`] that gives up with `Cancelled` once `cancel` fires
pub fn digest_file_cancellable(
    path: &Path,
    algorithm: HashAlgorithm,
    cancel: Option<&CancellationToken>,
) -> Result<DigestValue, FingerprintError> {
    let read_error = |source| FingerprintError::ReadError {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(read_error)?;
    match digest_reader(file, algorithm, cancel) {
        Ok(digest) => Ok(digest),
        Err(_) if cancel.is_some_and(CancellationToken::is_cancelled) => {
            Err(FingerprintError::Cancelled)
        }
        Err(source) => Err(read_error(source)),
    }
}
