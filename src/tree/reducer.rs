//! Order-independent reduction of per-file digests

use crate::types::{DigestValue, HashAlgorithm};

/// Combine per-file digests into one fingerprint.
///
/// Digests are sorted by byte order of their hex text, concatenated without
/// separators, and the concatenation is hashed with `algorithm`. An empty
/// input yields the algorithm's digest of the empty byte sequence.
pub fn reduce<I>(digests: I, algorithm: HashAlgorithm) -> DigestValue
where
    I: IntoIterator<Item = DigestValue>,
{
    let mut sorted: Vec<DigestValue> = digests.into_iter().collect();
    sorted.sort_unstable();

    // Feeding each digest in turn is the same as hashing the concatenation.
    let mut acc = algorithm.accumulator();
    for digest in &sorted {
        acc.update(digest.as_str().as_bytes());
    }
    acc.finalize()
}
