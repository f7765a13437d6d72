//! Core value types shared by the traversal, hashing, and reduction stages.

use crate::error::FingerprintError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Hash algorithm used for both per-file digests and the reduction step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Md5,
    Sha1,
    Sha256,
    Sha512,
}

impl HashAlgorithm {
    pub const ALL: [HashAlgorithm; 4] = [
        HashAlgorithm::Md5,
        HashAlgorithm::Sha1,
        HashAlgorithm::Sha256,
        HashAlgorithm::Sha512,
    ];

    /// Lowercase identifier, as accepted by `FromStr`
    pub fn name(self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "md5",
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha512 => "sha512",
        }
    }

    /// Raw digest length in bytes
    pub fn digest_len(self) -> usize {
        match self {
            HashAlgorithm::Md5 => 16,
            HashAlgorithm::Sha1 => 20,
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha512 => 64,
        }
    }

    /// Length of the hex-encoded digest
    pub fn hex_len(self) -> usize {
        self.digest_len() * 2
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = FingerprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "md5" => Ok(HashAlgorithm::Md5),
            "sha1" => Ok(HashAlgorithm::Sha1),
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha512" => Ok(HashAlgorithm::Sha512),
            _ => Err(FingerprintError::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

/// Lowercase hex digest.
///
/// Ordering is the byte order of the hex string, which is what the
/// reduction step sorts by.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DigestValue(String);

impl DigestValue {
    /// Encode raw digest bytes as lowercase hex
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DigestValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DigestValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Rules deciding which members of a directory scan are fingerprinted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionPolicy {
    /// Exact filenames to skip (files only, never directories)
    pub excluded_names: BTreeSet<String>,
    /// Bare extensions to skip, matched case-sensitively against the text
    /// after a filename's last `.`
    pub excluded_extensions: BTreeSet<String>,
    /// Skip entries whose name, or any ancestor name below the root, starts with `.`
    pub ignore_hidden: bool,
    /// Descend into directories reached through symlinks
    pub follow_symlinks: bool,
}

impl ExclusionPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_excluded_name(mut self, name: impl Into<String>) -> Self {
        self.excluded_names.insert(name.into());
        self
    }

    pub fn with_excluded_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_names.extend(names.into_iter().map(Into::into));
        self
    }

    /// Add an extension. A single leading `.` is dropped, since an
    /// extension never contains a dot.
    pub fn with_excluded_extension(mut self, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        let bare = extension.strip_prefix('.').unwrap_or(&extension).to_string();
        self.excluded_extensions.insert(bare);
        self
    }

    pub fn with_excluded_extensions<I, S>(self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        extensions
            .into_iter()
            .fold(self, |policy, ext| policy.with_excluded_extension(ext))
    }

    pub fn ignore_hidden(mut self, ignore: bool) -> Self {
        self.ignore_hidden = ignore;
        self
    }

    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }
}

/// A regular file accepted by traversal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Path used to open the file
    pub path: PathBuf,
    /// Path relative to the traversal root (the file name for a file root)
    pub relative_path: PathBuf,
}

/// Why a member of a directory scan was left out of the digest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipKind {
    ReadError,
    NotAccessible,
}

impl fmt::Display for SkipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipKind::ReadError => f.write_str("read error"),
            SkipKind::NotAccessible => f.write_str("not accessible"),
        }
    }
}

/// A recorded, non-fatal failure on one member of a directory scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEntry {
    pub path: PathBuf,
    pub kind: SkipKind,
    pub reason: String,
}

impl SkippedEntry {
    /// Build a record from a skippable error; returns `None` for fatal errors.
    pub fn from_error(err: &FingerprintError) -> Option<Self> {
        let (path, kind, source) = match err {
            FingerprintError::ReadError { path, source } => (path, SkipKind::ReadError, source),
            FingerprintError::NotAccessible { path, source } => {
                (path, SkipKind::NotAccessible, source)
            }
            _ => return None,
        };
        Some(Self {
            path: path.clone(),
            kind,
            reason: source.to_string(),
        })
    }
}

/// Per-file digest, kept when a manifest is requested
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDigest {
    pub relative_path: String,
    pub digest: DigestValue,
}

/// Result of fingerprinting one root path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    #[serde(rename = "path")]
    pub root: PathBuf,
    pub algorithm: HashAlgorithm,
    #[serde(rename = "checksum_value")]
    pub digest: DigestValue,
    /// Number of files whose digests went into the result
    pub file_count: usize,
    #[serde(default)]
    pub skipped: Vec<SkippedEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<FileDigest>>,
}

impl Fingerprint {
    /// Compare against an expected hex digest, ignoring case and surrounding whitespace
    pub fn matches(&self, expected: &str) -> bool {
        self.digest.as_str().eq_ignore_ascii_case(expected.trim())
    }

    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}
