//! Treeprint: order-independent content fingerprints
//!
//! Computes one deterministic digest for a file or a directory tree. Each
//! included file is hashed on its own, and the per-file digests are sorted
//! and hashed again, so the result does not depend on the order in which
//! the filesystem lists entries.
//!
//! ```no_run
//! use treeprint::{fingerprint, ExclusionPolicy, HashAlgorithm};
//!
//! let policy = ExclusionPolicy::new().with_excluded_extension("pyc").ignore_hidden(true);
//! let digest = fingerprint("src".as_ref(), HashAlgorithm::Sha256, &policy)?;
//! println!("{}", digest);
//! # Ok::<(), treeprint::FingerprintError>(())
//! ```

pub mod cancel;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod service;
pub mod tree;
pub mod types;

pub use cancel::CancellationToken;
pub use error::FingerprintError;
pub use service::{fingerprint, FingerprintOptions, FingerprintService};
pub use types::{DigestValue, ExclusionPolicy, Fingerprint, HashAlgorithm};
