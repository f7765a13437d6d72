//! Fingerprint service: validates the root, drives traversal and hashing,
//! and reduces the per-file digests into one fingerprint.

use crate::cancel::CancellationToken;
use crate::error::FingerprintError;
use crate::tree::hasher::digest_file_cancellable;
use crate::tree::path::{display_relative, resolve_root};
use crate::tree::reducer::reduce;
use crate::tree::walker::Walker;
use crate::types::{
    DigestValue, ExclusionPolicy, FileDigest, FileRecord, Fingerprint, HashAlgorithm,
    SkippedEntry,
};
use futures::stream::{FuturesUnordered, StreamExt};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Bound on traversal results buffered ahead of the hashing workers
const DISCOVERY_BUFFER: usize = 256;

/// Default worker count for concurrent hashing
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// Settings for one or more fingerprint computations
#[derive(Debug, Clone)]
pub struct FingerprintOptions {
    pub algorithm: HashAlgorithm,
    pub policy: ExclusionPolicy,
    /// Maximum files hashed at once by the concurrent entry point
    pub concurrency: usize,
    /// Deadline for the concurrent entry point
    pub timeout: Option<Duration>,
    /// Keep per-file digests on the result
    pub collect_manifest: bool,
}

impl Default for FingerprintOptions {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::default(),
            policy: ExclusionPolicy::default(),
            concurrency: default_concurrency(),
            timeout: None,
            collect_manifest: false,
        }
    }
}

impl FingerprintOptions {
    pub fn new(algorithm: HashAlgorithm, policy: ExclusionPolicy) -> Self {
        Self {
            algorithm,
            policy,
            ..Self::default()
        }
    }
}

/// Fingerprint `path` on the calling thread and return only the digest
pub fn fingerprint(
    path: &Path,
    algorithm: HashAlgorithm,
    policy: &ExclusionPolicy,
) -> Result<DigestValue, FingerprintError> {
    FingerprintService::new(FingerprintOptions::new(algorithm, policy.clone()))
        .fingerprint(path)
        .map(|fp| fp.digest)
}

enum Root {
    File(PathBuf),
    Directory(PathBuf),
}

/// Orchestrates traversal, hashing, and reduction
#[derive(Debug, Clone, Default)]
pub struct FingerprintService {
    options: FingerprintOptions,
}

impl FingerprintService {
    pub fn new(options: FingerprintOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &FingerprintOptions {
        &self.options
    }

    /// Fingerprint `path` sequentially on the calling thread.
    ///
    /// The timeout option is not applied here; use
    /// [`fingerprint_with_cancel`](Self::fingerprint_with_cancel) to stop early.
    pub fn fingerprint(&self, path: &Path) -> Result<Fingerprint, FingerprintError> {
        self.fingerprint_with_cancel(path, &CancellationToken::new())
    }

    pub fn fingerprint_with_cancel(
        &self,
        path: &Path,
        cancel: &CancellationToken,
    ) -> Result<Fingerprint, FingerprintError> {
        let algorithm = self.options.algorithm;
        match validate_root(path)? {
            Root::File(file) => self.fingerprint_file(path, &file, cancel),
            Root::Directory(dir) => {
                let traversal = Walker::new(dir, self.options.policy.clone())
                    .walk()?
                    .with_cancellation(cancel.clone());
                let mut aggregation = Aggregation::new(algorithm, self.options.collect_manifest);
                for item in traversal {
                    match item {
                        Ok(record) => {
                            let result = digest_file_cancellable(&record.path, algorithm, Some(cancel));
                            aggregation.accept(record, result)?;
                        }
                        Err(err) => aggregation.skip(err)?,
                    }
                }
                Ok(aggregation.finish(path))
            }
        }
    }

    /// Fingerprint `path`, hashing up to `concurrency` files at once.
    ///
    /// Hashing starts as files are discovered; the reduction waits for every
    /// hashing task. Must be called within a multi-threaded tokio runtime.
    pub async fn fingerprint_concurrent(&self, path: &Path) -> Result<Fingerprint, FingerprintError> {
        self.fingerprint_concurrent_with_cancel(path, &CancellationToken::new())
            .await
    }

    pub async fn fingerprint_concurrent_with_cancel(
        &self,
        path: &Path,
        cancel: &CancellationToken,
    ) -> Result<Fingerprint, FingerprintError> {
        // A child token lets us stop our own workers on failure without
        // cancelling the caller's token.
        let token = cancel.child_token();
        let run = self.run_concurrent(path, token.clone());
        let result = match self.options.timeout {
            Some(limit) => tokio::time::timeout(limit, run)
                .await
                .unwrap_or(Err(FingerprintError::TimedOut(limit))),
            None => run.await,
        };
        if result.is_err() {
            token.cancel();
        }
        result
    }

    async fn run_concurrent(
        &self,
        path: &Path,
        token: CancellationToken,
    ) -> Result<Fingerprint, FingerprintError> {
        let algorithm = self.options.algorithm;
        let dir = match validate_root(path)? {
            Root::File(file) => {
                let service = self.clone();
                let requested = path.to_path_buf();
                return tokio::task::spawn_blocking(move || {
                    service.fingerprint_file(&requested, &file, &token)
                })
                .await
                .map_err(|e| FingerprintError::TaskFailed(e.to_string()))?;
            }
            Root::Directory(dir) => dir,
        };

        let traversal = Walker::new(dir, self.options.policy.clone())
            .walk()?
            .with_cancellation(token.clone());

        let (tx, mut rx) = mpsc::channel(DISCOVERY_BUFFER);
        let producer = tokio::task::spawn_blocking(move || {
            for item in traversal {
                if tx.blocking_send(item).is_err() {
                    break;
                }
            }
        });

        let semaphore = Arc::new(Semaphore::new(self.options.concurrency.max(1)));
        let mut pending: FuturesUnordered<JoinHandle<HashOutcome>> = FuturesUnordered::new();
        let mut aggregation = Aggregation::new(algorithm, self.options.collect_manifest);

        loop {
            tokio::select! {
                Some(joined) = pending.next(), if !pending.is_empty() => {
                    let (record, result) = joined.map_err(|e| FingerprintError::TaskFailed(e.to_string()))?;
                    aggregation.accept(record, result)?;
                }
                item = rx.recv() => match item {
                    Some(Ok(record)) => {
                        let permit = Arc::clone(&semaphore)
                            .acquire_owned()
                            .await
                            .map_err(|_| FingerprintError::Cancelled)?;
                        let token = token.clone();
                        pending.push(tokio::task::spawn_blocking(move || {
                            let _permit = permit;
                            let result = digest_file_cancellable(&record.path, algorithm, Some(&token));
                            (record, result)
                        }));
                    }
                    Some(Err(err)) => aggregation.skip(err)?,
                    None => break,
                },
            }
        }

        producer
            .await
            .map_err(|e| FingerprintError::TaskFailed(e.to_string()))?;

        while let Some(joined) = pending.next().await {
            let (record, result) = joined.map_err(|e| FingerprintError::TaskFailed(e.to_string()))?;
            aggregation.accept(record, result)?;
        }

        Ok(aggregation.finish(path))
    }

    /// A file root is hashed directly; no reduction is applied.
    fn fingerprint_file(
        &self,
        requested: &Path,
        file: &Path,
        cancel: &CancellationToken,
    ) -> Result<Fingerprint, FingerprintError> {
        let algorithm = self.options.algorithm;
        let digest = digest_file_cancellable(file, algorithm, Some(cancel))?;
        let files = self.options.collect_manifest.then(|| {
            let name = file
                .file_name()
                .map(|n| display_relative(Path::new(n)))
                .unwrap_or_default();
            vec![FileDigest {
                relative_path: name,
                digest: digest.clone(),
            }]
        });
        info!(path = %requested.display(), %algorithm, %digest, "Fingerprint computed for file");
        Ok(Fingerprint {
            root: requested.to_path_buf(),
            algorithm,
            digest,
            file_count: 1,
            skipped: Vec::new(),
            files,
        })
    }
}

type HashOutcome = (FileRecord, Result<DigestValue, FingerprintError>);

fn validate_root(path: &Path) -> Result<Root, FingerprintError> {
    let resolved = resolve_root(path)?;
    let metadata =
        fs::metadata(&resolved).map_err(|_| FingerprintError::InvalidPath(path.to_path_buf()))?;
    if metadata.is_file() {
        Ok(Root::File(resolved))
    } else if metadata.is_dir() {
        Ok(Root::Directory(resolved))
    } else {
        Err(FingerprintError::InvalidPath(path.to_path_buf()))
    }
}

/// Per-computation accumulation of digests and skipped entries
struct Aggregation {
    algorithm: HashAlgorithm,
    digests: Vec<DigestValue>,
    manifest: Option<Vec<FileDigest>>,
    skipped: Vec<SkippedEntry>,
}

impl Aggregation {
    fn new(algorithm: HashAlgorithm, collect_manifest: bool) -> Self {
        Self {
            algorithm,
            digests: Vec::new(),
            manifest: collect_manifest.then(Vec::new),
            skipped: Vec::new(),
        }
    }

    fn accept(
        &mut self,
        record: FileRecord,
        result: Result<DigestValue, FingerprintError>,
    ) -> Result<(), FingerprintError> {
        let digest = match result {
            Ok(digest) => digest,
            Err(err) => return self.skip(err),
        };
        debug!(path = %record.relative_path.display(), %digest, "Hashed file");
        if let Some(manifest) = self.manifest.as_mut() {
            manifest.push(FileDigest {
                relative_path: display_relative(&record.relative_path),
                digest: digest.clone(),
            });
        }
        self.digests.push(digest);
        Ok(())
    }

    /// Record a skippable error, or hand a fatal one back
    fn skip(&mut self, err: FingerprintError) -> Result<(), FingerprintError> {
        match SkippedEntry::from_error(&err) {
            Some(entry) => {
                warn!(path = %entry.path.display(), kind = %entry.kind, reason = %entry.reason, "Skipping entry");
                self.skipped.push(entry);
                Ok(())
            }
            None => Err(err),
        }
    }

    fn finish(self, root: &Path) -> Fingerprint {
        let file_count = self.digests.len();
        let digest = reduce(self.digests, self.algorithm);
        let files = self.manifest.map(|mut files| {
            files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
            files
        });
        let mut skipped = self.skipped;
        skipped.sort_by(|a, b| a.path.cmp(&b.path));

        info!(
            path = %root.display(),
            algorithm = %self.algorithm,
            files = file_count,
            skipped = skipped.len(),
            %digest,
            "Fingerprint computed"
        );

        Fingerprint {
            root: root.to_path_buf(),
            algorithm: self.algorithm,
            digest,
            file_count,
            skipped,
            files,
        }
    }
}
