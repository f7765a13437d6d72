//! Concurrent fingerprinting: agreement with the sequential path, barrier
//! semantics, cancellation and timeouts.

use super::test_utils::write_tree;
use std::time::Duration;
use tempfile::TempDir;
use treeprint::{
    CancellationToken, ExclusionPolicy, FingerprintError, FingerprintOptions, FingerprintService,
    HashAlgorithm,
};

fn populated_dir(files: usize) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    for i in 0..files {
        let name = format!("level{}/sub{}/file{:04}.bin", i % 3, i % 7, i);
        let content = format!("file number {} {}", i, "x".repeat(i % 97));
        write_tree(temp_dir.path(), &[(name.as_str(), content.as_bytes())]);
    }
    temp_dir
}

fn service(algorithm: HashAlgorithm, concurrency: usize) -> FingerprintService {
    let mut options = FingerprintOptions::new(algorithm, ExclusionPolicy::default());
    options.concurrency = concurrency;
    options.collect_manifest = true;
    FingerprintService::new(options)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_matches_sequential() {
    let dir = populated_dir(200);
    for algorithm in HashAlgorithm::ALL {
        let svc = service(algorithm, 8);
        let sequential = svc.fingerprint(dir.path()).unwrap();
        let concurrent = svc.fingerprint_concurrent(dir.path()).await.unwrap();
        assert_eq!(sequential.digest, concurrent.digest, "{}", algorithm);
        assert_eq!(sequential.file_count, 200);
        assert_eq!(concurrent.file_count, 200);
        assert_eq!(sequential.files, concurrent.files, "manifest is sorted either way");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_worker_count_does_not_change_result() {
    let dir = populated_dir(64);
    let one = service(HashAlgorithm::Sha256, 1)
        .fingerprint_concurrent(dir.path())
        .await
        .unwrap();
    let many = service(HashAlgorithm::Sha256, 32)
        .fingerprint_concurrent(dir.path())
        .await
        .unwrap();
    assert_eq!(one.digest, many.digest);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_file_root() {
    let temp_dir = TempDir::new().unwrap();
    write_tree(temp_dir.path(), &[("a.txt", b"hello")]);
    let fp = service(HashAlgorithm::Md5, 4)
        .fingerprint_concurrent(&temp_dir.path().join("a.txt"))
        .await
        .unwrap();
    assert_eq!(fp.digest.as_str(), "5d41402abc4b2a76b9719d911017c592");
    assert_eq!(fp.file_count, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_empty_directory() {
    let temp_dir = TempDir::new().unwrap();
    let fp = service(HashAlgorithm::Md5, 4)
        .fingerprint_concurrent(temp_dir.path())
        .await
        .unwrap();
    assert_eq!(fp.digest.as_str(), "d41d8cd98f00b204e9800998ecf8427e");
    assert_eq!(fp.file_count, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancelled_before_start_yields_no_result() {
    let dir = populated_dir(20);
    let token = CancellationToken::new();
    token.cancel();

    let result = service(HashAlgorithm::Md5, 4)
        .fingerprint_concurrent_with_cancel(dir.path(), &token)
        .await;
    assert!(matches!(result, Err(FingerprintError::Cancelled)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_internal_failure_does_not_cancel_caller_token() {
    let temp_dir = TempDir::new().unwrap();
    let token = CancellationToken::new();
    let result = service(HashAlgorithm::Md5, 4)
        .fingerprint_concurrent_with_cancel(&temp_dir.path().join("missing"), &token)
        .await;
    assert!(matches!(result, Err(FingerprintError::InvalidPath(_))));
    assert!(!token.is_cancelled());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_elapsed_deadline_yields_timeout() {
    let dir = populated_dir(1000);
    let mut options = FingerprintOptions::new(HashAlgorithm::Sha512, ExclusionPolicy::default());
    options.timeout = Some(Duration::ZERO);
    let result = FingerprintService::new(options)
        .fingerprint_concurrent(dir.path())
        .await;
    assert!(matches!(result, Err(FingerprintError::TimedOut(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_generous_deadline_completes() {
    let dir = populated_dir(10);
    let mut options = FingerprintOptions::new(HashAlgorithm::Md5, ExclusionPolicy::default());
    options.timeout = Some(Duration::from_secs(60));
    let svc = FingerprintService::new(options);
    let timed = svc.fingerprint_concurrent(dir.path()).await.unwrap();
    let plain = svc.fingerprint(dir.path()).unwrap();
    assert_eq!(timed.digest, plain.digest);
}

#[test]
fn test_sequential_cancel_yields_no_result() {
    let dir = populated_dir(5);
    let token = CancellationToken::new();
    token.cancel();
    let result = service(HashAlgorithm::Md5, 1).fingerprint_with_cancel(dir.path(), &token);
    assert!(matches!(result, Err(FingerprintError::Cancelled)));
}

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_records_skipped_entries() {
    use treeprint::types::SkipKind;

    let temp_dir = TempDir::new().unwrap();
    write_tree(temp_dir.path(), &[("a.txt", b"hello"), ("b.txt", b"world")]);
    std::os::unix::fs::symlink(temp_dir.path().join("gone"), temp_dir.path().join("dangling"))
        .unwrap();

    let svc = service(HashAlgorithm::Md5, 4);
    let concurrent = svc.fingerprint_concurrent(temp_dir.path()).await.unwrap();
    assert_eq!(concurrent.digest.as_str(), "ae802c1f58f394d46485b7da18c56e9b");
    assert_eq!(concurrent.file_count, 2);
    assert_eq!(concurrent.skipped.len(), 1);
    assert_eq!(concurrent.skipped[0].kind, SkipKind::ReadError);
    assert!(concurrent.skipped[0].path.ends_with("dangling"));

    let sequential = svc.fingerprint(temp_dir.path()).unwrap();
    assert_eq!(sequential.skipped, concurrent.skipped);
}
