//! Property-based tests for determinism guarantees

use proptest::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use tempfile::TempDir;
use treeprint::tree::hasher::digest_bytes;
use treeprint::tree::reducer::reduce;
use treeprint::{fingerprint, DigestValue, ExclusionPolicy, HashAlgorithm};

fn any_algorithm() -> impl Strategy<Value = HashAlgorithm> {
    prop_oneof![
        Just(HashAlgorithm::Md5),
        Just(HashAlgorithm::Sha1),
        Just(HashAlgorithm::Sha256),
        Just(HashAlgorithm::Sha512),
    ]
}

/// File name -> content, names drawn so some are hidden and some carry extensions
fn tree_contents() -> impl Strategy<Value = BTreeMap<String, Vec<u8>>> {
    prop::collection::btree_map("\\.?[a-z]{1,6}(\\.(txt|log|tmp))?", any::<Vec<u8>>(), 0..12)
}

fn materialize(files: &BTreeMap<String, Vec<u8>>) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    for (name, content) in files {
        fs::write(temp_dir.path().join(name), content).unwrap();
    }
    temp_dir
}

/// Test that byte digests are deterministic
#[test]
fn test_digest_determinism_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(any_algorithm(), any::<Vec<u8>>()), |(algorithm, content)| {
            let first = digest_bytes(algorithm, &content);
            let second = digest_bytes(algorithm, &content);
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.as_str().len(), algorithm.hex_len());
            Ok(())
        })
        .unwrap();
}

/// Test that reduction ignores the order of its inputs
#[test]
fn test_reduce_permutation_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(any_algorithm(), prop::collection::vec(any::<Vec<u8>>(), 0..16)),
            |(algorithm, contents)| {
                let digests: Vec<DigestValue> =
                    contents.iter().map(|c| digest_bytes(algorithm, c)).collect();
                let mut reversed = digests.clone();
                reversed.reverse();
                let mut rotated = digests.clone();
                if !rotated.is_empty() {
                    rotated.rotate_left(contents.len() / 2);
                }

                let expected = reduce(digests, algorithm);
                prop_assert_eq!(&expected, &reduce(reversed, algorithm));
                prop_assert_eq!(&expected, &reduce(rotated, algorithm));
                Ok(())
            },
        )
        .unwrap();
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// The tree fingerprint equals the reduction of its file digests
    #[test]
    fn tree_fingerprint_is_reduction_of_file_digests(
        algorithm in any_algorithm(),
        files in tree_contents(),
    ) {
        let dir = materialize(&files);
        let expected = reduce(files.values().map(|c| digest_bytes(algorithm, c)), algorithm);
        let actual = fingerprint(dir.path(), algorithm, &ExclusionPolicy::default()).unwrap();
        prop_assert_eq!(actual, expected);
    }

    /// Excluded files never influence the fingerprint
    #[test]
    fn exclusions_are_invisible(
        files in tree_contents(),
        extra in any::<Vec<u8>>(),
    ) {
        let policy = ExclusionPolicy::new()
            .with_excluded_extension("tmp")
            .with_excluded_name("skip.me")
            .ignore_hidden(true);
        let dir = materialize(&files);
        let before = fingerprint(dir.path(), HashAlgorithm::Md5, &policy).unwrap();

        fs::write(dir.path().join("added.tmp"), &extra).unwrap();
        fs::write(dir.path().join("skip.me"), &extra).unwrap();
        fs::write(dir.path().join(".added"), &extra).unwrap();
        let after = fingerprint(dir.path(), HashAlgorithm::Md5, &policy).unwrap();
        prop_assert_eq!(before, after);
    }
}
