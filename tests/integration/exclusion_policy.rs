//! Exclusion policy behavior through the full pipeline

use super::test_utils::write_tree;
use std::fs;
use tempfile::TempDir;
use treeprint::{fingerprint, ExclusionPolicy, HashAlgorithm};

fn base_tree() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    write_tree(
        temp_dir.path(),
        &[
            ("src/main.rs", b"fn main() {}"),
            ("src/lib.rs", b"pub mod x;"),
            ("README", b"readme"),
        ],
    );
    temp_dir
}

/// Adding an excluded-by-name file leaves the fingerprint unchanged
#[test]
fn test_adding_excluded_name_is_invisible() {
    let dir = base_tree();
    let policy = ExclusionPolicy::new().with_excluded_name("Thumbs.db");
    let before = fingerprint(dir.path(), HashAlgorithm::Sha1, &policy).unwrap();

    write_tree(dir.path(), &[("src/Thumbs.db", b"junk"), ("Thumbs.db", b"junk")]);
    let after = fingerprint(dir.path(), HashAlgorithm::Sha1, &policy).unwrap();
    assert_eq!(before, after);
}

/// Adding an excluded-by-extension file leaves the fingerprint unchanged
#[test]
fn test_adding_excluded_extension_is_invisible() {
    let dir = base_tree();
    let policy = ExclusionPolicy::new().with_excluded_extension("pyc");
    let before = fingerprint(dir.path(), HashAlgorithm::Sha256, &policy).unwrap();

    write_tree(dir.path(), &[("src/cache.pyc", b"\x00\x01"), ("deep/er/x.pyc", b"1")]);
    let after = fingerprint(dir.path(), HashAlgorithm::Sha256, &policy).unwrap();
    assert_eq!(before, after);
}

/// Hidden files and hidden directories are invisible when ignoring hidden entries
#[test]
fn test_adding_hidden_entries_is_invisible() {
    let dir = base_tree();
    let policy = ExclusionPolicy::new().ignore_hidden(true);
    let before = fingerprint(dir.path(), HashAlgorithm::Md5, &policy).unwrap();

    write_tree(
        dir.path(),
        &[
            (".env", b"SECRET=1"),
            (".git/HEAD", b"ref: refs/heads/main"),
            ("src/.cache/visible_name.rs", b"cached"),
        ],
    );
    let after = fingerprint(dir.path(), HashAlgorithm::Md5, &policy).unwrap();
    assert_eq!(before, after);

    let counted = fingerprint(dir.path(), HashAlgorithm::Md5, &ExclusionPolicy::default()).unwrap();
    assert_ne!(before, counted, "hidden entries count when not ignored");
}

/// A hidden root directory does not hide its own contents
#[test]
fn test_hidden_root_name_does_not_count() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join(".config");
    write_tree(&root, &[("settings.toml", b"a = 1")]);

    let policy = ExclusionPolicy::new().ignore_hidden(true);
    let hidden_root = fingerprint(&root, HashAlgorithm::Md5, &policy).unwrap();
    let empty = fingerprint(
        TempDir::new().unwrap().path(),
        HashAlgorithm::Md5,
        &ExclusionPolicy::default(),
    )
    .unwrap();
    assert_ne!(hidden_root, empty);
}

/// Exclusion lists never prune directories by name
#[test]
fn test_directory_names_are_not_excluded() {
    let dir = base_tree();
    write_tree(dir.path(), &[("build/out.bin", b"binary")]);
    let with_name_rule = ExclusionPolicy::new()
        .with_excluded_name("build")
        .with_excluded_extension("build");

    let before = fingerprint(dir.path(), HashAlgorithm::Md5, &with_name_rule).unwrap();
    fs::remove_file(dir.path().join("build/out.bin")).unwrap();
    let after = fingerprint(dir.path(), HashAlgorithm::Md5, &with_name_rule).unwrap();
    assert_ne!(before, after, "files under a directory named like an exclusion still count");
}

/// Changing an included file's bytes changes the fingerprint
#[test]
fn test_changing_included_content_changes_fingerprint() {
    let dir = base_tree();
    let policy = ExclusionPolicy::new().with_excluded_extension("log");
    let before = fingerprint(dir.path(), HashAlgorithm::Md5, &policy).unwrap();

    fs::write(dir.path().join("src/lib.rs"), b"pub mod y;").unwrap();
    let after = fingerprint(dir.path(), HashAlgorithm::Md5, &policy).unwrap();
    assert_ne!(before, after);
}

/// Removing an included file changes the fingerprint
#[test]
fn test_removing_included_file_changes_fingerprint() {
    let dir = base_tree();
    let before = fingerprint(dir.path(), HashAlgorithm::Md5, &ExclusionPolicy::default()).unwrap();

    fs::remove_file(dir.path().join("README")).unwrap();
    let after = fingerprint(dir.path(), HashAlgorithm::Md5, &ExclusionPolicy::default()).unwrap();
    assert_ne!(before, after);
}

/// A file without a dot is matched by its full name as extension
#[test]
fn test_extensionless_file_matched_by_full_name() {
    let dir = base_tree();
    let policy = ExclusionPolicy::new().with_excluded_extension("README");
    let excluded = fingerprint(dir.path(), HashAlgorithm::Md5, &policy).unwrap();

    fs::remove_file(dir.path().join("README")).unwrap();
    let removed = fingerprint(dir.path(), HashAlgorithm::Md5, &ExclusionPolicy::default()).unwrap();
    assert_eq!(excluded, removed);
}
