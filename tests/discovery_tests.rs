// Discovery, skip resolution, and stale-result purging over real trees.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::tempdir;

use goldrun::discovery::{discover, Dialect};

fn touch(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn exclude() -> Vec<String> {
    vec!["runTests.py".to_string()]
}

#[test]
fn discovers_only_test_dialects_sorted() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    touch(&root.join("b.kl"), "report 1");
    touch(&root.join("a.py"), "print 1");
    touch(&root.join("a.out"), "1");
    touch(&root.join("notes.txt"), "not a test");
    touch(&root.join("sub/c.kl"), "report 2");

    let tests = discover(root, &exclude()).unwrap();
    let paths: Vec<PathBuf> = tests.iter().map(|t| t.path.clone()).collect();
    assert_eq!(
        paths,
        vec![root.join("a.py"), root.join("b.kl"), root.join("sub/c.kl")]
    );
    assert_eq!(tests[0].dialect, Dialect::DirectSource);
    assert_eq!(tests[1].dialect, Dialect::ExternalDsl);
}

#[test]
fn file_skip_marker_excludes_the_test() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    touch(&root.join("keep.py"), "print 1");
    touch(&root.join("skipme.py"), "print 1");
    touch(&root.join("skipme.skip"), "");

    let tests = discover(root, &exclude()).unwrap();
    let paths: Vec<PathBuf> = tests.iter().map(|t| t.path.clone()).collect();
    assert_eq!(paths, vec![root.join("keep.py")]);
}

#[test]
fn folder_skip_marker_prunes_the_whole_subtree() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    touch(&root.join("top.kl"), "report 1");
    touch(&root.join("dead.skip"), "");
    touch(&root.join("dead/x.kl"), "report 1");
    touch(&root.join("dead/deep/y.py"), "print 1");

    let tests = discover(root, &exclude()).unwrap();
    let paths: Vec<PathBuf> = tests.iter().map(|t| t.path.clone()).collect();
    assert_eq!(paths, vec![root.join("top.kl")]);
}

#[test]
fn stale_result_files_are_purged_not_run() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    touch(&root.join("a.kl"), "report 1");
    touch(&root.join("a.result"), "old failure");
    touch(&root.join("sub/b.kl"), "report 1");
    touch(&root.join("sub/b.result"), "old failure");

    let tests = discover(root, &exclude()).unwrap();
    assert_eq!(tests.len(), 2);
    assert!(!root.join("a.result").exists());
    assert!(!root.join("sub/b.result").exists());
}

#[test]
fn results_inside_skipped_folders_are_left_alone() {
    // Pruning happens before the purge ever sees the subtree.
    let dir = tempdir().unwrap();
    let root = dir.path();
    touch(&root.join("dead.skip"), "");
    touch(&root.join("dead/x.result"), "old failure");

    discover(root, &exclude()).unwrap();
    assert!(root.join("dead/x.result").exists());
}

#[test]
fn excluded_entry_script_is_not_a_test() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    touch(&root.join("runTests.py"), "legacy runner");
    touch(&root.join("a.py"), "print 1");

    let tests = discover(root, &exclude()).unwrap();
    let paths: Vec<PathBuf> = tests.iter().map(|t| t.path.clone()).collect();
    assert_eq!(paths, vec![root.join("a.py")]);
}

#[test]
fn missing_root_is_a_hard_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope");
    assert!(discover(&missing, &exclude()).is_err());
}
