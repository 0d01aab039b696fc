// Golden-file lifecycle: outcome matrix, .result artifacts, and the
// never-touch-goldens-in-verify-mode invariant.

use std::fs;

use tempfile::tempdir;
use termcolor::ColorChoice;

use goldrun::golden::{golden_path, result_path, GoldenManager, Outcome};

fn manager() -> GoldenManager {
    GoldenManager::new(ColorChoice::Never)
}

#[test]
fn absent_golden_is_created_in_verify_mode() {
    let dir = tempdir().unwrap();
    let test = dir.path().join("a.kl");
    fs::write(&test, "report 1").unwrap();

    let outcome = manager().decide(&test, "hello\nworld", false).unwrap();
    assert_eq!(outcome, Outcome::Created);
    assert_eq!(fs::read_to_string(golden_path(&test)).unwrap(), "hello\nworld");
    assert!(!result_path(&test).exists());
}

#[test]
fn matching_golden_passes_without_writing() {
    let dir = tempdir().unwrap();
    let test = dir.path().join("a.kl");
    fs::write(&test, "report 1").unwrap();
    fs::write(golden_path(&test), "hello\nworld").unwrap();

    let outcome = manager().decide(&test, "hello\nworld", false).unwrap();
    assert_eq!(outcome, Outcome::Passed);
    assert!(!result_path(&test).exists());
}

#[test]
fn mismatch_fails_and_records_result_exactly() {
    let dir = tempdir().unwrap();
    let test = dir.path().join("a.kl");
    fs::write(&test, "report 1").unwrap();
    fs::write(golden_path(&test), "hello\nuniverse").unwrap();

    let outcome = manager().decide(&test, "hello\nworld", false).unwrap();
    assert_eq!(outcome, Outcome::Failed);
    assert_eq!(
        fs::read_to_string(result_path(&test)).unwrap(),
        "hello\nworld"
    );
    // Verify mode never mutates the golden, regardless of outcome.
    assert_eq!(
        fs::read_to_string(golden_path(&test)).unwrap(),
        "hello\nuniverse"
    );
}

#[test]
fn update_rewrites_a_stale_golden() {
    let dir = tempdir().unwrap();
    let test = dir.path().join("a.kl");
    fs::write(&test, "report 1").unwrap();
    fs::write(golden_path(&test), "old").unwrap();

    let outcome = manager().decide(&test, "new", true).unwrap();
    assert_eq!(outcome, Outcome::Updated);
    assert_eq!(fs::read_to_string(golden_path(&test)).unwrap(), "new");
    assert!(!result_path(&test).exists());
}

#[test]
fn update_with_matching_golden_leaves_bytes_untouched() {
    let dir = tempdir().unwrap();
    let test = dir.path().join("a.kl");
    fs::write(&test, "report 1").unwrap();
    fs::write(golden_path(&test), "same").unwrap();
    let before = fs::metadata(golden_path(&test)).unwrap().modified().unwrap();

    let outcome = manager().decide(&test, "same", true).unwrap();
    assert_eq!(outcome, Outcome::ValidUnchanged);
    assert_eq!(fs::read_to_string(golden_path(&test)).unwrap(), "same");
    let after = fs::metadata(golden_path(&test)).unwrap().modified().unwrap();
    assert_eq!(before, after);
}

#[test]
fn update_with_absent_golden_reports_created() {
    let dir = tempdir().unwrap();
    let test = dir.path().join("a.kl");
    fs::write(&test, "report 1").unwrap();

    let outcome = manager().decide(&test, "fresh", true).unwrap();
    assert_eq!(outcome, Outcome::Created);
    assert_eq!(fs::read_to_string(golden_path(&test)).unwrap(), "fresh");
}

#[test]
fn golden_writes_leave_no_staging_files_behind() {
    let dir = tempdir().unwrap();
    let test = dir.path().join("a.kl");
    fs::write(&test, "report 1").unwrap();

    manager().decide(&test, "content", false).unwrap();
    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "tmp"))
        .collect();
    assert!(leftovers.is_empty());
}
