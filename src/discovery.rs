//! Test discovery and skip resolution.
//!
//! Walks the test tree, prunes skipped subtrees before descending into them,
//! purges stale `.result` artifacts, and yields candidate tests tagged with
//! their dialect. The returned order is sorted for determinism but carries no
//! contract: tests are independent.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::errors::HarnessError;

/// Test-script dialect, derived from the file extension once at discovery
/// time. Adding a dialect means adding a variant and one executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `.py`: executed as a program through the harness's script host.
    DirectSource,
    /// `.kl`: executed through the embedded-engine context or an external
    /// interpreter subprocess.
    ExternalDsl,
}

impl Dialect {
    pub fn from_path(path: &Path) -> Option<Dialect> {
        match path.extension()?.to_str()? {
            "py" => Some(Dialect::DirectSource),
            "kl" => Some(Dialect::ExternalDsl),
            _ => None,
        }
    }
}

/// A discovered candidate test. Evaluated exactly once per run; never
/// mutated afterwards except through its sibling `.out`/`.result` artifacts.
#[derive(Debug, Clone)]
pub struct TestCase {
    pub path: PathBuf,
    pub dialect: Dialect,
}

/// Skip marker for a test file: `dir/name.ext` is suppressed by
/// `dir/name.skip`.
pub fn file_skip_marker(path: &Path) -> PathBuf {
    path.with_extension("skip")
}

/// Skip marker for a directory: `dir/sub` is suppressed by `dir/sub.skip`.
/// The marker name is the full directory name plus `.skip`, so a directory
/// named `v1.2` is suppressed by `v1.2.skip`.
pub fn folder_skip_marker(dir: &Path) -> PathBuf {
    let name = dir.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    let mut marker = name;
    marker.push(".skip");
    dir.with_file_name(marker)
}

/// Walks `root` and returns every runnable test underneath it.
///
/// Side effects, in visit order:
/// - subtrees with a sibling `<name>.skip` marker are pruned before being
///   descended into, so no descendant is ever opened;
/// - every stale `*.result` artifact is deleted, so a rerun never accumulates
///   results from anything but the most recent run;
/// - tests with a sibling `<stem>.skip` marker are announced and excluded
///   without their content being read.
///
/// File names in `exclude` (e.g. a legacy runner script living inside the
/// test tree) are never treated as tests.
pub fn discover(root: &Path, exclude: &[String]) -> Result<Vec<TestCase>, HarnessError> {
    let mut tests = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() > 0
                && entry.file_type().is_dir()
                && folder_skip_marker(entry.path()).exists()
            {
                println!("Test Folder Skipped:{}", entry.file_name().to_string_lossy());
                return false;
            }
            true
        });

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "result") {
            fs::remove_file(path).map_err(|source| HarnessError::PurgeResult {
                path: path.to_path_buf(),
                source,
            })?;
            continue;
        }
        if entry
            .file_name()
            .to_str()
            .is_some_and(|name| exclude.iter().any(|e| e == name))
        {
            continue;
        }
        let Some(dialect) = Dialect::from_path(path) else {
            continue;
        };
        if file_skip_marker(path).exists() {
            println!("Test Skipped:{}", path.display());
            continue;
        }
        tests.push(TestCase {
            path: path.to_path_buf(),
            dialect,
        });
    }
    Ok(tests)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dialect_maps_known_extensions() {
        assert_eq!(
            Dialect::from_path(Path::new("t/a.py")),
            Some(Dialect::DirectSource)
        );
        assert_eq!(
            Dialect::from_path(Path::new("t/b.kl")),
            Some(Dialect::ExternalDsl)
        );
        assert_eq!(Dialect::from_path(Path::new("t/b.out")), None);
        assert_eq!(Dialect::from_path(Path::new("t/noext")), None);
    }

    #[test]
    fn file_marker_replaces_extension() {
        assert_eq!(
            file_skip_marker(Path::new("dir/name.kl")),
            PathBuf::from("dir/name.skip")
        );
    }

    #[test]
    fn folder_marker_appends_to_full_name() {
        assert_eq!(
            folder_skip_marker(Path::new("dir/sub")),
            PathBuf::from("dir/sub.skip")
        );
        assert_eq!(
            folder_skip_marker(Path::new("dir/v1.2")),
            PathBuf::from("dir/v1.2.skip")
        );
    }
}
