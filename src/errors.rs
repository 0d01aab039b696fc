//! Harness-fatal error types.
//!
//! Only cross-cutting setup failures surface as [`HarnessError`]: unreadable
//! test trees, missing `--file`/`--folder` targets, interpreters that cannot
//! be launched, unwritable reference artifacts. Per-test failures never reach
//! this type; they are folded into the test's captured output and compared
//! like any other text.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("failed to read test file {}: {source}", .path.display())]
    ReadTest { path: PathBuf, source: io::Error },

    #[error("failed to read reference file {}: {source}", .path.display())]
    ReadReference { path: PathBuf, source: io::Error },

    #[error("failed to write {}: {source}", .path.display())]
    WriteArtifact { path: PathBuf, source: io::Error },

    #[error("failed to remove stale result file {}: {source}", .path.display())]
    PurgeResult { path: PathBuf, source: io::Error },

    #[error("failed to walk test directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("failed to launch interpreter '{program}': {source}")]
    Interpreter { program: String, source: io::Error },

    #[error("interpreter '{program}' produced unreadable output: {source}")]
    InterpreterRead { program: String, source: io::Error },

    #[error("test file not found: {}", .0.display())]
    TestNotFound(PathBuf),

    #[error("test folder not found: {}", .0.display())]
    FolderNotFound(PathBuf),

    #[error("no executor for the extension of {}", .0.display())]
    UnknownDialect(PathBuf),
}
