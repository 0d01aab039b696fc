//! Golden-file lifecycle: compare, create, update, and diff.
//!
//! A test's reference output lives next to it as `<stem>.out`; the last
//! failing output lives at `<stem>.result` for external diffing. Outside of
//! update mode the golden file is the sole source of truth and is never
//! written to; only first creation and explicit updates touch it.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use difference::{Changeset, Difference};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::errors::HarnessError;

/// Outcome of one golden-file decision.
///
/// `Passed`/`Failed` only occur in verify mode; `Created`/`Updated`/
/// `ValidUnchanged` only when the golden is absent or an update was
/// requested. Mismatch and golden-absent are outcomes, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Created,
    Updated,
    ValidUnchanged,
    Passed,
    Failed,
}

/// Golden path for a test: extension replaced with `.out`.
pub fn golden_path(test_path: &Path) -> PathBuf {
    test_path.with_extension("out")
}

/// Result path for a test: extension replaced with `.result`.
pub fn result_path(test_path: &Path) -> PathBuf {
    test_path.with_extension("result")
}

pub struct GoldenManager {
    color: ColorChoice,
}

impl GoldenManager {
    pub fn new(color: ColorChoice) -> Self {
        Self { color }
    }

    /// Decides the fate of one test's produced output.
    ///
    /// - Golden absent, or update requested: write the output (all-or-nothing)
    ///   unless it already matches, and report `Created`/`Updated`/
    ///   `ValidUnchanged`.
    /// - Otherwise: byte-compare. A mismatch writes `<stem>.result` and prints
    ///   a line-level diff immediately, for quick feedback ahead of the
    ///   end-of-run summary.
    pub fn decide(
        &self,
        test_path: &Path,
        produced: &str,
        update: bool,
    ) -> Result<Outcome, HarnessError> {
        let reference = golden_path(test_path);
        let existing = match fs::read_to_string(&reference) {
            Ok(text) => Some(text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(source) => {
                return Err(HarnessError::ReadReference {
                    path: reference,
                    source,
                })
            }
        };

        match &existing {
            Some(reference_text) if !update => {
                if produced == reference_text {
                    println!("Test Passed:{}", test_path.display());
                    Ok(Outcome::Passed)
                } else {
                    println!("Test Failed:{}", test_path.display());
                    let result = result_path(test_path);
                    fs::write(&result, produced).map_err(|source| {
                        HarnessError::WriteArtifact {
                            path: result,
                            source,
                        }
                    })?;
                    self.print_diff(reference_text, produced);
                    Ok(Outcome::Failed)
                }
            }
            _ => {
                if existing.as_deref() == Some(produced) {
                    println!("Reference is Valid:{}", reference.display());
                    return Ok(Outcome::ValidUnchanged);
                }
                write_whole(&reference, produced)?;
                if existing.is_some() {
                    println!("Reference Updated:{}", reference.display());
                    Ok(Outcome::Updated)
                } else {
                    println!("Reference Created:{}", reference.display());
                    Ok(Outcome::Created)
                }
            }
        }
    }

    /// Prints an LCS line diff between golden and produced output: removed
    /// golden-only lines in red, added produced-only lines in green.
    fn print_diff(&self, reference: &str, produced: &str) {
        let changeset = Changeset::new(reference, produced, "\n");
        let mut stdout = StandardStream::stdout(self.color);
        for diff in &changeset.diffs {
            match diff {
                Difference::Same(block) => {
                    let _ = stdout.reset();
                    for line in block.split('\n') {
                        println!("  {}", line);
                    }
                }
                Difference::Add(block) => {
                    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)));
                    for line in block.split('\n') {
                        println!("+ {}", line);
                    }
                }
                Difference::Rem(block) => {
                    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)));
                    for line in block.split('\n') {
                        println!("- {}", line);
                    }
                }
            }
        }
        let _ = stdout.reset();
    }
}

/// All-or-nothing golden write: stage a sibling temp file, then rename over
/// the target so a crash mid-write never leaves a truncated golden.
fn write_whole(path: &Path, contents: &str) -> Result<(), HarnessError> {
    let mut staged_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    staged_name.push(".tmp");
    let staged = path.with_file_name(staged_name);
    let write = fs::write(&staged, contents).and_then(|_| fs::rename(&staged, path));
    write.map_err(|source| HarnessError::WriteArtifact {
        path: path.to_path_buf(),
        source,
    })
}
