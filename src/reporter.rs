//! End-of-run aggregation and summary printing.

use std::path::{Path, PathBuf};

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::golden::{golden_path, Outcome};

pub const BANNER: &str = "======================================";

/// Ordered record of what a run failed and what it rewrote. Appended to as
/// tests are evaluated, printed once at the end; no re-execution.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub failed: Vec<PathBuf>,
    pub updated: Vec<PathBuf>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, test_path: &Path, outcome: Outcome) {
        match outcome {
            Outcome::Failed => self.failed.push(test_path.to_path_buf()),
            Outcome::Created | Outcome::Updated => self.updated.push(golden_path(test_path)),
            Outcome::Passed | Outcome::ValidUnchanged => {}
        }
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    /// Prints the final summary. Verify mode reports either a green all-clear
    /// or the enumerated failures; update mode enumerates rewritten
    /// references and prints nothing when there were none.
    pub fn print(&self, update: bool, color: ColorChoice) {
        let mut stdout = StandardStream::stdout(color);
        if !update {
            println!("{}", BANNER);
            if self.failed.is_empty() {
                let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true));
                println!("ALL TESTS PASSED");
                let _ = stdout.reset();
            } else {
                let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
                println!("FAILED TESTS");
                let _ = stdout.reset();
                for path in &self.failed {
                    println!("{}", path.display());
                }
            }
        } else if !self.updated.is_empty() {
            println!("{}", BANNER);
            let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true));
            println!("UPDATED TESTS");
            let _ = stdout.reset();
            for path in &self.updated {
                println!("{}", path.display());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_routes_outcomes() {
        let mut summary = RunSummary::new();
        summary.record(Path::new("t/a.kl"), Outcome::Failed);
        summary.record(Path::new("t/b.kl"), Outcome::Created);
        summary.record(Path::new("t/c.kl"), Outcome::Updated);
        summary.record(Path::new("t/d.kl"), Outcome::Passed);
        summary.record(Path::new("t/e.kl"), Outcome::ValidUnchanged);
        assert_eq!(summary.failed, vec![PathBuf::from("t/a.kl")]);
        assert_eq!(
            summary.updated,
            vec![PathBuf::from("t/b.out"), PathBuf::from("t/c.out")]
        );
        assert!(summary.has_failures());
    }
}
