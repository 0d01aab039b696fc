//! Defines the command-line arguments for the harness.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "goldrun",
    version,
    about = "Discovers test scripts, runs them under captured output, and compares against golden files."
)]
pub struct HarnessArgs {
    /// Root directory containing the test tree.
    #[arg(default_value = "Tests")]
    pub root: PathBuf,

    /// Run exactly one test file (resolved as given, then under the root).
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Scope discovery to a sub-directory of the root.
    #[arg(long, conflicts_with = "file")]
    pub folder: Option<PathBuf>,

    /// Rewrite reference files from produced output instead of verifying.
    #[arg(long)]
    pub update: bool,

    /// External DSL interpreter for the fallback execution strategy.
    #[arg(long, default_value = "kl")]
    pub kl: String,

    /// Interpreter backing the direct-source dialect.
    #[arg(long, default_value = "python")]
    pub python: String,

    /// Disable colored diff and summary output.
    #[arg(long)]
    pub no_color: bool,
}
