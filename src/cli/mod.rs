//! The harness command-line interface.
//!
//! Wires the subprocess-backed collaborators into a [`Harness`] and maps the
//! run outcome onto the process exit code: non-zero when any test fails in
//! verify mode, zero otherwise.

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use termcolor::ColorChoice;

use crate::cli::args::HarnessArgs;
use crate::engine::{InterpreterCommand, SubprocessHost};
use crate::executor::DslStrategy;
use crate::harness::{Harness, HarnessConfig, Mode};

pub mod args;

/// The main entry point for the CLI.
pub fn run() -> Result<()> {
    let args = HarnessArgs::parse();

    let color = if args.no_color || !atty::is(atty::Stream::Stdout) {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };

    let mode = if args.update { Mode::Update } else { Mode::Verify };
    let mut config = HarnessConfig::new(args.root, mode);
    config.color = color;

    // The shipped binary wires the subprocess strategies; embedders with an
    // in-process engine inject EvalContext/ScriptHost implementations instead.
    let host = Box::new(SubprocessHost::new(InterpreterCommand::new(args.python)));
    let strategy = DslStrategy::Interpreter(InterpreterCommand::new(args.kl));

    let mut harness = Harness::new(config, host, strategy);
    harness
        .run(args.file.as_deref(), args.folder.as_deref())
        .into_diagnostic()?;

    if mode == Mode::Verify && harness.summary().has_failures() {
        std::process::exit(1);
    }
    Ok(())
}
