//! Collaborator seams for the two script dialects.
//!
//! The harness never interprets test content itself. Direct-source tests run
//! through a [`ScriptHost`]; external-DSL tests run either through a reusable
//! [`EvalContext`] (the fast path, one long-lived context per harness) or
//! through an [`InterpreterCommand`] subprocess (the fallback path).
//!
//! Subprocess-backed implementations are provided here; embedders with an
//! in-process engine implement the traits directly.

use std::fmt;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;

use crate::errors::HarnessError;
use crate::output::SharedSink;

/// Frame label that in-process script hosts must use for stack frames
/// originating at the harness's own invocation boundary. The direct executor
/// strips frames carrying this label from failure traces before folding them
/// into test output.
pub const ENTRY_FRAME: &str = "<goldrun>";

// =============================================================================
// DIAGNOSTICS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// One static-validation diagnostic reported by the engine.
///
/// `file` is absent when the diagnostic points into the test source itself
/// rather than an included file.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub file: Option<PathBuf>,
    /// 1-based line number.
    pub line: usize,
    pub column: usize,
    pub level: Severity,
    pub desc: String,
}

/// Engine failure outside of compile diagnostics. Its textual form is
/// appended to whatever output the test had already produced; it is never a
/// harness-level error.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct EngineError(pub String);

// =============================================================================
// COLLABORATOR TRAITS
// =============================================================================

/// Reusable unit of execution for the external DSL (the fast path).
///
/// Exactly one context exists per harness; its source slot is overwritten per
/// test via [`set_source`](EvalContext::set_source) to avoid engine
/// reinitialization. Not safe to share across concurrent evaluations; a
/// parallel harness would need one context per worker.
pub trait EvalContext {
    fn set_source(&mut self, source: &str) -> Result<(), EngineError>;

    /// Static-validation diagnostics for the current source. Empty means the
    /// source compiled cleanly.
    fn diagnostics(&self) -> Vec<Diagnostic>;

    /// Evaluates the bound unit once, writing all console output to `sink`.
    fn evaluate(&mut self, sink: &SharedSink) -> Result<(), EngineError>;
}

/// Rendered failure report from a direct-source run, e.g. a traceback.
#[derive(Debug)]
pub struct ScriptFailure {
    pub trace: String,
}

/// Runs a direct-source test, writing all of its output to `sink`.
///
/// An unhandled failure in the test body is returned as a [`ScriptFailure`]
/// whose trace may include frames labeled [`ENTRY_FRAME`] for the harness
/// boundary itself.
pub trait ScriptHost {
    fn execute(
        &mut self,
        path: &Path,
        source: &str,
        sink: &SharedSink,
    ) -> Result<(), ScriptFailure>;
}

// =============================================================================
// SUBPROCESS IMPLEMENTATIONS
// =============================================================================

/// External interpreter invoked once per test file.
#[derive(Debug, Clone)]
pub struct InterpreterCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl InterpreterCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Spawns the interpreter on `path` and reads its standard output line by
    /// line until exhaustion, trimming trailing whitespace per line so CRLF
    /// output normalizes to plain newlines.
    ///
    /// A spawn failure is a setup error, not a test outcome: the interpreter
    /// binary is a precondition of the whole run.
    pub fn run_to_exhaustion(&self, path: &Path) -> Result<String, HarnessError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|source| HarnessError::Interpreter {
                program: self.program.clone(),
                source,
            })?;

        let mut output = String::new();
        if let Some(stdout) = child.stdout.take() {
            for line in BufReader::new(stdout).lines() {
                let line = line.map_err(|source| HarnessError::InterpreterRead {
                    program: self.program.clone(),
                    source,
                })?;
                output.push_str(line.trim_end());
                output.push('\n');
            }
        }
        // Exit status does not matter here: the comparison contract is
        // stdout-to-exhaustion, whatever the interpreter exits with.
        child.wait().ok();
        Ok(output)
    }
}

/// Direct-dialect host backed by a configured interpreter subprocess.
///
/// The subprocess's stdout becomes the test's output; a non-zero exit folds
/// the stderr text in as the failure trace.
pub struct SubprocessHost {
    command: InterpreterCommand,
}

impl SubprocessHost {
    pub fn new(command: InterpreterCommand) -> Self {
        Self { command }
    }
}

impl ScriptHost for SubprocessHost {
    fn execute(
        &mut self,
        path: &Path,
        _source: &str,
        sink: &SharedSink,
    ) -> Result<(), ScriptFailure> {
        let output = Command::new(&self.command.program)
            .args(&self.command.args)
            .arg(path)
            .output();
        match output {
            Ok(output) => {
                sink.emit(&String::from_utf8_lossy(&output.stdout));
                if output.status.success() {
                    Ok(())
                } else {
                    Err(ScriptFailure {
                        trace: String::from_utf8_lossy(&output.stderr).into_owned(),
                    })
                }
            }
            Err(e) => Err(ScriptFailure {
                trace: format!("failed to launch '{}': {}", self.command.program, e),
            }),
        }
    }
}
