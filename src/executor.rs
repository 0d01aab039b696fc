//! Script executors, one per dialect.
//!
//! Both executors satisfy the same contract: given a test, produce a single
//! flat text blob. Everything a test can do wrong (unhandled failures,
//! compile diagnostics, evaluation errors) becomes part of that blob; the
//! run always continues to the next test.

use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use crate::discovery::TestCase;
use crate::engine::{
    Diagnostic, EngineError, EvalContext, InterpreterCommand, ScriptHost, ENTRY_FRAME,
};
use crate::errors::HarnessError;
use crate::output::{CaptureSink, LineFilter, SharedSink};

const DIAG_SEPARATOR: &str = "-----------------------------------";

/// Produces the normalized text output for a single test file.
pub trait Executor {
    fn run(&mut self, test: &TestCase) -> Result<String, HarnessError>;
}

// =============================================================================
// DIRECT-SOURCE EXECUTOR
// =============================================================================

/// Runs direct-source tests through a [`ScriptHost`], with the whole
/// execution wrapped in a capture sink.
pub struct DirectExecutor {
    host: Box<dyn ScriptHost>,
    filter: LineFilter,
}

impl DirectExecutor {
    pub fn new(host: Box<dyn ScriptHost>, filter: LineFilter) -> Self {
        Self { host, filter }
    }
}

impl Executor for DirectExecutor {
    fn run(&mut self, test: &TestCase) -> Result<String, HarnessError> {
        println!("Running Python test:{}", test.path.display());
        let source = fs::read_to_string(&test.path).map_err(|source| HarnessError::ReadTest {
            path: test.path.clone(),
            source,
        })?;

        let buffer = Rc::new(RefCell::new(CaptureSink::new()));
        let sink = SharedSink(buffer.clone());
        if let Err(failure) = self.host.execute(&test.path, &source, &sink) {
            // The failure trace is part of the test's output, minus the
            // frames that belong to the harness itself.
            let mut trace = sanitize_trace(&failure.trace, ENTRY_FRAME);
            if !trace.is_empty() && !trace.ends_with('\n') {
                trace.push('\n');
            }
            sink.emit(&trace);
        }

        let raw = buffer.borrow().raw().to_string();
        Ok(self.filter.filter_blob(&raw))
    }
}

/// Removes stack frames labeled with `entry_marker` (and their indented
/// continuation lines) from a failure trace, plus one trailing blank line, so
/// the printed trace does not leak harness-internal frames.
pub fn sanitize_trace(trace: &str, entry_marker: &str) -> String {
    let lines: Vec<&str> = trace.split('\n').collect();
    let mut kept: Vec<&str> = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        if line.contains(entry_marker) {
            let frame_indent = indent_width(line);
            i += 1;
            while i < lines.len()
                && !lines[i].trim().is_empty()
                && indent_width(lines[i]) > frame_indent
            {
                i += 1;
            }
            continue;
        }
        kept.push(line);
        i += 1;
    }
    if kept.last().is_some_and(|l| l.trim().is_empty()) {
        kept.pop();
    }
    kept.join("\n")
}

fn indent_width(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

// =============================================================================
// EXTERNAL-DSL EXECUTOR
// =============================================================================

/// Execution strategy for the external DSL.
pub enum DslStrategy {
    /// Fast path: one long-lived engine context, its source slot overwritten
    /// per test.
    Context(Box<dyn EvalContext>),
    /// Fallback path: an interpreter subprocess per test file.
    Interpreter(InterpreterCommand),
}

pub struct DslExecutor {
    strategy: DslStrategy,
    filter: LineFilter,
}

impl DslExecutor {
    pub fn new(strategy: DslStrategy, filter: LineFilter) -> Self {
        Self { strategy, filter }
    }
}

impl Executor for DslExecutor {
    fn run(&mut self, test: &TestCase) -> Result<String, HarnessError> {
        println!("Running KL test:{}", test.path.display());
        let raw = match &mut self.strategy {
            DslStrategy::Context(context) => run_in_context(context.as_mut(), test)?,
            DslStrategy::Interpreter(command) => command.run_to_exhaustion(&test.path)?,
        };
        Ok(self.filter.filter_blob(&raw))
    }
}

/// Fast-path evaluation: replace the context's source, check diagnostics,
/// evaluate once. An engine error appends its text to whatever was already
/// captured rather than replacing it.
fn run_in_context(context: &mut dyn EvalContext, test: &TestCase) -> Result<String, HarnessError> {
    let source = fs::read_to_string(&test.path).map_err(|source| HarnessError::ReadTest {
        path: test.path.clone(),
        source,
    })?;

    let buffer = Rc::new(RefCell::new(CaptureSink::new()));
    let sink = SharedSink(buffer.clone());

    let outcome = compile_and_evaluate(context, test, &source, &sink);

    let mut raw = buffer.borrow().raw().to_string();
    if let Err(e) = outcome {
        raw.push_str(&e.to_string());
    }
    Ok(raw)
}

fn compile_and_evaluate(
    context: &mut dyn EvalContext,
    test: &TestCase,
    source: &str,
    sink: &SharedSink,
) -> Result<(), EngineError> {
    context.set_source(source)?;
    let diagnostics = context.diagnostics();
    if !diagnostics.is_empty() {
        sink.emit(&format_compile_errors(&test.path, source, &diagnostics));
        return Ok(());
    }
    context.evaluate(sink)
}

/// Formats compile diagnostics into the structured error block that becomes
/// the test's output: a header naming the test, then per diagnostic its
/// location line and a ±2-line source excerpt with the offending line marked.
pub fn format_compile_errors(
    test_path: &Path,
    source: &str,
    diagnostics: &[Diagnostic],
) -> String {
    let mut text = Vec::new();
    text.push(format!(
        "Compilation error while compiling test: '{}'",
        test_path.display()
    ));
    text.push(DIAG_SEPARATOR.to_string());
    for diag in diagnostics {
        let excerpt_source = match diag.file.as_deref().filter(|f| f.exists()) {
            Some(file) => {
                text.push(format!("Error in {}", file.display()));
                text.push(format!(
                    "{}:{}:{}: {}: {}",
                    file.display(),
                    diag.line,
                    diag.column,
                    diag.level,
                    diag.desc
                ));
                fs::read_to_string(file).unwrap_or_else(|_| source.to_string())
            }
            None => {
                text.push(format!("Error in {}", test_path.display()));
                text.push(format!(
                    "{}:{}: {}: {}",
                    diag.line, diag.column, diag.level, diag.desc
                ));
                source.to_string()
            }
        };
        text.extend(excerpt(&excerpt_source, diag.line));
    }
    text.push(DIAG_SEPARATOR.to_string());
    let mut block = text.join("\n");
    block.push('\n');
    block
}

/// ±2-line excerpt centered on `line` (1-based), clamped to the source.
/// Line numbers are zero-padded to 4 digits; the offending line carries a
/// `" > "` marker.
fn excerpt(source: &str, line: usize) -> Vec<String> {
    let lines: Vec<&str> = source.split('\n').collect();
    if line == 0 || lines.is_empty() {
        return Vec::new();
    }
    let error_line = (line - 1).min(lines.len() - 1);
    let first = error_line.saturating_sub(2);
    let last = (error_line + 2).min(lines.len() - 1);
    (first..=last)
        .map(|i| {
            let marker = if i == error_line { " > " } else { "   " };
            format!("{:04}{}{}", i + 1, marker, lines[i])
        })
        .collect()
}
