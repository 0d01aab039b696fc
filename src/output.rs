//! Output capture and diagnostic-noise filtering.
//!
//! Test bodies and engine collaborators never print directly; they write
//! through an explicit [`OutputSink`] capability handed into the execution
//! boundary. [`CaptureSink`] tees every raw write to the real console while
//! accumulating the text for comparison, so capture state cannot leak between
//! tests: there is no global stream to restore, the sink simply goes out of
//! scope with the test that owned it.
//!
//! [`LineFilter`] is applied when an executor drains the sink. It strips the
//! engine's bracketed report tags, discards startup/registration/progress
//! chatter, and trims trailing whitespace, so that goldens only record the
//! lines a test meaningfully produced.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

/// Line prefixes discarded outright: engine startup, extension registration,
/// cache and preset loading, and event/progress/suspend/resume chatter.
pub const SUPPRESSED_PREFIXES: &[&str] = &[
    "Loaded extension",
    "Registered extension",
    "IRCache",
    "Loading DFG presets",
    "[Event",
    "[Progress",
    "[Suspend",
    "[Resume",
];

/// Leading tag marking an engine report line, e.g. `[FABRIC:MT] message`.
pub const ENGINE_REPORT_TAG: &str = "[FABRIC";

// =============================================================================
// LINE FILTER
// =============================================================================

/// Normalizes one line of raw console output at a time.
#[derive(Debug, Clone)]
pub struct LineFilter {
    report_tag: String,
    suppressed: Vec<String>,
}

impl Default for LineFilter {
    fn default() -> Self {
        Self {
            report_tag: ENGINE_REPORT_TAG.to_string(),
            suppressed: SUPPRESSED_PREFIXES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl LineFilter {
    pub fn new(report_tag: impl Into<String>, suppressed: Vec<String>) -> Self {
        Self {
            report_tag: report_tag.into(),
            suppressed,
        }
    }

    /// Filters a single line. Returns `None` when the line is suppressed.
    ///
    /// Order matters: the report tag is stripped first, so a tagged event line
    /// like `[FABRIC:MT] [Progress] 50%` still hits the suppression list.
    pub fn apply(&self, line: &str) -> Option<String> {
        let line = self.strip_report_tag(line);
        if self.suppressed.iter().any(|p| line.starts_with(p.as_str())) {
            return None;
        }
        Some(line.trim_end().to_string())
    }

    /// Splits a raw output blob into lines, filters each, and rejoins them.
    ///
    /// A raw blob ending in a newline would otherwise yield a trailing empty
    /// line; that one line is dropped so both dialects normalize identically.
    pub fn filter_blob(&self, raw: &str) -> String {
        let mut kept: Vec<String> = raw.split('\n').filter_map(|l| self.apply(l)).collect();
        if raw.ends_with('\n') && kept.last().is_some_and(|l| l.is_empty()) {
            kept.pop();
        }
        kept.join("\n")
    }

    /// Drops a leading `[TAG...]` report prefix plus the one separator
    /// character that follows the closing bracket.
    fn strip_report_tag<'a>(&self, line: &'a str) -> &'a str {
        if !line.starts_with(self.report_tag.as_str()) {
            return line;
        }
        let Some(end) = line.find(']') else {
            return line;
        };
        let rest = &line[end + 1..];
        let mut chars = rest.chars();
        chars.next();
        chars.as_str()
    }
}

// =============================================================================
// OUTPUT SINKS
// =============================================================================

/// Destination for all text a test body or engine collaborator produces.
pub trait OutputSink {
    fn emit(&mut self, text: &str);
}

/// Sink that discards everything. Useful for probing collaborators.
pub struct NullSink;

impl OutputSink for NullSink {
    fn emit(&mut self, _text: &str) {}
}

/// Shared, clonable handle to a sink, passed into execution boundaries.
#[derive(Clone)]
pub struct SharedSink(pub Rc<RefCell<dyn OutputSink>>);

impl SharedSink {
    pub fn new<T: OutputSink + 'static>(sink: T) -> Self {
        SharedSink(Rc::new(RefCell::new(sink)))
    }

    pub fn emit(&self, text: &str) {
        self.0.borrow_mut().emit(text);
    }
}

/// Accumulates raw output for one test while forwarding every write to the
/// real console (dual-write), so a watching user still sees live output.
pub struct CaptureSink {
    raw: String,
    echo: bool,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self {
            raw: String::new(),
            echo: true,
        }
    }

    /// Capture without console forwarding.
    pub fn silent() -> Self {
        Self {
            raw: String::new(),
            echo: false,
        }
    }

    /// The raw, unfiltered text captured so far.
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

impl Default for CaptureSink {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputSink for CaptureSink {
    fn emit(&mut self, text: &str) {
        if self.echo {
            let mut stdout = io::stdout();
            let _ = stdout.write_all(text.as_bytes());
            let _ = stdout.flush();
        }
        self.raw.push_str(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_tag_is_stripped_through_bracket_and_separator() {
        let filter = LineFilter::default();
        assert_eq!(filter.apply("[FABRIC:MT] hello"), Some("hello".to_string()));
        assert_eq!(filter.apply("[FABRIC] world"), Some("world".to_string()));
    }

    #[test]
    fn tag_without_closing_bracket_is_left_alone() {
        let filter = LineFilter::default();
        assert_eq!(
            filter.apply("[FABRIC broken"),
            Some("[FABRIC broken".to_string())
        );
    }

    #[test]
    fn suppressed_prefixes_drop_the_line() {
        let filter = LineFilter::default();
        assert_eq!(filter.apply("[Event] node dirtied"), None);
        assert_eq!(filter.apply("Loaded extension Geometry"), None);
        assert_eq!(filter.apply("[Progress] 50%"), None);
    }

    #[test]
    fn suppression_applies_after_tag_stripping() {
        let filter = LineFilter::default();
        assert_eq!(filter.apply("[FABRIC:MT] [Event] dirtied"), None);
    }

    #[test]
    fn trailing_whitespace_is_trimmed() {
        let filter = LineFilter::default();
        assert_eq!(filter.apply("value = 3   \t"), Some("value = 3".to_string()));
    }

    #[test]
    fn blob_filtering_drops_noise_and_trailing_newline() {
        let filter = LineFilter::default();
        let raw = "hello\n[Event] noise\nworld\n";
        assert_eq!(filter.filter_blob(raw), "hello\nworld");
    }

    #[test]
    fn interior_blank_lines_survive() {
        let filter = LineFilter::default();
        assert_eq!(filter.filter_blob("a\n\nb\n"), "a\n\nb");
    }

    #[test]
    fn capture_sink_accumulates_raw_writes() {
        let mut sink = CaptureSink::silent();
        sink.emit("one\n");
        sink.emit("two");
        assert_eq!(sink.raw(), "one\ntwo");
    }

    #[test]
    fn shared_sink_forwards_to_inner() {
        let buffer = Rc::new(RefCell::new(CaptureSink::silent()));
        let shared = SharedSink(buffer.clone());
        shared.emit("ping");
        assert_eq!(buffer.borrow().raw(), "ping");
    }
}
