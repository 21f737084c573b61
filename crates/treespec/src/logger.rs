//! Line-oriented output sinks.
//!
//! The runner never prints on its own. Every status line, error report and
//! summary goes through a [`Logger`], which owns indentation and muting.

use std::io::{IsTerminal, Write};
use std::panic::{self, PanicHookInfo};

/// How a piece of text should be presented. Sinks without color ignore it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Style {
    Plain,
    Banner,
    Passed,
    Cancelled,
    Failed,
    Warning,
}

/// An append-only text sink with indentation scopes.
///
/// Indentation is applied when the first text of a line is written, so a
/// line may be assembled from several `write` calls.
pub trait Logger {
    fn write(&mut self, text: &str, style: Style);

    fn end_line(&mut self);

    fn nest(&mut self);

    fn unnest(&mut self);

    /// Called right before a test body runs. Output written while muted is
    /// dropped.
    fn mute(&mut self) {}

    fn unmute(&mut self) {}

    fn line(&mut self, text: &str) {
        self.write(text, Style::Plain);
        self.end_line();
    }

    fn styled_line(&mut self, text: &str, style: Style) {
        self.write(text, style);
        self.end_line();
    }
}

const INDENT: &str = "  ";

/// Shared line assembly for the built-in sinks.
struct LineState {
    depth: usize,
    at_line_start: bool,
    muted: bool,
}

impl LineState {
    fn new() -> Self {
        LineState {
            depth: 0,
            at_line_start: true,
            muted: false,
        }
    }

    /// Returns the indentation owed before the next text, if any.
    fn prefix(&mut self) -> Option<String> {
        if self.at_line_start {
            self.at_line_start = false;
            Some(INDENT.repeat(self.depth))
        } else {
            None
        }
    }
}

impl Default for LineState {
    fn default() -> Self {
        LineState::new()
    }
}

// ============================================================================
// ConsoleLogger
// ============================================================================

/// Writes to stdout, coloring status words when stdout is a terminal.
pub struct ConsoleLogger {
    state: LineState,
    color: bool,
    saved_hook: Option<Box<dyn Fn(&PanicHookInfo<'_>) + Sync + Send + 'static>>,
}

impl ConsoleLogger {
    pub fn new(color: bool) -> Self {
        ConsoleLogger {
            state: LineState::new(),
            color,
            saved_hook: None,
        }
    }

    /// Color only if stdout is a terminal and `NO_COLOR` is unset.
    pub fn detect() -> Self {
        ConsoleLogger::new(use_color())
    }

    fn emit(&mut self, text: &str) {
        let mut out = std::io::stdout().lock();
        // A closed stdout is not worth failing a test run over.
        let _ = out.write_all(text.as_bytes());
    }
}

impl Logger for ConsoleLogger {
    fn write(&mut self, text: &str, style: Style) {
        if self.state.muted {
            return;
        }
        if let Some(prefix) = self.state.prefix() {
            self.emit(&prefix);
        }
        let painted = paint(text, style, self.color);
        self.emit(&painted);
    }

    fn end_line(&mut self) {
        if self.state.muted {
            return;
        }
        self.emit("\n");
        self.state.at_line_start = true;
    }

    fn nest(&mut self) {
        self.state.depth += 1;
    }

    fn unnest(&mut self) {
        self.state.depth = self.state.depth.saturating_sub(1);
    }

    fn mute(&mut self) {
        let _ = std::io::stdout().flush();
        self.state.muted = true;
        if self.saved_hook.is_none() {
            self.saved_hook = Some(panic::take_hook());
            panic::set_hook(Box::new(|_| {}));
        }
    }

    fn unmute(&mut self) {
        if let Some(hook) = self.saved_hook.take() {
            panic::set_hook(hook);
        }
        self.state.muted = false;
    }
}

impl Drop for ConsoleLogger {
    fn drop(&mut self) {
        self.unmute();
        let _ = std::io::stdout().flush();
    }
}

pub(crate) fn use_color() -> bool {
    // Respect NO_COLOR env var (https://no-color.org/)
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    std::io::stdout().is_terminal()
}

fn paint(text: &str, style: Style, color: bool) -> String {
    let code = match style {
        Style::Plain => return text.to_string(),
        Style::Banner => "1",
        Style::Passed => "32",
        Style::Cancelled => "33",
        Style::Failed => "31",
        Style::Warning => "33",
    };
    if color {
        format!("\x1b[{code}m{text}\x1b[0m")
    } else {
        text.to_string()
    }
}

// ============================================================================
// MemoryLogger
// ============================================================================

/// Collects output in memory. Useful for asserting on reports.
#[derive(Default)]
pub struct MemoryLogger {
    state: LineState,
    buffer: String,
    mute_count: usize,
}

impl MemoryLogger {
    pub fn new() -> Self {
        MemoryLogger {
            state: LineState::new(),
            buffer: String::new(),
            mute_count: 0,
        }
    }

    pub fn contents(&self) -> &str {
        &self.buffer
    }

    pub fn lines(&self) -> Vec<&str> {
        self.buffer.lines().collect()
    }

    /// How many times output was muted, i.e. how many test runs were attempted.
    pub fn mute_count(&self) -> usize {
        self.mute_count
    }

    pub fn is_muted(&self) -> bool {
        self.state.muted
    }
}

impl Logger for MemoryLogger {
    fn write(&mut self, text: &str, _style: Style) {
        if self.state.muted {
            return;
        }
        if let Some(prefix) = self.state.prefix() {
            self.buffer.push_str(&prefix);
        }
        self.buffer.push_str(text);
    }

    fn end_line(&mut self) {
        if self.state.muted {
            return;
        }
        self.buffer.push('\n');
        self.state.at_line_start = true;
    }

    fn nest(&mut self) {
        self.state.depth += 1;
    }

    fn unnest(&mut self) {
        self.state.depth = self.state.depth.saturating_sub(1);
    }

    fn mute(&mut self) {
        self.mute_count += 1;
        self.state.muted = true;
    }

    fn unmute(&mut self) {
        self.state.muted = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indentation_applies_at_line_start() {
        let mut logger = MemoryLogger::new();
        logger.line("root");
        logger.nest();
        logger.write("name---|", Style::Plain);
        logger.write("passed", Style::Passed);
        logger.end_line();
        logger.nest();
        logger.line("deeper");
        logger.unnest();
        logger.unnest();
        logger.line("back");

        assert_eq!(
            logger.contents(),
            "root\n  name---|passed\n    deeper\nback\n"
        );
    }

    #[test]
    fn test_muted_output_is_dropped() {
        let mut logger = MemoryLogger::new();
        logger.write("prefix|", Style::Plain);
        logger.mute();
        logger.line("noise");
        assert!(logger.is_muted());
        logger.unmute();
        logger.styled_line("passed", Style::Passed);

        assert_eq!(logger.contents(), "prefix|passed\n");
        assert_eq!(logger.mute_count(), 1);
    }

    #[test]
    fn test_unnest_saturates() {
        let mut logger = MemoryLogger::new();
        logger.unnest();
        logger.line("x");
        assert_eq!(logger.lines(), vec!["x"]);
    }

    #[test]
    fn test_paint() {
        assert_eq!(paint("ok", Style::Passed, false), "ok");
        assert_eq!(paint("ok", Style::Passed, true), "\x1b[32mok\x1b[0m");
        assert_eq!(paint("ok", Style::Plain, true), "ok");
    }
}
