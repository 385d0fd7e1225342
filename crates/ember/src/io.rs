//! Output capture for the `print` builtin.
//!
//! A `PrintWriter`/`StdPrint`/`CollectStringPrint` trio with no
//! stdout/stderr redirect-stack machinery — Ember has no
//! output-redirection language feature, so `Runner` is handed a
//! `PrintWriter` directly instead of pushing/popping a redirect target.

use std::{
    borrow::Cow,
    cell::RefCell,
    io::{self, Write as _},
};

/// Implement this to capture or redirect output from the `print` builtin.
pub trait PrintWriter {
    /// Writes one formatted argument's text, with no separator or trailing
    /// newline; those are emitted via `push`.
    fn write(&mut self, output: Cow<'_, str>);

    /// Writes a single separator/terminator character (a space between
    /// arguments, the trailing newline).
    fn push(&mut self, end: char);
}

/// Writes to process stdout, buffered per-call and flushed on drop so
/// interleaving with stderr diagnostics stays predictable.
#[derive(Debug, Default)]
pub struct StdPrint {
    buffer: RefCell<String>,
}

impl StdPrint {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PrintWriter for StdPrint {
    fn write(&mut self, output: Cow<'_, str>) {
        self.buffer.borrow_mut().push_str(&output);
    }

    fn push(&mut self, end: char) {
        self.buffer.borrow_mut().push(end);
    }
}

impl Drop for StdPrint {
    fn drop(&mut self) {
        let mut buffer = self.buffer.borrow_mut();
        if buffer.is_empty() {
            return;
        }
        let _ = io::stdout().write_all(buffer.as_bytes());
        let _ = io::stdout().flush();
        buffer.clear();
    }
}

/// Collects all output into an owned `String`. Used by tests to assert on
/// `print` output without touching the real stdout stream.
#[derive(Debug, Default)]
pub struct CollectStringPrint(String);

impl CollectStringPrint {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn output(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_output(self) -> String {
        self.0
    }
}

impl PrintWriter for CollectStringPrint {
    fn write(&mut self, output: Cow<'_, str>) {
        self.0.push_str(&output);
    }

    fn push(&mut self, end: char) {
        self.0.push(end);
    }
}

/// Discards all output. Useful when only the return value matters.
#[derive(Debug, Default)]
pub struct NoPrint;

impl PrintWriter for NoPrint {
    fn write(&mut self, _output: Cow<'_, str>) {}
    fn push(&mut self, _end: char) {}
}
