//! The diagnostic channel shared by Sema and the evaluator.
//!
//! A diagnostic carries a severity, a source location, and a message.
//! Ember has no `[[noreturn]]`-shaped escape hatch — `check`/`eval_type`
//! return `Result<_, ()>` instead, with the sink holding the accumulated
//! diagnostics, preferring explicit `Result` over panics or exceptions for
//! expected failure paths.

use std::fmt;

use crate::token::CodeRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// A single semantic diagnostic: a location, a message, a severity, and a
/// chain of related notes (the original's pattern of emitting an ambiguity
/// error followed by one note per ambiguous candidate).
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub range: CodeRange,
    pub message: String,
    pub notes: Vec<Diagnostic>,
}

impl Diagnostic {
    #[must_use]
    pub fn error(range: CodeRange, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            range,
            message: message.into(),
            notes: Vec::new(),
        }
    }

    #[must_use]
    pub fn warning(range: CodeRange, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            range,
            message: message.into(),
            notes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_note(mut self, note: Self) -> Self {
        self.notes.push(note);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.severity, self.message, self.range)?;
        for note in &self.notes {
            write!(f, "\n  note: {} ({})", note.message, note.range)?;
        }
        Ok(())
    }
}

/// Accumulates diagnostics emitted while checking one program.
///
/// Mirrors the original's `emit`/`stop` contract: `emit` records a
/// diagnostic and keeps going (used for warnings and for errors that do not
/// prevent further checking), `stop` is for callers that cannot usefully
/// continue once they have recorded a fatal error.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Attaches `note` to every diagnostic appended since `start` (an index
    /// previously read from `len`), in-place. Used to wrap errors raised
    /// while checking a generic instantiation with a note naming it.
    pub fn annotate_since(&mut self, start: usize, note: &Diagnostic) {
        for diag in &mut self.diagnostics[start..] {
            diag.notes.push(note.clone());
        }
    }

    #[must_use]
    pub fn had_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

/// A fault raised while evaluating an already-checked program.
///
/// Kept intentionally small: Sema rules out every ill-typed program before
/// the evaluator ever runs, so the only faults left are ones that depend on
/// runtime values (division/modulo by zero) plus
/// the recursion guard in `resource`.
#[derive(Debug, Clone)]
pub enum RuntimeError {
    DivisionByZero(CodeRange),
    RecursionLimit { range: CodeRange, limit: usize },
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DivisionByZero(range) => write!(f, "divided by zero ({range})"),
            Self::RecursionLimit { range, limit } => {
                write!(f, "maximum recursion depth ({limit}) exceeded ({range})")
            }
        }
    }
}

impl std::error::Error for RuntimeError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::CodeLoc;

    #[test]
    fn had_errors_ignores_warnings() {
        let mut sink = DiagnosticSink::new();
        sink.emit(Diagnostic::warning(CodeRange::default(), "just a warning"));
        assert!(!sink.had_errors());
        sink.emit(Diagnostic::error(CodeRange::default(), "fatal"));
        assert!(sink.had_errors());
        assert_eq!(sink.diagnostics().len(), 2);
    }

    #[test]
    fn with_note_chains_onto_the_diagnostic() {
        let range = CodeRange::point(CodeLoc::new(1, 1));
        let diag = Diagnostic::error(range, "ambiguous call").with_note(Diagnostic::error(range, "candidate here"));
        assert_eq!(diag.notes.len(), 1);
        assert_eq!(diag.notes[0].message, "candidate here");
    }

    #[test]
    fn division_by_zero_message_is_descriptive() {
        let err = RuntimeError::DivisionByZero(CodeRange::default());
        assert!(err.to_string().contains("divided by zero"));
    }
}
