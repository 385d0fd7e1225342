//! Source locations shared by the lexer, the AST, and diagnostics.

use std::fmt;

/// A single point in source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct CodeLoc {
    pub line: u32,
    pub column: u32,
}

impl CodeLoc {
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for CodeLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A half-open span of source text, from `start` up to and including `end`.
///
/// Every AST node and token carries one of these; diagnostics point back at
/// it to render `line:column` context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CodeRange {
    pub start: CodeLoc,
    pub end: CodeLoc,
}

impl CodeRange {
    #[must_use]
    pub const fn new(start: CodeLoc, end: CodeLoc) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub const fn point(loc: CodeLoc) -> Self {
        Self { start: loc, end: loc }
    }

    /// Merges two ranges into the smallest range covering both.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Display for CodeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Lexical token kinds produced by `syntax::lexer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Ident(String),
    Int(i64),
    Float(u64), // bits of an f64, kept hashable/Eq for token comparisons
    Str(String),
    Char(char),
    KwFn,
    KwLet,
    KwClass,
    KwEnum,
    KwIf,
    KwElse,
    KwWhile,
    KwFor,
    KwIn,
    KwReturn,
    KwBreak,
    KwContinue,
    KwTry,
    KwCatch,
    KwThrow,
    KwTrue,
    KwFalse,
    KwNone,
    KwNew,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    LShift,
    RShift,
    Eq,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Bang,
    AmpAmp,
    PipePipe,
    Arrow,
    Colon,
    ColonColon,
    Comma,
    Dot,
    Semi,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Eof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub range: CodeRange,
}

impl Token {
    #[must_use]
    pub const fn new(kind: TokenKind, range: CodeRange) -> Self {
        Self { kind, range }
    }
}
