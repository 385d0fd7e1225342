//! Hand-rolled tokenizer: source text to `Vec<token::Token>`.
//!
//! A `Peekable<Chars>` cursor tracking line/column by hand, one
//! `next_token` call per token, and a `LexError` carrying a message plus
//! a `CodeRange`.

use std::{iter::Peekable, str::Chars};

use crate::token::{CodeLoc, CodeRange, Token, TokenKind};

#[derive(Debug, Clone)]
pub struct LexError {
    pub message: String,
    pub range: CodeRange,
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.range)
    }
}

impl std::error::Error for LexError {}

pub struct Lexer<'src> {
    chars: Peekable<Chars<'src>>,
    line: u32,
    column: u32,
}

impl<'src> Lexer<'src> {
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            chars: source.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    fn loc(&self) -> CodeLoc {
        CodeLoc::new(self.line, self.column)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') => {
                    let mut ahead = self.chars.clone();
                    if ahead.next() == Some('/') && ahead.next() == Some('/') {
                        // `///` doc comments are not modeled; treated like `//`.
                        while !matches!(self.peek(), None | Some('\n')) {
                            self.bump();
                        }
                    } else if ahead.next() == Some('/') {
                        while !matches!(self.peek(), None | Some('\n')) {
                            self.bump();
                        }
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
    }

    /// Tokenizes the whole source, ending with a single `Eof` token.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia();
            let start = self.loc();
            let Some(c) = self.peek() else {
                tokens.push(Token::new(TokenKind::Eof, CodeRange::point(start)));
                break;
            };
            let kind = match c {
                c if c.is_ascii_digit() => self.lex_number()?,
                c if is_ident_start(c) => self.lex_ident_or_keyword(),
                '"' => self.lex_string(start)?,
                '\'' => self.lex_char(start)?,
                _ => self.lex_operator(start)?,
            };
            let end = self.loc();
            tokens.push(Token::new(kind, CodeRange::new(start, end)));
        }
        Ok(tokens)
    }

    fn lex_ident_or_keyword(&mut self) -> TokenKind {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if is_ident_continue(c) {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
        match text.as_str() {
            "fn" => TokenKind::KwFn,
            "let" => TokenKind::KwLet,
            "class" => TokenKind::KwClass,
            "enum" => TokenKind::KwEnum,
            "if" => TokenKind::KwIf,
            "else" => TokenKind::KwElse,
            "while" => TokenKind::KwWhile,
            "for" => TokenKind::KwFor,
            "in" => TokenKind::KwIn,
            "return" => TokenKind::KwReturn,
            "break" => TokenKind::KwBreak,
            "continue" => TokenKind::KwContinue,
            "try" => TokenKind::KwTry,
            "catch" => TokenKind::KwCatch,
            "throw" => TokenKind::KwThrow,
            "true" => TokenKind::KwTrue,
            "false" => TokenKind::KwFalse,
            "none" => TokenKind::KwNone,
            "new" => TokenKind::KwNew,
            _ => TokenKind::Ident(text),
        }
    }

    fn lex_number(&mut self) -> Result<TokenKind, LexError> {
        let start = self.loc();
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
        let mut is_float = false;
        if self.peek() == Some('.') {
            let mut ahead = self.chars.clone();
            ahead.next();
            if ahead.next().is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                text.push('.');
                self.bump();
                while let Some(c) = self.peek() {
                    if c.is_ascii_digit() {
                        text.push(c);
                        self.bump();
                    } else {
                        break;
                    }
                }
            }
        }
        if is_float {
            let value: f64 = text.parse().map_err(|_| LexError {
                message: format!("invalid float literal `{text}`"),
                range: CodeRange::new(start, self.loc()),
            })?;
            Ok(TokenKind::Float(value.to_bits()))
        } else {
            let value: i64 = text.parse().map_err(|_| LexError {
                message: format!("invalid integer literal `{text}`"),
                range: CodeRange::new(start, self.loc()),
            })?;
            Ok(TokenKind::Int(value))
        }
    }

    fn lex_string(&mut self, start: CodeLoc) -> Result<TokenKind, LexError> {
        self.bump(); // opening quote
        let mut text = String::new();
        loop {
            match self.bump() {
                Some('"') => break,
                Some('\\') => text.push(self.lex_escape(start)?),
                Some(c) => text.push(c),
                None => {
                    return Err(LexError {
                        message: "unterminated string literal".to_owned(),
                        range: CodeRange::new(start, self.loc()),
                    });
                }
            }
        }
        Ok(TokenKind::Str(text))
    }

    fn lex_char(&mut self, start: CodeLoc) -> Result<TokenKind, LexError> {
        self.bump(); // opening quote
        let c = match self.bump() {
            Some('\\') => self.lex_escape(start)?,
            Some(c) => c,
            None => {
                return Err(LexError {
                    message: "unterminated char literal".to_owned(),
                    range: CodeRange::new(start, self.loc()),
                });
            }
        };
        if !self.eat('\'') {
            return Err(LexError {
                message: "char literal must contain exactly one character".to_owned(),
                range: CodeRange::new(start, self.loc()),
            });
        }
        Ok(TokenKind::Char(c))
    }

    fn lex_escape(&mut self, start: CodeLoc) -> Result<char, LexError> {
        match self.bump() {
            Some('n') => Ok('\n'),
            Some('t') => Ok('\t'),
            Some('r') => Ok('\r'),
            Some('0') => Ok('\0'),
            Some('\\') => Ok('\\'),
            Some('"') => Ok('"'),
            Some('\'') => Ok('\''),
            Some(other) => Err(LexError {
                message: format!("unknown escape sequence `\\{other}`"),
                range: CodeRange::new(start, self.loc()),
            }),
            None => Err(LexError {
                message: "unterminated escape sequence".to_owned(),
                range: CodeRange::new(start, self.loc()),
            }),
        }
    }

    fn lex_operator(&mut self, start: CodeLoc) -> Result<TokenKind, LexError> {
        let c = self.bump().expect("caller already peeked a character");
        let kind = match c {
            '+' => TokenKind::Plus,
            '-' => {
                if self.eat('>') {
                    TokenKind::Arrow
                } else {
                    TokenKind::Minus
                }
            }
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '=' => {
                if self.eat('=') {
                    TokenKind::EqEq
                } else {
                    TokenKind::Eq
                }
            }
            '!' => {
                if self.eat('=') {
                    TokenKind::NotEq
                } else {
                    TokenKind::Bang
                }
            }
            '<' => {
                if self.eat('=') {
                    TokenKind::LtEq
                } else if self.eat('<') {
                    TokenKind::LShift
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                if self.eat('=') {
                    TokenKind::GtEq
                } else if self.eat('>') {
                    TokenKind::RShift
                } else {
                    TokenKind::Gt
                }
            }
            '&' => {
                if self.eat('&') {
                    TokenKind::AmpAmp
                } else {
                    return Err(LexError {
                        message: "unexpected character `&`".to_owned(),
                        range: CodeRange::new(start, self.loc()),
                    });
                }
            }
            '|' => {
                if self.eat('|') {
                    TokenKind::PipePipe
                } else {
                    return Err(LexError {
                        message: "unexpected character `|`".to_owned(),
                        range: CodeRange::new(start, self.loc()),
                    });
                }
            }
            ':' => {
                if self.eat(':') {
                    TokenKind::ColonColon
                } else {
                    TokenKind::Colon
                }
            }
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            ';' => TokenKind::Semi,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            other => {
                return Err(LexError {
                    message: format!("unexpected character `{other}`"),
                    range: CodeRange::new(start, self.loc()),
                });
            }
        };
        Ok(kind)
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src).tokenize().unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_a_function_signature() {
        assert_eq!(
            kinds("fn f(x: int) -> int {"),
            vec![
                TokenKind::KwFn,
                TokenKind::Ident("f".to_owned()),
                TokenKind::LParen,
                TokenKind::Ident("x".to_owned()),
                TokenKind::Colon,
                TokenKind::Ident("int".to_owned()),
                TokenKind::RParen,
                TokenKind::Arrow,
                TokenKind::Ident("int".to_owned()),
                TokenKind::LBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexes_shift_before_relational() {
        assert_eq!(kinds("a >> b"), vec![
            TokenKind::Ident("a".to_owned()),
            TokenKind::RShift,
            TokenKind::Ident("b".to_owned()),
            TokenKind::Eof,
        ]);
    }

    #[test]
    fn lexes_string_escapes() {
        assert_eq!(kinds(r#""a\nb""#), vec![TokenKind::Str("a\nb".to_owned()), TokenKind::Eof]);
    }

    #[test]
    fn rejects_unterminated_string() {
        assert!(Lexer::new("\"abc").tokenize().is_err());
    }
}
