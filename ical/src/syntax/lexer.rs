// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Lexer for unfolded iCalendar content lines.

use std::fmt::{self, Display};

use logos::Logos;

/// Byte range of a token in its logical line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Start offset, inclusive
    pub start: usize,
    /// End offset, exclusive
    pub end: usize,
}

impl Span {
    /// Create a new span.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Tokenize one logical line.
pub fn tokenize(src: &str) -> impl Iterator<Item = SpannedToken<'_>> {
    Token::lexer(src).spanned().map(|(tok, span)| match tok {
        Ok(tok) => SpannedToken(tok, Span::new(span.start, span.end)),
        Err(()) => SpannedToken(Token::Error, Span::new(span.start, span.end)),
    })
}

/// Token emitted by the iCalendar lexer
#[derive(PartialEq, Eq, Clone, Copy, Logos)]
pub enum Token<'a> {
    /// Double Quote ("), decimal codepoint 22
    #[token(r#"""#)]
    DQuote,

    /// Comma (,), decimal codepoint 44
    #[token(",")]
    Comma,

    /// Colon (:), decimal codepoint 58
    #[token(":")]
    Colon,

    /// Semicolon (;), decimal codepoint 59
    #[token(";")]
    Semicolon,

    /// Equal sign (=), decimal codepoint 61
    #[token("=")]
    Equal,

    /// ASCII symbols: sequences of printable ASCII characters
    #[regex(r#"[\t !#$%&'()*+./<>?@\[\\\]\^`\{|\}~]+"#)]
    Symbol(&'a str),

    /// Line break left in a logical line, which is malformed input
    #[regex(r"\r?\n")]
    Newline,

    /// ASCII word characters: 0-9, A-Z, a-z, underscore and hyphen
    #[regex("[0-9A-Za-z_-]+")]
    Word(&'a str),

    /// NON-US-ASCII  = UTF8-2 / UTF8-3 / UTF8-4
    #[regex(r#"[^\x00-\x7F]+"#)]
    UnicodeText(&'a str),

    /// Control characters and anything else the grammar rejects
    Error,
}

impl Token<'_> {
    /// Short name of the token kind, for error messages.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::DQuote => "double quote",
            Self::Comma => "comma",
            Self::Colon => "colon",
            Self::Semicolon => "semicolon",
            Self::Equal => "equal sign",
            Self::Symbol(_) => "symbol",
            Self::Newline => "line break",
            Self::Word(_) => "word",
            Self::UnicodeText(_) => "non-ASCII text",
            Self::Error => "invalid character",
        }
    }
}

impl Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Symbol(s) | Self::Word(s) | Self::UnicodeText(s) => {
                write!(f, "{}({s})", self.kind_name())
            }
            _ => f.write_str(self.kind_name()),
        }
    }
}

impl fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

/// A token with its associated span in the logical line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpannedToken<'src>(pub Token<'src>, pub Span);

#[cfg(test)]
mod tests {
    use super::Token::*;
    use super::*;

    fn tokens(src: &str) -> Vec<Token<'_>> {
        tokenize(src).map(|SpannedToken(t, _)| t).collect()
    }

    #[test]
    fn tokenizes_content_line() {
        assert_eq!(
            tokens("DTSTART;TZID=Europe/Berlin:20240105T100000"),
            [
                Word("DTSTART"),
                Semicolon,
                Word("TZID"),
                Equal,
                Word("Europe"),
                Symbol("/"),
                Word("Berlin"),
                Colon,
                Word("20240105T100000"),
            ]
        );
    }

    #[test]
    fn tokenizes_quotes_and_unicode() {
        assert_eq!(
            tokens(r#"CN="Zoë, R":x"#),
            [
                Word("CN"),
                Equal,
                DQuote,
                Word("Zo"),
                UnicodeText("ë"),
                Comma,
                Symbol(" "),
                Word("R"),
                DQuote,
                Colon,
                Word("x"),
            ]
        );
    }

    #[test]
    fn spans_cover_source() {
        let src = r"SUMMARY:a\,b";
        let spans: Vec<_> = tokenize(src).map(|SpannedToken(_, s)| s).collect();
        assert_eq!(spans.first(), Some(&Span::new(0, 7)));
        assert_eq!(spans.last().map(|s| s.end), Some(src.len()));
    }

    #[test]
    fn display_names_the_kind() {
        assert_eq!(Colon.to_string(), "colon");
        assert_eq!(Word("UID").to_string(), "word(UID)");
        assert_eq!(Error.to_string(), "invalid character");
    }

    #[test]
    fn control_characters_are_errors() {
        assert_eq!(tokens("A\u{1}"), [Word("A"), Error]);
        assert_eq!(tokens("A\r\nB"), [Word("A"), Newline, Word("B")]);
    }
}
