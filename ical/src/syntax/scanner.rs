// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Scanner for iCalendar content lines.
//!
//! Splits one unfolded logical line into its name, parameters and raw value:
//!
//! ```text
//! contentline = name *(";" param) ":" value
//! ```
//!
//! The value starts after the first colon that is neither quoted, escaped,
//! nor part of a URI inside a parameter value (`://`, `mailto:`, or a port
//! number following a `://`).

use crate::parser::ParseError;
use crate::syntax::LogicalLine;
use crate::syntax::lexer::{Span, SpannedToken, Token, tokenize};

/// A scanned iCalendar content line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLine<'src> {
    /// 1-based logical line number
    pub line: usize,
    /// Property name, original casing
    pub name: &'src str,
    /// Property parameters, in order
    pub parameters: Vec<ScannedParameter<'src>>,
    /// Raw property value, still escaped
    pub value: &'src str,
}

/// A scanned parameter from a content line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedParameter<'src> {
    /// Parameter name
    pub name: &'src str,
    /// Parameter values (comma-separated in the source)
    pub values: Vec<ScannedParameterValue<'src>>,
}

/// A single scanned parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScannedParameterValue<'src> {
    /// The value, without surrounding quotes
    pub value: &'src str,
    /// Whether the value was quoted in the source
    pub quoted: bool,
}

/// Scan one logical line.
///
/// # Errors
///
/// Returns [`ParseError::MalformedLine`] when the line has no name, no value
/// separator, a parameter without `=`, or an unterminated quote.
pub fn scan_line(line: &LogicalLine) -> Result<ContentLine<'_>, ParseError> {
    let src = line.text.as_str();
    let malformed = |reason: &str| ParseError::MalformedLine {
        line: line.number,
        reason: reason.to_owned(),
    };

    let tokens: Vec<SpannedToken<'_>> = tokenize(src).collect();
    let mut cursor = Cursor { tokens: &tokens, pos: 0 };

    let name = cursor
        .take_name(src)
        .ok_or_else(|| malformed("missing property name"))?;

    let mut parameters = Vec::new();
    loop {
        match cursor.bump() {
            Some(SpannedToken(Token::Colon, span)) => {
                let value = src.get(span.end..).unwrap_or_default();
                return Ok(ContentLine {
                    line: line.number,
                    name,
                    parameters,
                    value,
                });
            }
            Some(SpannedToken(Token::Semicolon, _)) => {
                let (param, boundary) = cursor.take_parameter(src).map_err(malformed)?;
                parameters.push(param);
                if let Some(at) = boundary {
                    return Ok(ContentLine {
                        line: line.number,
                        name,
                        parameters,
                        value: src.get(at + 1..).unwrap_or_default(),
                    });
                }
            }
            Some(SpannedToken(tok, _)) => {
                let reason = format!("unexpected {} in property name", tok.kind_name());
                return Err(malformed(&reason));
            }
            None => return Err(malformed("missing ':' before the value")),
        }
    }
}

struct Cursor<'a, 'src> {
    tokens: &'a [SpannedToken<'src>],
    pos: usize,
}

impl<'src> Cursor<'_, 'src> {
    fn peek(&self) -> Option<SpannedToken<'src>> {
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<SpannedToken<'src>> {
        let tok = self.peek()?;
        self.pos += 1;
        Some(tok)
    }

    /// A run of word tokens.
    fn take_name(&mut self, src: &'src str) -> Option<&'src str> {
        let start = self.peek()?.1.start;
        let mut end = start;
        while let Some(SpannedToken(Token::Word(_), span)) = self.peek() {
            end = span.end;
            self.pos += 1;
        }
        (end > start).then(|| src.get(start..end)).flatten()
    }

    /// One `name=value[,value...]` parameter. Also returns the offset of the
    /// value-separating colon when the parameter ended there.
    fn take_parameter(
        &mut self,
        src: &'src str,
    ) -> Result<(ScannedParameter<'src>, Option<usize>), &'static str> {
        let name = self.take_name(src).ok_or("empty parameter name")?;
        match self.bump() {
            Some(SpannedToken(Token::Equal, _)) => {}
            _ => return Err("missing '=' in parameter"),
        }

        let mut values = Vec::new();
        loop {
            let value = match self.peek() {
                Some(SpannedToken(Token::DQuote, open)) => {
                    self.pos += 1;
                    let close = self
                        .find(|t| t == Token::DQuote)
                        .ok_or("unterminated quoted string")?;
                    ScannedParameterValue {
                        value: src.get(open.end..close.start).unwrap_or_default(),
                        quoted: true,
                    }
                }
                Some(SpannedToken(_, first)) => {
                    let mut end = first.start;
                    while let Some(SpannedToken(tok, span)) = self.peek() {
                        match tok {
                            Token::Comma | Token::Semicolon => break,
                            Token::Colon if is_value_boundary(src, span) => break,
                            _ => {
                                end = span.end;
                                self.pos += 1;
                            }
                        }
                    }
                    ScannedParameterValue {
                        value: src.get(first.start..end).unwrap_or_default(),
                        quoted: false,
                    }
                }
                None => return Err("missing ':' before the value"),
            };
            values.push(value);

            match self.peek() {
                Some(SpannedToken(Token::Comma, _)) => self.pos += 1,
                Some(SpannedToken(Token::Semicolon, _)) => {
                    return Ok((ScannedParameter { name, values }, None));
                }
                Some(SpannedToken(Token::Colon, span)) => {
                    self.pos += 1;
                    return Ok((ScannedParameter { name, values }, Some(span.start)));
                }
                Some(_) => return Err("unexpected text after quoted parameter value"),
                None => return Err("missing ':' before the value"),
            }
        }
    }

    /// Advance past the next token matching `pred`, returning its span.
    fn find(&mut self, pred: impl Fn(Token<'src>) -> bool) -> Option<Span> {
        while let Some(SpannedToken(tok, span)) = self.bump() {
            if pred(tok) {
                return Some(span);
            }
        }
        None
    }
}

/// Whether the colon at `colon` separates the parameters from the value.
fn is_value_boundary(src: &str, colon: Span) -> bool {
    let before = src.get(..colon.start).unwrap_or_default();
    let after = src.get(colon.end..).unwrap_or_default();

    let backslashes = before.bytes().rev().take_while(|&b| b == b'\\').count();
    if backslashes % 2 == 1 {
        return false;
    }
    if after.starts_with("//") {
        return false;
    }
    let tail = before
        .len()
        .checked_sub("mailto".len())
        .and_then(|i| before.get(i..));
    if tail.is_some_and(|t| t.eq_ignore_ascii_case("mailto")) {
        return false;
    }
    let port = after.len() >= 4 && after.bytes().take(4).all(|b| b.is_ascii_digit());
    !(port && before.contains("://"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logical(text: &str) -> LogicalLine {
        LogicalLine {
            number: 1,
            text: text.to_owned(),
        }
    }

    fn param_values<'a>(line: &'a ContentLine<'_>, i: usize) -> Vec<&'a str> {
        line.parameters
            .get(i)
            .map(|p| p.values.iter().map(|v| v.value).collect())
            .unwrap_or_default()
    }

    #[test]
    fn scans_simple_line() {
        let src = logical("SUMMARY:Hello: World");
        let line = scan_line(&src).unwrap();
        assert_eq!(line.name, "SUMMARY");
        assert!(line.parameters.is_empty());
        assert_eq!(line.value, "Hello: World");

        let src = logical("DESCRIPTION:");
        let line = scan_line(&src).unwrap();
        assert_eq!(line.value, "");
    }

    #[test]
    fn scans_parameters() {
        let src = logical("ATTENDEE;ROLE=CHAIR;CN=\"Doe; John\":mailto:john@example.com");
        let line = scan_line(&src).unwrap();
        assert_eq!(line.name, "ATTENDEE");
        assert_eq!(line.parameters.len(), 2);
        assert_eq!(param_values(&line, 0), ["CHAIR"]);
        assert_eq!(param_values(&line, 1), ["Doe; John"]);
        assert!(line.parameters.get(1).unwrap().values.first().unwrap().quoted);
        assert_eq!(line.value, "mailto:john@example.com");

        let src = logical("ATTENDEE;DELEGATED-TO=\"mailto:a@x\",\"mailto:b@x\":mailto:c@x");
        let line = scan_line(&src).unwrap();
        assert_eq!(param_values(&line, 0), ["mailto:a@x", "mailto:b@x"]);
        assert_eq!(line.value, "mailto:c@x");
    }

    #[test]
    fn colon_boundary_rules() {
        #[rustfmt::skip]
        let cases = [
            // unquoted URIs inside parameter values
            ("ATTENDEE;DIR=ldap://host/x:mailto:a@x",            "ldap://host/x",           "mailto:a@x"),
            ("ORGANIZER;SENT-BY=mailto:s@x:mailto:o@x",          "mailto:s@x",              "mailto:o@x"),
            ("ATTENDEE;DIR=http://host:8080/dir:mailto:a@x",     "http://host:8080/dir",    "mailto:a@x"),
            // four digits without a preceding scheme are a value
            ("X-A;X-P=abc:1234",                                 "abc",                     "1234"),
            // escaped colon
            (r"X-A;X-P=a\:b:v",                                  r"a\:b",                   "v"),
        ];
        for (src, param, value) in cases {
            let logical = logical(src);
            let line = scan_line(&logical).unwrap();
            assert_eq!(param_values(&line, 0), [param], "{src}");
            assert_eq!(line.value, value, "{src}");
        }
    }

    #[test]
    fn value_keeps_uri_colons() {
        let src = logical("URL:http://example.com:8080/a");
        let line = scan_line(&src).unwrap();
        assert_eq!(line.value, "http://example.com:8080/a");
    }

    #[test]
    fn rejects_malformed_lines() {
        #[rustfmt::skip]
        let cases = [
            "",
            ":value",
            "SUMMARY",
            "SUMMARY value",
            "DTSTART;TZID:20240101",
            "ATTENDEE;CN=\"open:mailto:a@x",
            "X-A;=v:x",
        ];
        for src in cases {
            let err = scan_line(&logical(src)).unwrap_err();
            assert!(matches!(err, ParseError::MalformedLine { line: 1, .. }), "{src}: {err:?}");
        }
    }
}
