// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Untyped iCalendar syntax: unfolding, tokens, content lines and the
//! component tree.
//!
//! ```text
//! Raw Lines → Unfold → Logical Lines → Lexer + Scanner → Content Lines → Tree Builder
//! ```

mod lexer;
mod scanner;
mod tree_builder;

pub use crate::syntax::lexer::{Span, SpannedToken, Token, tokenize};
pub use crate::syntax::scanner::{ContentLine, ScannedParameter, ScannedParameterValue, scan_line};
pub use crate::syntax::tree_builder::{RawCalendar, RawComponent, build_tree};

/// One property line after unfolding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    /// 1-based logical line number
    pub number: usize,
    /// Line text without terminator
    pub text: String,
}

/// Join folded continuation lines.
///
/// A raw line starting with a single space or tab continues the previous
/// logical line, with that whitespace removed. A trailing `\r` is stripped
/// from every raw line and trailing empty lines are dropped.
pub fn unfold<I, S>(lines: I) -> Vec<LogicalLine>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut logical: Vec<LogicalLine> = Vec::new();
    for raw in lines {
        let raw = raw.as_ref();
        let raw = raw.strip_suffix('\r').unwrap_or(raw);

        let continuation = raw.strip_prefix(' ').or_else(|| raw.strip_prefix('\t'));
        match (continuation, logical.last_mut()) {
            (Some(rest), Some(prev)) => prev.text.push_str(rest),
            _ => logical.push(LogicalLine {
                number: logical.len() + 1,
                text: raw.to_owned(),
            }),
        }
    }

    while logical.last().is_some_and(|l| l.text.trim().is_empty()) {
        logical.pop();
    }
    logical
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(lines: &[LogicalLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn unfolds_continuation_lines() {
        let raw = [
            "BEGIN:VCALENDAR\r",
            "DESCRIPTION:This is a lo\r",
            " ng description\r",
            "\tthat spans lines\r",
            "END:VCALENDAR\r",
            "",
            "",
        ];
        let lines = unfold(raw);
        assert_eq!(
            texts(&lines),
            [
                "BEGIN:VCALENDAR",
                "DESCRIPTION:This is a long descriptionthat spans lines",
                "END:VCALENDAR",
            ]
        );
        let numbers: Vec<_> = lines.iter().map(|l| l.number).collect();
        assert_eq!(numbers, [1, 2, 3]);
    }

    #[test]
    fn removes_only_one_leading_space() {
        let lines = unfold(["SUMMARY:a", "  b"]);
        assert_eq!(texts(&lines), ["SUMMARY:a b"]);
    }

    #[test]
    fn leading_continuation_starts_a_line() {
        let lines = unfold([" SUMMARY:a"]);
        assert_eq!(texts(&lines), [" SUMMARY:a"]);
    }
}
