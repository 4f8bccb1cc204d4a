// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Text value escaping as defined in RFC 2445 Section 4.3.11.
//!
//! ```txt
//! text       = *(TSAFE-CHAR / ":" / DQUOTE / ESCAPED-CHAR)
//! ESCAPED-CHAR = "\\" / "\;" / "\," / "\N" / "\n")
//! ```

/// Escape a text value for output.
///
/// Backslash, comma and semicolon are backslash-escaped, any line break
/// becomes the two characters `\n`, and a double quote becomes a single quote.
#[must_use]
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            ',' => out.push_str("\\,"),
            ';' => out.push_str("\\;"),
            '"' => out.push('\''),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str("\\n");
            }
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

/// Reverse [`escape_text`], applied exactly once.
///
/// An unknown escape keeps its backslash; a trailing lone backslash is kept.
#[must_use]
pub fn unescape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some(',') => out.push(','),
            Some(';') => out.push(';'),
            Some('n' | 'N') => out.push('\n'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Split `raw` on every `sep` that is not escaped.
///
/// A separator is escaped when it is preceded by an odd number of
/// backslashes, so `a\\,b` splits while `a\,b` does not.
#[must_use]
pub fn split_unescaped(raw: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut backslashes = 0usize;
    for (i, c) in raw.char_indices() {
        if c == '\\' {
            backslashes += 1;
            continue;
        }
        if c == sep && backslashes % 2 == 0 {
            parts.push(raw.get(start..i).unwrap_or_default());
            start = i + c.len_utf8();
        }
        backslashes = 0;
    }
    parts.push(raw.get(start..).unwrap_or_default());
    parts
}

/// Split a list-valued text property on unescaped commas and unescape each
/// element.
#[must_use]
pub fn split_text_list(raw: &str) -> Vec<String> {
    split_unescaped(raw, ',')
        .into_iter()
        .map(unescape_text)
        .collect()
}
