// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! iCalendar (RFC 2445) formatter module.
//!
//! This module formats a [`Calendar`] to the RFC 2445 text format, or to the
//! xCal XML variant, writing to any `std::io::Write` implementer.
//!
//! # Example
//!
//! ```
//! use calforge_ical::{Calendar, CalendarConfig, formatter::format};
//!
//! let calendar = Calendar::new(CalendarConfig::default());
//! let ics = format(&calendar).unwrap();
//! assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
//! ```

mod component;
mod parameter;
mod property;
mod value;
mod xcal;

use std::io::{self, Write};

use crate::calendar::Calendar;
use crate::component::Component;
use crate::config::{CalendarConfig, Newline, OutputFormat};
use crate::formatter::component::{write_calendar, write_component};

pub use crate::formatter::value::{format_value, write_value};

/// Format a calendar with the options and output format of its own config.
///
/// # Errors
///
/// Returns an error if writing to the internal buffer fails or if the output
/// contains invalid UTF-8 data.
#[tracing::instrument(skip_all, fields(components = calendar.len()))]
pub fn format(calendar: &Calendar) -> io::Result<String> {
    let config = calendar.config();
    let options = FormatOptions::from_config(config);
    match config.format {
        OutputFormat::ICal => options.write_to_string(calendar),
        OutputFormat::XCal => {
            let mut buffer = Vec::new();
            xcal::write_xcal(&mut buffer, calendar, options.newline)?;
            into_string(buffer)
        }
    }
}

/// Format a single component, including its subcomponents.
///
/// # Errors
///
/// Returns an error if writing fails or the output is not valid UTF-8.
pub fn format_component(component: &Component, options: FormatOptions) -> io::Result<String> {
    let mut buffer = Vec::new();
    let mut formatter = Formatter::new(&mut buffer, options);
    write_component(&mut formatter, component)?;
    into_string(buffer)
}

fn into_string(buffer: Vec<u8>) -> io::Result<String> {
    String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Formatting options for the iCalendar formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    /// Maximum line length in octets before folding, excluding the line
    /// terminator.
    /// - `None`: no line folding
    /// - `Some(n)`: fold lines longer than n octets
    ///
    /// Default: `Some(75)`.
    pub folding: Option<usize>,

    /// Line folding style.
    ///
    /// Default: `FoldingStyle::Space` (newline + SPACE).
    pub folding_style: FoldingStyle,

    /// Line terminator.
    ///
    /// Default: `Newline::Crlf`.
    pub newline: Newline,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            folding: Some(75),
            folding_style: FoldingStyle::default(),
            newline: Newline::default(),
        }
    }
}

impl FormatOptions {
    /// Options taken from a calendar configuration.
    #[must_use]
    pub fn from_config(config: &CalendarConfig) -> Self {
        Self {
            folding: config.folding.filter(|&n| n > 0),
            folding_style: FoldingStyle::default(),
            newline: config.newline,
        }
    }

    /// Set the line folding option.
    #[must_use]
    pub fn folding(mut self, folding: Option<usize>) -> Self {
        self.folding = folding;
        self
    }

    /// Set the line folding style.
    #[must_use]
    pub const fn folding_style(mut self, style: FoldingStyle) -> Self {
        self.folding_style = style;
        self
    }

    /// Set the line terminator.
    #[must_use]
    pub const fn newline(mut self, newline: Newline) -> Self {
        self.newline = newline;
        self
    }

    /// Write a calendar in iCalendar text form to any `Write` implementer.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write(&self, calendar: &Calendar, w: &mut impl Write) -> io::Result<()> {
        let mut formatter = Formatter::new(w, *self);
        write_calendar(&mut formatter, calendar)?;
        formatter.flush()
    }

    /// Write a calendar in iCalendar text form to a `String`.
    ///
    /// # Errors
    /// Returns an error if writing fails or if the output contains invalid UTF-8 data.
    pub fn write_to_string(&self, calendar: &Calendar) -> io::Result<String> {
        let mut buffer = Vec::new();
        self.write(calendar, &mut buffer)?;
        into_string(buffer)
    }
}

/// Line folding style.
///
/// A folded line continues on the next physical line, which starts with a
/// single whitespace character (SPACE or TAB).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FoldingStyle {
    /// Newline + SPACE
    #[default]
    Space,
    /// Newline + TAB
    Tab,
}

impl FoldingStyle {
    /// The continuation character written after the newline.
    #[must_use]
    const fn continuation(self) -> &'static [u8] {
        match self {
            Self::Space => b" ",
            Self::Tab => b"\t",
        }
    }
}

/// iCalendar formatter that writes to any `Write` implementer.
///
/// Bytes written through [`Write`] are buffered until [`Formatter::writeln`]
/// ends the logical line, which is then folded as a whole.
#[derive(Debug)]
pub struct Formatter<W: Write> {
    /// The underlying writer.
    writer: W,
    /// Formatting options.
    options: FormatOptions,
    /// Pending logical line.
    line: Vec<u8>,
}

impl<W: Write> Formatter<W> {
    /// Create a new formatter with options.
    #[must_use]
    pub fn new(writer: W, options: FormatOptions) -> Self {
        Self {
            writer,
            options,
            line: Vec::new(),
        }
    }

    /// Get a mutable reference to the underlying writer.
    #[must_use]
    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Consumes this formatter, returning the underlying writer.
    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Write a calendar to the underlying writer.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write_calendar(&mut self, calendar: &Calendar) -> io::Result<()> {
        write_calendar(self, calendar)
    }

    /// End the pending logical line: fold it and write the terminator.
    pub(crate) fn writeln(&mut self) -> io::Result<()> {
        let line = std::mem::take(&mut self.line);
        self.write_folded(&line)?;
        self.writer.write_all(self.options.newline.as_bytes())
    }

    fn write_folded(&mut self, line: &[u8]) -> io::Result<()> {
        let Some(max_len) = self.options.folding else {
            // Folding disabled, write directly
            return self.writer.write_all(line);
        };

        let mut start = 0;
        let mut len = 0;
        let mut pos = 0;
        while pos < line.len() {
            let unit = unit_length(line, pos);
            if len + unit > max_len && len > 0 {
                self.writer.write_all(line.get(start..pos).unwrap_or_default())?;
                self.insert_fold()?;
                start = pos;
                len = self.options.folding_style.continuation().len();
            }
            len += unit;
            pos += unit;
        }
        self.writer.write_all(line.get(start..).unwrap_or_default())
    }

    /// Insert line folding: newline + whitespace.
    fn insert_fold(&mut self) -> io::Result<()> {
        self.writer.write_all(self.options.newline.as_bytes())?;
        self.writer
            .write_all(self.options.folding_style.continuation())
    }
}

impl<W: Write> Write for Formatter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.line.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.line.is_empty() {
            let line = std::mem::take(&mut self.line);
            self.write_folded(&line)?;
        }
        self.writer.flush()
    }
}

/// Length of the unbreakable unit starting at `pos`: one UTF-8 character, or
/// a backslash together with the character it escapes.
fn unit_length(buf: &[u8], pos: usize) -> usize {
    let Some(&first) = buf.get(pos) else {
        return 0;
    };
    let len = if first == b'\\' {
        1 + buf.get(pos + 1).map_or(0, |&b| utf8_length(b))
    } else {
        utf8_length(first)
    };
    len.min(buf.len() - pos)
}

/// Length of a UTF-8 sequence from its leading byte.
///
/// UTF-8 encoding:
/// - 0xxxxxxx: 1 byte (ASCII)
/// - 110xxxxx: 2 bytes
/// - 1110xxxx: 3 bytes
/// - 11110xxx: 4 bytes
/// - 10xxxxxx: continuation byte (not a start byte)
const fn utf8_length(byte: u8) -> usize {
    match byte {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fold(line: &str, options: FormatOptions) -> String {
        let mut buffer = Vec::new();
        let mut f = Formatter::new(&mut buffer, options);
        f.write_all(line.as_bytes()).unwrap();
        f.writeln().unwrap();
        String::from_utf8(buffer).unwrap()
    }

    fn physical_lines(s: &str) -> Vec<&str> {
        s.split("\r\n").filter(|l| !l.is_empty()).collect()
    }

    #[test]
    fn short_lines_are_untouched() {
        let out = fold("SUMMARY:Hello", FormatOptions::default());
        assert_eq!(out, "SUMMARY:Hello\r\n");
    }

    #[test]
    fn folds_at_75_octets() {
        let line = format!("DESCRIPTION:{}", "x".repeat(200));
        let out = fold(&line, FormatOptions::default());
        let lines = physical_lines(&out);
        assert!(lines.len() > 1);
        for l in &lines {
            assert!(l.len() <= 75, "{l:?} is {} octets", l.len());
        }
        assert!(lines.iter().skip(1).all(|l| l.starts_with(' ')));

        let unfolded: String = lines
            .iter()
            .enumerate()
            .map(|(i, l)| if i == 0 { *l } else { &l[1..] })
            .collect();
        assert_eq!(unfolded, line);
    }

    #[test]
    fn never_splits_utf8_or_escapes() {
        let line = format!("SUMMARY:{}", "é\\,".repeat(60));
        let out = fold(&line, FormatOptions::default());
        for l in physical_lines(&out) {
            assert!(l.len() <= 75);
            let body = l.strip_prefix(' ').unwrap_or(l);
            assert!(!body.starts_with(','), "escape pair split: {l:?}");
        }
        // valid UTF-8 on every physical line
        assert!(String::from_utf8(out.into_bytes()).is_ok());
    }

    #[test]
    fn folding_can_be_disabled() {
        let line = format!("DESCRIPTION:{}", "x".repeat(200));
        let options = FormatOptions::default().folding(None).newline(Newline::Lf);
        let out = fold(&line, options);
        assert_eq!(out, format!("{line}\n"));
    }

    #[test]
    fn tab_folding_style() {
        let line = "X".repeat(100);
        let options = FormatOptions::default()
            .folding(Some(40))
            .folding_style(FoldingStyle::Tab);
        let out = fold(&line, options);
        assert!(out.contains("\r\n\t"));
        assert_eq!(out.replace("\r\n\t", "").trim_end(), line);
    }
}
