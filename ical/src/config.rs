// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Calendar configuration, injected at construction.
//!
//! The library never reads the environment; callers build a
//! [`CalendarConfig`] themselves or, with the `serde` feature, deserialize
//! one from a partial table.

/// Default unique id used in generated UIDs and the product identifier.
pub const DEFAULT_UNIQUE_ID: &str = "localhost";

/// Default folding width in octets.
pub const DEFAULT_FOLDING: usize = 75;

/// Configuration of a [`Calendar`](crate::Calendar).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CalendarConfig {
    /// Host-like identifier appended to generated UIDs and used in PRODID.
    pub unique_id: String,

    /// Language tag appended to PRODID, e.g. `en`.
    pub language: Option<String>,

    /// Whether properties with empty values are kept as placeholders.
    pub allow_empty: bool,

    /// Line terminator of formatted output.
    pub newline: Newline,

    /// Output format.
    pub format: OutputFormat,

    /// Folding width in octets, `None` or `0` to disable folding.
    pub folding: Option<usize>,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            unique_id: DEFAULT_UNIQUE_ID.to_owned(),
            language: None,
            allow_empty: true,
            newline: Newline::default(),
            format: OutputFormat::default(),
            folding: Some(DEFAULT_FOLDING),
        }
    }
}

impl CalendarConfig {
    /// Set the unique id.
    #[must_use]
    pub fn unique_id(mut self, unique_id: impl Into<String>) -> Self {
        self.unique_id = unique_id.into();
        self
    }

    /// Set the language tag.
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Keep or reject empty property values.
    #[must_use]
    pub const fn allow_empty(mut self, allow_empty: bool) -> Self {
        self.allow_empty = allow_empty;
        self
    }

    /// Set the line terminator.
    #[must_use]
    pub const fn newline(mut self, newline: Newline) -> Self {
        self.newline = newline;
        self
    }

    /// Set the output format.
    #[must_use]
    pub const fn format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the folding width.
    #[must_use]
    pub const fn folding(mut self, folding: Option<usize>) -> Self {
        self.folding = folding;
        self
    }
}

/// Line terminator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Newline {
    /// `\r\n`, as RFC 2445 requires
    #[default]
    Crlf,
    /// `\n`
    Lf,
}

impl Newline {
    /// The terminator text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Crlf => "\r\n",
            Self::Lf => "\n",
        }
    }

    /// The terminator bytes.
    #[must_use]
    pub const fn as_bytes(self) -> &'static [u8] {
        self.as_str().as_bytes()
    }
}

/// Output format of [`format`](crate::formatter::format).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum OutputFormat {
    /// iCalendar text
    #[default]
    ICal,
    /// xCal XML
    XCal,
}
