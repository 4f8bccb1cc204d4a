// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Property value types and their parsers, RFC 2445 Section 4.3.

mod datetime;
mod duration;
mod input;
mod miscellaneous;
mod period;
mod rrule;
mod text;

use chumsky::Parser;
use chumsky::error::Rich;
use chumsky::extra;

pub use crate::value::datetime::{
    DateOrDateTime, ValueDate, ValueDateTime, ValueTime, ValueUtcOffset, Zone,
};
pub use crate::value::duration::ValueDuration;
pub use crate::value::input::DateInput;
pub use crate::value::miscellaneous::{ValueGeo, ValueRequestStatus};
pub use crate::value::period::ValuePeriod;
pub use crate::value::rrule::{RecurrenceFrequency, ValueRecurrenceRule, WeekDay, WeekDayNum};
pub use crate::value::text::{escape_text, split_text_list, split_unescaped, unescape_text};

/// The value data types a property may carry.
///
/// The string form is the name used by the `VALUE` parameter.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::EnumString,
    strum::Display,
    strum::AsRefStr,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "SCREAMING-KEBAB-CASE", ascii_case_insensitive)]
pub enum ValueKind {
    /// Inline base64 data, kept verbatim
    Binary,
    /// `TRUE` / `FALSE`
    Boolean,
    /// A calendar user address, e.g. `mailto:` URI
    CalAddress,
    /// Whole date
    Date,
    /// Date with time of day
    DateTime,
    /// Duration
    Duration,
    /// Floating point number
    Float,
    /// Signed 32-bit integer
    Integer,
    /// Period of time
    Period,
    /// Recurrence rule
    Recur,
    /// Text, escaped on the wire
    Text,
    /// URI, never escaped
    Uri,
    /// Fixed UTC offset
    UtcOffset,
    /// Latitude and longitude of GEO
    Geo,
    /// Status triple of REQUEST-STATUS
    RequestStatus,
}

/// A typed property value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Unescaped text
    Text(String),
    /// URI or calendar address, never escaped
    Uri(String),
    /// Base64 data, kept verbatim
    Binary(String),
    /// Integer
    Integer(i32),
    /// Floating point number
    Float(f64),
    /// Boolean
    Boolean(bool),
    /// Whole date
    Date(ValueDate),
    /// Date with time of day
    DateTime(ValueDateTime),
    /// Duration
    Duration(ValueDuration),
    /// Period of time
    Period(ValuePeriod),
    /// Recurrence rule
    Recur(ValueRecurrenceRule),
    /// Geographic position
    Geo(ValueGeo),
    /// Request status
    RequestStatus(ValueRequestStatus),
    /// UTC offset
    UtcOffset(ValueUtcOffset),
}

impl Value {
    /// The data type of this value.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Text(_) => ValueKind::Text,
            Self::Uri(_) => ValueKind::Uri,
            Self::Binary(_) => ValueKind::Binary,
            Self::Integer(_) => ValueKind::Integer,
            Self::Float(_) => ValueKind::Float,
            Self::Boolean(_) => ValueKind::Boolean,
            Self::Date(_) => ValueKind::Date,
            Self::DateTime(_) => ValueKind::DateTime,
            Self::Duration(_) => ValueKind::Duration,
            Self::Period(_) => ValueKind::Period,
            Self::Recur(_) => ValueKind::Recur,
            Self::Geo(_) => ValueKind::Geo,
            Self::RequestStatus(_) => ValueKind::RequestStatus,
            Self::UtcOffset(_) => ValueKind::UtcOffset,
        }
    }

    /// Text, URI or binary payload.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Uri(s) | Self::Binary(s) => Some(s),
            _ => None,
        }
    }

    /// Date or date-time payload.
    #[must_use]
    pub const fn as_date_or_date_time(&self) -> Option<DateOrDateTime> {
        match self {
            Self::Date(date) => Some(DateOrDateTime::Date(*date)),
            Self::DateTime(dt) => Some(DateOrDateTime::DateTime(*dt)),
            _ => None,
        }
    }

    /// Duration payload.
    #[must_use]
    pub const fn as_duration(&self) -> Option<&ValueDuration> {
        match self {
            Self::Duration(d) => Some(d),
            _ => None,
        }
    }

    /// Recurrence rule payload.
    #[must_use]
    pub const fn as_recur(&self) -> Option<&ValueRecurrenceRule> {
        match self {
            Self::Recur(r) => Some(r),
            _ => None,
        }
    }

    /// Period payload.
    #[must_use]
    pub const fn as_period(&self) -> Option<&ValuePeriod> {
        match self {
            Self::Period(p) => Some(p),
            _ => None,
        }
    }

    /// Integer payload.
    #[must_use]
    pub const fn as_integer(&self) -> Option<i32> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

/// A raw token could not be read as the requested value kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} value '{text}': {reason}")]
pub struct ValueError {
    /// The kind that was requested
    pub kind: ValueKind,
    /// The offending text
    pub text: String,
    /// Parser diagnostics
    pub reason: String,
}

impl ValueError {
    pub(crate) fn new(kind: ValueKind, text: &str, reason: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.to_owned(),
            reason: reason.into(),
        }
    }
}

type Extra<'src> = extra::Err<Rich<'src, char>>;

fn run<'src, T>(
    kind: ValueKind,
    raw: &'src str,
    parser: impl Parser<'src, &'src str, T, Extra<'src>>,
) -> Result<T, ValueError> {
    parser.parse(raw).into_result().map_err(|errs| {
        let reason = errs
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        ValueError::new(kind, raw, reason)
    })
}

/// Parse one raw value of the given kind.
///
/// Text is unescaped exactly once. Use [`parse_values`] for list-valued
/// properties.
///
/// # Errors
///
/// Returns [`ValueError`] if the text does not match the kind's grammar.
pub fn parse_value(kind: ValueKind, raw: &str) -> Result<Value, ValueError> {
    let raw = match kind {
        ValueKind::Text | ValueKind::Uri | ValueKind::CalAddress | ValueKind::Binary => raw,
        _ => raw.trim(),
    };
    Ok(match kind {
        ValueKind::Text => Value::Text(unescape_text(raw)),
        ValueKind::Uri | ValueKind::CalAddress => Value::Uri(raw.to_owned()),
        ValueKind::Binary => Value::Binary(raw.to_owned()),
        ValueKind::Boolean => {
            let upper = raw.to_ascii_uppercase();
            Value::Boolean(run(kind, &upper, miscellaneous::value_boolean())?)
        }
        ValueKind::Integer => Value::Integer(run(kind, raw, miscellaneous::value_integer())?),
        ValueKind::Float => Value::Float(run(kind, raw, miscellaneous::value_float())?),
        ValueKind::Date => Value::Date(run(kind, raw, datetime::value_date())?),
        ValueKind::DateTime => Value::DateTime(run(kind, raw, datetime::value_date_time())?),
        ValueKind::Duration => Value::Duration(run(kind, raw, duration::value_duration())?),
        ValueKind::Period => Value::Period(run(kind, raw, period::value_period())?),
        ValueKind::Recur => {
            let upper = raw.to_ascii_uppercase();
            Value::Recur(run(kind, &upper, rrule::value_rrule())?)
        }
        ValueKind::Geo => Value::Geo(run(kind, raw, miscellaneous::value_geo())?),
        ValueKind::RequestStatus => Value::RequestStatus(
            ValueRequestStatus::from_raw(raw)
                .ok_or_else(|| ValueError::new(kind, raw, "missing status description"))?,
        ),
        ValueKind::UtcOffset => Value::UtcOffset(run(kind, raw, datetime::value_utc_offset())?),
    })
}

/// Parse a raw value that may hold several comma-separated values.
///
/// The split honours backslash escapes, so `a\,b` stays one text value.
///
/// # Errors
///
/// Returns [`ValueError`] for the first element that fails to parse.
pub fn parse_values(kind: ValueKind, raw: &str) -> Result<Vec<Value>, ValueError> {
    split_unescaped(raw, ',')
        .into_iter()
        .map(|item| parse_value(kind, item))
        .collect()
}
