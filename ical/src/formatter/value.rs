// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Value formatting for iCalendar values.
//!
//! This module provides functions to format all iCalendar value types
//! as defined in RFC 2445 Section 4.3.

use std::fmt::Display;
use std::io::{self, Write};

use crate::keyword::{
    KW_BOOLEAN_FALSE, KW_BOOLEAN_TRUE, KW_RRULE_BYDAY, KW_RRULE_BYHOUR, KW_RRULE_BYMINUTE,
    KW_RRULE_BYMONTH, KW_RRULE_BYMONTHDAY, KW_RRULE_BYSECOND, KW_RRULE_BYSETPOS, KW_RRULE_BYWEEKNO,
    KW_RRULE_BYYEARDAY, KW_RRULE_COUNT, KW_RRULE_FREQ, KW_RRULE_INTERVAL, KW_RRULE_UNTIL,
    KW_RRULE_WKST,
};
use crate::value::{
    DateOrDateTime, Value, ValueDate, ValueDateTime, ValueDuration, ValuePeriod,
    ValueRecurrenceRule, ValueTime, ValueUtcOffset, Zone, escape_text,
};

/// Render a value as it appears after the colon of a content line.
#[must_use]
pub fn format_value(value: &Value) -> String {
    let mut buf = Vec::new();
    // writing to a Vec cannot fail
    let _ = write_value(&mut buf, value);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Format a value to the writer.
///
/// This is the main entry point for formatting values.
pub fn write_value<W: Write>(w: &mut W, value: &Value) -> io::Result<()> {
    match value {
        Value::Text(text) => write!(w, "{}", escape_text(text)),
        // Binary data is kept base64 encoded; URIs are never escaped
        Value::Uri(raw) | Value::Binary(raw) => write!(w, "{raw}"),
        Value::Integer(int) => write!(w, "{int}"),
        Value::Float(float) => write!(w, "{float}"),
        Value::Boolean(b) => {
            let v = if *b { KW_BOOLEAN_TRUE } else { KW_BOOLEAN_FALSE };
            write!(w, "{v}")
        }
        Value::Date(date) => write_date(w, *date),
        Value::DateTime(datetime) => write_date_time(w, datetime),
        Value::Duration(duration) => write_duration(w, duration),
        Value::Period(period) => write_period(w, period),
        Value::Recur(rule) => write_recurrence_rule(w, rule),
        Value::Geo(geo) => write!(w, "{};{}", geo.latitude, geo.longitude),
        Value::RequestStatus(status) => write!(w, "{}", status.to_raw()),
        Value::UtcOffset(offset) => write_utc_offset(w, *offset),
    }
}

/// Format a date value as `YYYYMMDD`.
pub fn write_date<W: Write>(w: &mut W, date: ValueDate) -> io::Result<()> {
    write!(w, "{:04}{:02}{:02}", date.year, date.month, date.day)
}

/// Format a date-time value as `YYYYMMDDTHHMMSS[Z]`.
///
/// Fixed offsets are converted, so zoned values always end in `Z`.
fn write_date_time<W: Write>(w: &mut W, datetime: &ValueDateTime) -> io::Result<()> {
    let datetime = match datetime.zone {
        Some(Zone::Offset(_)) => datetime.to_utc(),
        _ => *datetime,
    };
    write_date(w, datetime.date)?;
    write!(w, "T")?;
    write_time(w, datetime.time)?;
    if datetime.zone.is_some() {
        write!(w, "Z")?;
    }
    Ok(())
}

/// Format a time value as `HHMMSS`.
fn write_time<W: Write>(w: &mut W, time: ValueTime) -> io::Result<()> {
    write!(w, "{:02}{:02}{:02}", time.hour, time.minute, time.second)
}

/// Format a duration value as `P[n]DT[n]H[n]M[n]S` or `P[n]W`.
pub fn write_duration<W: Write>(w: &mut W, duration: &ValueDuration) -> io::Result<()> {
    match duration {
        ValueDuration::Week { positive, .. } | ValueDuration::DateTime { positive, .. }
            if !positive =>
        {
            write!(w, "-")?;
        }
        _ => { /* positive, no sign */ }
    }

    write!(w, "P")?;
    match duration {
        ValueDuration::Week { week, .. } => write!(w, "{week}W")?,
        ValueDuration::DateTime {
            day,
            hour,
            minute,
            second,
            ..
        } => {
            if *day > 0 {
                write!(w, "{day}D")?;
            }
            let has_time = *hour > 0 || *minute > 0 || *second > 0;
            if has_time {
                write!(w, "T")?;
            }
            if *hour > 0 {
                write!(w, "{hour}H")?;
            }
            if *minute > 0 {
                write!(w, "{minute}M")?;
            }
            if *second > 0 {
                write!(w, "{second}S")?;
            }
            if !has_time && *day == 0 {
                write!(w, "T0S")?;
            }
        }
    }
    Ok(())
}

/// Format a period value as `start/end` or `start/duration`.
fn write_period<W: Write>(w: &mut W, period: &ValuePeriod) -> io::Result<()> {
    match period {
        ValuePeriod::Explicit { start, end } => {
            write_date_time(w, start)?;
            write!(w, "/")?;
            write_date_time(w, end)
        }
        ValuePeriod::Duration { start, duration } => {
            write_date_time(w, start)?;
            write!(w, "/")?;
            write_duration(w, duration)
        }
    }
}

/// Format a UTC offset value as `+HHMM` or `-HHMM` (with optional seconds).
fn write_utc_offset<W: Write>(w: &mut W, offset: ValueUtcOffset) -> io::Result<()> {
    let sign = if offset.positive { "+" } else { "-" };
    write!(w, "{sign}{:02}{:02}", offset.hour, offset.minute)?;
    if let Some(second) = offset.second {
        write!(w, "{second:02}")?;
    }
    Ok(())
}

/// Format a recurrence rule value, parts in fixed order after `FREQ`.
fn write_recurrence_rule<W: Write>(w: &mut W, rule: &ValueRecurrenceRule) -> io::Result<()> {
    write!(w, "{KW_RRULE_FREQ}={}", rule.freq)?;

    match &rule.until {
        Some(DateOrDateTime::Date(date)) => {
            write!(w, ";{KW_RRULE_UNTIL}=")?;
            write_date(w, *date)?;
        }
        Some(DateOrDateTime::DateTime(datetime)) => {
            write!(w, ";{KW_RRULE_UNTIL}=")?;
            write_date_time(w, datetime)?;
        }
        None => {}
    }
    if let Some(count) = rule.count {
        write!(w, ";{KW_RRULE_COUNT}={count}")?;
    }
    if let Some(interval) = rule.interval {
        write!(w, ";{KW_RRULE_INTERVAL}={interval}")?;
    }

    write_list(w, KW_RRULE_BYSECOND, &rule.by_second)?;
    write_list(w, KW_RRULE_BYMINUTE, &rule.by_minute)?;
    write_list(w, KW_RRULE_BYHOUR, &rule.by_hour)?;
    write_list(w, KW_RRULE_BYDAY, &rule.by_day)?;
    write_list(w, KW_RRULE_BYMONTHDAY, &rule.by_month_day)?;
    write_list(w, KW_RRULE_BYYEARDAY, &rule.by_year_day)?;
    write_list(w, KW_RRULE_BYWEEKNO, &rule.by_week_no)?;
    write_list(w, KW_RRULE_BYMONTH, &rule.by_month)?;
    write_list(w, KW_RRULE_BYSETPOS, &rule.by_set_pos)?;

    if let Some(wkst) = rule.wkst {
        write!(w, ";{KW_RRULE_WKST}={wkst}")?;
    }
    Ok(())
}

fn write_list<W: Write, T: Display>(w: &mut W, key: &str, items: &[T]) -> io::Result<()> {
    if items.is_empty() {
        return Ok(());
    }
    write!(w, ";{key}=")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(w, ",")?;
        }
        write!(w, "{item}")?;
    }
    Ok(())
}
