// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Duration value type parser as defined in RFC 2445 Section 4.3.6.

use chumsky::extra::ParserExtra;
use chumsky::input::Input;
use chumsky::label::LabelError;
use chumsky::prelude::*;
use chumsky::span::SimpleSpan;

use crate::value::miscellaneous::ValueExpected;

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 60 * SECONDS_PER_MINUTE;
const SECONDS_PER_DAY: i64 = 24 * SECONDS_PER_HOUR;
const SECONDS_PER_WEEK: i64 = 7 * SECONDS_PER_DAY;

/// Duration Value defined in RFC 2445 Section 4.3.6
///
/// A week duration never mixes with day, hour, minute or second fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueDuration {
    /// Date and Time Duration
    DateTime {
        /// Whether the duration is positive
        positive: bool,
        /// Day Duration
        day: u32,
        /// Hour Duration
        hour: u32,
        /// Minute Duration
        minute: u32,
        /// Second Duration
        second: u32,
    },

    /// Week Duration
    Week {
        /// Whether the duration is positive
        positive: bool,
        /// Week Duration
        week: u32,
    },
}

impl ValueDuration {
    /// Split a signed number of seconds into days, hours, minutes and
    /// seconds. Weeks are never produced.
    #[must_use]
    pub fn from_seconds(seconds: i64) -> Self {
        let positive = seconds >= 0;
        let mut rest = seconds.unsigned_abs();
        let mut take = |unit: i64| {
            let unit = unit.unsigned_abs();
            let n = rest / unit;
            rest %= unit;
            u32::try_from(n).unwrap_or(u32::MAX)
        };
        let day = take(SECONDS_PER_DAY);
        let hour = take(SECONDS_PER_HOUR);
        let minute = take(SECONDS_PER_MINUTE);
        let second = take(1);
        Self::DateTime {
            positive,
            day,
            hour,
            minute,
            second,
        }
    }

    /// Signed length in seconds.
    #[must_use]
    pub fn as_seconds(&self) -> i64 {
        let (positive, secs) = match *self {
            Self::DateTime {
                positive,
                day,
                hour,
                minute,
                second,
            } => (
                positive,
                i64::from(day) * SECONDS_PER_DAY
                    + i64::from(hour) * SECONDS_PER_HOUR
                    + i64::from(minute) * SECONDS_PER_MINUTE
                    + i64::from(second),
            ),
            Self::Week { positive, week } => (positive, i64::from(week) * SECONDS_PER_WEEK),
        };
        if positive { secs } else { -secs }
    }

    /// The duration as a `jiff::SignedDuration`.
    #[must_use]
    pub fn signed_duration(&self) -> jiff::SignedDuration {
        jiff::SignedDuration::from_secs(self.as_seconds())
    }

    /// Add this duration to a wall clock reading, saturating at the civil
    /// range bounds.
    #[must_use]
    pub fn add_to(&self, datetime: jiff::civil::DateTime) -> jiff::civil::DateTime {
        datetime
            .checked_add(self.signed_duration())
            .unwrap_or(if self.as_seconds() < 0 {
                jiff::civil::DateTime::MIN
            } else {
                jiff::civil::DateTime::MAX
            })
    }
}

/// Format Definition:  This value type is defined by the following notation:
///
/// ```txt
/// dur-value  = (["+"] / "-") "P" (dur-date / dur-time / dur-week)
///
/// dur-date   = dur-day [dur-time]
/// dur-time   = "T" (dur-hour / dur-minute / dur-second)
/// dur-week   = 1*DIGIT "W"
/// dur-hour   = 1*DIGIT "H" [dur-minute]
/// dur-minute = 1*DIGIT "M" [dur-second]
/// dur-second = 1*DIGIT "S"
/// dur-day    = 1*DIGIT "D"
/// ```
pub fn value_duration<'src, I, E>() -> impl Parser<'src, I, ValueDuration, E> + Clone
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    // case-sensitive
    let int = select! { c @ '0'..='9' => c }
        .repeated()
        .at_least(1)
        .at_most(10) // u32 max is 10 digits: 4_294_967_295
        .collect::<String>()
        .try_map(|str, span| match lexical::parse_partial::<u32, _>(&str) {
            Ok((v, n)) if n == str.len() => Ok(v),
            _ => Err(E::Error::expected_found([ValueExpected::U32], None, span)),
        });

    let week = int.clone().then_ignore(just('W'));

    let second_val = int.clone().then_ignore(just('S'));
    let minute_val = int.clone().then_ignore(just('M'));
    let hour_val = int.clone().then_ignore(just('H'));

    // dur-second = 1*DIGIT "S"
    let second_only = second_val.clone().map(|s| (0, 0, s));

    // dur-minute = 1*DIGIT "M" [dur-second]
    let minute_with_second = minute_val
        .clone()
        .then(second_val.clone().or_not())
        .map(|(m, s)| (0, m, s.unwrap_or(0)));

    // dur-hour = 1*DIGIT "H" [dur-minute]
    let hour_with_minute = hour_val
        .then(minute_val.then(second_val.or_not()).or_not())
        .map(|(h, opt_ms)| match opt_ms {
            Some((m, opt_s)) => (h, m, opt_s.unwrap_or(0)),
            None => (h, 0, 0),
        });

    // dur-time = "T" (dur-hour / dur-minute / dur-second)
    let time = just('T').ignore_then(choice((hour_with_minute, minute_with_second, second_only)));

    let day = int.then_ignore(just('D'));
    let date = day.then(time.clone().or_not());

    let sign = select! { c @ ('+' | '-') => c }
        .or_not()
        .map(|sign| !matches!(sign, Some('-')));
    let prefix = sign.then_ignore(just('P'));
    choice((
        prefix.clone().then(date).map(|(positive, (day, time))| {
            let (hour, minute, second) = time.unwrap_or((0, 0, 0));
            ValueDuration::DateTime {
                positive,
                day,
                hour,
                minute,
                second,
            }
        }),
        prefix
            .clone()
            .then(time)
            .map(|(positive, (h, m, s))| ValueDuration::DateTime {
                positive,
                day: 0,
                hour: h,
                minute: m,
                second: s,
            }),
        prefix
            .then(week)
            .map(|(positive, week)| ValueDuration::Week { positive, week }),
    ))
}
