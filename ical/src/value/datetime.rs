// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Date, time, date-time and UTC offset values, RFC 2445 Section 4.3.

use chumsky::Parser;
use chumsky::extra::ParserExtra;
use chumsky::label::LabelError;
use chumsky::prelude::*;

use crate::value::miscellaneous::{
    ValueExpected, i8_0_1, i8_0_2, i8_0_9, i8_1_2, i8_1_9, i16_0_9, u8_0_1, u8_0_3, u8_0_5, u8_0_9,
};

/// Date value in the iCalendar format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ValueDate {
    /// Year component.
    pub year: i16,

    /// Month component, 1-12.
    pub month: i8,

    /// Day component, 1-31.
    pub day: i8,
}

impl ValueDate {
    /// Create a date, returning `None` if it does not exist in the Gregorian
    /// calendar.
    #[must_use]
    pub fn new(year: i16, month: i8, day: i8) -> Option<Self> {
        jiff::civil::Date::new(year, month, day)
            .ok()
            .map(Self::from_civil)
    }

    /// Convert to `jiff::civil::Date`.
    #[must_use]
    pub fn civil_date(self) -> jiff::civil::Date {
        self.into()
    }

    /// Build from a `jiff::civil::Date`.
    #[must_use]
    pub fn from_civil(date: jiff::civil::Date) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }
}

impl From<ValueDate> for jiff::civil::Date {
    fn from(value: ValueDate) -> Self {
        jiff::civil::date(value.year, value.month, value.day)
    }
}

/// Format Definition:  This value type is defined by the following notation:
///
/// ```txt
/// date               = date-value
///
/// date-value         = date-fullyear date-month date-mday
/// date-fullyear      = 4DIGIT
/// date-month         = 2DIGIT        ;01-12
/// date-mday          = 2DIGIT        ;01-28, 01-29, 01-30, 01-31
///                                    ;based on month/year
/// ```
pub fn value_date<'src, I, E>() -> impl Parser<'src, I, ValueDate, E> + Clone
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    let year = i16_0_9()
        .then(i16_0_9())
        .then(i16_0_9())
        .then(i16_0_9())
        .map(|(((a, b), c), d)| 1000 * a + 100 * b + 10 * c + d);

    let month = choice((
        just('0').ignore_then(i8_1_9()),
        just('1').ignore_then(i8_0_2()).map(|b| 10 + b),
    ));

    let day = choice((
        just('0').ignore_then(i8_1_9()),
        i8_1_2().then(i8_0_9()).map(|(a, b)| 10 * a + b),
        just('3').ignore_then(i8_0_1()).map(|b| 30 + b),
    ));

    year.then(month)
        .then(day)
        .try_map(|((year, month), day), span| {
            ValueDate::new(year, month, day)
                .ok_or_else(|| E::Error::expected_found([ValueExpected::Date], None, span))
        })
}

/// Time of day without a zone marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ValueTime {
    /// Hour component, 0-23.
    pub hour: u8,

    /// Minute component, 0-59.
    pub minute: u8,

    /// Second component, 0-60 (60 for leap second).
    pub second: u8,
}

impl ValueTime {
    /// Create a new `ValueTime` from components.
    #[must_use]
    pub const fn new(hour: u8, minute: u8, second: u8) -> Self {
        Self {
            hour,
            minute,
            second,
        }
    }

    /// Convert to `jiff::civil::Time`. A leap second is contracted to 59.
    #[must_use]
    #[expect(clippy::cast_possible_wrap)]
    pub fn civil_time(self) -> jiff::civil::Time {
        jiff::civil::time(
            self.hour.min(23) as i8,
            self.minute.min(59) as i8,
            self.second.min(59) as i8,
            0,
        )
    }

    /// Build from a `jiff::civil::Time`, dropping sub-second precision.
    #[must_use]
    #[expect(clippy::cast_sign_loss)]
    pub fn from_civil(time: jiff::civil::Time) -> Self {
        Self {
            hour: time.hour() as u8,
            minute: time.minute() as u8,
            second: time.second() as u8,
        }
    }
}

/// Format Definition:  This value type is defined by the following notation:
///
/// ```txt
/// time-hour    = 2DIGIT        ;00-23
/// time-minute  = 2DIGIT        ;00-59
/// time-second  = 2DIGIT        ;00-60
/// ;The "60" value is used to account for positive "leap" seconds.
/// ```
fn value_time<'src, I, E>() -> impl Parser<'src, I, ValueTime, E> + Clone
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    time_hour()
        .then(time_minute())
        .then(time_second())
        .map(|((hour, minute), second)| ValueTime::new(hour, minute, second))
}

/// Zone marker carried on a date-time value.
///
/// A TZID label never lives here; it is kept as the `TZID` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    /// Trailing `Z`
    Utc,

    /// Fixed numeric offset `±HHMM[SS]`
    Offset(ValueUtcOffset),
}

/// Date-Time value, RFC 2445 Section 4.3.5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueDateTime {
    /// Date component.
    pub date: ValueDate,

    /// Time component.
    pub time: ValueTime,

    /// Zone marker, `None` for floating or TZID-qualified times.
    pub zone: Option<Zone>,
}

impl ValueDateTime {
    /// Create a date-time from its parts.
    #[must_use]
    pub const fn new(date: ValueDate, time: ValueTime, zone: Option<Zone>) -> Self {
        Self { date, time, zone }
    }

    /// The wall clock reading, ignoring the zone marker.
    #[must_use]
    pub fn civil_date_time(&self) -> jiff::civil::DateTime {
        self.date.civil_date().to_datetime(self.time.civil_time())
    }

    /// Build from a wall clock reading and a zone marker.
    #[must_use]
    pub fn from_civil(datetime: jiff::civil::DateTime, zone: Option<Zone>) -> Self {
        Self {
            date: ValueDate::from_civil(datetime.date()),
            time: ValueTime::from_civil(datetime.time()),
            zone,
        }
    }

    /// Shift an offset-qualified value onto UTC. Other values are returned
    /// unchanged.
    #[must_use]
    pub fn to_utc(&self) -> Self {
        match self.zone {
            Some(Zone::Offset(offset)) => {
                let shifted = self
                    .civil_date_time()
                    .checked_sub(jiff::SignedDuration::from_secs(i64::from(
                        offset.as_seconds(),
                    )))
                    .unwrap_or_else(|_| self.civil_date_time());
                Self::from_civil(shifted, Some(Zone::Utc))
            }
            _ => *self,
        }
    }

    /// Whether the value carries the UTC marker.
    #[must_use]
    pub fn is_utc(&self) -> bool {
        matches!(self.zone, Some(Zone::Utc))
    }
}

/// A value that is either a whole date or a date-time, such as DTSTART or
/// the UNTIL rule part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateOrDateTime {
    /// All-day value
    Date(ValueDate),

    /// Date with a time of day
    DateTime(ValueDateTime),
}

impl DateOrDateTime {
    /// The calendar date.
    #[must_use]
    pub const fn date(&self) -> ValueDate {
        match self {
            Self::Date(date) => *date,
            Self::DateTime(dt) => dt.date,
        }
    }

    /// Wall clock reading, midnight for a whole date.
    #[must_use]
    pub fn civil_date_time(&self) -> jiff::civil::DateTime {
        match self {
            Self::Date(date) => date.civil_date().to_datetime(jiff::civil::Time::midnight()),
            Self::DateTime(dt) => dt.civil_date_time(),
        }
    }

    /// Whether this is a whole date.
    #[must_use]
    pub const fn is_date(&self) -> bool {
        matches!(self, Self::Date(_))
    }

    /// The zone marker of a date-time.
    #[must_use]
    pub const fn zone(&self) -> Option<Zone> {
        match self {
            Self::Date(_) => None,
            Self::DateTime(dt) => dt.zone,
        }
    }
}

/// Format Definition:  This value type is defined by the following notation:
///
/// ```txt
/// date-time  = date "T" time ;As specified in the date and time
///                            ;value definitions
/// time       = time-hour time-minute time-second [time-utc]
/// time-utc   = "Z"
/// ```
///
/// A trailing numeric offset `±HHMM[SS]` is accepted as well.
pub fn value_date_time<'src, I, E>() -> impl Parser<'src, I, ValueDateTime, E> + Clone
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    let zone = choice((
        just('Z').to(Zone::Utc),
        value_utc_offset().map(Zone::Offset),
    ));

    value_date()
        .then_ignore(just('T'))
        .then(value_time())
        .then(zone.or_not())
        .map(|((date, time), zone)| ValueDateTime { date, time, zone })
}

/// UTC Offset Value, RFC 2445 Section 4.3.14
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueUtcOffset {
    /// Whether the offset is positive
    pub positive: bool,

    /// Hour, 0-23
    pub hour: u8,

    /// Minute, 0-59
    pub minute: u8,

    /// Second, 0-60, optional
    pub second: Option<u8>,
}

impl ValueUtcOffset {
    /// Signed offset from UTC in seconds.
    #[must_use]
    pub fn as_seconds(self) -> i32 {
        let secs = i32::from(self.hour) * 3600
            + i32::from(self.minute) * 60
            + i32::from(self.second.unwrap_or(0));
        if self.positive { secs } else { -secs }
    }
}

/// Format Definition:  This value type is defined by the following notation:
///
/// ```txt
/// utc-offset = time-numzone
///
/// time-numzone = ("+" / "-") time-hour time-minute [time-second]
/// ```
pub fn value_utc_offset<'src, I, E>() -> impl Parser<'src, I, ValueUtcOffset, E> + Clone
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    select! { c @ ('+' | '-') => c }
        .then(time_hour())
        .then(time_minute())
        .then(time_second().or_not())
        .map(|(((sign, hour), minute), second)| ValueUtcOffset {
            positive: !matches!(sign, '-'),
            hour,
            minute,
            second,
        })
}

fn time_hour<'src, I, E>() -> impl Parser<'src, I, u8, E> + Copy
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    choice((
        u8_0_1().then(u8_0_9()).map(|(a, b)| 10 * a + b),
        just('2').ignore_then(u8_0_3()).map(|b| 20 + b),
    ))
}

fn time_minute<'src, I, E>() -> impl Parser<'src, I, u8, E> + Copy
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    u8_0_5().then(u8_0_9()).map(|(a, b)| 10 * a + b)
}

fn time_second<'src, I, E>() -> impl Parser<'src, I, u8, E> + Copy
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    choice((
        u8_0_5().then(u8_0_9()).map(|(a, b)| 10 * a + b),
        just('6').ignore_then(just('0').ignored().to(60)), // leap second
    ))
}

#[cfg(test)]
mod tests {
    use chumsky::input::Stream;

    use super::*;

    #[test]
    fn parses_date() {
        fn parse(src: &str) -> Result<ValueDate, Vec<Rich<'_, char>>> {
            let stream = Stream::from_iter(src.chars());
            value_date::<'_, _, extra::Err<_>>()
                .parse(stream)
                .into_result()
        }

        #[rustfmt::skip]
        let success_cases = [
            // examples from RFC 2445 Section 4.3.4
            ("19970714", ValueDate { year: 1997, month: 7, day: 14 }),
            // extra tests
            ("20240101", ValueDate { year: 2024, month: 1, day: 1 }),
            ("20000229", ValueDate { year: 2000, month: 2, day: 29 }), // leap year
            ("19000101", ValueDate { year: 1900, month: 1, day: 1 }),
        ];
        for (src, expected) in success_cases {
            assert_eq!(parse(src).unwrap(), expected);
        }

        let fail_cases = [
            "20241301",  // invalid month
            "20240001",  // invalid month
            "abcd1234",  // invalid characters
            "2024011",   // invalid length
            "202401011", // invalid length
            "19970230",  // invalid date
            "20230229",  // not a leap year
        ];
        for src in fail_cases {
            assert!(parse(src).is_err(), "Parse {src} should fail");
        }
    }

    #[test]
    fn parses_date_time() {
        fn parse(src: &str) -> Result<ValueDateTime, Vec<Rich<'_, char>>> {
            let stream = Stream::from_iter(src.chars());
            value_date_time::<'_, _, extra::Err<_>>()
                .parse(stream)
                .into_result()
        }

        let plus_one = ValueUtcOffset {
            positive: true,
            hour: 1,
            minute: 0,
            second: None,
        };

        #[rustfmt::skip]
        let success_cases = [
            ("19980118T230000",      (ValueDate { year: 1998, month: 1, day: 18 }, ValueTime::new(23, 0, 0), None)),
            ("19980119T070000Z",     (ValueDate { year: 1998, month: 1, day: 19 }, ValueTime::new(7, 0, 0), Some(Zone::Utc))),
            ("19970630T235960Z",     (ValueDate { year: 1997, month: 6, day: 30 }, ValueTime::new(23, 59, 60), Some(Zone::Utc))),
            ("20240105T100000+0100", (ValueDate { year: 2024, month: 1, day: 5 }, ValueTime::new(10, 0, 0), Some(Zone::Offset(plus_one)))),
        ];
        for (src, (date, time, zone)) in success_cases {
            let result = parse(src).unwrap();
            assert_eq!(result.date, date, "Failed for {src}");
            assert_eq!(result.time, time, "Failed for {src}");
            assert_eq!(result.zone, zone, "Failed for {src}");
        }

        let fail_cases = [
            "19970714 133000", // missing 'T'
            "19970714T250000", // invalid hour
            "19970714T126000", // invalid minute
            "19970714T123461", // invalid second
            "19970714T1230",   // missing second
            "19970714T123000ZZ",
        ];
        for src in fail_cases {
            assert!(parse(src).is_err(), "Parse {src} should fail");
        }
    }

    #[test]
    fn parses_utc_offset() {
        fn parse(src: &str) -> Result<ValueUtcOffset, Vec<Rich<'_, char>>> {
            let stream = Stream::from_iter(src.chars());
            value_utc_offset::<'_, _, extra::Err<_>>()
                .parse(stream)
                .into_result()
        }
        #[rustfmt::skip]
        let success_cases = [
            // examples from RFC 2445 Section 4.3.14
            (  "-0500", ValueUtcOffset{positive: false, hour: 5, minute:  0, second: None}),
            (  "+0100", ValueUtcOffset{positive:  true, hour: 1, minute:  0, second: None}),
            // extra tests
            (  "+0000", ValueUtcOffset{positive:  true, hour: 0, minute:  0, second: None}),
            ("-123456", ValueUtcOffset{positive: false, hour:12, minute: 34, second: Some(56)}),
        ];
        for (src, expected) in success_cases {
            assert_eq!(parse(src).unwrap(), expected);
        }

        let fail_cases = [
            "0500",     // missing sign
            "+2400",    // invalid hour
            "-1260",    // invalid minute
            "+123461",  // invalid second
            "+120",     // missing digit
            "+120000Z", // extra character
            "",         // empty string
        ];
        for src in fail_cases {
            assert!(parse(src).is_err(), "Parse {src} should fail");
        }
    }

    #[test]
    fn converts_offset_to_utc() {
        let local = ValueDateTime::new(
            ValueDate {
                year: 2024,
                month: 1,
                day: 1,
            },
            ValueTime::new(0, 30, 0),
            Some(Zone::Offset(ValueUtcOffset {
                positive: true,
                hour: 1,
                minute: 0,
                second: None,
            })),
        );
        let utc = local.to_utc();
        assert_eq!(
            utc.date,
            ValueDate {
                year: 2023,
                month: 12,
                day: 31
            }
        );
        assert_eq!(utc.time, ValueTime::new(23, 30, 0));
        assert!(utc.is_utc());

        let floating = ValueDateTime::new(local.date, local.time, None);
        assert_eq!(floating.to_utc(), floating);
    }
}
