// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Convenient date and date-time inputs, normalized into a [`Value`] plus
//! the parameters that qualify it.

use std::str::FromStr;

use chumsky::Parser;
use chumsky::error::Rich;
use chumsky::extra;

use crate::keyword::{KW_DATE, KW_TZID, KW_VALUE};
use crate::parameter::Parameters;
use crate::value::datetime::{
    ValueDate, ValueDateTime, ValueTime, Zone, value_date, value_date_time, value_utc_offset,
};
use crate::value::{Value, ValueError, ValueKind};

/// The shapes a date or date-time may be supplied in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateInput<'a> {
    /// Explicit fields. Without `time` the value is a whole date.
    Parts {
        /// Year
        year: i16,
        /// Month, 1-12
        month: i8,
        /// Day, 1-31
        day: i8,
        /// Hour, minute and second
        time: Option<(u8, u8, u8)>,
        /// `Z`, a numeric offset `±HHMM[SS]`, or a TZID label
        zone: Option<&'a str>,
    },

    /// UNIX seconds, read in the given zone or in UTC.
    Timestamp {
        /// Seconds since the epoch
        seconds: i64,
        /// `Z`, a numeric offset `±HHMM[SS]`, or a TZID label
        zone: Option<&'a str>,
    },

    /// Pre-formatted text, either `YYYY-MM-DD[ HH:MM[:SS]][ zone]` or the
    /// iCalendar form `YYYYMMDD[THHMMSS[Z]]`.
    Text(&'a str),
}

impl<'a> DateInput<'a> {
    /// A whole date.
    #[must_use]
    pub const fn date(year: i16, month: i8, day: i8) -> Self {
        Self::Parts {
            year,
            month,
            day,
            time: None,
            zone: None,
        }
    }

    /// A date-time with an optional zone.
    #[must_use]
    pub const fn date_time(
        year: i16,
        month: i8,
        day: i8,
        time: (u8, u8, u8),
        zone: Option<&'a str>,
    ) -> Self {
        Self::Parts {
            year,
            month,
            day,
            time: Some(time),
            zone,
        }
    }

    /// Normalize into a value and its parameters.
    ///
    /// A TZID label becomes the `TZID` parameter; `Z` and numeric offsets
    /// stay on the value. A whole date carries `VALUE=DATE`, and an explicit
    /// `VALUE=DATE` in `params` truncates a date-time to its date.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError`] if the fields do not form a valid date or time,
    /// or the text is in neither supported format.
    pub fn normalize(self, mut params: Parameters) -> Result<(Value, Parameters), ValueError> {
        let (date, time, zone) = match self {
            Self::Parts {
                year,
                month,
                day,
                time,
                zone,
            } => {
                let date = ValueDate::new(year, month, day).ok_or_else(|| {
                    ValueError::new(
                        ValueKind::Date,
                        &format!("{year:04}-{month:02}-{day:02}"),
                        "no such date",
                    )
                })?;
                let time = time
                    .map(|(h, m, s)| {
                        if h < 24 && m < 60 && s <= 60 {
                            Ok(ValueTime::new(h, m, s))
                        } else {
                            Err(ValueError::new(
                                ValueKind::DateTime,
                                &format!("{h:02}:{m:02}:{s:02}"),
                                "no such time of day",
                            ))
                        }
                    })
                    .transpose()?;
                (date, time, zone.map(ZoneInput::parse))
            }
            Self::Timestamp { seconds, zone } => from_timestamp(seconds, zone)?,
            Self::Text(text) => from_text(text)?,
        };

        let forced_date = params
            .value(KW_VALUE)
            .is_some_and(|v| v.eq_ignore_ascii_case(KW_DATE));

        let value = match time {
            Some(time) if !forced_date => {
                let zone = match zone {
                    Some(ZoneInput::Zone(zone)) => Some(zone),
                    Some(ZoneInput::Label(label)) => {
                        params.set(KW_TZID, [label]);
                        None
                    }
                    None => None,
                };
                Value::DateTime(ValueDateTime::new(date, time, zone))
            }
            _ => {
                params.set(KW_VALUE, [KW_DATE]);
                Value::Date(date)
            }
        };
        Ok((value, params))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ZoneInput<'a> {
    Zone(Zone),
    Label(&'a str),
}

impl<'a> ZoneInput<'a> {
    fn parse(text: &'a str) -> Self {
        let text = text.trim();
        if text.eq_ignore_ascii_case("Z") || text.eq_ignore_ascii_case("UTC") {
            return Self::Zone(Zone::Utc);
        }
        value_utc_offset::<'_, _, extra::Default>()
            .parse(text)
            .into_result()
            .map_or(Self::Label(text), |offset| Self::Zone(Zone::Offset(offset)))
    }
}

type Fields<'a> = (ValueDate, Option<ValueTime>, Option<ZoneInput<'a>>);

/// A TZID label is resolved through the time zone database so the clock
/// reading matches the label. Labels the database does not know fall back to
/// UTC.
fn from_timestamp(seconds: i64, zone: Option<&str>) -> Result<Fields<'_>, ValueError> {
    let invalid = |reason: &str| ValueError::new(ValueKind::DateTime, &seconds.to_string(), reason);
    let ts = jiff::Timestamp::from_second(seconds).map_err(|e| invalid(&e.to_string()))?;
    let (civil, zone) = match zone.map(ZoneInput::parse) {
        Some(ZoneInput::Zone(Zone::Offset(offset))) => {
            let tz = jiff::tz::Offset::from_seconds(offset.as_seconds())
                .map_err(|e| invalid(&e.to_string()))?;
            (tz.to_datetime(ts), ZoneInput::Zone(Zone::Offset(offset)))
        }
        Some(ZoneInput::Label(label)) => match jiff::tz::TimeZone::get(label) {
            Ok(tz) => (tz.to_datetime(ts), ZoneInput::Label(label)),
            Err(error) => {
                tracing::debug!(label, %error, "unknown time zone, using UTC");
                (jiff::tz::Offset::UTC.to_datetime(ts), ZoneInput::Zone(Zone::Utc))
            }
        },
        Some(ZoneInput::Zone(Zone::Utc)) | None => {
            (jiff::tz::Offset::UTC.to_datetime(ts), ZoneInput::Zone(Zone::Utc))
        }
    };
    Ok((
        ValueDate::from_civil(civil.date()),
        Some(ValueTime::from_civil(civil.time())),
        Some(zone),
    ))
}

fn from_text(text: &str) -> Result<Fields<'_>, ValueError> {
    let text = text.trim();
    let invalid = |reason: &str| ValueError::new(ValueKind::DateTime, text, reason);

    // iCalendar form first: YYYYMMDD or YYYYMMDDTHHMMSS[Z|±HHMM]
    type Extra<'src> = extra::Err<Rich<'src, char>>;
    if let Ok(dt) = value_date_time::<'_, _, Extra<'_>>().parse(text).into_result() {
        return Ok((dt.date, Some(dt.time), dt.zone.map(ZoneInput::Zone)));
    }
    if let Ok(date) = value_date::<'_, _, Extra<'_>>().parse(text).into_result() {
        return Ok((date, None, None));
    }

    // Human form: YYYY-MM-DD[ HH:MM[:SS]][ zone]
    let mut parts = text.split_whitespace();
    let date = parts.next().ok_or_else(|| invalid("empty date"))?;
    let date = jiff::civil::Date::from_str(date).map_err(|e| invalid(&e.to_string()))?;

    let mut time = None;
    let mut zone = None;
    if let Some(next) = parts.next() {
        if next.contains(':') {
            let t = jiff::civil::Time::from_str(next).map_err(|e| invalid(&e.to_string()))?;
            time = Some(ValueTime::from_civil(t));
            zone = parts.next();
        } else {
            zone = Some(next);
        }
    }
    if parts.next().is_some() {
        return Err(invalid("trailing text after zone"));
    }

    Ok((
        ValueDate::from_civil(date),
        time,
        zone.map(ZoneInput::parse),
    ))
}

#[cfg(test)]
mod tests {
    use crate::value::datetime::ValueUtcOffset;

    use super::*;

    fn date(y: i16, m: i8, d: i8) -> ValueDate {
        ValueDate::new(y, m, d).unwrap()
    }

    #[test]
    fn whole_date_gets_value_date() {
        let (value, params) = DateInput::date(2024, 1, 5)
            .normalize(Parameters::new())
            .unwrap();
        assert_eq!(value, Value::Date(date(2024, 1, 5)));
        assert_eq!(params.value("VALUE"), Some("DATE"));
    }

    #[test]
    fn zone_label_becomes_tzid() {
        let (value, params) = DateInput::date_time(2024, 1, 5, (9, 30, 0), Some("Europe/Berlin"))
            .normalize(Parameters::new())
            .unwrap();
        let Value::DateTime(dt) = value else {
            panic!("expected a date-time, got {value:?}");
        };
        assert_eq!(dt.zone, None);
        assert_eq!(dt.time, ValueTime::new(9, 30, 0));
        assert_eq!(params.value("TZID"), Some("Europe/Berlin"));
        assert_eq!(params.value("VALUE"), None);
    }

    #[test]
    fn utc_and_offset_stay_on_value() {
        let (value, params) = DateInput::date_time(2024, 1, 5, (9, 30, 0), Some("Z"))
            .normalize(Parameters::new())
            .unwrap();
        assert!(params.is_empty());
        assert!(matches!(value, Value::DateTime(dt) if dt.is_utc()));

        let (value, _) = DateInput::date_time(2024, 1, 5, (9, 30, 0), Some("-0500"))
            .normalize(Parameters::new())
            .unwrap();
        let Value::DateTime(dt) = value else {
            panic!("expected a date-time, got {value:?}");
        };
        assert_eq!(
            dt.zone,
            Some(Zone::Offset(ValueUtcOffset {
                positive: false,
                hour: 5,
                minute: 0,
                second: None
            }))
        );
    }

    #[test]
    fn timestamp_renders_in_utc() {
        let (value, _) = DateInput::Timestamp {
            seconds: 1_704_067_200, // 2024-01-01T00:00:00Z
            zone: None,
        }
        .normalize(Parameters::new())
        .unwrap();
        assert_eq!(
            value,
            Value::DateTime(ValueDateTime::new(
                date(2024, 1, 1),
                ValueTime::new(0, 0, 0),
                Some(Zone::Utc)
            ))
        );

        let (value, _) = DateInput::Timestamp {
            seconds: 1_704_067_200,
            zone: Some("+0100"),
        }
        .normalize(Parameters::new())
        .unwrap();
        let Value::DateTime(dt) = value else {
            panic!("expected a date-time, got {value:?}");
        };
        assert_eq!(dt.time, ValueTime::new(1, 0, 0));
        assert!(matches!(dt.zone, Some(Zone::Offset(_))));
    }

    #[test]
    fn timestamp_reads_the_labelled_zone() {
        let stamp = |zone| DateInput::Timestamp {
            seconds: 1_704_099_600, // 2024-01-01T09:00:00Z
            zone: Some(zone),
        };

        // Unknown labels are not attached to a UTC reading
        let (value, params) = stamp("Mars/Olympus_Mons")
            .normalize(Parameters::new())
            .unwrap();
        assert_eq!(
            value,
            Value::DateTime(ValueDateTime::new(
                date(2024, 1, 1),
                ValueTime::new(9, 0, 0),
                Some(Zone::Utc)
            ))
        );
        assert_eq!(params.value("TZID"), None);

        // Skipped where the host has no time zone database
        if jiff::tz::TimeZone::get("Europe/Berlin").is_ok() {
            let (value, params) = stamp("Europe/Berlin")
                .normalize(Parameters::new())
                .unwrap();
            assert_eq!(
                value,
                Value::DateTime(ValueDateTime::new(
                    date(2024, 1, 1),
                    ValueTime::new(10, 0, 0),
                    None
                ))
            );
            assert_eq!(params.value("TZID"), Some("Europe/Berlin"));
        }
    }

    #[test]
    fn parses_text_forms() {
        let (value, _) = DateInput::Text("2024-01-05 10:00:00 +0100")
            .normalize(Parameters::new())
            .unwrap();
        let Value::DateTime(dt) = value else {
            panic!("expected a date-time, got {value:?}");
        };
        assert_eq!(dt.date, date(2024, 1, 5));
        assert_eq!(dt.time, ValueTime::new(10, 0, 0));

        let (value, _) = DateInput::Text("20240105T100000Z")
            .normalize(Parameters::new())
            .unwrap();
        assert!(matches!(value, Value::DateTime(dt) if dt.is_utc()));

        let (value, params) = DateInput::Text("2024-01-05")
            .normalize(Parameters::new())
            .unwrap();
        assert_eq!(value, Value::Date(date(2024, 1, 5)));
        assert_eq!(params.value("VALUE"), Some("DATE"));

        let (_, params) = DateInput::Text("2024-01-05 10:00 America/New_York")
            .normalize(Parameters::new())
            .unwrap();
        assert_eq!(params.value("TZID"), Some("America/New_York"));

        assert!(DateInput::Text("not a date").normalize(Parameters::new()).is_err());
    }

    #[test]
    fn explicit_value_date_truncates() {
        let params = Parameters::new().with("VALUE", "DATE");
        let (value, params) = DateInput::date_time(2024, 1, 5, (23, 0, 0), None)
            .normalize(params)
            .unwrap();
        assert_eq!(value, Value::Date(date(2024, 1, 5)));
        assert_eq!(params.value("VALUE"), Some("DATE"));
    }

    #[test]
    fn rejects_impossible_fields() {
        assert!(DateInput::date(2023, 2, 29).normalize(Parameters::new()).is_err());
        assert!(
            DateInput::date_time(2024, 1, 1, (24, 0, 0), None)
                .normalize(Parameters::new())
                .is_err()
        );
    }
}
