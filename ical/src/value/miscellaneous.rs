// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Parsers for the small scalar value types: boolean, integer, float, geo and
//! request status, plus the shared digit selectors.

use std::borrow::Cow;

use chumsky::Parser;
use chumsky::error::RichPattern;
use chumsky::extra::ParserExtra;
use chumsky::input::Input;
use chumsky::label::LabelError;
use chumsky::prelude::*;
use chumsky::span::SimpleSpan;

use crate::keyword::{KW_BOOLEAN_FALSE, KW_BOOLEAN_TRUE};
use crate::value::text::{escape_text, split_unescaped, unescape_text};

/// Failure reasons when a specific value type was expected but not found.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValueExpected {
    /// A date value was expected
    Date,
    /// A 64-bit floating-point value was expected
    F64,
    /// A 32-bit signed integer value was expected
    I32,
    /// A 32-bit unsigned integer value was expected
    U32,
    /// A positive 32-bit unsigned integer value was expected
    PositiveU32,
    /// A rule part appears more than once
    RRuleDuplicatePart,
    /// FREQ is missing from the rule
    RRuleRequiredFreq,
    /// UNTIL and COUNT were both given
    RRuleCountUntilExclusion,
}

impl From<ValueExpected> for RichPattern<'_, char> {
    fn from(expected: ValueExpected) -> Self {
        match expected {
            ValueExpected::Date => Self::Label(Cow::Borrowed("invalid date")),
            ValueExpected::F64 => Self::Label(Cow::Borrowed("f64 out of range")),
            ValueExpected::I32 => Self::Label(Cow::Borrowed("i32 out of range")),
            ValueExpected::U32 => Self::Label(Cow::Borrowed("u32 out of range")),
            ValueExpected::PositiveU32 => Self::Label(Cow::Borrowed("positive u32")),
            ValueExpected::RRuleDuplicatePart => {
                Self::Label(Cow::Borrowed("rule part given more than once"))
            }
            ValueExpected::RRuleRequiredFreq => Self::Label(Cow::Borrowed("FREQ rule part")),
            ValueExpected::RRuleCountUntilExclusion => {
                Self::Label(Cow::Borrowed("either UNTIL or COUNT, not both"))
            }
        }
    }
}

/// Geographic position, RFC 2445 Section 4.8.1.6.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueGeo {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

/// Request status, RFC 2445 Section 4.8.8.2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueRequestStatus {
    /// Hierarchical status code, e.g. `2.0`
    pub code: String,
    /// Human readable status description
    pub description: String,
    /// Optional exception data
    pub extra: Option<String>,
}

impl ValueRequestStatus {
    /// Split the raw `code;description[;extra]` text.
    ///
    /// Returns `None` when the description part is missing.
    #[must_use]
    pub fn from_raw(raw: &str) -> Option<Self> {
        let mut parts = split_unescaped(raw, ';').into_iter();
        let code = parts.next()?.trim().to_owned();
        let description = unescape_text(parts.next()?);
        let rest: Vec<&str> = parts.collect();
        let extra = (!rest.is_empty()).then(|| unescape_text(&rest.join(";")));
        Some(Self {
            code,
            description,
            extra,
        })
    }

    /// Render as `code;description[;extra]` with text escaping applied.
    #[must_use]
    pub fn to_raw(&self) -> String {
        let mut out = format!("{};{}", self.code, escape_text(&self.description));
        if let Some(extra) = &self.extra {
            out.push(';');
            out.push_str(&escape_text(extra));
        }
        out
    }
}

/// ```txt
/// boolean    = "TRUE" / "FALSE"
/// ```
pub fn value_boolean<'src, I, E>() -> impl Parser<'src, I, bool, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    choice((
        just(KW_BOOLEAN_TRUE).to(true),
        just(KW_BOOLEAN_FALSE).to(false),
    ))
}

/// ```txt
/// integer    = (["+"] / "-") 1*DIGIT
/// ```
pub fn value_integer<'src, I, E>() -> impl Parser<'src, I, i32, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    select! { c @ ('+' | '-') => c }
        .or_not()
        .then(
            select! { c @ '0'..='9' => c }
                .repeated()
                .at_least(1)
                .at_most(10)
                .collect::<String>(),
        )
        .try_map(|(sign, digits), span| {
            let negative = matches!(sign, Some('-'));
            match lexical::parse::<i64, _>(&digits) {
                Ok(v) => {
                    let v = if negative { -v } else { v };
                    i32::try_from(v)
                        .map_err(|_| E::Error::expected_found([ValueExpected::I32], None, span))
                }
                Err(_) => Err(E::Error::expected_found([ValueExpected::I32], None, span)),
            }
        })
}

/// ```txt
/// float      = (["+"] / "-") 1*DIGIT ["." 1*DIGIT]
/// ```
pub fn value_float<'src, I, E>() -> impl Parser<'src, I, f64, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    let digits = select! { c @ '0'..='9' => c }
        .repeated()
        .at_least(1)
        .collect::<String>();

    select! { c @ ('+' | '-') => c }
        .or_not()
        .then(digits.clone())
        .then(just('.').ignore_then(digits).or_not())
        .try_map(|((sign, int), frac), span| {
            let mut s = String::new();
            if let Some('-') = sign {
                s.push('-');
            }
            s.push_str(&int);
            if let Some(frac) = frac {
                s.push('.');
                s.push_str(&frac);
            }
            lexical::parse::<f64, _>(&s)
                .map_err(|_| E::Error::expected_found([ValueExpected::F64], None, span))
        })
}

/// ```txt
/// geo-value  = float ";" float
/// ```
pub fn value_geo<'src, I, E>() -> impl Parser<'src, I, ValueGeo, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    value_float()
        .then_ignore(just(';'))
        .then(value_float())
        .map(|(latitude, longitude)| ValueGeo {
            latitude,
            longitude,
        })
}

macro_rules! define_digit_select {
    ($fname:ident : $ty:ty => { $($ch:literal),+ $(,)? }) => {
        #[allow(trivial_numeric_casts, clippy::cast_lossless, clippy::char_lit_as_u8, clippy::cast_possible_wrap)]
        pub(crate) const fn $fname<'src, I, E>() -> impl Parser<'src, I, $ty, E> + Copy
        where
            I: Input<'src, Token = char, Span = SimpleSpan>,
            E: ParserExtra<'src, I>,
        {
            select! {
                $(
                    $ch => (($ch as u8 - b'0') as $ty),
                )+
            }
        }
    };
}

define_digit_select!(u8_0_1 : u8 => { '0', '1' });
define_digit_select!(u8_0_2 : u8 => { '0', '1', '2' });
define_digit_select!(u8_0_3 : u8 => { '0', '1', '2', '3' });
define_digit_select!(u8_0_5 : u8 => { '0', '1', '2', '3', '4', '5' });
define_digit_select!(u8_0_9 : u8 => { '0', '1', '2', '3', '4', '5', '6', '7', '8', '9' });
define_digit_select!(u8_1_9 : u8 => { '1', '2', '3', '4', '5', '6', '7', '8', '9' });
define_digit_select!(i8_0_1 : i8 => { '0', '1' });
define_digit_select!(i8_0_2 : i8 => { '0', '1', '2' });
define_digit_select!(i8_0_3 : i8 => { '0', '1', '2', '3' });
define_digit_select!(i8_0_9 : i8 => { '0', '1', '2', '3', '4', '5', '6', '7', '8', '9' });
define_digit_select!(i8_1_2 : i8 => { '1', '2' });
define_digit_select!(i8_1_4 : i8 => { '1', '2', '3', '4' });
define_digit_select!(i8_1_9 : i8 => { '1', '2', '3', '4', '5', '6', '7', '8', '9' });
define_digit_select!(i16_0_5 : i16 => { '0', '1', '2', '3', '4', '5' });
define_digit_select!(i16_0_6 : i16 => { '0', '1', '2', '3', '4', '5', '6' });
define_digit_select!(i16_0_9 : i16 => { '0', '1', '2', '3', '4', '5', '6', '7', '8', '9' });
define_digit_select!(i16_1_2 : i16 => { '1', '2' });
define_digit_select!(i16_1_9 : i16 => { '1', '2', '3', '4', '5', '6', '7', '8', '9' });

#[cfg(test)]
mod tests {
    use chumsky::input::Stream;

    use super::*;

    #[test]
    fn parses_boolean() {
        fn parse(src: &str) -> Result<bool, Vec<Rich<'_, char>>> {
            let stream = Stream::from_iter(src.chars());
            value_boolean::<'_, _, extra::Err<_>>()
                .parse(stream)
                .into_result()
        }

        assert!(parse("TRUE").unwrap());
        assert!(!parse("FALSE").unwrap());
        for src in ["true", "T", "", "TRUEE"] {
            assert!(parse(src).is_err(), "Parse {src} should fail");
        }
    }

    #[test]
    fn parses_integer() {
        fn parse(src: &str) -> Result<i32, Vec<Rich<'_, char>>> {
            let stream = Stream::from_iter(src.chars());
            value_integer::<'_, _, extra::Err<_>>()
                .parse(stream)
                .into_result()
        }

        #[rustfmt::skip]
        let success_cases = [
            ("1234567890", 1_234_567_890),
            ("-1234567890", -1_234_567_890),
            ("+1234567890", 1_234_567_890),
            ("432109876", 432_109_876),
            ("0", 0),
        ];
        for (src, expected) in success_cases {
            assert_eq!(parse(src).unwrap(), expected, "Failed to parse: {src}");
        }

        for src in ["", "+", "12a", "3000000000", "1.5"] {
            assert!(parse(src).is_err(), "Parse {src} should fail");
        }
    }

    #[test]
    fn parses_geo() {
        fn parse(src: &str) -> Result<ValueGeo, Vec<Rich<'_, char>>> {
            let stream = Stream::from_iter(src.chars());
            value_geo::<'_, _, extra::Err<_>>()
                .parse(stream)
                .into_result()
        }

        let geo = parse("37.386013;-122.082932").unwrap();
        assert!((geo.latitude - 37.386_013).abs() < 1e-9);
        assert!((geo.longitude + 122.082_932).abs() < 1e-9);

        for src in ["37.386013", "37.386013,-122.08", ";1.0", "a;b"] {
            assert!(parse(src).is_err(), "Parse {src} should fail");
        }
    }

    #[test]
    fn splits_request_status() {
        let status = ValueRequestStatus::from_raw("3.1;Invalid property value;DTSTART:96-Apr-01")
            .unwrap();
        assert_eq!(status.code, "3.1");
        assert_eq!(status.description, "Invalid property value");
        assert_eq!(status.extra.as_deref(), Some("DTSTART:96-Apr-01"));

        let status = ValueRequestStatus::from_raw("2.0;Success").unwrap();
        assert_eq!(status.extra, None);
        assert_eq!(status.to_raw(), "2.0;Success");

        let status = ValueRequestStatus::from_raw(r"2.8;Success\; repeating event ignored")
            .unwrap();
        assert_eq!(status.description, "Success; repeating event ignored");
        assert_eq!(status.to_raw(), r"2.8;Success\; repeating event ignored");

        assert!(ValueRequestStatus::from_raw("2.0").is_none());
    }
}
