// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Recurrence rule value, RFC 2445 Section 4.3.10.

use std::fmt::{self, Display};

use chumsky::extra::ParserExtra;
use chumsky::input::Input;
use chumsky::label::LabelError;
use chumsky::prelude::*;
use chumsky::span::SimpleSpan;

use crate::keyword::{
    KW_DAY_FR, KW_DAY_MO, KW_DAY_SA, KW_DAY_SU, KW_DAY_TH, KW_DAY_TU, KW_DAY_WE, KW_RRULE_BYDAY,
    KW_RRULE_BYHOUR, KW_RRULE_BYMINUTE, KW_RRULE_BYMONTH, KW_RRULE_BYMONTHDAY, KW_RRULE_BYSECOND,
    KW_RRULE_BYSETPOS, KW_RRULE_BYWEEKNO, KW_RRULE_BYYEARDAY, KW_RRULE_COUNT, KW_RRULE_FREQ,
    KW_RRULE_FREQ_DAILY, KW_RRULE_FREQ_HOURLY, KW_RRULE_FREQ_MINUTELY, KW_RRULE_FREQ_MONTHLY,
    KW_RRULE_FREQ_SECONDLY, KW_RRULE_FREQ_WEEKLY, KW_RRULE_FREQ_YEARLY, KW_RRULE_INTERVAL,
    KW_RRULE_UNTIL, KW_RRULE_WKST,
};
use crate::value::datetime::{DateOrDateTime, value_date, value_date_time};
use crate::value::miscellaneous::{
    ValueExpected, i8_0_1, i8_0_3, i8_0_9, i8_1_2, i8_1_4, i8_1_9, i16_0_5, i16_0_6, i16_0_9,
    i16_1_2, i16_1_9, u8_0_1, u8_0_2, u8_0_3, u8_0_5, u8_0_9, u8_1_9,
};

/// Recurrence rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueRecurrenceRule {
    /// Frequency of recurrence
    pub freq: RecurrenceFrequency,
    /// Last instant of the recurrence, inclusive
    pub until: Option<DateOrDateTime>,
    /// Number of occurrences
    pub count: Option<u32>,
    /// Interval between recurrences
    pub interval: Option<u32>,
    /// Second specifier
    pub by_second: Vec<u8>,
    /// Minute specifier
    pub by_minute: Vec<u8>,
    /// Hour specifier
    pub by_hour: Vec<u8>,
    /// Day of month specifier
    pub by_month_day: Vec<i8>,
    /// Day of year specifier
    pub by_year_day: Vec<i16>,
    /// Week number specifier
    pub by_week_no: Vec<i8>,
    /// Month specifier
    pub by_month: Vec<u8>,
    /// Day of week specifier
    pub by_day: Vec<WeekDayNum>,
    /// Positions within the frequency period
    pub by_set_pos: Vec<i16>,
    /// Start day of week
    pub wkst: Option<WeekDay>,
}

impl ValueRecurrenceRule {
    /// A rule with only FREQ set.
    #[must_use]
    pub const fn new(freq: RecurrenceFrequency) -> Self {
        Self {
            freq,
            until: None,
            count: None,
            interval: None,
            by_second: Vec::new(),
            by_minute: Vec::new(),
            by_hour: Vec::new(),
            by_month_day: Vec::new(),
            by_year_day: Vec::new(),
            by_week_no: Vec::new(),
            by_month: Vec::new(),
            by_day: Vec::new(),
            by_set_pos: Vec::new(),
            wkst: None,
        }
    }

    /// INTERVAL, defaulting to 1.
    #[must_use]
    pub fn interval(&self) -> u32 {
        self.interval.unwrap_or(1).max(1)
    }
}

/// Recurrence frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[expect(missing_docs)]
pub enum RecurrenceFrequency {
    Secondly,
    Minutely,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Display for RecurrenceFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kw = match self {
            Self::Secondly => KW_RRULE_FREQ_SECONDLY,
            Self::Minutely => KW_RRULE_FREQ_MINUTELY,
            Self::Hourly => KW_RRULE_FREQ_HOURLY,
            Self::Daily => KW_RRULE_FREQ_DAILY,
            Self::Weekly => KW_RRULE_FREQ_WEEKLY,
            Self::Monthly => KW_RRULE_FREQ_MONTHLY,
            Self::Yearly => KW_RRULE_FREQ_YEARLY,
        };
        f.write_str(kw)
    }
}

/// Day of week with optional signed ordinal, e.g. `2MO` or `-1FR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeekDayNum {
    /// Day of the week
    pub day: WeekDay,
    /// Occurrence within the month or year, negative counts from the end
    pub occurrence: Option<i8>,
}

impl Display for WeekDayNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(n) = self.occurrence {
            write!(f, "{n}")?;
        }
        write!(f, "{}", self.day)
    }
}

/// Day of the week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[expect(missing_docs)]
pub enum WeekDay {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Display for WeekDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kw = match self {
            Self::Sunday => KW_DAY_SU,
            Self::Monday => KW_DAY_MO,
            Self::Tuesday => KW_DAY_TU,
            Self::Wednesday => KW_DAY_WE,
            Self::Thursday => KW_DAY_TH,
            Self::Friday => KW_DAY_FR,
            Self::Saturday => KW_DAY_SA,
        };
        f.write_str(kw)
    }
}

impl From<WeekDay> for jiff::civil::Weekday {
    fn from(day: WeekDay) -> Self {
        match day {
            WeekDay::Sunday => Self::Sunday,
            WeekDay::Monday => Self::Monday,
            WeekDay::Tuesday => Self::Tuesday,
            WeekDay::Wednesday => Self::Wednesday,
            WeekDay::Thursday => Self::Thursday,
            WeekDay::Friday => Self::Friday,
            WeekDay::Saturday => Self::Saturday,
        }
    }
}

impl From<jiff::civil::Weekday> for WeekDay {
    fn from(day: jiff::civil::Weekday) -> Self {
        match day {
            jiff::civil::Weekday::Sunday => Self::Sunday,
            jiff::civil::Weekday::Monday => Self::Monday,
            jiff::civil::Weekday::Tuesday => Self::Tuesday,
            jiff::civil::Weekday::Wednesday => Self::Wednesday,
            jiff::civil::Weekday::Thursday => Self::Thursday,
            jiff::civil::Weekday::Friday => Self::Friday,
            jiff::civil::Weekday::Saturday => Self::Saturday,
        }
    }
}

/// Format Definition:  This value type is defined by the following notation:
///
/// ```txt
/// recur      = "FREQ"=freq *(
///            ; either UNTIL or COUNT may appear in a 'recur',
///            ; but UNTIL and COUNT MUST NOT occur in the same 'recur'
///            ( ";" "UNTIL" "=" enddate ) /
///            ( ";" "COUNT" "=" 1*DIGIT ) /
///            ; the rest of these keywords are optional,
///            ; but MUST NOT occur more than once
///            ( ";" "INTERVAL" "=" 1*DIGIT )          /
///            ( ";" "BYSECOND" "=" byseclist )        /
///            ...
///            )
/// ```
///
/// Parts are accepted in any order.
pub fn value_rrule<'src, I, E>() -> impl Parser<'src, I, ValueRecurrenceRule, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    recur_rrule_part()
        .separated_by(just(';'))
        .at_least(1)
        .collect()
        .try_map(build_from_parts::<I, E::Error>)
}

#[derive(Debug, Clone)]
enum Part {
    Freq(RecurrenceFrequency),
    Until(DateOrDateTime),
    Count(u32),
    Interval(u32),
    BySecond(Vec<u8>),
    ByMinute(Vec<u8>),
    ByHour(Vec<u8>),
    ByMonthDay(Vec<i8>),
    ByYearDay(Vec<i16>),
    ByWeekNo(Vec<i8>),
    ByMonth(Vec<u8>),
    ByDay(Vec<WeekDayNum>),
    BySetPos(Vec<i16>),
    Wkst(WeekDay),
}

/// Store `value` in an empty slot; a second assignment is a duplicate.
fn set_once<T>(slot: &mut Option<T>, value: T) -> Result<(), ()> {
    match slot {
        Some(_) => Err(()),
        None => {
            *slot = Some(value);
            Ok(())
        }
    }
}

#[derive(Default)]
struct PartSlots {
    freq: Option<RecurrenceFrequency>,
    until: Option<DateOrDateTime>,
    count: Option<u32>,
    interval: Option<u32>,
    by_second: Option<Vec<u8>>,
    by_minute: Option<Vec<u8>>,
    by_hour: Option<Vec<u8>>,
    by_month_day: Option<Vec<i8>>,
    by_year_day: Option<Vec<i16>>,
    by_week_no: Option<Vec<i8>>,
    by_month: Option<Vec<u8>>,
    by_day: Option<Vec<WeekDayNum>>,
    by_set_pos: Option<Vec<i16>>,
    wkst: Option<WeekDay>,
}

impl PartSlots {
    fn fill(&mut self, part: Part) -> Result<(), ()> {
        match part {
            Part::Freq(v) => set_once(&mut self.freq, v),
            Part::Until(v) => set_once(&mut self.until, v),
            Part::Count(v) => set_once(&mut self.count, v),
            Part::Interval(v) => set_once(&mut self.interval, v),
            Part::BySecond(v) => set_once(&mut self.by_second, v),
            Part::ByMinute(v) => set_once(&mut self.by_minute, v),
            Part::ByHour(v) => set_once(&mut self.by_hour, v),
            Part::ByMonthDay(v) => set_once(&mut self.by_month_day, v),
            Part::ByYearDay(v) => set_once(&mut self.by_year_day, v),
            Part::ByWeekNo(v) => set_once(&mut self.by_week_no, v),
            Part::ByMonth(v) => set_once(&mut self.by_month, v),
            Part::ByDay(v) => set_once(&mut self.by_day, v),
            Part::BySetPos(v) => set_once(&mut self.by_set_pos, v),
            Part::Wkst(v) => set_once(&mut self.wkst, v),
        }
    }
}

fn build_from_parts<'src, I, Err>(
    parts: Vec<Part>,
    span: I::Span,
) -> Result<ValueRecurrenceRule, Err>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    Err: LabelError<'src, I, ValueExpected>,
{
    let mut slots = PartSlots::default();
    for part in parts {
        slots
            .fill(part)
            .map_err(|()| Err::expected_found([ValueExpected::RRuleDuplicatePart], None, span))?;
    }

    let freq = slots
        .freq
        .ok_or_else(|| Err::expected_found([ValueExpected::RRuleRequiredFreq], None, span))?;

    if slots.until.is_some() && slots.count.is_some() {
        return Err(Err::expected_found(
            [ValueExpected::RRuleCountUntilExclusion],
            None,
            span,
        ));
    }

    Ok(ValueRecurrenceRule {
        freq,
        until: slots.until,
        count: slots.count,
        interval: slots.interval,
        by_second: slots.by_second.unwrap_or_default(),
        by_minute: slots.by_minute.unwrap_or_default(),
        by_hour: slots.by_hour.unwrap_or_default(),
        by_month_day: slots.by_month_day.unwrap_or_default(),
        by_year_day: slots.by_year_day.unwrap_or_default(),
        by_week_no: slots.by_week_no.unwrap_or_default(),
        by_month: slots.by_month.unwrap_or_default(),
        by_day: slots.by_day.unwrap_or_default(),
        by_set_pos: slots.by_set_pos.unwrap_or_default(),
        wkst: slots.wkst,
    })
}

fn recur_rrule_part<'src, I, E>() -> impl Parser<'src, I, Part, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    let kw = |kw| just(kw).ignore_then(just('='));

    choice((
        kw(KW_RRULE_FREQ).ignore_then(freq()).map(Part::Freq),
        kw(KW_RRULE_UNTIL).ignore_then(enddate()).map(Part::Until),
        kw(KW_RRULE_COUNT)
            .ignore_then(u32_non_zero())
            .map(Part::Count),
        kw(KW_RRULE_INTERVAL)
            .ignore_then(u32_non_zero())
            .map(Part::Interval),
        kw(KW_RRULE_BYSECOND)
            .ignore_then(seconds().separated_by(just(',')).at_least(1).collect())
            .map(Part::BySecond),
        kw(KW_RRULE_BYMINUTE)
            .ignore_then(minutes().separated_by(just(',')).at_least(1).collect())
            .map(Part::ByMinute),
        kw(KW_RRULE_BYHOUR)
            .ignore_then(hour().separated_by(just(',')).at_least(1).collect())
            .map(Part::ByHour),
        kw(KW_RRULE_BYDAY)
            .ignore_then(weekdaynum().separated_by(just(',')).at_least(1).collect())
            .map(Part::ByDay),
        kw(KW_RRULE_BYMONTHDAY)
            .ignore_then(signed_list(ordmoday()))
            .map(Part::ByMonthDay),
        kw(KW_RRULE_BYYEARDAY)
            .ignore_then(signed_list(ordyrday()))
            .map(Part::ByYearDay),
        kw(KW_RRULE_BYWEEKNO)
            .ignore_then(signed_list(ordwk()))
            .map(Part::ByWeekNo),
        kw(KW_RRULE_BYMONTH)
            .ignore_then(monthnum().separated_by(just(',')).at_least(1).collect())
            .map(Part::ByMonth),
        kw(KW_RRULE_BYSETPOS)
            .ignore_then(signed_list(ordyrday()))
            .map(Part::BySetPos),
        kw(KW_RRULE_WKST).ignore_then(weekday()).map(Part::Wkst),
    ))
}

/// ```txt
/// freq        = "SECONDLY" / "MINUTELY" / "HOURLY" / "DAILY"
///             / "WEEKLY" / "MONTHLY" / "YEARLY"
/// ```
fn freq<'src, I, E>() -> impl Parser<'src, I, RecurrenceFrequency, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    choice((
        just(KW_RRULE_FREQ_SECONDLY).to(RecurrenceFrequency::Secondly),
        just(KW_RRULE_FREQ_MINUTELY).to(RecurrenceFrequency::Minutely),
        just(KW_RRULE_FREQ_HOURLY).to(RecurrenceFrequency::Hourly),
        just(KW_RRULE_FREQ_DAILY).to(RecurrenceFrequency::Daily),
        just(KW_RRULE_FREQ_WEEKLY).to(RecurrenceFrequency::Weekly),
        just(KW_RRULE_FREQ_MONTHLY).to(RecurrenceFrequency::Monthly),
        just(KW_RRULE_FREQ_YEARLY).to(RecurrenceFrequency::Yearly),
    ))
}

/// ```txt
/// enddate     = date / date-time
/// ```
fn enddate<'src, I, E>() -> impl Parser<'src, I, DateOrDateTime, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    choice((
        value_date_time().map(DateOrDateTime::DateTime),
        value_date().map(DateOrDateTime::Date),
    ))
}

/// ```txt
/// seconds     = 1DIGIT / 2DIGIT       ;0 to 59
/// ```
fn seconds<'src, I, E>() -> impl Parser<'src, I, u8, E> + Clone
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    choice((
        u8_0_5().then(u8_0_9()).map(|(a, b)| a * 10 + b), // 00-59
        just("60").to(60),                                // leap second
        u8_0_9(),                                         // 0-9
    ))
}

/// ```txt
/// minutes     = 1DIGIT / 2DIGIT       ;0 to 59
/// ```
fn minutes<'src, I, E>() -> impl Parser<'src, I, u8, E> + Clone
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    choice((
        u8_0_5().then(u8_0_9()).map(|(a, b)| a * 10 + b), // 00-59
        u8_0_9(),                                         // 0-9
    ))
}

/// ```txt
/// hour        = 1DIGIT / 2DIGIT       ;0 to 23
/// ```
fn hour<'src, I, E>() -> impl Parser<'src, I, u8, E> + Clone
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    choice((
        u8_0_1().then(u8_0_9()).map(|(a, b)| a * 10 + b), // 00-19
        just('2').ignore_then(u8_0_3()).map(|b| 20 + b),  // 20-23
        u8_0_9(),                                         // 0-9
    ))
}

/// ```txt
/// weekdaynum  = [([plus] ordwk / minus ordwk)] weekday
/// ```
fn weekdaynum<'src, I, E>() -> impl Parser<'src, I, WeekDayNum, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    signed(ordwk())
        .or_not()
        .then(weekday())
        .map(|(occurrence, day)| WeekDayNum { day, occurrence })
}

/// ```txt
/// weekday     = "SU" / "MO" / "TU" / "WE" / "TH" / "FR" / "SA"
/// ```
fn weekday<'src, I, E>() -> impl Parser<'src, I, WeekDay, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    choice((
        just(KW_DAY_SU).to(WeekDay::Sunday),
        just(KW_DAY_MO).to(WeekDay::Monday),
        just(KW_DAY_TU).to(WeekDay::Tuesday),
        just(KW_DAY_WE).to(WeekDay::Wednesday),
        just(KW_DAY_TH).to(WeekDay::Thursday),
        just(KW_DAY_FR).to(WeekDay::Friday),
        just(KW_DAY_SA).to(WeekDay::Saturday),
    ))
}

/// ```txt
/// ordwk       = 1DIGIT / 2DIGIT       ;1 to 53
/// ```
fn ordwk<'src, I, E>() -> impl Parser<'src, I, i8, E> + Clone
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    choice((
        i8_1_4().then(i8_0_9()).map(|(a, b)| a * 10 + b), // 10-49
        just('5').ignore_then(i8_0_3()).map(|a| 50 + a),  // 50-53
        just('0').ignore_then(i8_1_9()),                  // 01-09
        i8_1_9(),                                         // 1-9
    ))
}

/// ```txt
/// ordmoday    = 1DIGIT / 2DIGIT       ;1 to 31
/// ```
fn ordmoday<'src, I, E>() -> impl Parser<'src, I, i8, E> + Clone
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    choice((
        i8_1_2().then(i8_0_9()).map(|(a, b)| a * 10 + b), // 10-29
        just('3').ignore_then(i8_0_1()).map(|a| 30 + a),  // 30-31
        just('0').or_not().ignore_then(i8_1_9()),         // 1-9 / 01-09
    ))
}

/// ```txt
/// ordyrday    = 1DIGIT / 2DIGIT / 3DIGIT      ;1 to 366
/// ```
fn ordyrday<'src, I, E>() -> impl Parser<'src, I, i16, E> + Clone
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    let one_or_two = i16_1_9().then(i16_0_9().or_not()).map(|(a, b)| match b {
        Some(b) => a * 10 + b, // 10-99
        None => a,             // 1-9
    });

    choice((
        just('3').ignore_then(choice((
            just('6').ignore_then(i16_0_6()).map(|a| 360 + a), // 360-366
            i16_0_5().then(i16_0_9()).map(|(a, b)| 300 + a * 10 + b), // 300-359
        ))),
        i16_1_2()
            .then(i16_0_9())
            .then(i16_0_9())
            .map(|((a, b), c)| a * 100 + b * 10 + c), // 100-299
        just('0').or_not().ignore_then(choice((
            just('0').ignore_then(i16_0_9()), // 001-009
            one_or_two,                       // 1-99 / 01-99
        ))),
    ))
}

/// ```txt
/// monthnum    = 1DIGIT / 2DIGIT       ;1 to 12
/// ```
fn monthnum<'src, I, E>() -> impl Parser<'src, I, u8, E> + Clone
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    choice((
        just('0').ignore_then(u8_1_9()),                  // 01-09
        just('1').ignore_then(u8_0_2()).map(|a| 10 + a), // 10-12
        u8_1_9(),                                         // 1-9
    ))
}

/// `[plus / minus] n` where a minus negates `n`.
fn signed<'src, I, E, T>(
    magnitude: impl Parser<'src, I, T, E> + Clone,
) -> impl Parser<'src, I, T, E> + Clone
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    T: std::ops::Neg<Output = T>,
{
    select! { c @ ('+' | '-') => c }
        .or_not()
        .then(magnitude)
        .map(|(sign, n)| if matches!(sign, Some('-')) { -n } else { n })
}

fn signed_list<'src, I, E, T>(
    magnitude: impl Parser<'src, I, T, E> + Clone,
) -> impl Parser<'src, I, Vec<T>, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    T: std::ops::Neg<Output = T>,
{
    signed(magnitude)
        .separated_by(just(','))
        .at_least(1)
        .collect()
}

/// Positive u32 (1 or more digits)
fn u32_non_zero<'src, I, E>() -> impl Parser<'src, I, u32, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    select! { c @ '0'..='9' => c }
        .repeated()
        .at_least(1)
        .at_most(10) // u32 max is 10 digits
        .collect::<String>()
        .try_map(|str, span| match lexical::parse::<u32, _>(&str) {
            Ok(0) => Err(E::Error::expected_found(
                [ValueExpected::PositiveU32],
                None,
                span,
            )),
            Ok(v) => Ok(v),
            Err(_) => Err(E::Error::expected_found([ValueExpected::U32], None, span)),
        })
}
