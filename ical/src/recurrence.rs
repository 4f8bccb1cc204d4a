// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Recurrence rule expansion.
//!
//! A rule is expanded by walking forward from the seed (the component's
//! DTSTART) one step at a time and keeping the dates that pass every BY
//! filter. The walk is always bounded: by UNTIL, by the window end when the
//! rule has neither COUNT nor UNTIL, and in any case by an emergency break
//! one year past the window end.
//!
//! The seed takes the first COUNT slot, and dates before the window start
//! consume COUNT even though they are not returned.

use std::collections::BTreeSet;

use jiff::ToSpan;
use jiff::civil::{self, Date, DateTime, Weekday};

use crate::value::{DateOrDateTime, RecurrenceFrequency, ValueRecurrenceRule, WeekDay};

/// Upper bound on walk steps, whatever the window.
const MAX_STEPS: usize = 1_000_000;

/// Expand a recurrence rule into the occurrences at or after `window_start`.
///
/// `window_end` defaults to one year after `window_start`. The result never
/// reaches past one year after the window end.
///
/// # Examples
///
/// ```
/// use calforge_ical::recurrence::expand;
/// use calforge_ical::value::{ValueKind, parse_value};
/// use jiff::civil::date;
///
/// let rule = parse_value(ValueKind::Recur, "FREQ=DAILY;COUNT=3").unwrap();
/// let seed = date(2024, 1, 1).at(9, 0, 0, 0);
/// let dates = expand(rule.as_recur().unwrap(), seed, seed, None);
/// assert_eq!(dates.len(), 3);
/// ```
#[must_use]
pub fn expand(
    rule: &ValueRecurrenceRule,
    seed: DateTime,
    window_start: DateTime,
    window_end: Option<DateTime>,
) -> BTreeSet<DateTime> {
    let window_end = window_end.unwrap_or_else(|| one_year_after(window_start));
    Walk::new(rule, seed, window_start, window_end).run()
}

/// Expand the inclusion set (RRULE and RDATE) and subtract the exclusion set
/// (EXRULE and EXDATE).
///
/// RDATE and EXDATE entries are taken as they are; only RDATE entries inside
/// the window are kept.
#[must_use]
pub fn expand_set<'a>(
    rrules: impl IntoIterator<Item = &'a ValueRecurrenceRule>,
    rdates: impl IntoIterator<Item = DateTime>,
    exrules: impl IntoIterator<Item = &'a ValueRecurrenceRule>,
    exdates: impl IntoIterator<Item = DateTime>,
    seed: DateTime,
    window_start: DateTime,
    window_end: Option<DateTime>,
) -> BTreeSet<DateTime> {
    let window_end = window_end.unwrap_or_else(|| one_year_after(window_start));

    let mut included: BTreeSet<DateTime> = rrules
        .into_iter()
        .flat_map(|rule| expand(rule, seed, window_start, Some(window_end)))
        .collect();
    included.extend(
        rdates
            .into_iter()
            .filter(|d| (window_start..=window_end).contains(d)),
    );

    let mut excluded: BTreeSet<DateTime> = exrules
        .into_iter()
        .flat_map(|rule| expand(rule, seed, window_start, Some(window_end)))
        .collect();
    excluded.extend(exdates);

    included.retain(|d| !excluded.contains(d));
    included
}

fn one_year_after(dt: DateTime) -> DateTime {
    dt.checked_add(1.year()).unwrap_or(DateTime::MAX)
}

/// How the walk advances from one candidate to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Days(i64),
    Months(i32),
    Years(i32),
}

impl Step {
    fn for_rule(rule: &ValueRecurrenceRule) -> Self {
        if !rule.by_year_day.is_empty() || !rule.by_month_day.is_empty() || !rule.by_day.is_empty()
        {
            return Self::Days(1);
        }
        match rule.freq {
            RecurrenceFrequency::Yearly if !rule.by_month.is_empty() => Self::Months(1),
            RecurrenceFrequency::Yearly => Self::Years(1),
            RecurrenceFrequency::Monthly => Self::Months(1),
            RecurrenceFrequency::Weekly => Self::Days(7),
            _ => Self::Days(1),
        }
    }

    /// The `k`-th candidate after `seed`. Month and year steps keep the
    /// seed's day of month and yield `None` where that day does not exist.
    fn nth(self, seed: DateTime, k: i64) -> Option<DateTime> {
        match self {
            Self::Days(n) => {
                let span = jiff::Span::new().try_days(k.checked_mul(n)?).ok()?;
                seed.checked_add(span).ok()
            }
            Self::Months(n) => {
                let k = i32::try_from(k).ok()?.checked_mul(n)?;
                let months = i32::from(seed.year()) * 12 + i32::from(seed.month()) - 1 + k;
                let year = i16::try_from(months.div_euclid(12)).ok()?;
                let month = i8::try_from(months.rem_euclid(12) + 1).ok()?;
                let date = Date::new(year, month, seed.day()).ok()?;
                Some(date.to_datetime(seed.time()))
            }
            Self::Years(n) => {
                let k = i32::try_from(k).ok()?.checked_mul(n)?;
                let year = i16::try_from(i32::from(seed.year()) + k).ok()?;
                let date = Date::new(year, seed.month(), seed.day()).ok()?;
                Some(date.to_datetime(seed.time()))
            }
        }
    }
}

/// Ordinal counters of one day, forward (1-based) and backward (-1 is last).
#[derive(Debug, Clone, Copy, Default)]
struct DayCounters {
    year_day_up: i16,
    year_day_down: i16,
    month_day_down: i8,
    month_weekday_up: i8,
    month_weekday_down: i8,
    year_weekday_up: i8,
    year_weekday_down: i8,
    week_no_up: i8,
    week_no_down: i8,
}

/// Counters for every day of one year, rebuilt when the walk enters a new
/// year.
#[derive(Debug)]
struct YearCounters {
    year: i16,
    days: Vec<DayCounters>,
}

impl YearCounters {
    fn new(date: Date, wkst: Weekday) -> Self {
        let first = date.first_of_year();
        let len = usize::try_from(first.days_in_year()).unwrap_or(366);
        let dates: Vec<Date> = first.series(1.day()).take(len).collect();
        let mut days = vec![DayCounters::default(); dates.len()];

        let mut month = 0;
        let mut in_month = [0_i8; 7];
        let mut in_year = [0_i8; 7];
        for (i, (d, c)) in dates.iter().zip(days.iter_mut()).enumerate() {
            if d.month() != month {
                month = d.month();
                in_month = [0; 7];
            }
            let wd = weekday_index(d.weekday());
            c.year_day_up = i16::try_from(i + 1).unwrap_or(i16::MAX);
            c.month_weekday_up = bump(&mut in_month, wd, 1);
            c.year_weekday_up = bump(&mut in_year, wd, 1);
            c.week_no_up = week_no(*d, wkst);
        }

        let last_week = dates
            .iter()
            .rev()
            .take(7)
            .map(|d| week_no(*d, wkst))
            .max()
            .unwrap_or(52);

        let mut month = 0;
        let mut year_day = 0_i16;
        let mut month_day = 0_i8;
        let mut in_month = [0_i8; 7];
        let mut in_year = [0_i8; 7];
        for (d, c) in dates.iter().zip(days.iter_mut()).rev() {
            if d.month() != month {
                month = d.month();
                month_day = 0;
                in_month = [0; 7];
            }
            let wd = weekday_index(d.weekday());
            year_day -= 1;
            month_day -= 1;
            c.year_day_down = year_day;
            c.month_day_down = month_day;
            c.month_weekday_down = bump(&mut in_month, wd, -1);
            c.year_weekday_down = bump(&mut in_year, wd, -1);
            c.week_no_down = c.week_no_up - last_week - 1;
        }

        Self {
            year: first.year(),
            days,
        }
    }

    fn get(&self, date: Date) -> Option<&DayCounters> {
        let i = usize::try_from(date.day_of_year() - 1).ok()?;
        self.days.get(i)
    }
}

fn weekday_index(day: Weekday) -> usize {
    usize::try_from(day.to_sunday_zero_offset()).unwrap_or(0)
}

fn bump(counts: &mut [i8; 7], i: usize, delta: i8) -> i8 {
    match counts.get_mut(i) {
        Some(n) => {
            *n += delta;
            *n
        }
        None => 0,
    }
}

/// ISO week number. A week starting on Sunday shifts the count by one day.
fn week_no(date: Date, wkst: Weekday) -> i8 {
    let date = match wkst {
        Weekday::Sunday => date.tomorrow().unwrap_or(date),
        _ => date,
    };
    date.iso_week_date().week()
}

const EPOCH: Date = civil::date(1970, 1, 1);

fn day_number(date: Date) -> i64 {
    date.since(EPOCH).map_or(0, |span| i64::from(span.get_days()))
}

/// Index of the FREQ period a date falls in, counted from a fixed origin so
/// that INTERVAL can be checked by difference.
fn period_index(freq: RecurrenceFrequency, date: Date, wkst: Weekday) -> i64 {
    match freq {
        RecurrenceFrequency::Yearly => i64::from(date.year()),
        RecurrenceFrequency::Monthly => i64::from(date.year()) * 12 + i64::from(date.month()),
        RecurrenceFrequency::Weekly => {
            let into_week = i64::from(date.weekday().since(wkst));
            (day_number(date) - into_week).div_euclid(7)
        }
        _ => day_number(date),
    }
}

/// State of one expansion.
struct Walk<'a> {
    rule: &'a ValueRecurrenceRule,
    seed: DateTime,
    window_start: DateTime,
    /// Last instant the walk may produce
    end: DateTime,
    /// Whether `end` is the emergency break rather than UNTIL
    open_ended: bool,
    wkst: Weekday,
    step: Step,
    counters: Option<YearCounters>,
    /// Dates emitted or buffered-and-selected so far, seed included
    count: u32,
    out: BTreeSet<DateTime>,
}

impl<'a> Walk<'a> {
    fn new(
        rule: &'a ValueRecurrenceRule,
        seed: DateTime,
        window_start: DateTime,
        window_end: DateTime,
    ) -> Self {
        let emergency = one_year_after(window_end);
        let until = match (&rule.until, rule.count) {
            (Some(until), _) => Some(until_bound(until)),
            (None, None) => Some(window_end),
            (None, Some(_)) => None,
        };
        let (end, open_ended) = match until {
            Some(until) if until <= emergency => (until, false),
            _ => (emergency, true),
        };

        Self {
            rule,
            seed,
            window_start,
            end,
            open_ended,
            wkst: rule.wkst.unwrap_or(WeekDay::Monday).into(),
            step: Step::for_rule(rule),
            counters: None,
            count: 0,
            out: BTreeSet::new(),
        }
    }

    fn run(mut self) -> BTreeSet<DateTime> {
        if self.seed > self.end {
            return self.out;
        }

        let by_set_pos = !self.rule.by_set_pos.is_empty();
        let mut set_buffer: Vec<DateTime> = Vec::new();
        if self.accepts(self.seed.date()) {
            if by_set_pos {
                set_buffer.push(self.seed);
            } else {
                self.emit(self.seed);
            }
        }
        if !by_set_pos {
            self.count = 1;
        }

        let interval = i64::from(self.rule.interval());
        let seed_period = self.period(self.seed.date());
        let end_period = self.period(self.end.date());
        let mut set_period = seed_period;

        let mut truncated = false;
        let mut k: i64 = 0;
        for _ in 0..MAX_STEPS {
            if self.exhausted() {
                break;
            }
            k += 1;
            let Some(current) = self.step.nth(self.seed, k) else {
                if matches!(self.step, Step::Days(_)) {
                    break; // out of the representable range
                }
                continue;
            };

            let period = self.period(current.date());
            if current > self.end && (!by_set_pos || period != end_period) {
                truncated = self.open_ended;
                break;
            }

            if by_set_pos && period != set_period {
                self.flush_set_positions(&mut set_buffer);
                set_period = period;
            }

            if (period - seed_period) % interval != 0 {
                continue;
            }

            if !self.accepts(current.date()) {
                continue;
            }
            tracing::trace!(%current, "recurrence candidate accepted");

            if by_set_pos {
                set_buffer.push(current);
            } else {
                self.count += 1;
                self.emit(current);
            }
        }
        if by_set_pos {
            self.flush_set_positions(&mut set_buffer);
        }

        if truncated {
            tracing::warn!(
                end = %self.end,
                emitted = self.out.len(),
                "recurrence truncated by the emergency break"
            );
        }
        self.out
    }

    fn period(&self, date: Date) -> i64 {
        period_index(self.rule.freq, date, self.wkst)
    }

    fn exhausted(&self) -> bool {
        self.rule.count.is_some_and(|limit| self.count >= limit)
    }

    fn emit(&mut self, dt: DateTime) {
        if dt >= self.window_start && dt <= self.end {
            self.out.insert(dt);
        }
    }

    /// Select the buffered dates at the BYSETPOS positions.
    fn flush_set_positions(&mut self, buffer: &mut Vec<DateTime>) {
        if buffer.is_empty() {
            return;
        }
        let len = i64::try_from(buffer.len()).unwrap_or(i64::MAX);
        let mut positions = self.rule.by_set_pos.clone();
        positions.sort_unstable_by_key(|&p| if p > 0 { i64::from(p) } else { len + i64::from(p) + 1 });
        for pos in positions {
            if self.exhausted() {
                break;
            }
            let index = if pos > 0 {
                i64::from(pos) - 1
            } else {
                len + i64::from(pos)
            };
            let Some(&dt) = usize::try_from(index).ok().and_then(|i| buffer.get(i)) else {
                continue;
            };
            self.count += 1;
            self.emit(dt);
        }
        buffer.clear();
    }

    /// Whether `date` passes every BY filter of the rule.
    fn accepts(&mut self, date: Date) -> bool {
        let rule = self.rule;
        if !rule.by_month.is_empty() {
            let month = u8::try_from(date.month()).unwrap_or(0);
            if !rule.by_month.contains(&month) {
                return false;
            }
        }

        let needs_counters = !rule.by_week_no.is_empty()
            || !rule.by_year_day.is_empty()
            || !rule.by_month_day.is_empty()
            || !rule.by_day.is_empty();
        if !needs_counters {
            return true;
        }

        if self.counters.as_ref().is_none_or(|c| c.year != date.year()) {
            self.counters = Some(YearCounters::new(date, self.wkst));
        }
        let Some(c) = self.counters.as_ref().and_then(|c| c.get(date)).copied() else {
            return false;
        };

        if !rule.by_week_no.is_empty()
            && !rule
                .by_week_no
                .iter()
                .any(|&n| n == c.week_no_up || n == c.week_no_down)
        {
            return false;
        }
        if !rule.by_year_day.is_empty()
            && !rule
                .by_year_day
                .iter()
                .any(|&n| n == c.year_day_up || n == c.year_day_down)
        {
            return false;
        }
        if !rule.by_month_day.is_empty()
            && !rule
                .by_month_day
                .iter()
                .any(|&n| n == date.day() || n == c.month_day_down)
        {
            return false;
        }
        if !rule.by_day.is_empty() {
            let weekday = WeekDay::from(date.weekday());
            let in_month =
                rule.freq == RecurrenceFrequency::Monthly || !rule.by_month.is_empty();
            let in_year = rule.freq == RecurrenceFrequency::Yearly;
            let matched = rule.by_day.iter().any(|entry| {
                if entry.day != weekday {
                    return false;
                }
                match entry.occurrence {
                    None => true,
                    Some(n) if in_month => n == c.month_weekday_up || n == c.month_weekday_down,
                    Some(n) if in_year => n == c.year_weekday_up || n == c.year_weekday_down,
                    Some(_) => false,
                }
            });
            if !matched {
                return false;
            }
        }
        true
    }
}

/// Last instant covered by UNTIL. A date covers its whole day.
fn until_bound(until: &DateOrDateTime) -> DateTime {
    match until {
        DateOrDateTime::Date(date) => date.civil_date().to_datetime(civil::time(23, 59, 59, 0)),
        DateOrDateTime::DateTime(dt) => dt.civil_date_time(),
    }
}
