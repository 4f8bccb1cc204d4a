// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for recurrence expansion.

use std::collections::BTreeSet;

use calforge_ical::ValueRecurrenceRule;
use calforge_ical::recurrence::{expand, expand_set};
use calforge_ical::value::{ValueKind, parse_value};
use jiff::civil::{DateTime, date};

fn rule(src: &str) -> ValueRecurrenceRule {
    parse_value(ValueKind::Recur, src)
        .unwrap()
        .as_recur()
        .cloned()
        .unwrap()
}

fn days(list: &[(i16, i8, i8)]) -> BTreeSet<DateTime> {
    list.iter()
        .map(|&(y, m, d)| date(y, m, d).at(0, 0, 0, 0))
        .collect()
}

#[test]
fn count_bounds_the_walk_regardless_of_window() {
    let seed = date(2024, 1, 1).at(0, 0, 0, 0);
    let got = expand(&rule("FREQ=DAILY;COUNT=3"), seed, seed, None);
    assert_eq!(got, days(&[(2024, 1, 1), (2024, 1, 2), (2024, 1, 3)]));

    let wide = expand(
        &rule("FREQ=DAILY;COUNT=3"),
        seed,
        seed,
        Some(date(2030, 1, 1).at(0, 0, 0, 0)),
    );
    assert_eq!(wide, got);
}

#[test]
fn monthly_second_monday() {
    let seed = date(2024, 1, 1).at(0, 0, 0, 0);
    let got = expand(
        &rule("FREQ=MONTHLY;BYDAY=2MO"),
        seed,
        seed,
        Some(date(2024, 4, 30).at(0, 0, 0, 0)),
    );
    assert_eq!(
        got,
        days(&[(2024, 1, 8), (2024, 2, 12), (2024, 3, 11), (2024, 4, 8)])
    );
}

#[test]
fn biweekly_fridays() {
    let seed = date(2024, 1, 5).at(0, 0, 0, 0);
    let got = expand(
        &rule("FREQ=WEEKLY;INTERVAL=2;BYDAY=FR"),
        seed,
        seed,
        Some(date(2024, 2, 15).at(0, 0, 0, 0)),
    );
    assert_eq!(got, days(&[(2024, 1, 5), (2024, 1, 19), (2024, 2, 2)]));
}

#[test]
fn count_is_consumed_before_the_window() {
    let seed = date(2024, 1, 1).at(9, 30, 0, 0);
    let window_start = date(2024, 1, 4).at(0, 0, 0, 0);
    let got = expand(&rule("FREQ=DAILY;COUNT=5"), seed, window_start, None);

    let expected: BTreeSet<_> = [date(2024, 1, 4), date(2024, 1, 5)]
        .into_iter()
        .map(|d| d.at(9, 30, 0, 0))
        .collect();
    assert_eq!(got, expected);
}

#[test]
fn open_ended_rules_stay_in_bounds() {
    let seed = date(2024, 1, 1).at(8, 0, 0, 0);
    let window_end = date(2024, 1, 31).at(23, 59, 59, 0);
    let got = expand(&rule("FREQ=DAILY"), seed, seed, Some(window_end));
    assert_eq!(got.len(), 31);
    assert!(got.iter().all(|d| *d <= window_end));

    // UNTIL far beyond the window is cut one year past the window end
    let until = expand(&rule("FREQ=DAILY;UNTIL=20991231"), seed, seed, Some(window_end));
    let limit = date(2025, 1, 31).at(23, 59, 59, 0);
    assert!(until.last().is_some_and(|d| *d <= limit));
    assert!(until.len() > 31);
}

#[test]
fn until_date_includes_the_whole_day() {
    let seed = date(2024, 3, 1).at(18, 0, 0, 0);
    let got = expand(&rule("FREQ=WEEKLY;UNTIL=20240315"), seed, seed, None);
    let expected: BTreeSet<_> = [date(2024, 3, 1), date(2024, 3, 8), date(2024, 3, 15)]
        .into_iter()
        .map(|d| d.at(18, 0, 0, 0))
        .collect();
    assert_eq!(got, expected);
}

#[test]
fn last_weekday_of_each_month() {
    let seed = date(2024, 1, 31).at(0, 0, 0, 0);
    let got = expand(
        &rule("FREQ=MONTHLY;BYDAY=MO,TU,WE,TH,FR;BYSETPOS=-1"),
        seed,
        seed,
        Some(date(2024, 3, 31).at(0, 0, 0, 0)),
    );
    assert_eq!(got, days(&[(2024, 1, 31), (2024, 2, 29), (2024, 3, 29)]));
}

#[test]
fn yearly_by_month_and_day() {
    let seed = date(2024, 1, 1).at(0, 0, 0, 0);
    let got = expand(
        &rule("FREQ=YEARLY;BYMONTH=1,7;BYMONTHDAY=1"),
        seed,
        seed,
        Some(date(2025, 12, 31).at(0, 0, 0, 0)),
    );
    assert_eq!(
        got,
        days(&[(2024, 1, 1), (2024, 7, 1), (2025, 1, 1), (2025, 7, 1)])
    );
}

#[test]
fn set_subtracts_exclusions() {
    let seed = date(2024, 1, 1).at(0, 0, 0, 0);
    let rrule = rule("FREQ=DAILY;COUNT=5");
    let exrule = rule("FREQ=DAILY;COUNT=1");
    let got = expand_set(
        [&rrule],
        days(&[(2024, 1, 10), (2026, 6, 1)]),
        [&exrule],
        days(&[(2024, 1, 3)]),
        seed,
        seed,
        Some(date(2024, 12, 31).at(0, 0, 0, 0)),
    );
    assert_eq!(
        got,
        days(&[(2024, 1, 2), (2024, 1, 4), (2024, 1, 5), (2024, 1, 10)])
    );
}
