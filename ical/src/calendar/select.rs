// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Date-range selection over the components of a calendar.
//!
//! Every selected occurrence of a recurring component is a copy of the
//! component carrying `X-CURRENT-DTSTART` and, when the component has an end,
//! `X-CURRENT-DTEND` or `X-CURRENT-DUE`, so callers see the occurrence dates
//! rather than the recurrence seed.

use std::collections::{BTreeMap, BTreeSet};

use jiff::SignedDuration;
use jiff::civil::{self, DateTime};

use crate::calendar::Calendar;
use crate::component::{Component, ComponentKind};
use crate::formatter::format_value;
use crate::keyword::{KW_X_CURRENT_DTEND, KW_X_CURRENT_DTSTART, KW_X_CURRENT_DUE};
use crate::parameter::Parameters;
use crate::property::PropertyName;
use crate::recurrence::expand;
use crate::value::{DateOrDateTime, Value, ValueDate, Zone};

/// Kinds a selection may return.
const SELECTABLE: [ComponentKind; 4] = [
    ComponentKind::VEvent,
    ComponentKind::VTodo,
    ComponentKind::VJournal,
    ComponentKind::VFreeBusy,
];

/// Parameters of [`Calendar::select_components`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectQuery {
    /// First day of the window
    pub start: ValueDate,
    /// Last day of the window, inclusive
    pub end: ValueDate,
    /// Kinds to select. Empty selects every selectable kind.
    pub kinds: Vec<ComponentKind>,
    /// Return one flat list instead of day buckets
    pub flat: bool,
    /// Select components overlapping the window, recurrences included,
    /// instead of only those starting inside it
    pub any: bool,
    /// Repeat a component spanning several days in every day it touches
    pub split: bool,
}

impl SelectQuery {
    /// A one-day window on `start`.
    #[must_use]
    pub fn new(start: ValueDate) -> Self {
        Self {
            start,
            end: start,
            kinds: Vec::new(),
            flat: false,
            any: true,
            split: true,
        }
    }

    /// Set the last day of the window.
    #[must_use]
    pub fn end(mut self, end: ValueDate) -> Self {
        self.end = end;
        self
    }

    /// Restrict the kinds. Unselectable kinds are taken as VEVENT.
    #[must_use]
    pub fn kinds(mut self, kinds: impl IntoIterator<Item = ComponentKind>) -> Self {
        self.kinds = kinds.into_iter().collect();
        self
    }

    /// Return a flat list.
    #[must_use]
    pub fn flat(mut self, flat: bool) -> Self {
        self.flat = flat;
        self
    }

    /// Select overlapping components (`true`) or only those starting inside
    /// the window (`false`).
    #[must_use]
    pub fn any(mut self, any: bool) -> Self {
        self.any = any;
        self
    }

    /// Repeat multi-day components per day.
    #[must_use]
    pub fn split(mut self, split: bool) -> Self {
        self.split = split;
        self
    }

    fn selected_kinds(&self) -> Vec<ComponentKind> {
        let mut kinds = Vec::with_capacity(SELECTABLE.len());
        for &kind in &self.kinds {
            let kind = match SELECTABLE.contains(&kind) {
                true => kind,
                false => ComponentKind::VEvent,
            };
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        if kinds.is_empty() {
            kinds = SELECTABLE.to_vec();
        }
        kinds
    }
}

/// Result of [`Calendar::select_components`].
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// The calendar holds no components
    NotApplicable,
    /// Nothing falls in the window
    NoMatches,
    /// Every selected component, in calendar order
    Flat(Vec<Component>),
    /// Selected components bucketed by day, in ascending date order
    Days(BTreeMap<ValueDate, Vec<Component>>),
}

impl Selection {
    /// Number of selected entries, counting every day bucket entry.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::NotApplicable | Self::NoMatches => 0,
            Self::Flat(list) => list.len(),
            Self::Days(days) => days.values().map(Vec::len).sum(),
        }
    }

    /// Whether nothing was selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Calendar {
    /// Select the components and occurrences falling in a date window.
    #[tracing::instrument(
        skip_all,
        fields(start = ?query.start, end = ?query.end, kinds = ?query.kinds)
    )]
    #[must_use]
    pub fn select_components(&self, query: &SelectQuery) -> Selection {
        if self.is_empty() {
            return Selection::NotApplicable;
        }

        let window = Window {
            start: query.start.civil_date().to_datetime(civil::Time::midnight()),
            end: end_of_day(query.end.civil_date()),
        };
        let kinds = query.selected_kinds();

        let mut out = Collector::new(query.flat);
        for component in self.stored() {
            if !kinds.contains(&component.kind()) {
                continue;
            }
            let Some(timing) = Timing::of(component) else {
                continue;
            };
            select_one(component, &timing, window, query, &mut out);
        }

        tracing::debug!(selected = out.len(), "selected components");
        out.finish()
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    start: DateTime,
    end: DateTime,
}

fn end_of_day(date: civil::Date) -> DateTime {
    date.to_datetime(civil::time(23, 59, 59, 0))
}

/// Which property the component's end came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EndSource {
    DtEnd,
    Due,
    Derived,
}

/// Start, end and duration of one component.
#[derive(Debug)]
struct Timing {
    start: DateOrDateTime,
    start_dt: DateTime,
    /// Stored end value when it came from DTEND or DUE
    end_value: Option<DateOrDateTime>,
    end_source: EndSource,
    end_dt: DateTime,
    duration: SignedDuration,
}

impl Timing {
    fn of(component: &Component) -> Option<Self> {
        let start = component.dtstart()?;
        let start_dt = start.civil_date_time();

        let (end_value, end_source) = match component.dtend() {
            Some(end) => (Some(end), EndSource::DtEnd),
            None if component.kind() == ComponentKind::VTodo => match component.due() {
                Some(due) => (Some(due), EndSource::Due),
                None => (None, EndSource::Derived),
            },
            None => (None, EndSource::Derived),
        };

        let end_dt = match end_value {
            // an all-day end is exclusive: the component ends the day before
            Some(DateOrDateTime::Date(date)) => {
                let day = date.civil_date();
                end_of_day(day.yesterday().unwrap_or(day))
            }
            Some(end) => end.civil_date_time(),
            None => component
                .end_from_duration()
                .unwrap_or_else(|| end_of_day(start_dt.date())),
        };
        let end_dt = if end_dt < start_dt {
            end_of_day(start_dt.date())
        } else {
            end_dt
        };

        Some(Self {
            start,
            start_dt,
            end_value,
            end_source,
            end_dt,
            duration: end_dt.duration_since(start_dt),
        })
    }

    fn all_day_end(&self) -> bool {
        self.end_value.is_some_and(|end| end.is_date())
    }
}

fn shift(dt: DateTime, by: SignedDuration) -> DateTime {
    dt.checked_add(by).unwrap_or(if by.is_negative() {
        DateTime::MIN
    } else {
        DateTime::MAX
    })
}

fn select_one(
    component: &Component,
    timing: &Timing,
    window: Window,
    query: &SelectQuery,
    out: &mut Collector,
) {
    let work_start = shift(window.start, -timing.duration);
    let work_end = shift(window.end, timing.duration);

    let mut excluded: BTreeSet<DateTime> = component
        .exrules()
        .flat_map(|rule| expand(rule, timing.start_dt, work_start, Some(work_end)))
        .collect();
    excluded.extend(
        component
            .exdates()
            .map(|d| d.civil_date_time())
            .filter(|d| (work_start..=window.end).contains(d)),
    );

    if query.any {
        for (occurrence, duration) in occurrences(component, timing, work_start, work_end) {
            if occurrence < work_start || occurrence > window.end {
                continue;
            }
            if excluded.contains(&occurrence) || occurrence <= timing.start_dt {
                continue;
            }
            let occurrence_end = shift(occurrence, duration);
            let copy = with_current_dates(component, timing, occurrence, occurrence_end);
            out.add(copy, query, window, occurrence, occurrence_end, &excluded);
        }

        let overlaps = timing.end_dt >= window.start && timing.start_dt <= window.end;
        if !overlaps {
            return;
        }
    } else if timing.start_dt < window.start || timing.start_dt > window.end {
        return;
    }

    out.add(
        component.clone(),
        query,
        window,
        timing.start_dt,
        timing.end_dt,
        &excluded,
    );
}

/// Recurrence instants from RRULE and RDATE, each with its duration.
fn occurrences(
    component: &Component,
    timing: &Timing,
    work_start: DateTime,
    work_end: DateTime,
) -> BTreeMap<DateTime, SignedDuration> {
    let mut found: BTreeMap<DateTime, SignedDuration> = component
        .rrules()
        .flat_map(|rule| expand(rule, timing.start_dt, work_start, Some(work_end)))
        .map(|dt| (dt, timing.duration))
        .collect();

    for rdate in component.rdates() {
        match rdate {
            Value::Period(period) => {
                let start = period.start().civil_date_time();
                let end = period.civil_end();
                found.insert(start, end.duration_since(start));
            }
            other => {
                if let Some(date) = other.as_date_or_date_time() {
                    found.insert(date.civil_date_time(), timing.duration);
                }
            }
        }
    }
    found
}

/// A copy of `component` carrying the dates of one occurrence.
fn with_current_dates(
    component: &Component,
    timing: &Timing,
    start: DateTime,
    end: DateTime,
) -> Component {
    let mut copy = component.clone();
    let start_text = current_text(start, timing.start.is_date(), timing.start.zone());
    set_current(&mut copy, KW_X_CURRENT_DTSTART, start_text);

    let name = match timing.end_source {
        EndSource::DtEnd => KW_X_CURRENT_DTEND,
        EndSource::Due => KW_X_CURRENT_DUE,
        EndSource::Derived => return copy,
    };
    let end_text = if timing.all_day_end() {
        let day = end.date();
        current_text(end_of_day(day.tomorrow().unwrap_or(day)), true, None)
    } else {
        let zone = timing.end_value.and_then(|end| end.zone());
        current_text(end, false, zone)
    };
    set_current(&mut copy, name, end_text);
    copy
}

fn set_current(component: &mut Component, name: &str, text: String) {
    let Some(name) = PropertyName::extension(name) else {
        return;
    };
    if let Err(error) = component.set_property(name, vec![Value::Text(text)], Parameters::new()) {
        tracing::warn!(%error, "cannot set occurrence date");
    }
}

/// `YYYY-MM-DD`, or `YYYY-MM-DD HH:MM:SS` with ` Z` or ` ±HHMM` when zoned.
fn current_text(dt: DateTime, date_only: bool, zone: Option<Zone>) -> String {
    if date_only {
        return dt.date().strftime("%Y-%m-%d").to_string();
    }
    let text = dt.strftime("%Y-%m-%d %H:%M:%S").to_string();
    match zone {
        None => text,
        Some(Zone::Utc) => format!("{text} Z"),
        Some(Zone::Offset(offset)) => format!("{text} {}", format_value(&Value::UtcOffset(offset))),
    }
}

/// Accumulates the selection in the requested shape.
#[derive(Debug)]
enum Collector {
    Flat(Vec<Component>),
    Days(BTreeMap<ValueDate, Vec<Component>>),
}

impl Collector {
    fn new(flat: bool) -> Self {
        match flat {
            true => Self::Flat(Vec::new()),
            false => Self::Days(BTreeMap::new()),
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::Flat(list) => list.len(),
            Self::Days(days) => days.values().map(Vec::len).sum(),
        }
    }

    fn add(
        &mut self,
        component: Component,
        query: &SelectQuery,
        window: Window,
        start: DateTime,
        end: DateTime,
        excluded: &BTreeSet<DateTime>,
    ) {
        let days = match self {
            Self::Flat(list) => {
                list.push(component);
                return;
            }
            Self::Days(days) => days,
        };

        if !query.split {
            if start >= window.start && !excluded.contains(&start) {
                days.entry(ValueDate::from_civil(start.date()))
                    .or_default()
                    .push(component);
            }
            return;
        }

        // one entry per touched day inside the window
        let first = start.max(window.start).date();
        let last = end.min(window.end).date();
        for day in first.series(jiff::Span::new().days(1)).take_while(|d| *d <= last) {
            let at = day.to_datetime(start.time());
            if excluded.contains(&at) {
                continue;
            }
            days.entry(ValueDate::from_civil(day))
                .or_default()
                .push(component.clone());
        }
    }

    fn finish(self) -> Selection {
        if self.len() == 0 {
            return Selection::NoMatches;
        }
        match self {
            Self::Flat(list) => Selection::Flat(list),
            Self::Days(days) => Selection::Days(days),
        }
    }
}
