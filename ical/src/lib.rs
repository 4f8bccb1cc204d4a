// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! An RFC 2445 iCalendar engine.
//!
//! Parse iCalendar text into a typed [`Calendar`], edit its components and
//! properties, expand recurrence rules, select occurrences in a date window,
//! and format the result back to folded iCalendar text or xCal.
//!
//! ```
//! use calforge_ical::{CalendarConfig, format, parse_str};
//!
//! let src = "BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nUID:1@example.com\r\nDTSTART:20240105T090000Z\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";
//! let calendar = parse_str(src, CalendarConfig::default()).unwrap();
//! assert_eq!(calendar.len(), 1);
//! assert!(format(&calendar).unwrap().contains("DTSTART:20240105T090000Z\r\n"));
//! ```

#![warn(
    trivial_casts,
    trivial_numeric_casts,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    clippy::dbg_macro,
    clippy::indexing_slicing,
    clippy::pedantic
)]
// Allow certain clippy lints that are too restrictive for this crate
#![allow(
    clippy::option_option,
    clippy::similar_names,
    clippy::single_match_else,
    clippy::match_bool
)]

pub mod calendar;
pub mod component;
pub mod config;
pub mod formatter;
pub mod keyword;
pub mod parameter;
mod parser;
pub mod property;
pub mod recurrence;
pub mod syntax;
pub mod value;

pub use crate::calendar::{Calendar, SelectQuery, Selection};
pub use crate::component::{Component, ComponentError, ComponentKind, ComponentSelector};
pub use crate::config::{CalendarConfig, Newline, OutputFormat};
pub use crate::formatter::{FormatOptions, format, format_component};
pub use crate::parameter::{Parameter, Parameters};
pub use crate::parser::{ParseError, parse, parse_str};
pub use crate::property::{Property, PropertyError, PropertyName};
pub use crate::value::{
    DateInput, DateOrDateTime, RecurrenceFrequency, Value, ValueDate, ValueDateTime,
    ValueDuration, ValueError, ValueKind, ValuePeriod, ValueRecurrenceRule, ValueTime,
    ValueUtcOffset, WeekDay, WeekDayNum, Zone,
};
