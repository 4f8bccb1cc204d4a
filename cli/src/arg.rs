// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use calforge_ical::{ComponentKind, ValueDate, ValueKind, value::parse_value};
use clap::{Arg, ArgMatches, ValueHint, arg, value_parser};

#[derive(Debug, Clone, Copy)]
pub struct CommonArgs;

impl CommonArgs {
    pub fn file() -> Arg {
        arg!([FILE] "iCalendar file to read, stdin when omitted")
            .value_parser(value_parser!(PathBuf))
            .value_hint(ValueHint::FilePath)
    }

    /// The input file as `-f FILE`, for commands with positional arguments.
    pub fn file_flag() -> Arg {
        arg!(-f --file <FILE> "iCalendar file to read, stdin when omitted")
            .id("FILE")
            .required(false)
            .value_parser(value_parser!(PathBuf))
            .value_hint(ValueHint::FilePath)
    }

    pub fn get_file(matches: &ArgMatches) -> Option<PathBuf> {
        matches.get_one::<PathBuf>("FILE").cloned()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WindowArgs;

impl WindowArgs {
    pub fn start() -> Arg {
        arg!(-s --start <DATE> "First day of the window, YYYY-MM-DD")
            .value_parser(parse_date)
    }

    pub fn end() -> Arg {
        arg!(-e --end <DATE> "Last day of the window, defaults to the first day")
            .required(false)
            .value_parser(parse_date)
    }

    pub fn kind() -> Arg {
        arg!(-t --"type" <KIND> "Component kind to select, may be repeated")
            .required(false)
            .action(clap::ArgAction::Append)
            .value_parser(parse_kind)
    }

    pub fn get_start(matches: &ArgMatches) -> Option<ValueDate> {
        matches.get_one::<ValueDate>("start").copied()
    }

    pub fn get_end(matches: &ArgMatches) -> Option<ValueDate> {
        matches.get_one::<ValueDate>("end").copied()
    }

    pub fn get_kinds(matches: &ArgMatches) -> Vec<ComponentKind> {
        matches
            .get_many::<ComponentKind>("type")
            .map(|kinds| kinds.copied().collect())
            .unwrap_or_default()
    }
}

/// Accepts `YYYY-MM-DD` and the basic `YYYYMMDD` form.
fn parse_date(s: &str) -> Result<ValueDate, String> {
    let compact = s.trim().replace('-', "");
    parse_value(ValueKind::Date, &compact)
        .ok()
        .and_then(|v| v.as_date_or_date_time())
        .map(|d| d.date())
        .ok_or_else(|| format!("invalid date '{s}', expected YYYY-MM-DD"))
}

fn parse_kind(s: &str) -> Result<ComponentKind, String> {
    s.parse()
        .map_err(|_| format!("unknown component kind '{s}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        let expected = ValueDate::new(2024, 3, 9).unwrap();
        assert_eq!(parse_date("2024-03-09").unwrap(), expected);
        assert_eq!(parse_date("20240309").unwrap(), expected);
        assert!(parse_date("2024-02-30").is_err());
        assert!(parse_date("tomorrow").is_err());
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!(parse_kind("vtodo").unwrap(), ComponentKind::VTodo);
        assert_eq!(parse_kind("VEVENT").unwrap(), ComponentKind::VEvent);
        assert!(parse_kind("meeting").is_err());
    }
}
