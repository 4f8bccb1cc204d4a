// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;
use std::fmt::Write as _;
use std::path::PathBuf;

use calforge_ical::{
    CalendarConfig, Component, ComponentKind, PropertyName, SelectQuery, Selection, ValueDate,
};
use clap::{ArgMatches, Command, arg};
use colored::Colorize;

use crate::arg::{CommonArgs, WindowArgs};
use crate::util::{load_calendar, write_stdout};

const X_CURRENT_DTSTART: &str = "X-CURRENT-DTSTART";

/// List the components and occurrences in a date window.
#[derive(Debug, Clone)]
pub struct CmdSelect {
    pub file: Option<PathBuf>,
    pub start: ValueDate,
    pub end: Option<ValueDate>,
    pub kinds: Vec<ComponentKind>,
    pub flat: bool,
    pub starts_only: bool,
    pub no_split: bool,
}

impl CmdSelect {
    pub const NAME: &str = "select";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .alias("ls")
            .about("List components and occurrences in a date window")
            .arg(CommonArgs::file())
            .arg(WindowArgs::start())
            .arg(WindowArgs::end())
            .arg(WindowArgs::kind())
            .arg(arg!(--flat "Print one flat list instead of day buckets"))
            .arg(arg!(--"starts-only" "Only components starting inside the window"))
            .arg(arg!(--"no-split" "Show a multi-day component on its first day only"))
    }

    pub fn from(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            file: CommonArgs::get_file(matches),
            start: WindowArgs::get_start(matches).ok_or("start date is required")?,
            end: WindowArgs::get_end(matches),
            kinds: WindowArgs::get_kinds(matches),
            flat: matches.get_flag("flat"),
            starts_only: matches.get_flag("starts-only"),
            no_split: matches.get_flag("no-split"),
        })
    }

    pub fn query(&self) -> SelectQuery {
        SelectQuery::new(self.start)
            .end(self.end.unwrap_or(self.start))
            .kinds(self.kinds.iter().copied())
            .flat(self.flat)
            .any(!self.starts_only)
            .split(!self.no_split)
    }

    pub fn run(self, config: CalendarConfig) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "selecting components...");
        let calendar = load_calendar(self.file.as_deref(), config)?;
        let selection = calendar.select_components(&self.query());
        write_stdout(&render(&selection))
    }
}

fn render(selection: &Selection) -> String {
    let mut out = String::new();
    match selection {
        Selection::NotApplicable => out.push_str("calendar is empty\n"),
        Selection::NoMatches => out.push_str("no matches\n"),
        Selection::Flat(list) => {
            for component in list {
                let _ = writeln!(out, "{}", line(component));
            }
        }
        Selection::Days(days) => {
            for (day, list) in days {
                let header = format!("{:04}-{:02}-{:02}", day.year, day.month, day.day);
                let _ = writeln!(out, "{}", header.bold());
                for component in list {
                    let _ = writeln!(out, "  {}", line(component));
                }
            }
        }
    }
    out
}

fn line(component: &Component) -> String {
    let mut line = format!(
        "{:<9} {}",
        component.kind().to_string(),
        component.summary().unwrap_or("(no summary)")
    );
    if let Some(uid) = component.uid() {
        let _ = write!(line, "  {}", uid.dimmed());
    }
    let current = PropertyName::extension(X_CURRENT_DTSTART).and_then(|name| {
        let value = component.get_property(&name, None)?.value()?;
        value.as_text().map(str::to_owned)
    });
    if let Some(current) = current {
        let _ = write!(line, "  @ {}", current.cyan());
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use calforge_ical::parse_str;

    fn parse(args: &[&str]) -> CmdSelect {
        let matches = CmdSelect::command().try_get_matches_from(args).unwrap();
        CmdSelect::from(&matches).unwrap()
    }

    #[test]
    fn test_query_from_args() {
        let cmd = parse(&[
            "select", "cal.ics", "--start", "2024-01-01", "--end", "2024-01-31", "-t", "vtodo",
            "-t", "vjournal", "--flat", "--starts-only",
        ]);
        assert_eq!(cmd.file, Some(PathBuf::from("cal.ics")));

        let query = cmd.query();
        assert_eq!(query.start, ValueDate::new(2024, 1, 1).unwrap());
        assert_eq!(query.end, ValueDate::new(2024, 1, 31).unwrap());
        assert_eq!(query.kinds, [ComponentKind::VTodo, ComponentKind::VJournal]);
        assert!(query.flat);
        assert!(!query.any);
        assert!(query.split);
    }

    #[test]
    fn test_end_defaults_to_start() {
        let query = parse(&["select", "-s", "20240105"]).query();
        assert_eq!(query.end, query.start);
        assert!(query.kinds.is_empty());
    }

    #[test]
    fn test_start_is_required() {
        let result = CmdSelect::command().try_get_matches_from(["select", "cal.ics"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_render() {
        colored::control::set_override(false);
        assert_eq!(render(&Selection::NotApplicable), "calendar is empty\n");
        assert_eq!(render(&Selection::NoMatches), "no matches\n");

        let src = "BEGIN:VCALENDAR\n\
BEGIN:VEVENT\n\
UID:weekly@example.com\n\
DTSTART:20240101T090000\n\
DTEND:20240101T100000\n\
RRULE:FREQ=WEEKLY;COUNT=2\n\
SUMMARY:Review\n\
END:VEVENT\n\
END:VCALENDAR";
        let calendar = parse_str(src, CalendarConfig::default()).unwrap();
        let query = SelectQuery::new(ValueDate::new(2024, 1, 1).unwrap())
            .end(ValueDate::new(2024, 1, 10).unwrap());
        let text = render(&calendar.select_components(&query));
        assert_eq!(
            text,
            "2024-01-01\n  VEVENT    Review  weekly@example.com\n\
2024-01-08\n  VEVENT    Review  weekly@example.com  @ 2024-01-08 09:00:00\n"
        );
    }
}
