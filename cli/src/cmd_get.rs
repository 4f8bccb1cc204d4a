// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;
use std::path::PathBuf;

use calforge_ical::{CalendarConfig, ComponentSelector, FormatOptions, format_component};
use clap::{ArgMatches, Command, arg, value_parser};

use crate::arg::CommonArgs;
use crate::util::{load_calendar, write_stdout};

/// Print one component.
#[derive(Debug, Clone)]
pub struct CmdGet {
    pub file: Option<PathBuf>,
    pub selector: ComponentSelector,
}

impl CmdGet {
    pub const NAME: &str = "get";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Print one component in iCalendar text")
            .arg(
                arg!(<SELECTOR> "1-based position, component kind or UID")
                    .long_help(
                        "\
All digits select by 1-based position. A component kind such as VTODO selects \
by kind, with ORDINAL choosing among components of that kind. Anything else is \
taken as a UID.",
                    ),
            )
            .arg(
                arg!([ORDINAL] "1-based ordinal among components of the kind")
                    .value_parser(value_parser!(usize)),
            )
            .arg(CommonArgs::file_flag())
    }

    pub fn from(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        let arg = matches
            .get_one::<String>("SELECTOR")
            .ok_or("selector is required")?;
        let ordinal = matches.get_one::<usize>("ORDINAL").copied();
        let selector = ComponentSelector::parse(arg, ordinal)
            .ok_or_else(|| format!("'{arg}' names no component kind"))?;

        Ok(Self {
            file: CommonArgs::get_file(matches),
            selector,
        })
    }

    pub fn run(self, config: CalendarConfig) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "getting component...");
        let calendar = load_calendar(self.file.as_deref(), config)?;
        let component = calendar
            .get_component(&self.selector)
            .ok_or_else(|| format!("no component matches {:?}", self.selector))?;

        let options = FormatOptions::from_config(calendar.config());
        write_stdout(&format_component(&component, options)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calforge_ical::ComponentKind;

    fn parse(args: &[&str]) -> Result<CmdGet, Box<dyn Error>> {
        let matches = CmdGet::command().try_get_matches_from(args)?;
        CmdGet::from(&matches)
    }

    #[test]
    fn test_selector_forms() {
        let cmd = parse(&["get", "3"]).unwrap();
        assert_eq!(cmd.selector, ComponentSelector::Index(3));
        assert_eq!(cmd.file, None);

        let cmd = parse(&["get", "vtodo", "2", "-f", "cal.ics"]).unwrap();
        assert_eq!(cmd.selector, ComponentSelector::Kind(ComponentKind::VTodo, 2));
        assert_eq!(cmd.file, Some(PathBuf::from("cal.ics")));

        let cmd = parse(&["get", "abc@example.com"]).unwrap();
        assert_eq!(
            cmd.selector,
            ComponentSelector::Uid("abc@example.com".to_owned())
        );
    }

    #[test]
    fn test_unknown_kind() {
        assert!(parse(&["get", "meeting"]).is_err());
        assert!(parse(&["get"]).is_err());
    }
}
