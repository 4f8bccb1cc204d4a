// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;
use std::path::PathBuf;

use calforge_ical::{CalendarConfig, Newline, OutputFormat, format};
use clap::{ArgMatches, Command, arg};

use crate::arg::CommonArgs;
use crate::util::{load_calendar, write_stdout};

/// Parse a calendar and write it back out normalized.
#[derive(Debug, Clone)]
pub struct CmdFormat {
    pub file: Option<PathBuf>,
    pub xcal: bool,
    pub no_fold: bool,
    pub lf: bool,
}

impl CmdFormat {
    pub const NAME: &str = "format";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .alias("fmt")
            .about("Parse a calendar and print it normalized")
            .arg(CommonArgs::file())
            .arg(arg!(--xcal "Print xCal XML instead of iCalendar text"))
            .arg(arg!(--"no-fold" "Do not fold long lines"))
            .arg(arg!(--lf "End lines with LF instead of CRLF"))
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            file: CommonArgs::get_file(matches),
            xcal: matches.get_flag("xcal"),
            no_fold: matches.get_flag("no-fold"),
            lf: matches.get_flag("lf"),
        }
    }

    /// Flags override the loaded configuration.
    pub fn apply(&self, mut config: CalendarConfig) -> CalendarConfig {
        if self.xcal {
            config.format = OutputFormat::XCal;
        }
        if self.no_fold {
            config.folding = None;
        }
        if self.lf {
            config.newline = Newline::Lf;
        }
        config
    }

    pub fn run(self, config: CalendarConfig) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "formatting calendar...");
        let config = self.apply(config);
        let calendar = load_calendar(self.file.as_deref(), config)?;
        write_stdout(&format(&calendar)?)
    }
}

/// Parse a calendar, sort its components and write it back out.
#[derive(Debug, Clone)]
pub struct CmdSort {
    pub file: Option<PathBuf>,
}

impl CmdSort {
    pub const NAME: &str = "sort";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Sort components: time zones first, then by start date")
            .arg(CommonArgs::file())
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            file: CommonArgs::get_file(matches),
        }
    }

    pub fn run(self, config: CalendarConfig) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "sorting calendar...");
        let mut calendar = load_calendar(self.file.as_deref(), config)?;
        calendar.sort();
        write_stdout(&format(&calendar)?)
    }
}
