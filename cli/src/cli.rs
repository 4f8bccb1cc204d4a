// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, ffi::OsString, path::PathBuf};

use clap::{ArgMatches, Command, ValueHint, arg, builder::styling, crate_version, value_parser};
use colored::Colorize;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::APP_NAME;
use crate::cmd_format::{CmdFormat, CmdSort};
use crate::cmd_get::CmdGet;
use crate::cmd_select::CmdSelect;
use crate::config::parse_config;

const CALFORGE_LOG_ENV: &str = "CALFORGE_LOG";

/// Run the calforge command-line interface.
pub fn run() -> Result<(), Box<dyn Error>> {
    match Cli::parse() {
        Ok(cli) => {
            init_tracing(cli.verbose);
            if let Err(e) = cli.run() {
                eprintln!("{} {}", "Error:".red(), e);
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            std::process::exit(2);
        }
    };
    Ok(())
}

/// Log to stderr, filtered by `CALFORGE_LOG`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env(CALFORGE_LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Command-line interface
#[derive(Debug)]
pub struct Cli {
    /// Path to the configuration file
    pub config: Option<PathBuf>,

    /// Log at debug level
    pub verbose: bool,

    /// The command to execute
    pub command: Commands,
}

impl Cli {
    /// Create the command-line interface
    pub fn command() -> Command {
        const STYLES: styling::Styles = styling::Styles::styled()
            .header(styling::AnsiColor::Green.on_default().bold())
            .usage(styling::AnsiColor::Green.on_default().bold())
            .literal(styling::AnsiColor::Blue.on_default().bold())
            .placeholder(styling::AnsiColor::Cyan.on_default());

        Command::new(APP_NAME)
            .about("Parse, normalize and query iCalendar files.")
            .author("Zexin Yuan <aim@yzx9.xyz>")
            .version(crate_version!())
            .styles(STYLES)
            .subcommand_required(true)
            .arg_required_else_help(true)
            .arg(
                arg!(-c --config [CONFIG] "Path to the configuration file")
                    .long_help(
                        "\
Path to the configuration file. Defaults to $CALFORGE_CONFIG, then \
$XDG_CONFIG_HOME/calforge/config.toml on Linux and MacOS, \
%APPDATA%/calforge/config.toml on Windows.",
                    )
                    .global(true)
                    .value_parser(value_parser!(PathBuf))
                    .value_hint(ValueHint::FilePath),
            )
            .arg(arg!(-v --verbose "Log debug information to stderr").global(true))
            .subcommand(CmdFormat::command())
            .subcommand(CmdSelect::command())
            .subcommand(CmdGet::command())
            .subcommand(CmdSort::command())
    }

    /// Parse the command-line arguments
    pub fn parse() -> Result<Self, Box<dyn Error>> {
        let commands = Self::command();
        let matches = commands.get_matches();
        Self::from(matches)
    }

    /// Parse the specified arguments
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, Box<dyn Error>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let commands = Self::command();
        let matches = commands.try_get_matches_from(args)?;
        Self::from(matches)
    }

    /// Create a CLI instance from the `ArgMatches`
    pub fn from(matches: ArgMatches) -> Result<Self, Box<dyn Error>> {
        use Commands::*;
        let command = match matches.subcommand() {
            Some((CmdFormat::NAME, matches)) => Format(CmdFormat::from(matches)),
            Some((CmdSelect::NAME, matches)) => Select(CmdSelect::from(matches)?),
            Some((CmdGet::NAME, matches)) => Get(CmdGet::from(matches)?),
            Some((CmdSort::NAME, matches)) => Sort(CmdSort::from(matches)),
            _ => return Err("a command is required".into()),
        };

        let config = matches.get_one("config").cloned();
        let verbose = matches.get_flag("verbose");
        Ok(Cli {
            config,
            verbose,
            command,
        })
    }

    /// Run the command
    pub fn run(self) -> Result<(), Box<dyn Error>> {
        self.command.run(self.config)
    }
}

/// The commands available in the CLI
#[derive(Debug, Clone)]
pub enum Commands {
    /// Parse and re-serialize a calendar
    Format(CmdFormat),

    /// List components in a date window
    Select(CmdSelect),

    /// Print one component
    Get(CmdGet),

    /// Sort and re-serialize a calendar
    Sort(CmdSort),
}

impl Commands {
    /// Run the command with the given configuration
    #[rustfmt::skip]
    pub fn run(self, config: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
        use Commands::*;
        tracing::debug!("parsing configuration...");
        let config = parse_config(config)?;
        match self {
            Format(a) => a.run(config),
            Select(a) => a.run(config),
            Get(a)    => a.run(config),
            Sort(a)   => a.run(config),
        }
    }
}
