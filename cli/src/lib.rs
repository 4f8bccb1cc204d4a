// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Command-line front end of calforge: reads iCalendar text from a file or
//! stdin, hands it to [`calforge_ical`], and writes the result to stdout.

mod arg;
mod cli;
mod cmd_format;
mod cmd_get;
mod cmd_select;
mod config;
mod util;

pub use crate::cli::{Cli, Commands, run};
pub use crate::cmd_format::{CmdFormat, CmdSort};
pub use crate::cmd_get::CmdGet;
pub use crate::cmd_select::CmdSelect;
pub use crate::config::parse_config;

/// Name of the binary, also used for the config directory.
pub const APP_NAME: &str = "calforge";
