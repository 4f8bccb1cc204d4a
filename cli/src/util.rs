// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::Path;

use calforge_ical::{Calendar, CalendarConfig, parse};

/// Read raw lines from a file, or from stdin when no file is given.
pub fn read_lines(file: Option<&Path>) -> Result<Vec<String>, Box<dyn Error>> {
    let lines = match file {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {e}", path.display()))?
            .lines()
            .map(str::to_owned)
            .collect(),
        None => io::stdin().lock().lines().collect::<io::Result<_>>()?,
    };
    Ok(lines)
}

/// Read and parse a calendar.
#[tracing::instrument(skip(config))]
pub fn load_calendar(
    file: Option<&Path>,
    config: CalendarConfig,
) -> Result<Calendar, Box<dyn Error>> {
    let lines = read_lines(file)?;
    tracing::debug!(lines = lines.len(), "read input");
    Ok(parse(lines, config)?)
}

/// Write a finished text blob to stdout.
pub fn write_stdout(text: &str) -> Result<(), Box<dyn Error>> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
