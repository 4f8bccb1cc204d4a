// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, path::PathBuf, str::FromStr};

use calforge_ical::CalendarConfig;

use crate::APP_NAME;

const CALFORGE_CONFIG_ENV: &str = "CALFORGE_CONFIG";

/// Load the calendar configuration.
///
/// Looks at `path`, then `$CALFORGE_CONFIG`, then the user config directory.
/// An explicit path must exist; a missing default file means defaults.
#[tracing::instrument]
pub fn parse_config(path: Option<PathBuf>) -> Result<CalendarConfig, Box<dyn Error>> {
    let path = if let Some(path) = path {
        path
    } else if let Ok(env_path) = std::env::var(CALFORGE_CONFIG_ENV) {
        PathBuf::from(env_path)
    } else {
        match get_config_dir().map(|dir| dir.join(format!("{APP_NAME}/config.toml"))) {
            Some(config) if config.exists() => config,
            _ => {
                tracing::debug!("no config file found, using defaults");
                return Ok(CalendarConfig::default());
            }
        }
    };

    tracing::debug!(path = %path.display(), "loading config");
    std::fs::read_to_string(&path)
        .map_err(|e| format!("Failed to read config file at {}: {}", path.display(), e))?
        .parse::<ConfigRaw>()
        .map(|a| a.calendar)
}

#[derive(Debug, Default, serde::Deserialize)]
struct ConfigRaw {
    #[serde(default)]
    calendar: CalendarConfig,
}

impl FromStr for ConfigRaw {
    type Err = Box<dyn Error>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(s)?)
    }
}

fn get_config_dir() -> Option<PathBuf> {
    #[cfg(unix)]
    let config_dir = xdg::BaseDirectories::new().get_config_home();
    #[cfg(not(unix))]
    let config_dir = dirs::config_dir();
    config_dir
}

#[cfg(test)]
#[allow(unsafe_code)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::{Mutex, OnceLock};

    use calforge_ical::{Newline, OutputFormat};
    use tempfile::TempDir;

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    #[test]
    fn parses_partial_table() {
        let raw: ConfigRaw = r#"
[calendar]
unique_id = "example.com"
newline = "lf"
"#
        .parse()
        .unwrap();

        let config = raw.calendar;
        assert_eq!(config.unique_id, "example.com");
        assert_eq!(config.newline, Newline::Lf);
        assert_eq!(config.format, OutputFormat::ICal);
        assert!(config.allow_empty);
        assert_eq!(config.folding, Some(75));
    }

    #[test]
    fn empty_file_gives_defaults() {
        let raw: ConfigRaw = "".parse().unwrap();
        assert_eq!(raw.calendar, CalendarConfig::default());
    }

    #[test]
    fn rejects_unknown_format() {
        let raw = r#"
[calendar]
format = "json"
"#
        .parse::<ConfigRaw>();
        assert!(raw.is_err());
    }

    #[test]
    fn cli_flag_overrides_env_var() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "[calendar]\nunique_id = \"cli\"\n").unwrap();
        let env_path = temp_dir.path().join("env_config.toml");
        fs::write(&env_path, "[calendar]\nunique_id = \"env\"\n").unwrap();

        let _guard = env_lock().lock().unwrap();
        unsafe {
            std::env::set_var(CALFORGE_CONFIG_ENV, env_path.to_str().unwrap());
        }

        let from_flag = parse_config(Some(config_path)).unwrap();
        let from_env = parse_config(None).unwrap();

        unsafe {
            std::env::remove_var(CALFORGE_CONFIG_ENV);
        }
        assert_eq!(from_flag.unique_id, "cli");
        assert_eq!(from_env.unique_id, "env");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = parse_config(Some(temp_dir.path().join("missing.toml")));
        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[test]
    fn missing_default_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();

        let _guard = env_lock().lock().unwrap();
        unsafe {
            std::env::remove_var(CALFORGE_CONFIG_ENV);
            std::env::set_var("XDG_CONFIG_HOME", temp_dir.path());
        }

        let config = parse_config(None).unwrap();

        unsafe {
            std::env::remove_var("XDG_CONFIG_HOME");
        }
        assert_eq!(config, CalendarConfig::default());
    }

    #[cfg(unix)]
    #[test]
    fn reads_default_file() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join(APP_NAME);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.toml"), "[calendar]\nlanguage = \"de\"\n").unwrap();

        let _guard = env_lock().lock().unwrap();
        unsafe {
            std::env::remove_var(CALFORGE_CONFIG_ENV);
            std::env::set_var("XDG_CONFIG_HOME", temp_dir.path());
        }

        let config = parse_config(None).unwrap();

        unsafe {
            std::env::remove_var("XDG_CONFIG_HOME");
        }
        assert_eq!(config.language.as_deref(), Some("de"));
    }
}
