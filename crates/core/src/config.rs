//! Configuration file discovery and loading
//!
//! Values are resolved in priority order:
//! 1. CLI arguments (highest priority)
//! 2. Environment variables
//! 3. Config file (searched in standard locations)
//! 4. Built-in defaults (lowest priority)
//!
//! Steps 1 and 2 are handled by clap in each binary, this module covers step 3.

use std::env;
use std::fs;
use std::path::PathBuf;

use serde::de::DeserializeOwned;

use crate::APP_NAME;

/// Where a configuration was loaded from
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// Explicit path provided via CLI flag or env var
    Explicit(PathBuf),
    /// Found in the current working directory
    CurrentDir(PathBuf),
    /// Found under $XDG_CONFIG_HOME/weather-analytics/
    XdgConfig(PathBuf),
    /// Found under /etc/weather-analytics/
    System(PathBuf),
    /// No config file found
    Defaults,
}

impl ConfigSource {
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            ConfigSource::Explicit(p)
            | ConfigSource::CurrentDir(p)
            | ConfigSource::XdgConfig(p)
            | ConfigSource::System(p) => Some(p),
            ConfigSource::Defaults => None,
        }
    }
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.path() {
            Some(p) => write!(f, "{}", p.display()),
            None => write!(f, "(defaults)"),
        }
    }
}

/// Find a configuration file in the standard locations
///
/// Search order:
/// 1. `env_var` (e.g. WEATHER_API_CONFIG), if it names an existing file
/// 2. `filename` in the current directory
/// 3. `$XDG_CONFIG_HOME/weather-analytics/filename` (or `~/.config/...`)
/// 4. `/etc/weather-analytics/filename`
pub fn find_config_file(env_var: &str, filename: &str) -> ConfigSource {
    if let Ok(path) = env::var(env_var) {
        let explicit = PathBuf::from(path);
        if explicit.is_file() {
            return ConfigSource::Explicit(explicit);
        }
    }

    let candidates = [
        ConfigSource::CurrentDir(PathBuf::from(filename)),
        ConfigSource::XdgConfig(xdg_config_dir().join(filename)),
        ConfigSource::System(PathBuf::from("/etc").join(APP_NAME).join(filename)),
    ];

    candidates
        .into_iter()
        .find(|source| source.path().is_some_and(|p| p.is_file()))
        .unwrap_or(ConfigSource::Defaults)
}

fn xdg_config_dir() -> PathBuf {
    match (env::var("XDG_CONFIG_HOME"), env::var("HOME")) {
        (Ok(xdg), _) => PathBuf::from(xdg).join(APP_NAME),
        (Err(_), Ok(home)) => PathBuf::from(home).join(".config").join(APP_NAME),
        // Relative fallback, will not normally exist
        _ => PathBuf::from(".config").join(APP_NAME),
    }
}

/// Load and parse a TOML configuration file
///
/// Returns `T::default()` when `source` is [`ConfigSource::Defaults`].
pub fn load_config<T: DeserializeOwned + Default>(source: &ConfigSource) -> anyhow::Result<T> {
    let Some(path) = source.path() else {
        return Ok(T::default());
    };
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}
