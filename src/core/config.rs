//! # Configuration
//!
//! Screen options with a clear override hierarchy: built-in defaults →
//! config file. The embedding application can also skip files entirely and
//! build a [`ScreenOptions`] in code.
//!
//! The file lives at `~/.termflow/config.toml`. All fields are optional —
//! anything missing falls back to its default.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info, warn};
use serde::Deserialize;

use crate::core::cell::{Cell, Color, DEFAULT_CELL};

pub const DEFAULT_POLL_TIMEOUT_MS: u64 = 50;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct TermflowConfig {
    #[serde(default)]
    pub screen: ScreenSection,
    #[serde(default)]
    pub default_cell: DefaultCellSection,
}

#[derive(Debug, Default, Deserialize)]
pub struct ScreenSection {
    /// `"concurrent"` or `"serial"`.
    pub dispatch: Option<String>,
    pub poll_timeout_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DefaultCellSection {
    /// A single character.
    pub symbol: Option<String>,
    /// `"default"` or `"#rrggbb"`.
    pub foreground: Option<String>,
    pub background: Option<String>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config value: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Resolved Options (concrete values, no Options)
// ============================================================================

/// How the run loop executes dispatches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DispatchMode {
    /// One task per event, fire-and-forget, unbounded. Events may complete
    /// out of order; grid access stays safe behind the context's lock.
    #[default]
    Concurrent,
    /// One event at a time. Lower throughput, strict ordering.
    Serial,
}

/// Concrete screen options, after resolution.
#[derive(Clone, Copy, Debug)]
pub struct ScreenOptions {
    /// The cell used to backfill unset grid positions.
    pub default_cell: Cell,
    pub dispatch: DispatchMode,
    /// How long one backend poll blocks before re-checking for shutdown.
    pub poll_timeout: Duration,
}

impl Default for ScreenOptions {
    fn default() -> Self {
        Self {
            default_cell: DEFAULT_CELL,
            dispatch: DispatchMode::default(),
            poll_timeout: Duration::from_millis(DEFAULT_POLL_TIMEOUT_MS),
        }
    }
}

impl ScreenOptions {
    /// Load and resolve `~/.termflow/config.toml`; defaults when absent.
    pub fn load() -> Result<Self, ConfigError> {
        load_config()?.resolve()
    }

    /// Load and resolve an explicit config file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        load_config_from(path)?.resolve()
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.termflow/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".termflow").join("config.toml"))
}

/// Load the config file from its default location. A missing file (or an
/// undeterminable home directory) yields the defaults, not an error.
pub fn load_config() -> Result<TermflowConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(TermflowConfig::default());
        }
    };
    if !path.exists() {
        info!("No config file at {}, using defaults", path.display());
        return Ok(TermflowConfig::default());
    }
    load_config_from(&path)
}

fn load_config_from(path: &Path) -> Result<TermflowConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: TermflowConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

// ============================================================================
// Resolution
// ============================================================================

impl TermflowConfig {
    /// Turn sparse file values into concrete [`ScreenOptions`].
    pub fn resolve(self) -> Result<ScreenOptions, ConfigError> {
        let defaults = ScreenOptions::default();

        let dispatch = match self.screen.dispatch.as_deref() {
            None => defaults.dispatch,
            Some("concurrent") => DispatchMode::Concurrent,
            Some("serial") => DispatchMode::Serial,
            Some(other) => {
                return Err(ConfigError::Invalid(format!(
                    "dispatch must be \"concurrent\" or \"serial\", got {other:?}"
                )));
            }
        };

        let poll_timeout = self
            .screen
            .poll_timeout_ms
            .map_or(defaults.poll_timeout, Duration::from_millis);

        let symbol = match self.default_cell.symbol.as_deref() {
            None => defaults.default_cell.symbol,
            Some(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => c,
                    _ => {
                        return Err(ConfigError::Invalid(format!(
                            "default_cell.symbol must be a single character, got {s:?}"
                        )));
                    }
                }
            }
        };

        let foreground = resolve_color(self.default_cell.foreground.as_deref(), "foreground")?;
        let background = resolve_color(self.default_cell.background.as_deref(), "background")?;

        Ok(ScreenOptions {
            default_cell: Cell::new(symbol, foreground, background),
            dispatch,
            poll_timeout,
        })
    }
}

fn resolve_color(value: Option<&str>, field: &str) -> Result<Color, ConfigError> {
    match value {
        None => Ok(Color::Default),
        Some(s) => Color::parse(s).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "default_cell.{field} must be \"default\" or \"#rrggbb\", got {s:?}"
            ))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_resolves_to_defaults() {
        let options = TermflowConfig::default().resolve().unwrap();
        assert_eq!(options.default_cell, DEFAULT_CELL);
        assert_eq!(options.dispatch, DispatchMode::Concurrent);
        assert_eq!(options.poll_timeout, Duration::from_millis(DEFAULT_POLL_TIMEOUT_MS));
    }

    #[test]
    fn full_config_parses_and_resolves() {
        let config: TermflowConfig = toml::from_str(
            r##"
            [screen]
            dispatch = "serial"
            poll_timeout_ms = 200

            [default_cell]
            symbol = "."
            foreground = "#ff0000"
            background = "default"
            "##,
        )
        .unwrap();

        let options = config.resolve().unwrap();
        assert_eq!(options.dispatch, DispatchMode::Serial);
        assert_eq!(options.poll_timeout, Duration::from_millis(200));
        assert_eq!(
            options.default_cell,
            Cell::new('.', Color::Rgb(255, 0, 0), Color::Default)
        );
    }

    #[test]
    fn bad_dispatch_mode_is_rejected() {
        let config: TermflowConfig =
            toml::from_str("[screen]\ndispatch = \"threads\"\n").unwrap();
        assert!(matches!(config.resolve(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn bad_color_is_rejected() {
        let config: TermflowConfig =
            toml::from_str("[default_cell]\nforeground = \"reddish\"\n").unwrap();
        assert!(matches!(config.resolve(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn multi_char_symbol_is_rejected() {
        let config: TermflowConfig =
            toml::from_str("[default_cell]\nsymbol = \"ab\"\n").unwrap();
        assert!(matches!(config.resolve(), Err(ConfigError::Invalid(_))));
    }
}
