//! Tool configuration.
//!
//! Settings are layered, lowest priority first:
//! 1. Default values
//! 2. Configuration file (TOML, optional)
//! 3. Environment variables (`QPACK_QIF__` prefix)
//! 4. Command-line arguments
//!
//! ```toml
//! log_level = "debug"
//! strict_huffman_padding = true
//! keep_going = false
//! ```

use anyhow::{Context, Result};
use config::{Config as ConfigLoader, Environment};
use qpack::{PaddingPolicy, QpackConfig};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::cli::CliArgs;

/// Settings for one run of the tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Default tracing level; `RUST_LOG` still takes precedence.
    ///
    /// **Default:** `"info"`
    pub log_level: String,

    /// Reject Huffman literals with malformed padding.
    ///
    /// **Default:** `false`
    pub strict_huffman_padding: bool,

    /// Write an empty block for an undecodable header block instead of
    /// aborting.
    ///
    /// **Default:** `false`
    pub keep_going: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info.to_string(),
            strict_huffman_padding: false,
            keep_going: false,
        }
    }
}

impl Settings {
    /// Validate the settings.
    ///
    /// Returns `Ok(())` if valid, or a list of error messages if invalid.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if let Err(e) = self.log_level.parse::<LogLevel>() {
            errors.push(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Parsed log level, falling back to `info` for an invalid value.
    pub fn level(&self) -> LogLevel {
        self.log_level.parse().unwrap_or(LogLevel::Info)
    }

    /// Codec configuration derived from these settings.
    pub fn qpack_config(&self) -> QpackConfig {
        QpackConfig {
            huffman_padding: if self.strict_huffman_padding {
                PaddingPolicy::Strict
            } else {
                PaddingPolicy::Lenient
            },
        }
    }
}

/// Log level enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!("Invalid log level: {}", s)),
        }
    }
}

/// Load and validate settings for the parsed command line.
///
/// # Errors
///
/// Returns an error if:
/// - The configuration file exists but cannot be read or parsed
/// - Environment variables cannot be read
/// - Validation fails
pub fn load_settings(cli: &CliArgs) -> Result<Settings> {
    let mut settings = load_config_file(&cli.config)?;
    apply_env_overrides(
        &mut settings,
        Environment::with_prefix("QPACK_QIF").separator("__"),
    )?;
    apply_cli_overrides(&mut settings, cli);

    settings.validate().map_err(|errors| {
        anyhow::anyhow!("Configuration validation failed:\n{}", errors.join("\n"))
    })?;

    Ok(settings)
}

/// Load settings from a TOML file; a missing file yields the defaults.
fn load_config_file(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }

    let config_str = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    toml::from_str(&config_str)
        .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
}

/// Apply environment variable overrides.
///
/// Examples:
/// - `QPACK_QIF__LOG_LEVEL=debug`
/// - `QPACK_QIF__KEEP_GOING=true`
fn apply_env_overrides(settings: &mut Settings, env: Environment) -> Result<()> {
    let env_config = ConfigLoader::builder()
        .add_source(env)
        .build()
        .context("Failed to load environment variables")?;

    if let Ok(level) = env_config.get_string("log_level") {
        settings.log_level = level;
    }
    if let Ok(strict) = env_config.get_bool("strict_huffman_padding") {
        settings.strict_huffman_padding = strict;
    }
    if let Ok(keep_going) = env_config.get_bool("keep_going") {
        settings.keep_going = keep_going;
    }

    Ok(())
}

/// Apply command-line argument overrides. Flags can only switch options on.
fn apply_cli_overrides(settings: &mut Settings, cli: &CliArgs) {
    if let Some(ref level) = cli.log_level {
        settings.log_level = level.clone();
    }
    if cli.strict_huffman_padding {
        settings.strict_huffman_padding = true;
    }
    if cli.keep_going {
        settings.keep_going = true;
    }
}
