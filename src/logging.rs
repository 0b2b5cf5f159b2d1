//! Structured logging setup
//!
//! The engine only emits `tracing` events; hosts that do not install their
//! own subscriber can call [`init_logging`] once at startup.

use serde::{Deserialize, Serialize};
use std::io;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ConfigError;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
  /// Multi-line, human readable
  #[default]
  Pretty,
  Compact,
  /// One JSON object per event
  Json,
}

impl std::fmt::Display for LogFormat {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Pretty => write!(f, "pretty"),
      Self::Compact => write!(f, "compact"),
      Self::Json => write!(f, "json"),
    }
  }
}

impl std::str::FromStr for LogFormat {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "pretty" => Ok(Self::Pretty),
      "compact" => Ok(Self::Compact),
      "json" => Ok(Self::Json),
      _ => Err(format!("Unknown log format: {}", s)),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
  /// `EnvFilter` directive, e.g. "info" or "fitness_forge=debug"
  pub level: String,
  pub format: LogFormat,
  /// Include source file and line numbers
  pub include_location: bool,
}

impl Default for LoggingConfig {
  fn default() -> Self {
    Self {
      level: "info".into(),
      format: LogFormat::Pretty,
      include_location: false,
    }
  }
}

/// Install the global `tracing` subscriber.
///
/// Returns `Ok(false)` when a subscriber is already installed, so calling
/// this twice (or from tests) is harmless.
pub fn init_logging(config: &LoggingConfig) -> Result<bool, ConfigError> {
  let filter = EnvFilter::try_new(&config.level).map_err(|_| ConfigError::Invalid {
    key: "FORGE_LOG_LEVEL".into(),
    value: config.level.clone(),
  })?;

  let registry = tracing_subscriber::registry().with(filter);

  let installed = match config.format {
    LogFormat::Json => registry
      .with(
        fmt::layer()
          .json()
          .with_file(config.include_location)
          .with_line_number(config.include_location)
          .with_target(true)
          .with_writer(io::stdout),
      )
      .try_init()
      .is_ok(),
    LogFormat::Pretty => registry
      .with(
        fmt::layer()
          .pretty()
          .with_file(config.include_location)
          .with_line_number(config.include_location)
          .with_target(true)
          .with_writer(io::stdout),
      )
      .try_init()
      .is_ok(),
    LogFormat::Compact => registry
      .with(
        fmt::layer()
          .compact()
          .with_file(false)
          .with_line_number(false)
          .with_target(false)
          .with_writer(io::stdout),
      )
      .try_init()
      .is_ok(),
  };

  if installed {
    info!(
      log.level = %config.level,
      log.format = %config.format,
      version = env!("CARGO_PKG_VERSION"),
      "fitness-forge logging initialized"
    );
  }

  Ok(installed)
}
