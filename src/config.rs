//! Engine configuration
//!
//! Defaults match the standard progression rules. Every knob can be
//! overridden through `FORGE_*` environment variables, optionally loaded
//! from a `.env` file.

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

use crate::logging::{LogFormat, LoggingConfig};
use crate::targets::SeriesTargetConfig;

pub const ENV_WEIGHT_QUANTIZATION: &str = "FORGE_WEIGHT_QUANTIZATION";
pub const ENV_MAX_REP_DROP: &str = "FORGE_MAX_REP_DROP_PER_WEEK";
pub const ENV_MAX_REP_INCREASE: &str = "FORGE_MAX_REP_INCREASE_PER_WEEK";
pub const ENV_MAX_INTENSITY: &str = "FORGE_MAX_INTENSITY";
pub const ENV_MAX_REPS_SCAN: &str = "FORGE_MAX_REPS_SCAN";
pub const ENV_REMOVE_REPS_IF_CLAMPED: &str = "FORGE_REMOVE_REPS_IF_CLAMPED";
pub const ENV_MIN_REPS: &str = "FORGE_MIN_REPS";
pub const ENV_LOG_LEVEL: &str = "FORGE_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "FORGE_LOG_FORMAT";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
  #[error("Invalid value for {key}: {value}")]
  Invalid { key: String, value: String },

  #[error("Failed to load .env file: {0}")]
  DotEnv(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
  pub series: SeriesTargetConfig,
  pub logging: LoggingConfig,
}

fn invalid(key: &str, value: &str) -> ConfigError {
  ConfigError::Invalid {
    key: key.into(),
    value: value.into(),
  }
}

/// Parse an optional variable; unset means None
fn env_parse<T: FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
  let raw = match env::var(key) {
    Ok(raw) => raw,
    Err(_) => return Ok(None),
  };
  match raw.trim().parse::<T>() {
    Ok(value) => Ok(Some(value)),
    Err(_) => Err(invalid(key, &raw)),
  }
}

fn env_bool(key: &str) -> Result<Option<bool>, ConfigError> {
  let raw = match env::var(key) {
    Ok(raw) => raw,
    Err(_) => return Ok(None),
  };
  match raw.trim().to_ascii_lowercase().as_str() {
    "true" | "1" | "yes" => Ok(Some(true)),
    "false" | "0" | "no" => Ok(Some(false)),
    _ => Err(invalid(key, &raw)),
  }
}

fn require(
  key: &str,
  value: Option<f64>,
  valid: impl Fn(f64) -> bool,
) -> Result<Option<f64>, ConfigError> {
  match value {
    Some(v) if !valid(v) => Err(invalid(key, &v.to_string())),
    other => Ok(other),
  }
}

impl EngineConfig {
  /// Read `.env` (if present) then the process environment
  pub fn load() -> Result<Self, ConfigError> {
    match dotenvy::dotenv() {
      Ok(_) => {}
      Err(e) if e.not_found() => {}
      Err(e) => return Err(ConfigError::DotEnv(e.to_string())),
    }
    Self::from_env()
  }

  pub fn from_env() -> Result<Self, ConfigError> {
    let mut series = SeriesTargetConfig::default();

    let step = env_parse(ENV_WEIGHT_QUANTIZATION)?;
    if let Some(step) = require(ENV_WEIGHT_QUANTIZATION, step, |v| v > 0.0)? {
      series.weight_quantization = step;
    }
    if let Some(drop) = env_parse::<i32>(ENV_MAX_REP_DROP)? {
      if drop < 0 {
        return Err(invalid(ENV_MAX_REP_DROP, &drop.to_string()));
      }
      series.max_rep_drop_per_week = drop;
    }
    if let Some(increase) = env_parse::<i32>(ENV_MAX_REP_INCREASE)? {
      if increase < 0 {
        return Err(invalid(ENV_MAX_REP_INCREASE, &increase.to_string()));
      }
      series.max_rep_increase_per_week = increase;
    }
    let max_intensity = env_parse(ENV_MAX_INTENSITY)?;
    series.max_intensity = require(ENV_MAX_INTENSITY, max_intensity, |v| v > 0.0)?;
    if let Some(scan) = env_parse::<i32>(ENV_MAX_REPS_SCAN)? {
      if scan < 1 {
        return Err(invalid(ENV_MAX_REPS_SCAN, &scan.to_string()));
      }
      series.max_reps_scan = scan;
    }
    if let Some(remove) = env_bool(ENV_REMOVE_REPS_IF_CLAMPED)? {
      series.remove_reps_if_clamped = remove;
    }
    if let Some(min_reps) = env_parse::<i32>(ENV_MIN_REPS)? {
      if min_reps < 1 {
        return Err(invalid(ENV_MIN_REPS, &min_reps.to_string()));
      }
      series.min_reps_override = Some(min_reps);
    }

    let mut logging = LoggingConfig::default();
    if let Ok(level) = env::var(ENV_LOG_LEVEL) {
      logging.level = level;
    }
    if let Ok(raw) = env::var(ENV_LOG_FORMAT) {
      logging.format = raw.parse::<LogFormat>().map_err(|_| invalid(ENV_LOG_FORMAT, &raw))?;
    }

    Ok(Self { series, logging })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;

  const ALL_KEYS: [&str; 9] = [
    ENV_WEIGHT_QUANTIZATION,
    ENV_MAX_REP_DROP,
    ENV_MAX_REP_INCREASE,
    ENV_MAX_INTENSITY,
    ENV_MAX_REPS_SCAN,
    ENV_REMOVE_REPS_IF_CLAMPED,
    ENV_MIN_REPS,
    ENV_LOG_LEVEL,
    ENV_LOG_FORMAT,
  ];

  #[test]
  #[serial]
  fn test_from_env_defaults() {
    temp_env::with_vars_unset(ALL_KEYS, || {
      let config = EngineConfig::from_env().unwrap();

      assert_eq!(config, EngineConfig::default());
      assert_eq!(config.series.weight_quantization, 0.5);
      assert_eq!(config.series.max_rep_drop_per_week, 3);
      assert_eq!(config.series.max_rep_increase_per_week, 5);
      assert_eq!(config.series.max_reps_scan, 30);
      assert_eq!(config.series.max_intensity, None);
      assert!(!config.series.remove_reps_if_clamped);
      assert_eq!(config.logging.level, "info");
      assert_eq!(config.logging.format, LogFormat::Pretty);
    });
  }

  #[test]
  #[serial]
  fn test_from_env_overrides() {
    temp_env::with_vars(
      [
        (ENV_WEIGHT_QUANTIZATION, Some("1.25")),
        (ENV_MAX_REP_DROP, Some("2")),
        (ENV_MAX_INTENSITY, Some("0.9")),
        (ENV_REMOVE_REPS_IF_CLAMPED, Some("true")),
        (ENV_MIN_REPS, Some("4")),
        (ENV_LOG_LEVEL, Some("fitness_forge=debug")),
        (ENV_LOG_FORMAT, Some("json")),
      ],
      || {
        let config = EngineConfig::from_env().unwrap();

        assert_eq!(config.series.weight_quantization, 1.25);
        assert_eq!(config.series.max_rep_drop_per_week, 2);
        assert_eq!(config.series.max_intensity, Some(0.9));
        assert!(config.series.remove_reps_if_clamped);
        assert_eq!(config.series.min_reps_override, Some(4));
        assert_eq!(config.logging.level, "fitness_forge=debug");
        assert_eq!(config.logging.format, LogFormat::Json);
      },
    );
  }

  #[test]
  #[serial]
  fn test_from_env_rejects_invalid_values() {
    temp_env::with_var(ENV_WEIGHT_QUANTIZATION, Some("0"), || {
      let err = EngineConfig::from_env().unwrap_err();
      assert_eq!(
        err,
        ConfigError::Invalid {
          key: ENV_WEIGHT_QUANTIZATION.into(),
          value: "0".into()
        }
      );
    });

    temp_env::with_var(ENV_MAX_REPS_SCAN, Some("many"), || {
      let err = EngineConfig::from_env().unwrap_err();
      assert!(err.to_string().contains(ENV_MAX_REPS_SCAN));
    });

    temp_env::with_var(ENV_REMOVE_REPS_IF_CLAMPED, Some("maybe"), || {
      assert!(EngineConfig::from_env().is_err());
    });

    temp_env::with_var(ENV_LOG_FORMAT, Some("xml"), || {
      assert!(EngineConfig::from_env().is_err());
    });
  }
}
