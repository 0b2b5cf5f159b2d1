//! JSON command surface
//!
//! Hosts call the engine through these functions with JSON payloads. Every
//! command returns `Result<String, String>` so it can be exposed directly
//! over an IPC bridge; the error string is user-facing.

pub mod planning;
pub mod week;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
  #[error("Invalid request payload: {0}")]
  Decode(String),

  #[error("Failed to encode response: {0}")]
  Encode(String),

  #[error("Invalid timestamp: {0}")]
  InvalidTimestamp(String),
}

impl From<CommandError> for String {
  fn from(e: CommandError) -> Self {
    e.to_string()
  }
}

pub(crate) fn decode<T: DeserializeOwned>(payload: &str) -> Result<T, CommandError> {
  serde_json::from_str(payload).map_err(|e| CommandError::Decode(e.to_string()))
}

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<String, CommandError> {
  serde_json::to_string(value).map_err(|e| CommandError::Encode(e.to_string()))
}

/// RFC 3339 timestamp, or the current time when absent
pub(crate) fn parse_now(raw: Option<&str>) -> Result<DateTime<Utc>, CommandError> {
  match raw {
    Some(raw) => DateTime::parse_from_rfc3339(raw)
      .map(|dt| dt.with_timezone(&Utc))
      .map_err(|e| CommandError::InvalidTimestamp(format!("{}: {}", raw, e))),
    None => Ok(Utc::now()),
  }
}
