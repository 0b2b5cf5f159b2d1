//! Week close command

use super::{decode, encode, parse_now};
use crate::weekclose::{self, WeekSnapshot};

/// Close a week from a JSON [`WeekSnapshot`]; returns the JSON outcome.
///
/// `now` is an RFC 3339 timestamp used to stamp adjustments and defaults to
/// the current time.
pub fn close_week(snapshot_json: &str, now: Option<&str>) -> Result<String, String> {
    let snapshot: WeekSnapshot = decode(snapshot_json)?;
    let now = parse_now(now)?;

    let outcome = weekclose::close_week(&snapshot, now);
    Ok(encode(&outcome)?)
}
