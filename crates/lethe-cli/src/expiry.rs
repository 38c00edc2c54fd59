//! Relative expiry parsing.

use chrono::{DateTime, Duration, Utc};

use crate::error::CliError;

/// `(suffix, seconds)` pairs, longest suffix first so `min` wins over a
/// hypothetical trailing `n` and `mo` is tried before shorter units.
const UNITS: &[(&str, i64)] = &[
    ("min", 60),
    ("mo", 30 * 24 * 3600),
    ("y", 365 * 24 * 3600),
    ("w", 7 * 24 * 3600),
    ("d", 24 * 3600),
    ("h", 3600),
    ("s", 1),
];

/// Parse `<n><unit>` (e.g. `90min`, `2w`, `1y`) relative to `now`.
pub fn parse(expires_in: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, CliError> {
    let invalid = || CliError::InvalidDuration { value: expires_in.to_string() };

    for (suffix, unit_seconds) in UNITS {
        let Some(value) = expires_in.strip_suffix(suffix) else {
            continue;
        };

        let Ok(count) = value.parse::<i64>() else {
            break;
        };
        if count <= 0 {
            break;
        }

        return Ok(now + Duration::seconds(count * unit_seconds));
    }

    Err(invalid())
}
