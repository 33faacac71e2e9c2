//! Expiry argument parsing.

use std::time::Duration;

use anyhow::Context;
use jiff::SignedDuration;

/// Parses a non-negative duration in the friendly (`1h30m`, `3600s`) or
/// ISO 8601 (`PT1H`) format.
pub fn parse_duration(value: &str) -> anyhow::Result<Duration> {
    let duration: SignedDuration = value.trim().parse().with_context(|| {
        format!("expiration should be a duration such as 1h, 60m or 3600s, got {value:?}")
    })?;

    Duration::try_from(duration)
        .map_err(|_| anyhow::anyhow!("expiration must not be negative, got {value:?}"))
}
