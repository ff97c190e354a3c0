// Timestamp helpers shared by the liveness filter and the traffic ledger
use chrono::{DateTime, Duration, Utc};

use crate::{Error, Result};

/// 2000-01-01T00:00:00Z, the seed timestamp for a fresh ledger series
const LEDGER_EPOCH_SECS: i64 = 946_684_800;

/// Parse a platform timestamp such as `2024-01-01T12:30:00Z`
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| Error::InvalidTimestamp(raw.to_string()))
}

/// Predates any traffic GitHub can report, so every real sample is newer
pub fn ledger_epoch() -> DateTime<Utc> {
    DateTime::from_timestamp(LEDGER_EPOCH_SECS, 0).unwrap_or_default()
}

/// `start + window`, saturating at the end of representable time
pub fn add_saturating(start: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
    start
        .checked_add_signed(window)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// `end - window`, saturating at the start of representable time
pub fn sub_saturating(end: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
    end.checked_sub_signed(window)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
