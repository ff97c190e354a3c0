use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;

const REMAINING_HEADER: &str = "x-ratelimit-remaining";
const RESET_HEADER: &str = "x-ratelimit-reset";

/// Rate limit state reported alongside every GitHub response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub remaining: u64,
    pub reset: DateTime<Utc>,
}

impl RateLimit {
    /// Read the rate limit headers. Returns None if either is absent or garbled.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let remaining = header_number(headers, REMAINING_HEADER)?;
        let reset_epoch = header_number(headers, RESET_HEADER)?;
        let reset = DateTime::from_timestamp(i64::try_from(reset_epoch).ok()?, 0)?;

        Some(Self { remaining, reset })
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining < 1
    }
}

fn header_number(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}
