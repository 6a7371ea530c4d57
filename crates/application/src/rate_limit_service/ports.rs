use async_trait::async_trait;
use chrono::{DateTime, Utc};

use fieldtrack_core::AppResult;

/// Repository port for rate limit counters.
///
/// Increments must be atomic with respect to concurrent requests for the
/// same key.
#[async_trait]
pub trait RateLimitRepository: Send + Sync {
    /// Counts one attempt for `key`, starting a fresh window when the previous
    /// one has expired. Returns the count within the active window.
    async fn record_attempt(
        &self,
        key: &str,
        window_duration_seconds: i64,
    ) -> AppResult<AttemptInfo>;

    /// Removes counters whose window started before `before`.
    async fn cleanup_expired(&self, before: DateTime<Utc>) -> AppResult<u64>;
}

/// Counter state of one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptInfo {
    /// Attempts in the active window, including the current one.
    pub attempt_count: i32,
    /// Start of the active window.
    pub window_started_at: DateTime<Utc>,
}
