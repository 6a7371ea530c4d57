//! Process-local rate limit counters for single-instance deployments.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use fieldtrack_application::{AttemptInfo, RateLimitRepository};
use fieldtrack_core::{AppError, AppResult};

/// In-memory implementation of the rate limit repository port.
#[derive(Debug, Default)]
pub struct InMemoryRateLimitRepository {
    windows: Mutex<HashMap<String, AttemptInfo>>,
}

impl InMemoryRateLimitRepository {
    /// Creates an empty counter store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateLimitRepository for InMemoryRateLimitRepository {
    async fn record_attempt(
        &self,
        key: &str,
        window_duration_seconds: i64,
    ) -> AppResult<AttemptInfo> {
        if window_duration_seconds <= 0 {
            return Err(AppError::Validation(
                "window_duration_seconds must be greater than zero".to_owned(),
            ));
        }

        let now = Utc::now();
        let window = Duration::seconds(window_duration_seconds);
        let mut windows = self.windows.lock().await;
        let entry = windows.entry(key.to_owned()).or_insert(AttemptInfo {
            attempt_count: 0,
            window_started_at: now,
        });

        if entry.window_started_at + window < now {
            entry.attempt_count = 0;
            entry.window_started_at = now;
        }
        entry.attempt_count = entry.attempt_count.saturating_add(1);

        Ok(entry.clone())
    }

    async fn cleanup_expired(&self, before: DateTime<Utc>) -> AppResult<u64> {
        let mut windows = self.windows.lock().await;
        let initial = windows.len();
        windows.retain(|_, info| info.window_started_at >= before);

        Ok(u64::try_from(initial - windows.len()).unwrap_or(u64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use fieldtrack_application::RateLimitRepository;

    use super::InMemoryRateLimitRepository;

    #[tokio::test]
    async fn attempts_accumulate_per_key() {
        let repository = InMemoryRateLimitRepository::new();

        for expected in 1..=3 {
            let info = repository
                .record_attempt("issue_report:10.0.0.1", 60)
                .await
                .unwrap_or_else(|_| unreachable!());
            assert_eq!(info.attempt_count, expected);
        }

        let other = repository
            .record_attempt("issue_report:10.0.0.2", 60)
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(other.attempt_count, 1);
    }

    #[tokio::test]
    async fn cleanup_drops_old_windows() {
        let repository = InMemoryRateLimitRepository::new();
        assert!(repository.record_attempt("login:10.0.0.1", 60).await.is_ok());

        let removed = repository
            .cleanup_expired(Utc::now() + Duration::seconds(1))
            .await
            .unwrap_or(0);
        assert_eq!(removed, 1);
    }

    #[tokio::test]
    async fn non_positive_windows_are_rejected() {
        let repository = InMemoryRateLimitRepository::new();
        assert!(repository.record_attempt("login:10.0.0.1", 0).await.is_err());
    }
}
