use std::sync::Arc;

use chrono::Utc;
use tracing::warn;

use fieldtrack_core::{AppError, AppResult};

use super::config::RateLimitRule;
use super::ports::RateLimitRepository;

/// Application service for per-source rate limiting.
#[derive(Clone)]
pub struct RateLimitService {
    repository: Arc<dyn RateLimitRepository>,
}

impl RateLimitService {
    /// Creates a new rate limit service.
    #[must_use]
    pub fn new(repository: Arc<dyn RateLimitRepository>) -> Self {
        Self { repository }
    }

    /// Counts an attempt from `source` against `rule`.
    ///
    /// Returns [`AppError::RateLimited`] once the budget is exhausted. The
    /// rejected request must not perform its action.
    pub async fn check_rate_limit(&self, rule: &RateLimitRule, source: &str) -> AppResult<()> {
        let info = self
            .repository
            .record_attempt(&rule.key_for(source), rule.window_seconds)
            .await?;

        if info.attempt_count > rule.max_attempts {
            warn!(
                category = %rule.category,
                source,
                attempts = info.attempt_count,
                "rate limit exceeded"
            );
            return Err(AppError::RateLimited(
                "too many requests, please try again later".to_owned(),
            ));
        }

        Ok(())
    }

    /// Removes counters older than a day.
    pub async fn cleanup(&self) -> AppResult<u64> {
        let cutoff = Utc::now() - chrono::Duration::hours(24);
        self.repository.cleanup_expired(cutoff).await
    }
}
