//! PostgreSQL rate limit counters shared by every API instance.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use fieldtrack_application::{AttemptInfo, RateLimitRepository};
use fieldtrack_core::{AppError, AppResult};

/// Fixed-window counters stored in `rate_limit_counters`.
#[derive(Clone)]
pub struct PostgresRateLimitRepository {
    pool: PgPool,
}

impl PostgresRateLimitRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RateLimitRepository for PostgresRateLimitRepository {
    async fn record_attempt(
        &self,
        key: &str,
        window_duration_seconds: i64,
    ) -> AppResult<AttemptInfo> {
        if window_duration_seconds <= 0 {
            return Err(AppError::Validation(format!(
                "rate limit window for '{key}' must be positive"
            )));
        }

        // The upsert holds the row lock, so concurrent hits on one bucket serialize.
        let (hits, window_started_at) = sqlx::query_as::<_, (i32, DateTime<Utc>)>(
            r#"
            INSERT INTO rate_limit_counters AS counter (bucket, window_started_at, hits)
            VALUES ($1, now(), 1)
            ON CONFLICT (bucket) DO UPDATE
            SET
                hits = CASE
                    WHEN counter.window_started_at + $2::float8 * INTERVAL '1 second' <= now()
                    THEN 1
                    ELSE counter.hits + 1
                END,
                window_started_at = CASE
                    WHEN counter.window_started_at + $2::float8 * INTERVAL '1 second' <= now()
                    THEN now()
                    ELSE counter.window_started_at
                END
            RETURNING hits, window_started_at
            "#,
        )
        .bind(key)
        .bind(window_duration_seconds)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to count request for bucket '{key}': {error}"))
        })?;

        Ok(AttemptInfo {
            attempt_count: hits,
            window_started_at,
        })
    }

    async fn cleanup_expired(&self, before: DateTime<Utc>) -> AppResult<u64> {
        sqlx::query("DELETE FROM rate_limit_counters WHERE window_started_at < $1")
            .bind(before)
            .execute(&self.pool)
            .await
            .map(|result| result.rows_affected())
            .map_err(|error| {
                AppError::Internal(format!("failed to prune rate limit counters: {error}"))
            })
    }
}
