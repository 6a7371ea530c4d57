//! Redis-backed rate limit counters shared across API instances.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use redis::Script;
use redis::aio::ConnectionManager;

use fieldtrack_application::{AttemptInfo, RateLimitRepository};
use fieldtrack_core::{AppError, AppResult};

/// Increments the counter and arms its expiry in one round trip.
///
/// Returns the attempt count and the epoch second at which the window began.
const RECORD_ATTEMPT_SCRIPT: &str = r#"
local count = redis.call('INCR', KEYS[1])
local ttl = redis.call('TTL', KEYS[1])
local window = tonumber(ARGV[1])

if ttl < 0 then
  redis.call('EXPIRE', KEYS[1], window)
  ttl = window
end

return {count, tonumber(ARGV[2]) - (window - ttl)}
"#;

/// Redis implementation of the rate limit repository port.
#[derive(Clone)]
pub struct RedisRateLimitRepository {
    connection: ConnectionManager,
    script: Script,
    key_prefix: String,
}

impl RedisRateLimitRepository {
    /// Connects to Redis and prepares the counter script.
    pub async fn connect(redis_url: &str, key_prefix: impl Into<String>) -> AppResult<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|error| AppError::Validation(format!("invalid REDIS_URL: {error}")))?;
        let connection = ConnectionManager::new(client)
            .await
            .map_err(|error| AppError::Internal(format!("failed to connect to redis: {error}")))?;

        Ok(Self {
            connection,
            script: Script::new(RECORD_ATTEMPT_SCRIPT),
            key_prefix: key_prefix.into(),
        })
    }
}

#[async_trait]
impl RateLimitRepository for RedisRateLimitRepository {
    async fn record_attempt(
        &self,
        key: &str,
        window_duration_seconds: i64,
    ) -> AppResult<AttemptInfo> {
        let window = i32::try_from(window_duration_seconds)
            .ok()
            .filter(|window| *window > 0)
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "rate limit window of {window_duration_seconds} seconds is not supported"
                ))
            })?;

        let mut connection = self.connection.clone();
        let (attempt_count, window_started_epoch): (i64, i64) = self
            .script
            .key(format!("{}:{key}", self.key_prefix))
            .arg(window)
            .arg(Utc::now().timestamp())
            .invoke_async(&mut connection)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to record redis rate limit attempt: {error}"))
            })?;

        Ok(AttemptInfo {
            attempt_count: i32::try_from(attempt_count).unwrap_or(i32::MAX),
            window_started_at: Utc
                .timestamp_opt(window_started_epoch, 0)
                .single()
                .ok_or_else(|| {
                    AppError::Internal(format!(
                        "invalid redis window start timestamp: {window_started_epoch}"
                    ))
                })?,
        })
    }

    async fn cleanup_expired(&self, _before: DateTime<Utc>) -> AppResult<u64> {
        // Keys carry a TTL.
        Ok(0)
    }
}
