use std::sync::Arc;

use fieldtrack_application::RateLimitRepository;
use fieldtrack_core::AppResult;
use fieldtrack_infrastructure::{
    InMemoryRateLimitRepository, PostgresRateLimitRepository, RedisRateLimitRepository,
};
use sqlx::PgPool;

use crate::api_config::{ApiConfig, RateLimitStoreConfig};

pub(super) async fn build_rate_limit_repository(
    pool: &PgPool,
    config: &ApiConfig,
) -> AppResult<Arc<dyn RateLimitRepository>> {
    Ok(match &config.rate_limit_store {
        RateLimitStoreConfig::Memory => Arc::new(InMemoryRateLimitRepository::new()),
        RateLimitStoreConfig::Postgres => Arc::new(PostgresRateLimitRepository::new(pool.clone())),
        RateLimitStoreConfig::Redis { url } => {
            Arc::new(RedisRateLimitRepository::connect(url, "fieldtrack:rate_limit").await?)
        }
    })
}
