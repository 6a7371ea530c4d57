use async_trait::async_trait;
use sqlx::PgPool;

use fieldtrack_application::{SecurityEvent, SecurityEventRepository};
use fieldtrack_core::{AppError, AppResult};

/// PostgreSQL-backed repository for access-denial events.
#[derive(Clone)]
pub struct PostgresSecurityEventRepository {
    pool: PgPool,
}

impl PostgresSecurityEventRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SecurityEventRepository for PostgresSecurityEventRepository {
    async fn append_event(&self, event: SecurityEvent) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO security_events (user_id, project_id, event_type, detail)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(event.user_id.map(|user_id| user_id.as_uuid()))
        .bind(event.project_id.map(|project_id| project_id.as_uuid()))
        .bind(event.event_type)
        .bind(event.detail)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to append security event: {error}"))
        })?;

        Ok(())
    }
}
