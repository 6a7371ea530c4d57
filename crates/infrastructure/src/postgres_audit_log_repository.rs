use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use fieldtrack_application::AuditLogRepository;
use fieldtrack_core::{AppError, AppResult, UserId};
use fieldtrack_domain::{AuditActor, AuditAction, AuditEntryId, AuditLogEntry, ProjectId};

use crate::postgres_item_repository::stored_coordinates;


/// PostgreSQL-backed repository for the per-project audit trail.
///
/// Entries are insert-only; there is no update or delete path.
#[derive(Clone)]
pub struct PostgresAuditLogRepository {
    pool: PgPool,
}

impl PostgresAuditLogRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AuditLogRow {
    id: uuid::Uuid,
    project_id: uuid::Uuid,
    actor_id: Option<uuid::Uuid>,
    actor_username: Option<String>,
    action: String,
    target: String,
    details: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    created_at: DateTime<Utc>,
}

impl TryFrom<AuditLogRow> for AuditLogEntry {
    type Error = AppError;

    fn try_from(row: AuditLogRow) -> Result<Self, Self::Error> {
        let actor = match (row.actor_id, row.actor_username) {
            (Some(user_id), Some(username)) => Some(AuditActor {
                user_id: UserId::from_uuid(user_id),
                username,
            }),
            _ => None,
        };

        Ok(Self {
            id: AuditEntryId::from_uuid(row.id),
            project_id: ProjectId::from_uuid(row.project_id),
            actor,
            action: AuditAction::from(row.action),
            target: row.target,
            details: row.details,
            gps: stored_coordinates(row.latitude, row.longitude)?,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl AuditLogRepository for PostgresAuditLogRepository {
    async fn append_entry(&self, entry: AuditLogEntry) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_log_entries (
                id,
                project_id,
                actor_id,
                actor_username,
                action,
                target,
                details,
                latitude,
                longitude,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(entry.id.as_uuid())
        .bind(entry.project_id.as_uuid())
        .bind(entry.actor.as_ref().map(|actor| actor.user_id.as_uuid()))
        .bind(entry.actor.as_ref().map(|actor| actor.username.as_str()))
        .bind(entry.action.as_str())
        .bind(entry.target.as_str())
        .bind(entry.details.as_str())
        .bind(entry.gps.map(|gps| gps.latitude()))
        .bind(entry.gps.map(|gps| gps.longitude()))
        .bind(entry.created_at)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to append audit entry: {error}")))?;

        Ok(())
    }

    async fn list_project_entries(&self, project_id: ProjectId) -> AppResult<Vec<AuditLogEntry>> {
        sqlx::query_as::<_, AuditLogRow>(
            r#"
            SELECT
                id,
                project_id,
                actor_id,
                actor_username,
                action,
                target,
                details,
                latitude,
                longitude,
                created_at
            FROM audit_log_entries
            WHERE project_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(project_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list audit log entries: {error}"))
        })?
        .into_iter()
        .map(AuditLogEntry::try_from)
        .collect()
    }
}
