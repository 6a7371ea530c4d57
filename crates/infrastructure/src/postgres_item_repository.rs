//! PostgreSQL-backed repositories for items, evidence and issues.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use fieldtrack_application::{EvidenceRepository, IssueRepository, ItemRepository};
use fieldtrack_core::{AppError, AppResult, UserId};
use fieldtrack_domain::{
    EvidenceId, EvidenceRecord, FieldDefinitionId, GpsCoordinates, Issue, IssueId, Item,
    ItemFieldValue, ItemId, ProjectId, StageId,
};

mod evidence;
mod issues;

#[cfg(test)]
mod tests;

/// PostgreSQL implementation of the item, evidence and issue ports.
#[derive(Clone)]
pub struct PostgresItemRepository {
    pool: PgPool,
}

impl PostgresItemRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ItemRow {
    id: uuid::Uuid,
    project_id: uuid::Uuid,
    identifier: String,
    is_completed: bool,
    created_by: Option<uuid::Uuid>,
    created_at: DateTime<Utc>,
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Self {
            id: ItemId::from_uuid(row.id),
            project_id: ProjectId::from_uuid(row.project_id),
            identifier: row.identifier,
            is_completed: row.is_completed,
            created_by: row.created_by.map(UserId::from_uuid),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct FieldValueRow {
    item_id: uuid::Uuid,
    field_id: uuid::Uuid,
    value: String,
}

impl From<FieldValueRow> for ItemFieldValue {
    fn from(row: FieldValueRow) -> Self {
        Self {
            item_id: ItemId::from_uuid(row.item_id),
            field_id: FieldDefinitionId::from_uuid(row.field_id),
            value: row.value,
        }
    }
}

/// Rebuilds stored coordinates; a half-populated pair is treated as absent.
pub(crate) fn stored_coordinates(
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> AppResult<Option<GpsCoordinates>> {
    match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => GpsCoordinates::new(latitude, longitude).map(Some),
        _ => Ok(None),
    }
}

fn count_from_row(count: i64) -> AppResult<u64> {
    u64::try_from(count)
        .map_err(|error| AppError::Internal(format!("invalid row count {count}: {error}")))
}

#[async_trait]
impl ItemRepository for PostgresItemRepository {
    async fn insert_item(&self, item: Item) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO items (id, project_id, identifier, is_completed, created_by, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(item.id.as_uuid())
        .bind(item.project_id.as_uuid())
        .bind(item.identifier.as_str())
        .bind(item.is_completed)
        .bind(item.created_by.map(|user_id| user_id.as_uuid()))
        .bind(item.created_at)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to insert item: {error}")))?;

        Ok(())
    }

    async fn find_item(&self, item_id: ItemId) -> AppResult<Option<Item>> {
        let row = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT id, project_id, identifier, is_completed, created_by, created_at
            FROM items
            WHERE id = $1
            "#,
        )
        .bind(item_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find item: {error}")))?;

        Ok(row.map(Item::from))
    }

    async fn list_items(&self, project_id: ProjectId) -> AppResult<Vec<Item>> {
        let rows = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT id, project_id, identifier, is_completed, created_by, created_at
            FROM items
            WHERE project_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(project_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list items: {error}")))?;

        Ok(rows.into_iter().map(Item::from).collect())
    }

    async fn count_items(&self, project_id: ProjectId) -> AppResult<u64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM items WHERE project_id = $1")
            .bind(project_id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to count items: {error}")))?;

        count_from_row(count)
    }

    async fn count_completed_items(&self, project_id: ProjectId) -> AppResult<u64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM items WHERE project_id = $1 AND is_completed",
        )
        .bind(project_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to count completed items: {error}"))
        })?;

        count_from_row(count)
    }

    async fn save_field_values(&self, values: Vec<ItemFieldValue>) -> AppResult<()> {
        if values.is_empty() {
            return Ok(());
        }

        let item_ids = values
            .iter()
            .map(|value| value.item_id.as_uuid())
            .collect::<Vec<_>>();
        let field_ids = values
            .iter()
            .map(|value| value.field_id.as_uuid())
            .collect::<Vec<_>>();
        let texts = values
            .into_iter()
            .map(|value| value.value)
            .collect::<Vec<_>>();

        sqlx::query(
            r#"
            INSERT INTO item_field_values (item_id, field_id, value)
            SELECT * FROM UNNEST($1::UUID[], $2::UUID[], $3::TEXT[])
            ON CONFLICT (item_id, field_id) DO UPDATE SET value = EXCLUDED.value
            "#,
        )
        .bind(&item_ids)
        .bind(&field_ids)
        .bind(&texts)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to save field values: {error}")))?;

        Ok(())
    }

    async fn list_field_values(&self, item_id: ItemId) -> AppResult<Vec<ItemFieldValue>> {
        let rows = sqlx::query_as::<_, FieldValueRow>(
            r#"
            SELECT v.item_id, v.field_id, v.value
            FROM item_field_values v
            JOIN item_field_definitions d ON d.id = v.field_id
            WHERE v.item_id = $1
            ORDER BY d.position
            "#,
        )
        .bind(item_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list field values: {error}")))?;

        Ok(rows.into_iter().map(ItemFieldValue::from).collect())
    }

    async fn list_project_field_values(
        &self,
        project_id: ProjectId,
        field_id: FieldDefinitionId,
    ) -> AppResult<Vec<ItemFieldValue>> {
        let rows = sqlx::query_as::<_, FieldValueRow>(
            r#"
            SELECT v.item_id, v.field_id, v.value
            FROM item_field_values v
            JOIN items i ON i.id = v.item_id
            WHERE i.project_id = $1 AND v.field_id = $2
            "#,
        )
        .bind(project_id.as_uuid())
        .bind(field_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list project field values: {error}"))
        })?;

        Ok(rows.into_iter().map(ItemFieldValue::from).collect())
    }

    async fn count_items_with_field_value(
        &self,
        project_id: ProjectId,
        field_id: FieldDefinitionId,
        value: &str,
    ) -> AppResult<u64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM item_field_values v
            JOIN items i ON i.id = v.item_id
            WHERE i.project_id = $1 AND v.field_id = $2 AND v.value = $3
            "#,
        )
        .bind(project_id.as_uuid())
        .bind(field_id.as_uuid())
        .bind(value)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to count items by field value: {error}"))
        })?;

        count_from_row(count)
    }

    async fn try_assign_identifier(&self, item_id: ItemId, identifier: &str) -> AppResult<bool> {
        // The (project_id, identifier) unique constraint arbitrates races.
        let result = sqlx::query("UPDATE items SET identifier = $2 WHERE id = $1")
            .bind(item_id.as_uuid())
            .bind(identifier)
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) if done.rows_affected() == 0 => Err(AppError::NotFound(format!(
                "item '{item_id}' does not exist"
            ))),
            Ok(_) => Ok(true),
            Err(sqlx::Error::Database(database_error))
                if database_error.code().as_deref() == Some("23505") =>
            {
                Ok(false)
            }
            Err(error) => Err(AppError::Internal(format!(
                "failed to assign item identifier: {error}"
            ))),
        }
    }

    async fn set_item_completion(&self, item_id: ItemId, is_completed: bool) -> AppResult<()> {
        sqlx::query("UPDATE items SET is_completed = $2 WHERE id = $1")
            .bind(item_id.as_uuid())
            .bind(is_completed)
            .execute(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to update item completion: {error}"))
            })?;

        Ok(())
    }
}
