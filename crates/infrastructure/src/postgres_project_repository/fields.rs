use super::*;

impl PostgresProjectRepository {
    pub(super) async fn replace_field_definitions_impl(
        &self,
        project_id: ProjectId,
        definitions: Vec<ItemFieldDefinition>,
    ) -> AppResult<()> {
        let mut transaction = self.begin().await?;

        sqlx::query("DELETE FROM item_field_definitions WHERE project_id = $1")
            .bind(project_id.as_uuid())
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to clear field definitions: {error}"))
            })?;

        for (position, definition) in definitions.iter().enumerate() {
            let position = i32::try_from(position).map_err(|error| {
                AppError::Validation(format!("too many field definitions: {error}"))
            })?;
            sqlx::query(
                r#"
                INSERT INTO item_field_definitions (
                    id, project_id, position, label, kind, source_column, is_grouping_key,
                    is_required
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(definition.id().as_uuid())
            .bind(project_id.as_uuid())
            .bind(position)
            .bind(definition.label())
            .bind(definition.kind().as_str())
            .bind(definition.kind().column())
            .bind(definition.is_grouping_key())
            .bind(definition.is_required())
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                conflict_or_internal(
                    error,
                    "insert field definition",
                    "a project may have only one grouping field",
                )
            })?;
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit field definitions: {error}"))
        })
    }

    pub(super) async fn list_field_definitions_impl(
        &self,
        project_id: ProjectId,
    ) -> AppResult<Vec<ItemFieldDefinition>> {
        sqlx::query_as::<_, FieldDefinitionRow>(
            r#"
            SELECT id, project_id, label, kind, source_column, is_grouping_key, is_required
            FROM item_field_definitions
            WHERE project_id = $1
            ORDER BY position
            "#,
        )
        .bind(project_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list field definitions: {error}"))
        })?
        .into_iter()
        .map(ItemFieldDefinition::try_from)
        .collect()
    }
}
