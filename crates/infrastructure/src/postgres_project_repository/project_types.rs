use std::collections::HashMap;

use super::*;

impl PostgresProjectRepository {
    pub(super) async fn insert_project_type_impl(&self, project_type: ProjectType) -> AppResult<()> {
        let mut transaction = self.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO project_types (id, name, unit_name, description)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(project_type.id().as_uuid())
        .bind(project_type.name())
        .bind(project_type.unit_name())
        .bind(project_type.description())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to insert project type: {error}")))?;

        for stage in project_type.stages() {
            let order = i32::try_from(stage.order()).map_err(|error| {
                AppError::Validation(format!("stage order {} is too large: {error}", stage.order()))
            })?;
            sqlx::query(
                r#"
                INSERT INTO stage_definitions (id, project_type_id, name, stage_order, is_required)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(stage.id().as_uuid())
            .bind(project_type.id().as_uuid())
            .bind(stage.name())
            .bind(order)
            .bind(stage.is_required())
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                conflict_or_internal(error, "insert stage", "stage order is used more than once")
            })?;
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit project type: {error}"))
        })
    }

    pub(super) async fn find_project_type_impl(
        &self,
        project_type_id: ProjectTypeId,
    ) -> AppResult<Option<ProjectType>> {
        let row = sqlx::query_as::<_, ProjectTypeRow>(
            r#"
            SELECT id, name, unit_name, description
            FROM project_types
            WHERE id = $1
            "#,
        )
        .bind(project_type_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find project type: {error}")))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut assembled = self.assemble_project_types(vec![row]).await?;
        Ok(assembled.pop())
    }

    pub(super) async fn list_project_types_impl(&self) -> AppResult<Vec<ProjectType>> {
        let rows = sqlx::query_as::<_, ProjectTypeRow>(
            r#"
            SELECT id, name, unit_name, description
            FROM project_types
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list project types: {error}")))?;

        self.assemble_project_types(rows).await
    }

    async fn assemble_project_types(&self, rows: Vec<ProjectTypeRow>) -> AppResult<Vec<ProjectType>> {
        let ids = rows.iter().map(|row| row.id).collect::<Vec<_>>();
        let stage_rows = sqlx::query_as::<_, StageRow>(
            r#"
            SELECT id, project_type_id, name, stage_order, is_required
            FROM stage_definitions
            WHERE project_type_id = ANY($1)
            ORDER BY stage_order
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list stages: {error}")))?;

        let mut stages_by_type = HashMap::<uuid::Uuid, Vec<StageDefinition>>::new();
        for stage_row in stage_rows {
            stages_by_type
                .entry(stage_row.project_type_id)
                .or_default()
                .push(StageDefinition::try_from(stage_row)?);
        }

        rows.into_iter()
            .map(|row| {
                ProjectType::new(
                    ProjectTypeId::from_uuid(row.id),
                    row.name,
                    row.unit_name,
                    row.description,
                    stages_by_type.remove(&row.id).unwrap_or_default(),
                )
            })
            .collect()
    }
}
