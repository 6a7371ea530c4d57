use super::*;

impl PostgresProjectRepository {
    pub(super) async fn insert_project_impl(&self, project: Project) -> AppResult<()> {
        let mut transaction = self.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO projects (
                id, name, project_type_id, client_id, client_link, status,
                data_file_key, data_file_name, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(project.id().as_uuid())
        .bind(project.name())
        .bind(project.project_type_id().as_uuid())
        .bind(project.client_id().map(|client_id| client_id.as_uuid()))
        .bind(project.client_link().as_uuid())
        .bind(project.status().as_str())
        .bind(project.data_file().map(|file| file.storage_key.as_str()))
        .bind(project.data_file().map(|file| file.filename.as_str()))
        .bind(project.created_at())
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            conflict_or_internal(error, "insert project", "project link already exists")
        })?;

        replace_contractors(&mut transaction, &project).await?;

        transaction
            .commit()
            .await
            .map_err(|error| AppError::Internal(format!("failed to commit project: {error}")))
    }

    pub(super) async fn save_project_impl(&self, project: &Project) -> AppResult<()> {
        let mut transaction = self.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE projects
            SET status = $2, data_file_key = $3, data_file_name = $4
            WHERE id = $1
            "#,
        )
        .bind(project.id().as_uuid())
        .bind(project.status().as_str())
        .bind(project.data_file().map(|file| file.storage_key.as_str()))
        .bind(project.data_file().map(|file| file.filename.as_str()))
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to save project: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "project '{}' does not exist",
                project.id()
            )));
        }

        replace_contractors(&mut transaction, project).await?;

        transaction
            .commit()
            .await
            .map_err(|error| AppError::Internal(format!("failed to commit project: {error}")))
    }

    pub(super) async fn find_project_impl(
        &self,
        project_id: ProjectId,
    ) -> AppResult<Option<Project>> {
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            "{PROJECT_SELECT} WHERE p.id = $1 GROUP BY p.id"
        ))
        .bind(project_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find project: {error}")))?;

        row.map(Project::try_from).transpose()
    }

    pub(super) async fn find_project_by_link_impl(
        &self,
        link: ClientLink,
    ) -> AppResult<Option<Project>> {
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            "{PROJECT_SELECT} WHERE p.client_link = $1 GROUP BY p.id"
        ))
        .bind(link.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find project by link: {error}")))?;

        row.map(Project::try_from).transpose()
    }

    pub(super) async fn list_projects_impl(&self) -> AppResult<Vec<Project>> {
        let rows = sqlx::query_as::<_, ProjectRow>(&format!(
            "{PROJECT_SELECT} GROUP BY p.id ORDER BY p.created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list projects: {error}")))?;

        rows.into_iter().map(Project::try_from).collect()
    }

    pub(super) async fn list_projects_for_contractor_impl(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<Project>> {
        let rows = sqlx::query_as::<_, ProjectRow>(&format!(
            r#"{PROJECT_SELECT}
            WHERE EXISTS (
                SELECT 1 FROM project_contractors assigned
                WHERE assigned.project_id = p.id AND assigned.user_id = $1
            )
            GROUP BY p.id
            ORDER BY p.created_at DESC"#
        ))
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list contractor projects: {error}"))
        })?;

        rows.into_iter().map(Project::try_from).collect()
    }

    pub(super) async fn list_projects_for_client_impl(
        &self,
        client_id: ClientId,
    ) -> AppResult<Vec<Project>> {
        let rows = sqlx::query_as::<_, ProjectRow>(&format!(
            "{PROJECT_SELECT} WHERE p.client_id = $1 GROUP BY p.id ORDER BY p.created_at DESC"
        ))
        .bind(client_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list client projects: {error}")))?;

        rows.into_iter().map(Project::try_from).collect()
    }
}

async fn replace_contractors(
    transaction: &mut Transaction<'_, Postgres>,
    project: &Project,
) -> AppResult<()> {
    sqlx::query("DELETE FROM project_contractors WHERE project_id = $1")
        .bind(project.id().as_uuid())
        .execute(&mut **transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to clear contractors: {error}")))?;

    let contractor_ids = project
        .contractors()
        .iter()
        .map(UserId::as_uuid)
        .collect::<Vec<_>>();
    if contractor_ids.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO project_contractors (project_id, user_id)
        SELECT $1, contractor_id FROM UNNEST($2::UUID[]) AS contractor_id
        "#,
    )
    .bind(project.id().as_uuid())
    .bind(&contractor_ids)
    .execute(&mut **transaction)
    .await
    .map_err(|error| AppError::Internal(format!("failed to assign contractors: {error}")))?;

    Ok(())
}
