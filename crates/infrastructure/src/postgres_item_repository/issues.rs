use super::*;

#[derive(Debug, FromRow)]
struct IssueRow {
    id: uuid::Uuid,
    project_id: uuid::Uuid,
    item_id: uuid::Uuid,
    message: String,
    status: String,
    reporter: Option<String>,
    created_at: DateTime<Utc>,
    resolved_by: Option<uuid::Uuid>,
    resolved_at: Option<DateTime<Utc>>,
}

impl TryFrom<IssueRow> for Issue {
    type Error = AppError;

    fn try_from(row: IssueRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: IssueId::from_uuid(row.id),
            project_id: ProjectId::from_uuid(row.project_id),
            item_id: ItemId::from_uuid(row.item_id),
            message: row.message,
            status: row.status.parse()?,
            reporter: row.reporter,
            created_at: row.created_at,
            resolved_by: row.resolved_by.map(UserId::from_uuid),
            resolved_at: row.resolved_at,
        })
    }
}

#[async_trait]
impl IssueRepository for PostgresItemRepository {
    async fn insert_issue(&self, issue: Issue) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO issues (
                id, project_id, item_id, message, status, reporter,
                created_at, resolved_by, resolved_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(issue.id.as_uuid())
        .bind(issue.project_id.as_uuid())
        .bind(issue.item_id.as_uuid())
        .bind(issue.message.as_str())
        .bind(issue.status.as_str())
        .bind(issue.reporter.as_deref())
        .bind(issue.created_at)
        .bind(issue.resolved_by.map(|user_id| user_id.as_uuid()))
        .bind(issue.resolved_at)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to insert issue: {error}")))?;

        Ok(())
    }

    async fn find_issue(&self, issue_id: IssueId) -> AppResult<Option<Issue>> {
        let row = sqlx::query_as::<_, IssueRow>(
            r#"
            SELECT id, project_id, item_id, message, status, reporter,
                   created_at, resolved_by, resolved_at
            FROM issues
            WHERE id = $1
            "#,
        )
        .bind(issue_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find issue: {error}")))?;

        row.map(Issue::try_from).transpose()
    }

    async fn save_issue(&self, issue: &Issue) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE issues
            SET status = $2, resolved_by = $3, resolved_at = $4
            WHERE id = $1
            "#,
        )
        .bind(issue.id.as_uuid())
        .bind(issue.status.as_str())
        .bind(issue.resolved_by.map(|user_id| user_id.as_uuid()))
        .bind(issue.resolved_at)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to save issue: {error}")))?;

        Ok(())
    }

    async fn list_project_issues(&self, project_id: ProjectId) -> AppResult<Vec<Issue>> {
        sqlx::query_as::<_, IssueRow>(
            r#"
            SELECT id, project_id, item_id, message, status, reporter,
                   created_at, resolved_by, resolved_at
            FROM issues
            WHERE project_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(project_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list issues: {error}")))?
        .into_iter()
        .map(Issue::try_from)
        .collect()
    }
}
