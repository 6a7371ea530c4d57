use super::*;

#[derive(Debug, FromRow)]
struct EvidenceRow {
    id: uuid::Uuid,
    item_id: uuid::Uuid,
    stage_id: uuid::Uuid,
    image_key: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    captured_at: DateTime<Utc>,
    uploaded_by: Option<uuid::Uuid>,
}

impl TryFrom<EvidenceRow> for EvidenceRecord {
    type Error = AppError;

    fn try_from(row: EvidenceRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: EvidenceId::from_uuid(row.id),
            item_id: ItemId::from_uuid(row.item_id),
            stage_id: StageId::from_uuid(row.stage_id),
            image_key: row.image_key,
            gps: stored_coordinates(row.latitude, row.longitude)?,
            captured_at: row.captured_at,
            uploaded_by: row.uploaded_by.map(UserId::from_uuid),
        })
    }
}

fn into_records(rows: Vec<EvidenceRow>) -> AppResult<Vec<EvidenceRecord>> {
    rows.into_iter().map(EvidenceRecord::try_from).collect()
}

#[async_trait]
impl EvidenceRepository for PostgresItemRepository {
    async fn list_item_evidence(&self, item_id: ItemId) -> AppResult<Vec<EvidenceRecord>> {
        let rows = sqlx::query_as::<_, EvidenceRow>(
            r#"
            SELECT id, item_id, stage_id, image_key, latitude, longitude, captured_at, uploaded_by
            FROM evidence_records
            WHERE item_id = $1
            "#,
        )
        .bind(item_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list item evidence: {error}")))?;

        into_records(rows)
    }

    async fn list_project_evidence(
        &self,
        project_id: ProjectId,
    ) -> AppResult<Vec<EvidenceRecord>> {
        let rows = sqlx::query_as::<_, EvidenceRow>(
            r#"
            SELECT e.id, e.item_id, e.stage_id, e.image_key, e.latitude, e.longitude,
                   e.captured_at, e.uploaded_by
            FROM evidence_records e
            JOIN items i ON i.id = e.item_id
            WHERE i.project_id = $1
            "#,
        )
        .bind(project_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list project evidence: {error}"))
        })?;

        into_records(rows)
    }

    async fn find_evidence(
        &self,
        item_id: ItemId,
        stage_id: StageId,
    ) -> AppResult<Option<EvidenceRecord>> {
        let row = sqlx::query_as::<_, EvidenceRow>(
            r#"
            SELECT id, item_id, stage_id, image_key, latitude, longitude, captured_at, uploaded_by
            FROM evidence_records
            WHERE item_id = $1 AND stage_id = $2
            "#,
        )
        .bind(item_id.as_uuid())
        .bind(stage_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find evidence: {error}")))?;

        row.map(EvidenceRecord::try_from).transpose()
    }

    async fn insert_evidence(&self, record: EvidenceRecord) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO evidence_records (
                id, item_id, stage_id, image_key, latitude, longitude, captured_at, uploaded_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.item_id.as_uuid())
        .bind(record.stage_id.as_uuid())
        .bind(record.image_key.as_str())
        .bind(record.gps.map(|gps| gps.latitude()))
        .bind(record.gps.map(|gps| gps.longitude()))
        .bind(record.captured_at)
        .bind(record.uploaded_by.map(|user_id| user_id.as_uuid()))
        .execute(&self.pool)
        .await
        .map_err(|error| {
            if let sqlx::Error::Database(ref database_error) = error
                && database_error.code().as_deref() == Some("23505")
            {
                return AppError::Conflict(format!(
                    "stage '{}' of item '{}' already has evidence",
                    record.stage_id, record.item_id
                ));
            }
            AppError::Internal(format!("failed to insert evidence: {error}"))
        })?;

        Ok(())
    }

    async fn delete_evidence(
        &self,
        item_id: ItemId,
        stage_id: StageId,
    ) -> AppResult<Option<EvidenceRecord>> {
        let row = sqlx::query_as::<_, EvidenceRow>(
            r#"
            DELETE FROM evidence_records
            WHERE item_id = $1 AND stage_id = $2
            RETURNING id, item_id, stage_id, image_key, latitude, longitude, captured_at, uploaded_by
            "#,
        )
        .bind(item_id.as_uuid())
        .bind(stage_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete evidence: {error}")))?;

        row.map(EvidenceRecord::try_from).transpose()
    }
}
