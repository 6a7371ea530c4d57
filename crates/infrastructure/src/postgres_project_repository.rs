//! PostgreSQL-backed repository for clients, project types and projects.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use fieldtrack_application::ProjectRepository;
use fieldtrack_core::{AppError, AppResult, UserId};
use fieldtrack_domain::{
    Client, ClientId, ClientLink, DataFile, FieldDefinitionId, FieldKind, ItemFieldDefinition,
    Project, ProjectId, ProjectParts, ProjectType, ProjectTypeId, StageDefinition, StageId,
};

mod clients;
mod fields;
mod project_types;
mod projects;


/// PostgreSQL implementation of the project repository port.
#[derive(Clone)]
pub struct PostgresProjectRepository {
    pool: PgPool,
}

impl PostgresProjectRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> AppResult<Transaction<'_, Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(|error| AppError::Internal(format!("failed to start transaction: {error}")))
    }
}

#[derive(Debug, FromRow)]
struct ClientRow {
    id: uuid::Uuid,
    name: String,
    link: uuid::Uuid,
    created_at: DateTime<Utc>,
}

impl TryFrom<ClientRow> for Client {
    type Error = AppError;

    fn try_from(row: ClientRow) -> Result<Self, Self::Error> {
        Client::restore(
            ClientId::from_uuid(row.id),
            row.name,
            ClientLink::from_uuid(row.link),
            row.created_at,
        )
    }
}

#[derive(Debug, FromRow)]
struct ProjectTypeRow {
    id: uuid::Uuid,
    name: String,
    unit_name: String,
    description: Option<String>,
}

#[derive(Debug, FromRow)]
struct StageRow {
    id: uuid::Uuid,
    project_type_id: uuid::Uuid,
    name: String,
    stage_order: i32,
    is_required: bool,
}

impl TryFrom<StageRow> for StageDefinition {
    type Error = AppError;

    fn try_from(row: StageRow) -> Result<Self, Self::Error> {
        let order = u32::try_from(row.stage_order).map_err(|error| {
            AppError::Internal(format!("invalid stored stage order {}: {error}", row.stage_order))
        })?;
        StageDefinition::new(StageId::from_uuid(row.id), row.name, order, row.is_required)
    }
}

#[derive(Debug, FromRow)]
struct ProjectRow {
    id: uuid::Uuid,
    name: String,
    project_type_id: uuid::Uuid,
    client_id: Option<uuid::Uuid>,
    client_link: uuid::Uuid,
    status: String,
    data_file_key: Option<String>,
    data_file_name: Option<String>,
    created_at: DateTime<Utc>,
    contractor_ids: Vec<uuid::Uuid>,
}

impl TryFrom<ProjectRow> for Project {
    type Error = AppError;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        let data_file = match (row.data_file_key, row.data_file_name) {
            (Some(storage_key), Some(filename)) => Some(DataFile {
                storage_key,
                filename,
            }),
            _ => None,
        };

        Project::from_parts(ProjectParts {
            id: ProjectId::from_uuid(row.id),
            name: row.name,
            project_type_id: ProjectTypeId::from_uuid(row.project_type_id),
            client_id: row.client_id.map(ClientId::from_uuid),
            client_link: ClientLink::from_uuid(row.client_link),
            status: row.status.parse()?,
            contractors: row
                .contractor_ids
                .into_iter()
                .map(UserId::from_uuid)
                .collect::<BTreeSet<_>>(),
            data_file,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct FieldDefinitionRow {
    id: uuid::Uuid,
    project_id: uuid::Uuid,
    label: String,
    kind: String,
    source_column: Option<String>,
    is_grouping_key: bool,
    is_required: bool,
}

impl TryFrom<FieldDefinitionRow> for ItemFieldDefinition {
    type Error = AppError;

    fn try_from(row: FieldDefinitionRow) -> Result<Self, Self::Error> {
        ItemFieldDefinition::new(
            FieldDefinitionId::from_uuid(row.id),
            ProjectId::from_uuid(row.project_id),
            row.label,
            FieldKind::from_storage(&row.kind, row.source_column)?,
            row.is_grouping_key,
        )
        .map(|definition| definition.with_required(row.is_required))
    }
}

/// Shared projection for project reads; contractors are aggregated per row.
const PROJECT_SELECT: &str = r#"
    SELECT
        p.id,
        p.name,
        p.project_type_id,
        p.client_id,
        p.client_link,
        p.status,
        p.data_file_key,
        p.data_file_name,
        p.created_at,
        COALESCE(
            ARRAY_AGG(pc.user_id ORDER BY pc.user_id) FILTER (WHERE pc.user_id IS NOT NULL),
            '{}'
        ) AS contractor_ids
    FROM projects p
    LEFT JOIN project_contractors pc ON pc.project_id = p.id
"#;

#[async_trait]
impl ProjectRepository for PostgresProjectRepository {
    async fn insert_client(&self, client: Client) -> AppResult<()> {
        self.insert_client_impl(client).await
    }

    async fn find_client(&self, client_id: ClientId) -> AppResult<Option<Client>> {
        self.find_client_impl(client_id).await
    }

    async fn find_client_by_link(&self, link: ClientLink) -> AppResult<Option<Client>> {
        self.find_client_by_link_impl(link).await
    }

    async fn list_clients(&self) -> AppResult<Vec<Client>> {
        self.list_clients_impl().await
    }

    async fn insert_project_type(&self, project_type: ProjectType) -> AppResult<()> {
        self.insert_project_type_impl(project_type).await
    }

    async fn find_project_type(
        &self,
        project_type_id: ProjectTypeId,
    ) -> AppResult<Option<ProjectType>> {
        self.find_project_type_impl(project_type_id).await
    }

    async fn list_project_types(&self) -> AppResult<Vec<ProjectType>> {
        self.list_project_types_impl().await
    }

    async fn insert_project(&self, project: Project) -> AppResult<()> {
        self.insert_project_impl(project).await
    }

    async fn save_project(&self, project: &Project) -> AppResult<()> {
        self.save_project_impl(project).await
    }

    async fn find_project(&self, project_id: ProjectId) -> AppResult<Option<Project>> {
        self.find_project_impl(project_id).await
    }

    async fn find_project_by_link(&self, link: ClientLink) -> AppResult<Option<Project>> {
        self.find_project_by_link_impl(link).await
    }

    async fn list_projects(&self) -> AppResult<Vec<Project>> {
        self.list_projects_impl().await
    }

    async fn list_projects_for_contractor(&self, user_id: UserId) -> AppResult<Vec<Project>> {
        self.list_projects_for_contractor_impl(user_id).await
    }

    async fn list_projects_for_client(&self, client_id: ClientId) -> AppResult<Vec<Project>> {
        self.list_projects_for_client_impl(client_id).await
    }

    async fn replace_field_definitions(
        &self,
        project_id: ProjectId,
        definitions: Vec<ItemFieldDefinition>,
    ) -> AppResult<()> {
        self.replace_field_definitions_impl(project_id, definitions)
            .await
    }

    async fn list_field_definitions(
        &self,
        project_id: ProjectId,
    ) -> AppResult<Vec<ItemFieldDefinition>> {
        self.list_field_definitions_impl(project_id).await
    }
}

fn conflict_or_internal(error: sqlx::Error, operation: &str, conflict: &str) -> AppError {
    if let sqlx::Error::Database(ref database_error) = error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict(conflict.to_owned());
    }

    AppError::Internal(format!("failed to {operation}: {error}"))
}
