use std::collections::{BTreeSet, HashSet};

use fieldtrack_core::{AppError, AppResult, UserId, UserIdentity, UserRole};
use fieldtrack_domain::{
    AuditAction, AuditRecord, Client, ClientId, FieldDefinitionId, FieldKind, ItemFieldDefinition,
    ItemFieldSchema, Project, ProjectId, ProjectType, ProjectTypeId, StageDefinition, StageId,
};

use crate::service_support::audit_actor;

use super::ProjectService;

/// Stage of a new project type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageInput {
    /// Display name.
    pub name: String,
    /// Unique position.
    pub order: u32,
    /// Whether the stage counts towards completion.
    pub is_required: bool,
}

/// Input for creating a project type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProjectTypeInput {
    /// Template name.
    pub name: String,
    /// Item unit label.
    pub unit_name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Stages in any order.
    pub stages: Vec<StageInput>,
}

/// Input for creating a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProjectInput {
    /// Project name.
    pub name: String,
    /// Workflow template.
    pub project_type_id: ProjectTypeId,
    /// Owning client.
    pub client_id: Option<ClientId>,
    /// Contractors assigned from the start.
    pub contractors: Vec<UserId>,
}

/// One custom question of a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinitionInput {
    /// Question label.
    pub label: String,
    /// Input kind.
    pub kind: FieldKind,
    /// Whether answers bucket items.
    pub is_grouping_key: bool,
    /// Whether every new item must answer.
    pub is_required: bool,
}

impl ProjectService {
    /// Creates a client organisation with its own dashboard link.
    pub async fn create_client(&self, actor: &UserIdentity, name: &str) -> AppResult<Client> {
        self.access.require_admin(actor, None, "create clients").await?;

        let client = Client::new(name, chrono::Utc::now())?;
        self.projects.insert_client(client.clone()).await?;
        Ok(client)
    }

    /// Lists client organisations.
    pub async fn list_clients(&self, actor: &UserIdentity) -> AppResult<Vec<Client>> {
        self.access.require_admin(actor, None, "list clients").await?;
        self.projects.list_clients().await
    }

    /// Creates a workflow template.
    pub async fn create_project_type(
        &self,
        actor: &UserIdentity,
        input: CreateProjectTypeInput,
    ) -> AppResult<ProjectType> {
        self.access
            .require_admin(actor, None, "create project types")
            .await?;
        if input.stages.is_empty() {
            return Err(AppError::Validation(
                "a project type needs at least one stage".to_owned(),
            ));
        }

        let stages = input
            .stages
            .into_iter()
            .map(|stage| StageDefinition::new(StageId::new(), stage.name, stage.order, stage.is_required))
            .collect::<AppResult<Vec<_>>>()?;
        let project_type = ProjectType::new(
            ProjectTypeId::new(),
            input.name,
            input.unit_name,
            input.description,
            stages,
        )?;

        self.projects
            .insert_project_type(project_type.clone())
            .await?;
        Ok(project_type)
    }

    /// Lists workflow templates.
    pub async fn list_project_types(&self, actor: &UserIdentity) -> AppResult<Vec<ProjectType>> {
        self.access
            .require_admin(actor, None, "list project types")
            .await?;
        self.projects.list_project_types().await
    }

    /// Creates an active project with a fresh magic link.
    pub async fn create_project(
        &self,
        actor: &UserIdentity,
        input: CreateProjectInput,
    ) -> AppResult<Project> {
        self.access.require_admin(actor, None, "create projects").await?;

        if self
            .projects
            .find_project_type(input.project_type_id)
            .await?
            .is_none()
        {
            return Err(AppError::Validation(format!(
                "project type '{}' does not exist",
                input.project_type_id
            )));
        }
        if let Some(client_id) = input.client_id
            && self.projects.find_client(client_id).await?.is_none()
        {
            return Err(AppError::Validation(format!(
                "client '{client_id}' does not exist"
            )));
        }

        let mut project = Project::new(
            input.name,
            input.project_type_id,
            input.client_id,
            chrono::Utc::now(),
        )?;
        for contractor in input.contractors {
            self.require_contractor(contractor).await?;
            project.assign_contractor(contractor);
        }

        self.projects.insert_project(project.clone()).await?;

        self.audit
            .record(AuditRecord {
                project_id: project.id(),
                actor: Some(audit_actor(actor)),
                action: AuditAction::ProjectCreated,
                target: project.name().to_owned(),
                details: format!(
                    "{} contractor(s) assigned",
                    project.contractors().len()
                ),
                gps: None,
            })
            .await;

        Ok(project)
    }

    /// Assigns a contractor to a project.
    pub async fn assign_contractor(
        &self,
        actor: &UserIdentity,
        project_id: ProjectId,
        contractor: UserId,
    ) -> AppResult<Project> {
        self.access
            .require_admin(actor, Some(project_id), "assign contractors")
            .await?;
        let mut project = self.access.authorize_project(actor, project_id).await?;
        let username = self.require_contractor(contractor).await?;

        if project.assign_contractor(contractor) {
            self.projects.save_project(&project).await?;
            self.audit
                .record(AuditRecord {
                    project_id,
                    actor: Some(audit_actor(actor)),
                    action: AuditAction::ContractorAssigned,
                    target: username,
                    details: format!("Assigned to {}", project.name()),
                    gps: None,
                })
                .await;
        }

        Ok(project)
    }

    /// Removes a contractor from a project.
    pub async fn unassign_contractor(
        &self,
        actor: &UserIdentity,
        project_id: ProjectId,
        contractor: UserId,
    ) -> AppResult<Project> {
        self.access
            .require_admin(actor, Some(project_id), "unassign contractors")
            .await?;
        let mut project = self.access.authorize_project(actor, project_id).await?;

        if project.unassign_contractor(contractor) {
            self.projects.save_project(&project).await?;
            self.audit
                .record(AuditRecord {
                    project_id,
                    actor: Some(audit_actor(actor)),
                    action: AuditAction::ContractorUnassigned,
                    target: contractor.to_string(),
                    details: format!("Removed from {}", project.name()),
                    gps: None,
                })
                .await;
        }

        Ok(project)
    }

    /// Signs a project off. The transition is one-way and admin only.
    pub async fn mark_project_completed(
        &self,
        actor: &UserIdentity,
        project_id: ProjectId,
    ) -> AppResult<Project> {
        self.access
            .require_admin(actor, Some(project_id), "mark projects completed")
            .await?;
        let mut project = self.access.authorize_project(actor, project_id).await?;

        project.mark_completed()?;
        self.projects.save_project(&project).await?;

        self.audit
            .record(AuditRecord {
                project_id,
                actor: Some(audit_actor(actor)),
                action: AuditAction::ProjectCompleted,
                target: project.name().to_owned(),
                details: "Project status set to COMPLETED".to_owned(),
                gps: None,
            })
            .await;

        Ok(project)
    }

    /// Replaces the custom questions of a project that has no items yet.
    pub async fn configure_fields(
        &self,
        actor: &UserIdentity,
        project_id: ProjectId,
        fields: Vec<FieldDefinitionInput>,
    ) -> AppResult<Vec<ItemFieldDefinition>> {
        self.access
            .require_admin(actor, Some(project_id), "configure item fields")
            .await?;
        let project = self.access.authorize_project(actor, project_id).await?;

        if self.items.count_items(project_id).await? > 0 {
            return Err(AppError::Conflict(format!(
                "project '{}' already has items, its fields can no longer change",
                project.name()
            )));
        }

        let definitions = fields
            .into_iter()
            .map(|field| {
                ItemFieldDefinition::new(
                    FieldDefinitionId::new(),
                    project_id,
                    field.label,
                    field.kind,
                    field.is_grouping_key,
                )
                .map(|definition| definition.with_required(field.is_required))
            })
            .collect::<AppResult<Vec<_>>>()?;
        let schema = ItemFieldSchema::new(definitions)?;

        let mut labels = HashSet::new();
        for definition in schema.definitions() {
            if !labels.insert(definition.label().to_lowercase()) {
                return Err(AppError::Validation(format!(
                    "field label '{}' is used more than once",
                    definition.label()
                )));
            }
        }

        let headers = self.data_files.headers(&project).await;
        if !headers.is_empty()
            && let Some(column) = schema
                .definitions()
                .iter()
                .filter_map(|definition| definition.kind().column())
                .find(|column| !headers.iter().any(|header| header == column))
        {
            return Err(AppError::Validation(format!(
                "column '{column}' is not present in the project data file"
            )));
        }

        let definitions = schema.definitions().to_vec();
        self.projects
            .replace_field_definitions(project_id, definitions.clone())
            .await?;

        self.audit
            .record(AuditRecord {
                project_id,
                actor: Some(audit_actor(actor)),
                action: AuditAction::FieldsConfigured,
                target: project.name().to_owned(),
                details: definitions
                    .iter()
                    .map(|definition| definition.label().to_owned())
                    .collect::<Vec<_>>()
                    .join(", "),
                gps: None,
            })
            .await;

        Ok(definitions)
    }

    /// Stores a CSV or XLSX file as the project's dropdown source.
    pub async fn attach_data_file(
        &self,
        actor: &UserIdentity,
        project_id: ProjectId,
        filename: &str,
        bytes: Vec<u8>,
    ) -> AppResult<Project> {
        self.access
            .require_admin(actor, Some(project_id), "upload data files")
            .await?;
        let mut project = self.access.authorize_project(actor, project_id).await?;

        let data_file = self.data_files.store(filename, bytes).await?;
        let filename = data_file.filename.clone();
        let replaced = project.attach_data_file(data_file);
        self.projects.save_project(&project).await?;

        let details = match &replaced {
            Some(previous) => format!("Replaced {} with {filename}", previous.filename),
            None => format!("Attached {filename}"),
        };
        if let Some(previous) = replaced {
            self.data_files.discard(&project, &previous).await;
        }

        self.audit
            .record(AuditRecord {
                project_id,
                actor: Some(audit_actor(actor)),
                action: AuditAction::DataFileUploaded,
                target: project.name().to_owned(),
                details,
                gps: None,
            })
            .await;

        Ok(project)
    }

    /// Returns the column headers of the project's data file. Admin only.
    pub async fn data_file_headers(
        &self,
        actor: &UserIdentity,
        project_id: ProjectId,
    ) -> AppResult<Vec<String>> {
        self.access
            .require_admin(actor, Some(project_id), "read data file headers")
            .await?;
        let project = self.access.authorize_project(actor, project_id).await?;
        Ok(self.data_files.headers(&project).await)
    }

    /// Returns the dropdown options of one field.
    pub async fn field_options(
        &self,
        actor: &UserIdentity,
        project_id: ProjectId,
        field_id: FieldDefinitionId,
    ) -> AppResult<BTreeSet<String>> {
        let project = self.access.authorize_project(actor, project_id).await?;
        let definition = self
            .projects
            .list_field_definitions(project_id)
            .await?
            .into_iter()
            .find(|definition| definition.id() == field_id)
            .ok_or_else(|| AppError::NotFound(format!("field '{field_id}' does not exist")))?;

        match definition.kind().column() {
            Some(column) => Ok(self.data_files.column_values(&project, column).await),
            None => Ok(BTreeSet::new()),
        }
    }

    async fn require_contractor(&self, user_id: UserId) -> AppResult<String> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::Validation(format!("user '{user_id}' does not exist")))?;
        if user.role != UserRole::Contractor {
            return Err(AppError::Validation(format!(
                "user '{}' is not a contractor",
                user.username
            )));
        }
        Ok(user.username)
    }
}
