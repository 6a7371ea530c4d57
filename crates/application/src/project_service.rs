//! Dashboards, client views and project administration.

use std::sync::Arc;

use fieldtrack_core::AppResult;
use fieldtrack_domain::{Project, project_progress_percent};

use crate::service_support::project_type_of;
use crate::{
    AccessPolicyService, AuditLogService, DataFileService, EvidenceRepository, IssueRepository,
    ItemRepository, ProjectRepository, UserRepository,
};

mod administration;
mod client_views;
mod dashboard;


pub use administration::{
    CreateProjectInput, CreateProjectTypeInput, FieldDefinitionInput, StageInput,
};
pub use client_views::{
    ClientDashboard, ClientProjectView, ItemEvidenceHistory, ItemGroup, StageEvidence,
};
pub use dashboard::{ProjectDetail, ProjectSummary};

/// Collaborators of [`ProjectService`].
pub struct ProjectServiceDependencies {
    /// Access policy.
    pub access: AccessPolicyService,
    /// Audit trail.
    pub audit: AuditLogService,
    /// Data file reader.
    pub data_files: DataFileService,
    /// Project repository.
    pub projects: Arc<dyn ProjectRepository>,
    /// Item repository.
    pub items: Arc<dyn ItemRepository>,
    /// Evidence repository.
    pub evidence: Arc<dyn EvidenceRepository>,
    /// Issue repository.
    pub issues: Arc<dyn IssueRepository>,
    /// User repository, used to validate contractor assignments.
    pub users: Arc<dyn UserRepository>,
}

/// Application service for project-level reads and administration.
#[derive(Clone)]
pub struct ProjectService {
    access: AccessPolicyService,
    audit: AuditLogService,
    data_files: DataFileService,
    projects: Arc<dyn ProjectRepository>,
    items: Arc<dyn ItemRepository>,
    evidence: Arc<dyn EvidenceRepository>,
    issues: Arc<dyn IssueRepository>,
    users: Arc<dyn UserRepository>,
}

impl ProjectService {
    /// Creates a new project service.
    #[must_use]
    pub fn new(dependencies: ProjectServiceDependencies) -> Self {
        Self {
            access: dependencies.access,
            audit: dependencies.audit,
            data_files: dependencies.data_files,
            projects: dependencies.projects,
            items: dependencies.items,
            evidence: dependencies.evidence,
            issues: dependencies.issues,
            users: dependencies.users,
        }
    }

    async fn summarize(&self, project: Project) -> AppResult<ProjectSummary> {
        let project_type = project_type_of(self.projects.as_ref(), &project).await?;
        let client_name = match project.client_id() {
            Some(client_id) => self
                .projects
                .find_client(client_id)
                .await?
                .map(|client| client.name().to_owned()),
            None => None,
        };
        let total_items = self.items.count_items(project.id()).await?;
        let completed_items = self.items.count_completed_items(project.id()).await?;

        Ok(ProjectSummary {
            project_type_name: project_type.name().to_owned(),
            unit_name: project_type.unit_name().to_owned(),
            client_name,
            total_items,
            completed_items,
            progress_percent: project_progress_percent(completed_items, total_items),
            project,
        })
    }

    async fn summarize_all(&self, projects: Vec<Project>) -> AppResult<Vec<ProjectSummary>> {
        let mut summaries = Vec::with_capacity(projects.len());
        for project in projects {
            summaries.push(self.summarize(project).await?);
        }
        Ok(summaries)
    }
}
