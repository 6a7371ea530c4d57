use fieldtrack_core::{AppResult, UserIdentity, UserRole};
use fieldtrack_domain::{IssueStatus, Item, ItemFieldDefinition, Project, ProjectId};

use super::ProjectService;

/// Project card with progress figures.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectSummary {
    /// The project.
    pub project: Project,
    /// Workflow template name.
    pub project_type_name: String,
    /// Item unit label (e.g. "Pole").
    pub unit_name: String,
    /// Owning client name.
    pub client_name: Option<String>,
    /// Item count.
    pub total_items: u64,
    /// Completed item count.
    pub completed_items: u64,
    /// `floor(100 * completed / total)`.
    pub progress_percent: u8,
}

/// Project detail for contractors and admins.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDetail {
    /// Progress figures.
    pub summary: ProjectSummary,
    /// Items in creation order.
    pub items: Vec<Item>,
    /// Custom questions asked for new items.
    pub field_definitions: Vec<ItemFieldDefinition>,
    /// Unresolved issue count.
    pub open_issue_count: usize,
}

impl ProjectService {
    /// Lists the projects visible on the actor's dashboard.
    pub async fn list_dashboard_projects(
        &self,
        actor: &UserIdentity,
    ) -> AppResult<Vec<ProjectSummary>> {
        let projects = match actor.role() {
            UserRole::Admin => self.projects.list_projects().await?,
            UserRole::Contractor => {
                self.projects
                    .list_projects_for_contractor(actor.user_id())
                    .await?
            }
        };

        self.summarize_all(projects).await
    }

    /// Returns a project with its items.
    pub async fn project_detail(
        &self,
        actor: &UserIdentity,
        project_id: ProjectId,
    ) -> AppResult<ProjectDetail> {
        let project = self.access.authorize_project(actor, project_id).await?;

        let items = self.items.list_items(project.id()).await?;
        let field_definitions = self.projects.list_field_definitions(project.id()).await?;
        let open_issue_count = self
            .issues
            .list_project_issues(project.id())
            .await?
            .iter()
            .filter(|issue| issue.status == IssueStatus::Open)
            .count();

        Ok(ProjectDetail {
            summary: self.summarize(project).await?,
            items,
            field_definitions,
            open_issue_count,
        })
    }
}
