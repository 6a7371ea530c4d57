use async_trait::async_trait;
use fieldtrack_core::{AppResult, UserId};
use fieldtrack_domain::{
    Client, ClientId, ClientLink, ItemFieldDefinition, Project, ProjectId, ProjectType,
    ProjectTypeId,
};

/// Repository port for clients, workflow templates and projects.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Persists a new client.
    async fn insert_client(&self, client: Client) -> AppResult<()>;

    /// Finds a client by identifier.
    async fn find_client(&self, client_id: ClientId) -> AppResult<Option<Client>>;

    /// Finds a client by its dashboard link token.
    async fn find_client_by_link(&self, link: ClientLink) -> AppResult<Option<Client>>;

    /// Lists every client ordered by name.
    async fn list_clients(&self) -> AppResult<Vec<Client>>;

    /// Persists a new project type together with its stages.
    async fn insert_project_type(&self, project_type: ProjectType) -> AppResult<()>;

    /// Finds a project type with its stages sorted by order.
    async fn find_project_type(
        &self,
        project_type_id: ProjectTypeId,
    ) -> AppResult<Option<ProjectType>>;

    /// Lists every project type ordered by name.
    async fn list_project_types(&self) -> AppResult<Vec<ProjectType>>;

    /// Persists a new project.
    async fn insert_project(&self, project: Project) -> AppResult<()>;

    /// Saves status, contractor assignments and data file of a project.
    async fn save_project(&self, project: &Project) -> AppResult<()>;

    /// Finds a project by identifier.
    async fn find_project(&self, project_id: ProjectId) -> AppResult<Option<Project>>;

    /// Finds a project by its magic link token.
    async fn find_project_by_link(&self, link: ClientLink) -> AppResult<Option<Project>>;

    /// Lists every project, newest first.
    async fn list_projects(&self) -> AppResult<Vec<Project>>;

    /// Lists projects the contractor is assigned to, newest first.
    async fn list_projects_for_contractor(&self, user_id: UserId) -> AppResult<Vec<Project>>;

    /// Lists projects owned by a client, newest first.
    async fn list_projects_for_client(&self, client_id: ClientId) -> AppResult<Vec<Project>>;

    /// Replaces all custom field definitions of a project.
    async fn replace_field_definitions(
        &self,
        project_id: ProjectId,
        definitions: Vec<ItemFieldDefinition>,
    ) -> AppResult<()>;

    /// Lists custom field definitions of a project in creation order.
    async fn list_field_definitions(
        &self,
        project_id: ProjectId,
    ) -> AppResult<Vec<ItemFieldDefinition>>;
}
