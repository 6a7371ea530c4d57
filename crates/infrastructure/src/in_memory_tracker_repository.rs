use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use fieldtrack_application::{ProjectRepository, SecurityEvent, UserRecord};
use fieldtrack_core::{AppError, AppResult, UserId};
use fieldtrack_domain::{
    AuditLogEntry, Client, ClientId, ClientLink, EvidenceRecord, FieldDefinitionId, Issue, IssueId,
    Item, ItemFieldDefinition, ItemFieldValue, ItemId, Project, ProjectId, ProjectType, ProjectTypeId,
};

mod items;
mod records;

#[cfg(test)]
mod tests;

/// In-memory implementation of every tracker persistence port.
///
/// Used by the API when no database is configured for tests and local demos.
#[derive(Debug, Default)]
pub struct InMemoryTrackerRepository {
    clients: RwLock<HashMap<ClientId, Client>>,
    project_types: RwLock<HashMap<ProjectTypeId, ProjectType>>,
    projects: RwLock<HashMap<ProjectId, Project>>,
    field_definitions: RwLock<HashMap<ProjectId, Vec<ItemFieldDefinition>>>,
    items: RwLock<Vec<Item>>,
    field_values: RwLock<HashMap<(ItemId, FieldDefinitionId), ItemFieldValue>>,
    evidence: RwLock<Vec<EvidenceRecord>>,
    issues: RwLock<HashMap<IssueId, Issue>>,
    audit_entries: RwLock<Vec<AuditLogEntry>>,
    security_events: RwLock<Vec<SecurityEvent>>,
    users: RwLock<Vec<UserRecord>>,
}

impl InMemoryTrackerRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every recorded security event in append order.
    pub async fn security_events(&self) -> Vec<SecurityEvent> {
        self.security_events.read().await.clone()
    }
}

fn newest_first(mut projects: Vec<Project>) -> Vec<Project> {
    projects.sort_by(|left, right| {
        right
            .created_at()
            .cmp(&left.created_at())
            .then_with(|| left.name().cmp(right.name()))
    });
    projects
}

#[async_trait]
impl ProjectRepository for InMemoryTrackerRepository {
    async fn insert_client(&self, client: Client) -> AppResult<()> {
        let mut clients = self.clients.write().await;
        if clients.values().any(|stored| stored.link() == client.link()) {
            return Err(AppError::Conflict(format!(
                "client link '{}' already exists",
                client.link()
            )));
        }

        clients.insert(client.id(), client);
        Ok(())
    }

    async fn find_client(&self, client_id: ClientId) -> AppResult<Option<Client>> {
        Ok(self.clients.read().await.get(&client_id).cloned())
    }

    async fn find_client_by_link(&self, link: ClientLink) -> AppResult<Option<Client>> {
        Ok(self
            .clients
            .read()
            .await
            .values()
            .find(|client| client.link() == link)
            .cloned())
    }

    async fn list_clients(&self) -> AppResult<Vec<Client>> {
        let mut clients = self
            .clients
            .read()
            .await
            .values()
            .cloned()
            .collect::<Vec<_>>();
        clients.sort_by(|left, right| left.name().cmp(right.name()));
        Ok(clients)
    }

    async fn insert_project_type(&self, project_type: ProjectType) -> AppResult<()> {
        self.project_types
            .write()
            .await
            .insert(project_type.id(), project_type);
        Ok(())
    }

    async fn find_project_type(
        &self,
        project_type_id: ProjectTypeId,
    ) -> AppResult<Option<ProjectType>> {
        Ok(self.project_types.read().await.get(&project_type_id).cloned())
    }

    async fn list_project_types(&self) -> AppResult<Vec<ProjectType>> {
        let mut project_types = self
            .project_types
            .read()
            .await
            .values()
            .cloned()
            .collect::<Vec<_>>();
        project_types.sort_by(|left, right| left.name().cmp(right.name()));
        Ok(project_types)
    }

    async fn insert_project(&self, project: Project) -> AppResult<()> {
        let mut projects = self.projects.write().await;
        if projects
            .values()
            .any(|stored| stored.client_link() == project.client_link())
        {
            return Err(AppError::Conflict(format!(
                "project link '{}' already exists",
                project.client_link()
            )));
        }

        projects.insert(project.id(), project);
        Ok(())
    }

    async fn save_project(&self, project: &Project) -> AppResult<()> {
        let mut projects = self.projects.write().await;
        let stored = projects
            .get_mut(&project.id())
            .ok_or_else(|| AppError::NotFound(format!("project '{}' not found", project.id())))?;
        *stored = project.clone();
        Ok(())
    }

    async fn find_project(&self, project_id: ProjectId) -> AppResult<Option<Project>> {
        Ok(self.projects.read().await.get(&project_id).cloned())
    }

    async fn find_project_by_link(&self, link: ClientLink) -> AppResult<Option<Project>> {
        Ok(self
            .projects
            .read()
            .await
            .values()
            .find(|project| project.client_link() == link)
            .cloned())
    }

    async fn list_projects(&self) -> AppResult<Vec<Project>> {
        Ok(newest_first(
            self.projects.read().await.values().cloned().collect(),
        ))
    }

    async fn list_projects_for_contractor(&self, user_id: UserId) -> AppResult<Vec<Project>> {
        Ok(newest_first(
            self.projects
                .read()
                .await
                .values()
                .filter(|project| project.has_contractor(user_id))
                .cloned()
                .collect(),
        ))
    }

    async fn list_projects_for_client(&self, client_id: ClientId) -> AppResult<Vec<Project>> {
        Ok(newest_first(
            self.projects
                .read()
                .await
                .values()
                .filter(|project| project.client_id() == Some(client_id))
                .cloned()
                .collect(),
        ))
    }

    async fn replace_field_definitions(
        &self,
        project_id: ProjectId,
        definitions: Vec<ItemFieldDefinition>,
    ) -> AppResult<()> {
        self.field_definitions
            .write()
            .await
            .insert(project_id, definitions);
        Ok(())
    }

    async fn list_field_definitions(
        &self,
        project_id: ProjectId,
    ) -> AppResult<Vec<ItemFieldDefinition>> {
        Ok(self
            .field_definitions
            .read()
            .await
            .get(&project_id)
            .cloned()
            .unwrap_or_default())
    }
}
