//! Project access gating for authenticated users and magic links.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, warn};

use fieldtrack_core::{AppError, AppResult, UserId, UserIdentity};
use fieldtrack_domain::{AccessDecision, Client, ClientLink, Project, ProjectId, project_access};

use crate::ProjectRepository;

#[cfg(test)]
mod tests;

/// Security event emitted on authorization failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityEvent {
    /// Acting user, if authenticated.
    pub user_id: Option<UserId>,
    /// Project the request targeted.
    pub project_id: Option<ProjectId>,
    /// Stable event type identifier.
    pub event_type: String,
    /// Human-readable detail.
    pub detail: String,
}

/// Repository port for security event persistence.
#[async_trait]
pub trait SecurityEventRepository: Send + Sync {
    /// Appends a security event.
    async fn append_event(&self, event: SecurityEvent) -> AppResult<()>;
}

/// Application service gating every project-scoped operation.
#[derive(Clone)]
pub struct AccessPolicyService {
    projects: Arc<dyn ProjectRepository>,
    security_events: Arc<dyn SecurityEventRepository>,
}

impl AccessPolicyService {
    /// Creates a new access policy service.
    #[must_use]
    pub fn new(
        projects: Arc<dyn ProjectRepository>,
        security_events: Arc<dyn SecurityEventRepository>,
    ) -> Self {
        Self {
            projects,
            security_events,
        }
    }

    /// Ensures the actor may act on the project.
    ///
    /// Denials are logged, stored as security events and surface as
    /// [`AppError::Forbidden`].
    pub async fn check_access(&self, actor: &UserIdentity, project: &Project) -> AppResult<()> {
        match project_access(actor, project) {
            AccessDecision::Allow => Ok(()),
            AccessDecision::Deny(reason) => {
                self.deny(
                    actor,
                    Some(project.id()),
                    "project_access_denied",
                    reason.as_str(),
                )
                .await;
                Err(AppError::Forbidden(reason))
            }
        }
    }

    /// Loads a project and checks access to it.
    pub async fn authorize_project(
        &self,
        actor: &UserIdentity,
        project_id: ProjectId,
    ) -> AppResult<Project> {
        let project = self
            .projects
            .find_project(project_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("project '{project_id}' does not exist")))?;

        self.check_access(actor, &project).await?;
        Ok(project)
    }

    /// Ensures the actor is an admin.
    pub async fn require_admin(
        &self,
        actor: &UserIdentity,
        project_id: Option<ProjectId>,
        operation: &str,
    ) -> AppResult<()> {
        if actor.is_admin() {
            return Ok(());
        }

        let reason = format!(
            "user '{}' is not allowed to {operation}",
            actor.user_id()
        );
        self.deny(actor, project_id, "admin_required", reason.as_str())
            .await;
        Err(AppError::Forbidden(reason))
    }

    /// Resolves a project from its magic link. Unknown links are not found.
    pub async fn resolve_project_link(&self, link: &str) -> AppResult<Project> {
        let link = link.parse::<ClientLink>()?;
        self.projects
            .find_project_by_link(link)
            .await?
            .ok_or_else(|| AppError::NotFound("client link does not exist".to_owned()))
    }

    /// Resolves a client from its dashboard link. Unknown links are not found.
    pub async fn resolve_client_link(&self, link: &str) -> AppResult<Client> {
        let link = link.parse::<ClientLink>()?;
        self.projects
            .find_client_by_link(link)
            .await?
            .ok_or_else(|| AppError::NotFound("client link does not exist".to_owned()))
    }

    async fn deny(
        &self,
        actor: &UserIdentity,
        project_id: Option<ProjectId>,
        event_type: &str,
        reason: &str,
    ) {
        warn!(
            user_id = %actor.user_id(),
            project_id = ?project_id.map(|id| id.to_string()),
            event_type,
            "access denied: {reason}"
        );

        if let Err(append_error) = self
            .security_events
            .append_event(SecurityEvent {
                user_id: Some(actor.user_id()),
                project_id,
                event_type: event_type.to_owned(),
                detail: reason.to_owned(),
            })
            .await
        {
            error!(
                error = %append_error,
                user_id = %actor.user_id(),
                "failed to persist security event"
            );
        }
    }
}
