use fieldtrack_core::{AppError, AppResult, UserIdentity};
use fieldtrack_domain::{AuditActor, Project, ProjectType};

use crate::ProjectRepository;

pub(crate) fn audit_actor(identity: &UserIdentity) -> AuditActor {
    AuditActor {
        user_id: identity.user_id(),
        username: identity.username().to_owned(),
    }
}

pub(crate) fn require_active_project(project: &Project) -> AppResult<()> {
    if project.is_active() {
        return Ok(());
    }

    Err(AppError::Conflict(format!(
        "project '{}' is completed and no longer accepts changes",
        project.name()
    )))
}

pub(crate) async fn project_type_of(
    projects: &dyn ProjectRepository,
    project: &Project,
) -> AppResult<ProjectType> {
    projects
        .find_project_type(project.project_type_id())
        .await?
        .ok_or_else(|| {
            AppError::Internal(format!(
                "project type '{}' of project '{}' is missing",
                project.project_type_id(),
                project.id()
            ))
        })
}
