use fieldtrack_core::{UserIdentity, UserRole};

use crate::Project;

/// Result of a project access check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// Access granted.
    Allow,
    /// Access denied for the given reason.
    Deny(String),
}

impl AccessDecision {
    /// Returns whether access was granted.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Decides whether an authenticated user may act on a project.
///
/// Admins are unrestricted; contractors must be assigned to the project.
#[must_use]
pub fn project_access(identity: &UserIdentity, project: &Project) -> AccessDecision {
    match identity.role() {
        UserRole::Admin => AccessDecision::Allow,
        UserRole::Contractor if project.has_contractor(identity.user_id()) => AccessDecision::Allow,
        UserRole::Contractor => AccessDecision::Deny(format!(
            "user '{}' is not assigned to project '{}'",
            identity.user_id(),
            project.id()
        )),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use fieldtrack_core::{UserId, UserIdentity, UserRole};

    use crate::{Project, ProjectTypeId};

    use super::{AccessDecision, project_access};

    fn project() -> Project {
        Project::new("Kano North", ProjectTypeId::new(), None, Utc::now())
            .unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn admins_see_every_project() {
        let admin = UserIdentity::new(UserId::new(), "root", UserRole::Admin);
        assert!(project_access(&admin, &project()).is_allowed());
    }

    #[test]
    fn unassigned_contractors_are_denied() {
        let contractor = UserIdentity::new(UserId::new(), "ade", UserRole::Contractor);
        let mut project = project();

        assert!(matches!(
            project_access(&contractor, &project),
            AccessDecision::Deny(_)
        ));

        project.assign_contractor(contractor.user_id());
        assert_eq!(project_access(&contractor, &project), AccessDecision::Allow);
    }
}
