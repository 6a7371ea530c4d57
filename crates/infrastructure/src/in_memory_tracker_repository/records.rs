use fieldtrack_application::{AuditLogRepository, SecurityEventRepository, UserRepository};
use fieldtrack_core::UserRole;

use super::*;

#[async_trait]
impl AuditLogRepository for InMemoryTrackerRepository {
    async fn append_entry(&self, entry: AuditLogEntry) -> AppResult<()> {
        self.audit_entries.write().await.push(entry);
        Ok(())
    }

    async fn list_project_entries(&self, project_id: ProjectId) -> AppResult<Vec<AuditLogEntry>> {
        Ok(self
            .audit_entries
            .read()
            .await
            .iter()
            .filter(|entry| entry.project_id == project_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SecurityEventRepository for InMemoryTrackerRepository {
    async fn append_event(&self, event: SecurityEvent) -> AppResult<()> {
        self.security_events.write().await.push(event);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryTrackerRepository {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<UserRecord>> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|user| user.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|user| user.id == user_id)
            .cloned())
    }

    async fn create(&self, user: UserRecord) -> AppResult<()> {
        let mut users = self.users.write().await;
        if users
            .iter()
            .any(|stored| stored.username.eq_ignore_ascii_case(&user.username))
        {
            return Err(AppError::Conflict(format!(
                "username '{}' is already taken",
                user.username
            )));
        }

        users.push(user);
        Ok(())
    }

    async fn list_by_role(&self, role: UserRole) -> AppResult<Vec<UserRecord>> {
        let mut users = self
            .users
            .read()
            .await
            .iter()
            .filter(|user| user.role == role)
            .cloned()
            .collect::<Vec<_>>();
        users.sort_by_key(|user| user.username.to_lowercase());
        Ok(users)
    }
}
