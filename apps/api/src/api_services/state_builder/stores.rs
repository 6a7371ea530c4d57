use std::sync::Arc;

use fieldtrack_application::{
    AuditLogRepository, EvidenceRepository, IssueRepository, ItemRepository, ProjectRepository,
    SecurityEventRepository, UserRepository,
};
#[cfg(test)]
use fieldtrack_infrastructure::InMemoryTrackerRepository;
use fieldtrack_infrastructure::{
    PostgresAuditLogRepository, PostgresItemRepository, PostgresProjectRepository,
    PostgresSecurityEventRepository, PostgresUserRepository,
};
use sqlx::PgPool;

/// Persistence ports shared by the services.
pub struct TrackerStores {
    pub projects: Arc<dyn ProjectRepository>,
    pub items: Arc<dyn ItemRepository>,
    pub evidence: Arc<dyn EvidenceRepository>,
    pub issues: Arc<dyn IssueRepository>,
    pub audit_log: Arc<dyn AuditLogRepository>,
    pub security_events: Arc<dyn SecurityEventRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl TrackerStores {
    pub fn postgres(pool: &PgPool) -> Self {
        let items = Arc::new(PostgresItemRepository::new(pool.clone()));

        Self {
            projects: Arc::new(PostgresProjectRepository::new(pool.clone())),
            items: items.clone(),
            evidence: items.clone(),
            issues: items,
            audit_log: Arc::new(PostgresAuditLogRepository::new(pool.clone())),
            security_events: Arc::new(PostgresSecurityEventRepository::new(pool.clone())),
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
        }
    }

    #[cfg(test)]
    pub fn in_memory(repository: Arc<InMemoryTrackerRepository>) -> Self {
        Self {
            projects: repository.clone(),
            items: repository.clone(),
            evidence: repository.clone(),
            issues: repository.clone(),
            audit_log: repository.clone(),
            security_events: repository.clone(),
            users: repository,
        }
    }
}
