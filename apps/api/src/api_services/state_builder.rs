use std::sync::Arc;

use fieldtrack_application::{
    AccessPolicyService, AuditLogService, DataFileService, IssueService, ItemService,
    ProgressService, ProgressServiceDependencies, ProjectService, ProjectServiceDependencies,
    RateLimitRepository, RateLimitService, UserService,
};
use fieldtrack_core::AppError;
use ipnet::IpNet;
use sqlx::PgPool;

use crate::api_config::ApiConfig;
use crate::state::AppState;

mod collaborators;
mod rate_limits;
mod stores;

pub use collaborators::Collaborators;
pub use stores::TrackerStores;

/// Deployment settings copied into the state.
pub struct StateSettings {
    pub frontend_url: String,
    pub public_base_url: String,
    pub trusted_proxies: Vec<IpNet>,
}

pub async fn build_app_state(pool: PgPool, config: &ApiConfig) -> Result<AppState, AppError> {
    let stores = TrackerStores::postgres(&pool);
    let collaborators = collaborators::build_collaborators(config).await?;
    let rate_limits = rate_limits::build_rate_limit_repository(&pool, config).await?;

    Ok(assemble_app_state(
        stores,
        collaborators,
        rate_limits,
        StateSettings {
            frontend_url: config.frontend_url.clone(),
            public_base_url: config.public_base_url.clone(),
            trusted_proxies: config.trusted_proxies.clone(),
        },
    ))
}

/// Wires every service over the given ports.
pub fn assemble_app_state(
    stores: TrackerStores,
    collaborators: Collaborators,
    rate_limits: Arc<dyn RateLimitRepository>,
    settings: StateSettings,
) -> AppState {
    let access = AccessPolicyService::new(stores.projects.clone(), stores.security_events);
    let audit = AuditLogService::new(stores.audit_log, access.clone());
    let data_files = DataFileService::new(
        collaborators.media.clone(),
        collaborators.spreadsheet,
    );

    AppState {
        project_service: ProjectService::new(ProjectServiceDependencies {
            access: access.clone(),
            audit: audit.clone(),
            data_files: data_files.clone(),
            projects: stores.projects.clone(),
            items: stores.items.clone(),
            evidence: stores.evidence.clone(),
            issues: stores.issues.clone(),
            users: stores.users.clone(),
        }),
        item_service: ItemService::new(
            access.clone(),
            audit.clone(),
            stores.projects.clone(),
            stores.items.clone(),
            data_files,
        ),
        progress_service: ProgressService::new(ProgressServiceDependencies {
            access: access.clone(),
            audit: audit.clone(),
            projects: stores.projects,
            items: stores.items.clone(),
            evidence: stores.evidence,
            media: collaborators.media,
            geotagger: collaborators.geotagger,
            watermarker: collaborators.watermarker,
        }),
        issue_service: IssueService::new(access.clone(), audit.clone(), stores.items, stores.issues),
        user_service: UserService::new(stores.users, collaborators.password_hasher, access),
        audit_log_service: audit,
        rate_limit_service: RateLimitService::new(rate_limits),
        frontend_url: settings.frontend_url,
        public_base_url: settings.public_base_url,
        trusted_proxies: Arc::new(settings.trusted_proxies),
    }
}
