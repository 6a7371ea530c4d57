use std::sync::Arc;

use fieldtrack_application::{
    AuditLogService, IssueService, ItemService, ProgressService, ProjectService, RateLimitRule,
    RateLimitService, UserService,
};
use ipnet::IpNet;

/// Budgets of the rate-limited endpoints.
#[derive(Debug, Clone)]
pub struct RateLimitRules {
    pub login: RateLimitRule,
    pub client_dashboard: RateLimitRule,
    pub client_view: RateLimitRule,
    pub client_image: RateLimitRule,
    pub issue_report: RateLimitRule,
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub project_service: ProjectService,
    pub item_service: ItemService,
    pub progress_service: ProgressService,
    pub issue_service: IssueService,
    pub audit_log_service: AuditLogService,
    pub user_service: UserService,
    pub rate_limit_service: RateLimitService,
    pub frontend_url: String,
    pub public_base_url: String,
    pub trusted_proxies: Arc<Vec<IpNet>>,
}

impl AppState {
    /// Returns the shareable URL of a project magic link.
    #[must_use]
    pub fn project_link_url(&self, link: &str) -> String {
        format!("{}/p/{link}", self.public_base_url.trim_end_matches('/'))
    }

    /// Returns the shareable URL of a client dashboard link.
    #[must_use]
    pub fn client_link_url(&self, link: &str) -> String {
        format!("{}/c/{link}", self.public_base_url.trim_end_matches('/'))
    }
}
