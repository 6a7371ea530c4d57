//! Application services and ports.

#![forbid(unsafe_code)]

mod access_policy_service;
mod audit_log_service;
mod data_file_service;
mod issue_service;
mod item_service;
mod progress_service;
mod project_service;
mod rate_limit_service;
mod service_support;
mod tracker_ports;
mod user_service;

#[cfg(test)]
mod test_support;

pub use access_policy_service::{AccessPolicyService, SecurityEvent, SecurityEventRepository};
pub use audit_log_service::{
    AUDIT_EXPORT_HEADER, AuditExport, AuditLogRepository, AuditLogService, AuditRecordOutcome,
};
pub use data_file_service::DataFileService;
pub use issue_service::{IssueService, IssueView};
pub use item_service::{CreateItemInput, ItemService};
pub use progress_service::{
    EvidenceDeletion, EvidenceUpload, EvidenceUploadResult, ItemProgressView, ProgressService,
    ProgressServiceDependencies, StageProgress,
};
pub use project_service::{
    ClientDashboard, ClientProjectView, CreateProjectInput, CreateProjectTypeInput,
    FieldDefinitionInput, ItemEvidenceHistory, ItemGroup, ProjectDetail, ProjectService,
    ProjectServiceDependencies, ProjectSummary, StageEvidence, StageInput,
};
pub use rate_limit_service::{AttemptInfo, RateLimitRepository, RateLimitRule, RateLimitService};
pub use tracker_ports::{
    BrandingOutcome, EvidenceRepository, GeoTagger, IssueRepository, ItemRepository, MediaStore,
    ProjectRepository, SpreadsheetAdapter, Watermarker,
};
pub use user_service::{
    AuthOutcome, NewUser, PASSWORD_MAX_LENGTH, PASSWORD_MIN_LENGTH, PasswordHasher, UserRecord,
    UserRepository, UserService, validate_password,
};
