mod auth;
mod catalog;
mod common;
mod items;
mod projects;
mod public;

pub use auth::AuthLoginRequest;
pub use catalog::{
    ClientResponse, CreateClientRequest, CreateProjectTypeRequest, CreateUserRequest,
    ProjectTypeResponse, StageRequest, StageResponse,
};
pub use common::{HealthResponse, UserIdentityResponse};
pub use items::{
    CreateItemRequest, EvidenceDeletionResponse, EvidenceResponse, EvidenceUploadResponse,
    FieldValueResponse, ItemHistoryResponse, ItemProgressResponse, ItemResponse,
    StageEvidenceResponse, StageProgressResponse,
};
pub use projects::{
    AuditLogEntryResponse, ConfigureFieldsRequest, CreateProjectRequest,
    DataFileHeadersResponse, FieldDefinitionRequest, FieldDefinitionResponse,
    FieldOptionsResponse, IssueResponse, ProjectDetailResponse, ProjectResponse,
    ProjectSummaryResponse,
};
pub use public::{
    ClientDashboardResponse, ClientProjectViewResponse, ItemGroupResponse,
    PublicProjectSummaryResponse, ReportIssueRequest,
};
