use fieldtrack_domain::{Client, ProjectType, StageDefinition};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for client creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/create-client-request.ts"
)]
pub struct CreateClientRequest {
    pub name: String,
}

/// API representation of a client organisation.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/client-response.ts"
)]
pub struct ClientResponse {
    pub id: String,
    pub name: String,
    pub client_link: String,
    /// Shareable dashboard URL.
    pub dashboard_url: String,
    pub created_at: String,
}

impl ClientResponse {
    /// Builds a response with the shareable dashboard URL.
    #[must_use]
    pub fn new(client: &Client, dashboard_url: String) -> Self {
        Self {
            id: client.id().to_string(),
            name: client.name().to_owned(),
            client_link: client.link().to_string(),
            dashboard_url,
            created_at: client.created_at().to_rfc3339(),
        }
    }
}

/// One stage of a new project type.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/stage-request.ts"
)]
pub struct StageRequest {
    pub name: String,
    pub order: u32,
    #[serde(default = "default_required")]
    pub is_required: bool,
}

fn default_required() -> bool {
    true
}

/// Incoming payload for project type creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/create-project-type-request.ts"
)]
pub struct CreateProjectTypeRequest {
    pub name: String,
    pub unit_name: String,
    pub description: Option<String>,
    pub stages: Vec<StageRequest>,
}

/// API representation of a stage.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/stage-response.ts"
)]
pub struct StageResponse {
    pub id: String,
    pub name: String,
    pub order: u32,
    pub is_required: bool,
}

impl From<&StageDefinition> for StageResponse {
    fn from(stage: &StageDefinition) -> Self {
        Self {
            id: stage.id().to_string(),
            name: stage.name().to_owned(),
            order: stage.order(),
            is_required: stage.is_required(),
        }
    }
}

/// API representation of a workflow template.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/project-type-response.ts"
)]
pub struct ProjectTypeResponse {
    pub id: String,
    pub name: String,
    pub unit_name: String,
    pub description: Option<String>,
    pub stages: Vec<StageResponse>,
}

impl From<&ProjectType> for ProjectTypeResponse {
    fn from(project_type: &ProjectType) -> Self {
        Self {
            id: project_type.id().to_string(),
            name: project_type.name().to_owned(),
            unit_name: project_type.unit_name().to_owned(),
            description: project_type.description().map(ToOwned::to_owned),
            stages: project_type.stages().iter().map(StageResponse::from).collect(),
        }
    }
}

/// Incoming payload for account creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/create-user-request.ts"
)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    /// `"admin"` or `"contractor"`.
    pub role: String,
}
