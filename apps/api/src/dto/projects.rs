use fieldtrack_application::{FieldDefinitionInput, IssueView, ProjectDetail, ProjectSummary};
use fieldtrack_core::AppResult;
use fieldtrack_domain::{AuditLogEntry, FieldKind, ItemFieldDefinition, Project};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::ItemResponse;

/// Incoming payload for project creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/create-project-request.ts"
)]
pub struct CreateProjectRequest {
    pub name: String,
    pub project_type_id: String,
    pub client_id: Option<String>,
    #[serde(default)]
    pub contractor_ids: Vec<String>,
}

/// API representation of a project.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/project-response.ts"
)]
pub struct ProjectResponse {
    pub id: String,
    pub name: String,
    pub project_type_id: String,
    pub client_id: Option<String>,
    /// `"ACTIVE"` or `"COMPLETED"`.
    pub status: String,
    pub project_link: String,
    pub contractor_ids: Vec<String>,
    pub data_file_name: Option<String>,
    pub created_at: String,
}

impl From<&Project> for ProjectResponse {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id().to_string(),
            name: project.name().to_owned(),
            project_type_id: project.project_type_id().to_string(),
            client_id: project.client_id().map(|client_id| client_id.to_string()),
            status: project.status().as_str().to_owned(),
            project_link: project.client_link().to_string(),
            contractor_ids: project
                .contractors()
                .iter()
                .map(ToString::to_string)
                .collect(),
            data_file_name: project
                .data_file()
                .map(|data_file| data_file.filename.clone()),
            created_at: project.created_at().to_rfc3339(),
        }
    }
}

/// Project card with progress figures.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/project-summary-response.ts"
)]
pub struct ProjectSummaryResponse {
    pub project: ProjectResponse,
    pub project_type_name: String,
    pub unit_name: String,
    pub client_name: Option<String>,
    #[ts(type = "number")]
    pub total_items: u64,
    #[ts(type = "number")]
    pub completed_items: u64,
    pub progress_percent: u8,
}

impl From<&ProjectSummary> for ProjectSummaryResponse {
    fn from(summary: &ProjectSummary) -> Self {
        Self {
            project: ProjectResponse::from(&summary.project),
            project_type_name: summary.project_type_name.clone(),
            unit_name: summary.unit_name.clone(),
            client_name: summary.client_name.clone(),
            total_items: summary.total_items,
            completed_items: summary.completed_items,
            progress_percent: summary.progress_percent,
        }
    }
}

/// API representation of a custom question.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/field-definition-response.ts"
)]
pub struct FieldDefinitionResponse {
    pub id: String,
    pub label: String,
    /// `"text"` or `"dropdown"`.
    pub kind: String,
    pub column: Option<String>,
    pub is_grouping_key: bool,
    pub is_required: bool,
}

impl From<&ItemFieldDefinition> for FieldDefinitionResponse {
    fn from(definition: &ItemFieldDefinition) -> Self {
        Self {
            id: definition.id().to_string(),
            label: definition.label().to_owned(),
            kind: definition.kind().as_str().to_owned(),
            column: definition.kind().column().map(ToOwned::to_owned),
            is_grouping_key: definition.is_grouping_key(),
            is_required: definition.is_required(),
        }
    }
}

/// Project detail for contractors and admins.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/project-detail-response.ts"
)]
pub struct ProjectDetailResponse {
    pub summary: ProjectSummaryResponse,
    pub items: Vec<ItemResponse>,
    pub field_definitions: Vec<FieldDefinitionResponse>,
    pub open_issue_count: usize,
}

impl From<&ProjectDetail> for ProjectDetailResponse {
    fn from(detail: &ProjectDetail) -> Self {
        Self {
            summary: ProjectSummaryResponse::from(&detail.summary),
            items: detail.items.iter().map(ItemResponse::from).collect(),
            field_definitions: detail
                .field_definitions
                .iter()
                .map(FieldDefinitionResponse::from)
                .collect(),
            open_issue_count: detail.open_issue_count,
        }
    }
}

/// One custom question in a field configuration request.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/field-definition-request.ts"
)]
pub struct FieldDefinitionRequest {
    pub label: String,
    /// `"text"` or `"dropdown"`.
    pub kind: String,
    pub column: Option<String>,
    #[serde(default)]
    pub is_grouping_key: bool,
    #[serde(default = "default_required")]
    pub is_required: bool,
}

fn default_required() -> bool {
    true
}

impl FieldDefinitionRequest {
    /// Converts the request into a service input.
    pub fn into_input(self) -> AppResult<FieldDefinitionInput> {
        Ok(FieldDefinitionInput {
            kind: FieldKind::from_storage(self.kind.trim(), self.column)?,
            label: self.label,
            is_grouping_key: self.is_grouping_key,
            is_required: self.is_required,
        })
    }
}

/// Incoming payload replacing a project's custom questions.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/configure-fields-request.ts"
)]
pub struct ConfigureFieldsRequest {
    pub fields: Vec<FieldDefinitionRequest>,
}

/// Dropdown options of one field.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/field-options-response.ts"
)]
pub struct FieldOptionsResponse {
    pub options: Vec<String>,
}

/// Column headers of a project's data file.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/data-file-headers-response.ts"
)]
pub struct DataFileHeadersResponse {
    pub headers: Vec<String>,
}

/// API representation of a client-flagged issue.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/issue-response.ts"
)]
pub struct IssueResponse {
    pub id: String,
    pub item_id: String,
    pub item_identifier: Option<String>,
    pub message: String,
    /// `"OPEN"` or `"RESOLVED"`.
    pub status: String,
    pub reporter: Option<String>,
    pub created_at: String,
    pub resolved_at: Option<String>,
}

impl IssueResponse {
    /// Builds a response, optionally labelled with the item identifier.
    #[must_use]
    pub fn new(issue: &fieldtrack_domain::Issue, item_identifier: Option<String>) -> Self {
        Self {
            id: issue.id.to_string(),
            item_id: issue.item_id.to_string(),
            item_identifier,
            message: issue.message.clone(),
            status: issue.status.as_str().to_owned(),
            reporter: issue.reporter.clone(),
            created_at: issue.created_at.to_rfc3339(),
            resolved_at: issue.resolved_at.map(|resolved_at| resolved_at.to_rfc3339()),
        }
    }
}

impl From<&IssueView> for IssueResponse {
    fn from(view: &IssueView) -> Self {
        Self::new(&view.issue, Some(view.item_identifier.clone()))
    }
}

/// API representation of an audit log entry.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/audit-log-entry-response.ts"
)]
pub struct AuditLogEntryResponse {
    pub id: String,
    /// Acting username; absent for anonymous client actions.
    pub username: Option<String>,
    pub action: String,
    pub target: String,
    pub details: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: String,
}

impl From<&AuditLogEntry> for AuditLogEntryResponse {
    fn from(entry: &AuditLogEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            username: entry.actor.as_ref().map(|actor| actor.username.clone()),
            action: entry.action.as_str().to_owned(),
            target: entry.target.clone(),
            details: entry.details.clone(),
            latitude: entry.gps.map(|gps| gps.latitude()),
            longitude: entry.gps.map(|gps| gps.longitude()),
            created_at: entry.created_at.to_rfc3339(),
        }
    }
}
