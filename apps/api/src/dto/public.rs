use fieldtrack_application::{ClientDashboard, ClientProjectView, ItemGroup, ProjectSummary};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::ItemHistoryResponse;

/// Project progress as shown to anonymous client viewers.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/public-project-summary-response.ts"
)]
pub struct PublicProjectSummaryResponse {
    pub name: String,
    pub status: String,
    pub project_link: String,
    pub project_type_name: String,
    pub unit_name: String,
    pub client_name: Option<String>,
    #[ts(type = "number")]
    pub total_items: u64,
    #[ts(type = "number")]
    pub completed_items: u64,
    pub progress_percent: u8,
}

impl From<&ProjectSummary> for PublicProjectSummaryResponse {
    fn from(summary: &ProjectSummary) -> Self {
        Self {
            name: summary.project.name().to_owned(),
            status: summary.project.status().as_str().to_owned(),
            project_link: summary.project.client_link().to_string(),
            project_type_name: summary.project_type_name.clone(),
            unit_name: summary.unit_name.clone(),
            client_name: summary.client_name.clone(),
            total_items: summary.total_items,
            completed_items: summary.completed_items,
            progress_percent: summary.progress_percent,
        }
    }
}

/// Client organisation dashboard.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/client-dashboard-response.ts"
)]
pub struct ClientDashboardResponse {
    pub client_name: String,
    pub projects: Vec<PublicProjectSummaryResponse>,
}

impl From<&ClientDashboard> for ClientDashboardResponse {
    fn from(dashboard: &ClientDashboard) -> Self {
        Self {
            client_name: dashboard.client.name().to_owned(),
            projects: dashboard
                .projects
                .iter()
                .map(PublicProjectSummaryResponse::from)
                .collect(),
        }
    }
}

/// Items sharing one grouping value.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/item-group-response.ts"
)]
pub struct ItemGroupResponse {
    pub label: Option<String>,
    pub items: Vec<ItemHistoryResponse>,
}

impl From<&ItemGroup> for ItemGroupResponse {
    fn from(group: &ItemGroup) -> Self {
        Self {
            label: group.label.clone(),
            items: group.items.iter().map(ItemHistoryResponse::from).collect(),
        }
    }
}

/// Read-only project view behind a magic link.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/client-project-view-response.ts"
)]
pub struct ClientProjectViewResponse {
    pub project: PublicProjectSummaryResponse,
    pub grouping_label: Option<String>,
    pub groups: Vec<ItemGroupResponse>,
}

impl From<&ClientProjectView> for ClientProjectViewResponse {
    fn from(view: &ClientProjectView) -> Self {
        Self {
            project: PublicProjectSummaryResponse::from(&view.summary),
            grouping_label: view.grouping_label.clone(),
            groups: view.groups.iter().map(ItemGroupResponse::from).collect(),
        }
    }
}

/// Incoming payload for an anonymous issue report.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/report-issue-request.ts"
)]
pub struct ReportIssueRequest {
    pub message: String,
    pub reporter: Option<String>,
}
