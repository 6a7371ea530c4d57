//! Anonymous magic-link endpoints.
//!
//! The link in the path is the only credential; unknown links are 404.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use fieldtrack_domain::{ItemId, StageId};
use tracing::info;

use crate::dto::{
    ClientDashboardResponse, ClientProjectViewResponse, IssueResponse, ReportIssueRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

use super::uploads::image_response;

pub async fn client_dashboard_handler(
    State(state): State<AppState>,
    Path(client_link): Path<String>,
) -> ApiResult<Json<ClientDashboardResponse>> {
    let dashboard = state
        .project_service
        .client_dashboard(client_link.as_str())
        .await?;

    Ok(Json(ClientDashboardResponse::from(&dashboard)))
}

pub async fn client_project_view_handler(
    State(state): State<AppState>,
    Path(project_link): Path<String>,
) -> ApiResult<Json<ClientProjectViewResponse>> {
    let view = state
        .project_service
        .client_project_view(project_link.as_str())
        .await?;

    Ok(Json(ClientProjectViewResponse::from(&view)))
}

pub async fn client_evidence_image_handler(
    State(state): State<AppState>,
    Path((project_link, item_id, stage_id)): Path<(String, String, String)>,
) -> ApiResult<Response> {
    let bytes = state
        .progress_service
        .client_evidence_image(
            project_link.as_str(),
            item_id.parse::<ItemId>()?,
            stage_id.parse::<StageId>()?,
        )
        .await?;

    Ok(image_response(bytes))
}

pub async fn report_issue_handler(
    State(state): State<AppState>,
    Path((project_link, item_id)): Path<(String, String)>,
    Json(payload): Json<ReportIssueRequest>,
) -> ApiResult<(StatusCode, Json<IssueResponse>)> {
    let item_id = item_id.parse::<ItemId>()?;
    let issue = state
        .issue_service
        .report_issue(
            project_link.as_str(),
            item_id,
            payload.message.as_str(),
            payload.reporter,
        )
        .await?;

    info!(issue_id = %issue.id, item_id = %item_id, "issue reported by client");
    Ok((StatusCode::CREATED, Json(IssueResponse::new(&issue, None))))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use axum::Json;
    use axum::extract::{Extension, Path, State};
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use fieldtrack_application::CreateItemInput;

    use crate::dto::ReportIssueRequest;
    use crate::handlers::items::resolve_issue_handler;
    use crate::handlers::projects::list_project_issues_handler;
    use crate::handlers::test_support::{seed_project, test_app};

    use super::{client_dashboard_handler, client_project_view_handler, report_issue_handler};

    #[tokio::test]
    async fn magic_link_shows_grouped_progress() {
        let app = test_app().await;
        let (project, _) = seed_project(&app).await;
        let detail = app
            .state
            .project_service
            .project_detail(&app.admin, project.id())
            .await
            .unwrap_or_else(|_| unreachable!());
        let field = detail.field_definitions[0].id();
        for street in ["Zaria Road", "Bari"] {
            app.state
                .item_service
                .create_item(
                    &app.contractor,
                    CreateItemInput {
                        project_id: project.id(),
                        field_values: BTreeMap::from([(field, street.to_owned())]),
                    },
                )
                .await
                .unwrap_or_else(|_| unreachable!());
        }

        let Json(view) = client_project_view_handler(
            State(app.state.clone()),
            Path(project.client_link().to_string()),
        )
        .await
        .unwrap_or_else(|_| unreachable!());

        assert_eq!(view.grouping_label.as_deref(), Some("Street"));
        let labels = view
            .groups
            .iter()
            .map(|group| group.label.clone().unwrap_or_default())
            .collect::<Vec<_>>();
        assert_eq!(labels, vec!["Bari", "Zaria Road"]);
        assert_eq!(view.project.total_items, 2);
        assert_eq!(view.project.progress_percent, 0);
    }

    #[tokio::test]
    async fn unknown_links_are_not_found() {
        let app = test_app().await;

        let project_view =
            client_project_view_handler(State(app.state.clone()), Path(uuid::Uuid::new_v4().to_string()))
                .await
                .into_response();
        let dashboard = client_dashboard_handler(State(app.state.clone()), Path("guess".to_owned()))
            .await
            .into_response();

        assert_eq!(project_view.status(), StatusCode::NOT_FOUND);
        assert_eq!(dashboard.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn client_reports_issue_and_contractor_resolves_it() {
        let app = test_app().await;
        let (project, _) = seed_project(&app).await;
        let field = app
            .state
            .project_service
            .project_detail(&app.admin, project.id())
            .await
            .unwrap_or_else(|_| unreachable!())
            .field_definitions[0]
            .id();
        let item = app
            .state
            .item_service
            .create_item(
                &app.contractor,
                CreateItemInput {
                    project_id: project.id(),
                    field_values: BTreeMap::from([(field, "Bari".to_owned())]),
                },
            )
            .await
            .unwrap_or_else(|_| unreachable!());

        let (status, Json(issue)) = report_issue_handler(
            State(app.state.clone()),
            Path((project.client_link().to_string(), item.id.to_string())),
            Json(ReportIssueRequest {
                message: "Pole is leaning".to_owned(),
                reporter: Some("Inspector".to_owned()),
            }),
        )
        .await
        .unwrap_or_else(|_| unreachable!());
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(issue.status, "OPEN");

        let Json(resolved) = resolve_issue_handler(
            State(app.state.clone()),
            Extension(app.contractor.clone()),
            Path(issue.id.clone()),
        )
        .await
        .unwrap_or_else(|_| unreachable!());
        assert_eq!(resolved.status, "RESOLVED");

        let Json(issues) = list_project_issues_handler(
            State(app.state.clone()),
            Extension(app.admin.clone()),
            Path(project.id().to_string()),
        )
        .await
        .unwrap_or_else(|_| unreachable!());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].item_identifier.as_deref(), Some("Kano North_Bari #1"));
    }
}
