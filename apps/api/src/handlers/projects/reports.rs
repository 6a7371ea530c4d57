use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use fieldtrack_core::UserIdentity;
use fieldtrack_domain::ProjectId;

use crate::dto::{AuditLogEntryResponse, IssueResponse, ItemHistoryResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_project_issues_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(project_id): Path<String>,
) -> ApiResult<Json<Vec<IssueResponse>>> {
    let issues = state
        .issue_service
        .list_project_issues(&user, project_id.parse::<ProjectId>()?)
        .await?
        .iter()
        .map(IssueResponse::from)
        .collect();

    Ok(Json(issues))
}

pub async fn project_inspection_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(project_id): Path<String>,
) -> ApiResult<Json<Vec<ItemHistoryResponse>>> {
    let histories = state
        .project_service
        .admin_inspection(&user, project_id.parse::<ProjectId>()?)
        .await?
        .iter()
        .map(ItemHistoryResponse::from)
        .collect();

    Ok(Json(histories))
}

pub async fn list_audit_log_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(project_id): Path<String>,
) -> ApiResult<Json<Vec<AuditLogEntryResponse>>> {
    let entries = state
        .audit_log_service
        .list_entries(&user, project_id.parse::<ProjectId>()?)
        .await?
        .iter()
        .map(AuditLogEntryResponse::from)
        .collect();

    Ok(Json(entries))
}

pub async fn export_audit_log_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(project_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let export = state
        .audit_log_service
        .export_csv(&user, project_id.parse::<ProjectId>()?)
        .await?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        export.filename.replace('"', "")
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        export.content,
    ))
}
