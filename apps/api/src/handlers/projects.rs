use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Extension, Multipart, Path, State};
use axum::http::StatusCode;
use fieldtrack_application::{CreateItemInput, CreateProjectInput};
use fieldtrack_core::{AppError, AppResult, UserId, UserIdentity};
use fieldtrack_domain::{ClientId, FieldDefinitionId, ProjectId, ProjectTypeId};
use tracing::info;

use crate::dto::{
    ConfigureFieldsRequest, CreateItemRequest, CreateProjectRequest, DataFileHeadersResponse,
    FieldDefinitionResponse, FieldOptionsResponse, ItemResponse, ProjectDetailResponse,
    ProjectResponse, ProjectSummaryResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

use super::uploads::read_upload_form;

mod reports;


pub use reports::{
    export_audit_log_handler, list_audit_log_handler, list_project_issues_handler,
    project_inspection_handler,
};

pub async fn list_projects_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<ProjectSummaryResponse>>> {
    let projects = state
        .project_service
        .list_dashboard_projects(&user)
        .await?
        .iter()
        .map(ProjectSummaryResponse::from)
        .collect();

    Ok(Json(projects))
}

pub async fn create_project_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<ProjectResponse>)> {
    let contractors = payload
        .contractor_ids
        .iter()
        .map(|contractor_id| parse_user_id(contractor_id))
        .collect::<AppResult<Vec<_>>>()?;
    let client_id = payload
        .client_id
        .as_deref()
        .filter(|client_id| !client_id.trim().is_empty())
        .map(str::parse::<ClientId>)
        .transpose()?;

    let project = state
        .project_service
        .create_project(
            &user,
            CreateProjectInput {
                name: payload.name,
                project_type_id: payload.project_type_id.parse::<ProjectTypeId>()?,
                client_id,
                contractors,
            },
        )
        .await?;

    info!(
        project_id = %project.id(),
        project_url = %state.project_link_url(&project.client_link().to_string()),
        "project created"
    );
    Ok((StatusCode::CREATED, Json(ProjectResponse::from(&project))))
}

pub async fn project_detail_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(project_id): Path<String>,
) -> ApiResult<Json<ProjectDetailResponse>> {
    let detail = state
        .project_service
        .project_detail(&user, project_id.parse::<ProjectId>()?)
        .await?;

    Ok(Json(ProjectDetailResponse::from(&detail)))
}

pub async fn complete_project_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(project_id): Path<String>,
) -> ApiResult<Json<ProjectResponse>> {
    let project = state
        .project_service
        .mark_project_completed(&user, project_id.parse::<ProjectId>()?)
        .await?;

    Ok(Json(ProjectResponse::from(&project)))
}

pub async fn assign_contractor_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((project_id, user_id)): Path<(String, String)>,
) -> ApiResult<Json<ProjectResponse>> {
    let project = state
        .project_service
        .assign_contractor(
            &user,
            project_id.parse::<ProjectId>()?,
            parse_user_id(&user_id)?,
        )
        .await?;

    Ok(Json(ProjectResponse::from(&project)))
}

pub async fn unassign_contractor_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((project_id, user_id)): Path<(String, String)>,
) -> ApiResult<Json<ProjectResponse>> {
    let project = state
        .project_service
        .unassign_contractor(
            &user,
            project_id.parse::<ProjectId>()?,
            parse_user_id(&user_id)?,
        )
        .await?;

    Ok(Json(ProjectResponse::from(&project)))
}

pub async fn configure_fields_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(project_id): Path<String>,
    Json(payload): Json<ConfigureFieldsRequest>,
) -> ApiResult<Json<Vec<FieldDefinitionResponse>>> {
    let fields = payload
        .fields
        .into_iter()
        .map(|field| field.into_input())
        .collect::<AppResult<Vec<_>>>()?;

    let definitions = state
        .project_service
        .configure_fields(&user, project_id.parse::<ProjectId>()?, fields)
        .await?
        .iter()
        .map(FieldDefinitionResponse::from)
        .collect();

    Ok(Json(definitions))
}

pub async fn field_options_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((project_id, field_id)): Path<(String, String)>,
) -> ApiResult<Json<FieldOptionsResponse>> {
    let options = state
        .project_service
        .field_options(
            &user,
            project_id.parse::<ProjectId>()?,
            field_id.parse::<FieldDefinitionId>()?,
        )
        .await?;

    Ok(Json(FieldOptionsResponse {
        options: options.into_iter().collect(),
    }))
}

pub async fn upload_data_file_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(project_id): Path<String>,
    multipart: Multipart,
) -> ApiResult<Json<DataFileHeadersResponse>> {
    let project_id = project_id.parse::<ProjectId>()?;
    let file = read_upload_form(multipart, "file").await?.require_file("file")?;

    state
        .project_service
        .attach_data_file(&user, project_id, file.filename.as_str(), file.bytes)
        .await?;
    let headers = state
        .project_service
        .data_file_headers(&user, project_id)
        .await?;

    Ok(Json(DataFileHeadersResponse { headers }))
}

pub async fn data_file_headers_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(project_id): Path<String>,
) -> ApiResult<Json<DataFileHeadersResponse>> {
    let headers = state
        .project_service
        .data_file_headers(&user, project_id.parse::<ProjectId>()?)
        .await?;

    Ok(Json(DataFileHeadersResponse { headers }))
}

pub async fn create_item_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(project_id): Path<String>,
    Json(payload): Json<CreateItemRequest>,
) -> ApiResult<(StatusCode, Json<ItemResponse>)> {
    let field_values = payload
        .field_values
        .into_iter()
        .map(|(field_id, value)| {
            field_id
                .parse::<FieldDefinitionId>()
                .map(|field_id| (field_id, value))
        })
        .collect::<AppResult<BTreeMap<_, _>>>()?;

    let item = state
        .item_service
        .create_item(
            &user,
            CreateItemInput {
                project_id: project_id.parse::<ProjectId>()?,
                field_values,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ItemResponse::from(&item))))
}

fn parse_user_id(value: &str) -> AppResult<UserId> {
    uuid::Uuid::parse_str(value.trim())
        .map(UserId::from_uuid)
        .map_err(|error| AppError::Validation(format!("malformed user id '{value}': {error}")))
}
