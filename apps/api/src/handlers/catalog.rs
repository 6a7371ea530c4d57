//! Admin catalog: clients, workflow templates and accounts.

use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use fieldtrack_application::{CreateProjectTypeInput, NewUser, StageInput};
use fieldtrack_core::{UserIdentity, UserRole};

use crate::dto::{
    ClientResponse, CreateClientRequest, CreateProjectTypeRequest, CreateUserRequest,
    ProjectTypeResponse, UserIdentityResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_clients_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<ClientResponse>>> {
    let clients = state
        .project_service
        .list_clients(&user)
        .await?
        .iter()
        .map(|client| ClientResponse::new(client, state.client_link_url(&client.link().to_string())))
        .collect();

    Ok(Json(clients))
}

pub async fn create_client_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<CreateClientRequest>,
) -> ApiResult<(StatusCode, Json<ClientResponse>)> {
    let client = state
        .project_service
        .create_client(&user, payload.name.as_str())
        .await?;
    let dashboard_url = state.client_link_url(&client.link().to_string());

    Ok((
        StatusCode::CREATED,
        Json(ClientResponse::new(&client, dashboard_url)),
    ))
}

pub async fn list_project_types_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<ProjectTypeResponse>>> {
    let project_types = state
        .project_service
        .list_project_types(&user)
        .await?
        .iter()
        .map(ProjectTypeResponse::from)
        .collect();

    Ok(Json(project_types))
}

pub async fn create_project_type_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<CreateProjectTypeRequest>,
) -> ApiResult<(StatusCode, Json<ProjectTypeResponse>)> {
    let project_type = state
        .project_service
        .create_project_type(
            &user,
            CreateProjectTypeInput {
                name: payload.name,
                unit_name: payload.unit_name,
                description: payload.description,
                stages: payload
                    .stages
                    .into_iter()
                    .map(|stage| StageInput {
                        name: stage.name,
                        order: stage.order,
                        is_required: stage.is_required,
                    })
                    .collect(),
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ProjectTypeResponse::from(&project_type)),
    ))
}

pub async fn list_contractors_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<UserIdentityResponse>>> {
    let contractors = state
        .user_service
        .list_contractors(&user)
        .await?
        .into_iter()
        .map(UserIdentityResponse::from)
        .collect();

    Ok(Json(contractors))
}

pub async fn create_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserIdentityResponse>)> {
    let role = payload.role.trim().parse::<UserRole>()?;
    let created = state
        .user_service
        .create_user(
            &user,
            NewUser {
                username: payload.username,
                password: payload.password,
                role,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(UserIdentityResponse::from(created))))
}
