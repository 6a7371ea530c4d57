use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use fieldtrack_application::AuthOutcome;
use fieldtrack_core::{AppError, UserIdentity};
use tower_sessions::Session;
use tracing::info;

use crate::dto::{AuthLoginRequest, UserIdentityResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub const SESSION_USER_KEY: &str = "user_identity";

/// POST /auth/login - Authenticate with username and password.
pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<AuthLoginRequest>,
) -> ApiResult<Json<UserIdentityResponse>> {
    let identity = match state
        .user_service
        .login(&payload.username, &payload.password)
        .await?
    {
        AuthOutcome::Authenticated(identity) => identity,
        AuthOutcome::Failed => {
            return Err(AppError::Unauthorized("invalid username or password".to_owned()).into());
        }
    };

    session
        .cycle_id()
        .await
        .map_err(|error| AppError::Internal(format!("failed to cycle session id: {error}")))?;
    session
        .insert(SESSION_USER_KEY, &identity)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session identity: {error}"))
        })?;

    info!(user_id = %identity.user_id(), role = identity.role().as_str(), "user logged in");
    Ok(Json(UserIdentityResponse::from(identity)))
}

/// POST /auth/logout - Drop the current session.
pub async fn logout_handler(session: Session) -> ApiResult<StatusCode> {
    session
        .delete()
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /auth/me - Return the authenticated account.
pub async fn me_handler(Extension(user): Extension<UserIdentity>) -> Json<UserIdentityResponse> {
    Json(UserIdentityResponse::from(user))
}
