use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use fieldtrack_core::AppError;
use tracing::error;

mod types;

pub use types::ErrorResponse;

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::SequenceViolation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self.0, "request failed");
        }

        let payload = match self.0 {
            AppError::SequenceViolation(missing_stages) => {
                let message = AppError::SequenceViolation(missing_stages.clone()).to_string();
                ErrorResponse::with_missing_stages(message, missing_stages)
            }
            other => ErrorResponse::new(other.to_string()),
        };

        (status, Json(payload)).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use fieldtrack_core::AppError;

    use super::ApiError;

    async fn render(error: AppError) -> (StatusCode, serde_json::Value) {
        let response = ApiError(error).into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap_or_else(|_| unreachable!());
        (
            status,
            serde_json::from_slice(&body).unwrap_or_else(|_| unreachable!()),
        )
    }

    #[tokio::test]
    async fn locked_stage_lists_missing_predecessors() {
        let (status, body) = render(AppError::SequenceViolation(vec![
            "Excavation".to_owned(),
            "Planting".to_owned(),
        ]))
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body["missing_stages"],
            serde_json::json!(["Excavation", "Planting"])
        );
    }

    #[tokio::test]
    async fn rate_limit_maps_to_too_many_requests() {
        let (status, body) = render(AppError::RateLimited("slow down".to_owned())).await;

        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert!(body.get("missing_stages").is_none());
        assert_eq!(body["message"], "rate limited: slow down");
    }
}
