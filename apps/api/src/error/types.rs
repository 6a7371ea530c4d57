use serde::Serialize;
use ts_rs::TS;

/// API error payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    missing_stages: Option<Vec<String>>,
}

impl ErrorResponse {
    pub(super) fn new(message: String) -> Self {
        Self {
            message,
            missing_stages: None,
        }
    }

    pub(super) fn with_missing_stages(message: String, missing_stages: Vec<String>) -> Self {
        Self {
            message,
            missing_stages: Some(missing_stages),
        }
    }
}
