//! Item progress, evidence uploads and issue resolution.

use axum::Json;
use axum::extract::{Extension, Multipart, Path, State};
use axum::response::Response;
use fieldtrack_application::EvidenceUpload;
use fieldtrack_core::UserIdentity;
use fieldtrack_domain::{IssueId, ItemId, StageId};
use tracing::info;

use crate::dto::{
    EvidenceDeletionResponse, EvidenceUploadResponse, IssueResponse, ItemProgressResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

use super::uploads::{image_response, read_upload_form};

pub async fn item_progress_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(item_id): Path<String>,
) -> ApiResult<Json<ItemProgressResponse>> {
    let view = state
        .progress_service
        .item_progress(&user, item_id.parse::<ItemId>()?)
        .await?;

    Ok(Json(ItemProgressResponse::from(view)))
}

/// PUT /api/items/{item_id}/stages/{stage_id}/evidence
///
/// Multipart fields: `image` (required), `latitude` and `longitude`.
pub async fn upload_evidence_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((item_id, stage_id)): Path<(String, String)>,
    multipart: Multipart,
) -> ApiResult<Json<EvidenceUploadResponse>> {
    let item_id = item_id.parse::<ItemId>()?;
    let stage_id = stage_id.parse::<StageId>()?;
    let mut form = read_upload_form(multipart, "image").await?;
    let image = form.require_file("image")?;

    let result = state
        .progress_service
        .upload_evidence(
            &user,
            EvidenceUpload {
                item_id,
                stage_id,
                image: image.bytes,
                filename: image.filename,
                latitude: form.text("latitude"),
                longitude: form.text("longitude"),
            },
        )
        .await?;

    info!(
        item_id = %item_id,
        stage_id = %stage_id,
        replaced = result.replaced,
        branded = result.branded,
        "evidence uploaded"
    );
    Ok(Json(EvidenceUploadResponse::from(result)))
}

pub async fn delete_evidence_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((item_id, stage_id)): Path<(String, String)>,
) -> ApiResult<Json<EvidenceDeletionResponse>> {
    let deletion = state
        .progress_service
        .delete_stage_evidence(&user, item_id.parse::<ItemId>()?, stage_id.parse::<StageId>()?)
        .await?;

    Ok(Json(EvidenceDeletionResponse::from(deletion)))
}

pub async fn evidence_image_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((item_id, stage_id)): Path<(String, String)>,
) -> ApiResult<Response> {
    let bytes = state
        .progress_service
        .evidence_image(&user, item_id.parse::<ItemId>()?, stage_id.parse::<StageId>()?)
        .await?;

    Ok(image_response(bytes))
}

pub async fn resolve_issue_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(issue_id): Path<String>,
) -> ApiResult<Json<IssueResponse>> {
    let issue = state
        .issue_service
        .resolve_issue(&user, issue_id.parse::<IssueId>()?)
        .await?;

    Ok(Json(IssueResponse::new(&issue, None)))
}
