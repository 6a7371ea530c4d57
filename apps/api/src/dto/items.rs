use std::collections::BTreeMap;

use fieldtrack_application::{
    EvidenceDeletion, EvidenceUploadResult, ItemEvidenceHistory, ItemProgressView, StageEvidence,
    StageProgress,
};
use fieldtrack_domain::{EvidenceRecord, Item};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::StageResponse;

/// Incoming payload for item creation. Keys are field definition ids.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/create-item-request.ts"
)]
pub struct CreateItemRequest {
    #[serde(default)]
    pub field_values: BTreeMap<String, String>,
}

/// API representation of an item.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/item-response.ts"
)]
pub struct ItemResponse {
    pub id: String,
    pub project_id: String,
    pub identifier: String,
    pub is_completed: bool,
    pub created_at: String,
}

impl From<&Item> for ItemResponse {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id.to_string(),
            project_id: item.project_id.to_string(),
            identifier: item.identifier.clone(),
            is_completed: item.is_completed,
            created_at: item.created_at.to_rfc3339(),
        }
    }
}

/// API representation of a stored evidence photo.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/evidence-response.ts"
)]
pub struct EvidenceResponse {
    pub id: String,
    pub stage_id: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub captured_at: String,
}

impl From<&EvidenceRecord> for EvidenceResponse {
    fn from(record: &EvidenceRecord) -> Self {
        Self {
            id: record.id.to_string(),
            stage_id: record.stage_id.to_string(),
            latitude: record.gps.map(|gps| gps.latitude()),
            longitude: record.gps.map(|gps| gps.longitude()),
            captured_at: record.captured_at.to_rfc3339(),
        }
    }
}

/// Stage row of an item detail.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/stage-progress-response.ts"
)]
pub struct StageProgressResponse {
    pub stage: StageResponse,
    pub is_locked: bool,
    pub evidence: Option<EvidenceResponse>,
}

impl From<&StageProgress> for StageProgressResponse {
    fn from(progress: &StageProgress) -> Self {
        Self {
            stage: StageResponse::from(&progress.stage),
            is_locked: progress.is_locked,
            evidence: progress.evidence.as_ref().map(EvidenceResponse::from),
        }
    }
}

/// Captured answer to one custom question.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/field-value-response.ts"
)]
pub struct FieldValueResponse {
    pub label: String,
    pub value: String,
}

/// Item detail with per-stage lock state.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/item-progress-response.ts"
)]
pub struct ItemProgressResponse {
    pub item: ItemResponse,
    pub project_id: String,
    pub project_name: String,
    pub project_status: String,
    pub stages: Vec<StageProgressResponse>,
    pub field_values: Vec<FieldValueResponse>,
}

impl From<ItemProgressView> for ItemProgressResponse {
    fn from(view: ItemProgressView) -> Self {
        Self {
            item: ItemResponse::from(&view.item),
            project_id: view.project_id.to_string(),
            project_name: view.project_name,
            project_status: view.project_status.as_str().to_owned(),
            stages: view.stages.iter().map(StageProgressResponse::from).collect(),
            field_values: view
                .field_values
                .into_iter()
                .map(|(label, value)| FieldValueResponse { label, value })
                .collect(),
        }
    }
}

/// Outcome of an evidence upload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/evidence-upload-response.ts"
)]
pub struct EvidenceUploadResponse {
    pub evidence: EvidenceResponse,
    pub replaced: bool,
    pub branded: bool,
    pub item_completed: bool,
}

impl From<EvidenceUploadResult> for EvidenceUploadResponse {
    fn from(result: EvidenceUploadResult) -> Self {
        Self {
            evidence: EvidenceResponse::from(&result.record),
            replaced: result.replaced,
            branded: result.branded,
            item_completed: result.item_completed,
        }
    }
}

/// Outcome of an evidence deletion.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/evidence-deletion-response.ts"
)]
pub struct EvidenceDeletionResponse {
    pub deleted: bool,
    pub item_completed: bool,
}

impl From<EvidenceDeletion> for EvidenceDeletionResponse {
    fn from(deletion: EvidenceDeletion) -> Self {
        Self {
            deleted: deletion.deleted,
            item_completed: deletion.item_completed,
        }
    }
}

/// Evidence of one stage inside an item history.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/stage-evidence-response.ts"
)]
pub struct StageEvidenceResponse {
    pub stage: StageResponse,
    pub evidence: EvidenceResponse,
}

impl From<&StageEvidence> for StageEvidenceResponse {
    fn from(entry: &StageEvidence) -> Self {
        Self {
            stage: StageResponse::from(&entry.stage),
            evidence: EvidenceResponse::from(&entry.evidence),
        }
    }
}

/// Item with its evidence in stage order.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/item-history-response.ts"
)]
pub struct ItemHistoryResponse {
    pub item: ItemResponse,
    pub evidence: Vec<StageEvidenceResponse>,
}

impl From<&ItemEvidenceHistory> for ItemHistoryResponse {
    fn from(history: &ItemEvidenceHistory) -> Self {
        Self {
            item: ItemResponse::from(&history.item),
            evidence: history
                .evidence
                .iter()
                .map(StageEvidenceResponse::from)
                .collect(),
        }
    }
}
