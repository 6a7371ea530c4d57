use tracing::{debug, warn};

use fieldtrack_core::{AppError, AppResult, UserIdentity};
use fieldtrack_domain::{
    AuditAction, AuditRecord, EvidenceId, EvidenceRecord, GpsCoordinates, ItemId, StageGate,
    StageId, can_accept,
};

use crate::BrandingOutcome;
use crate::service_support::{audit_actor, require_active_project};

use super::ProgressService;

const EVIDENCE_NAMESPACE: &str = "evidence";

/// Photo submitted for one stage of one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceUpload {
    /// Evidenced item.
    pub item_id: ItemId,
    /// Evidenced stage.
    pub stage_id: StageId,
    /// Raw image bytes.
    pub image: Vec<u8>,
    /// Original file name.
    pub filename: String,
    /// Client-supplied latitude.
    pub latitude: Option<String>,
    /// Client-supplied longitude.
    pub longitude: Option<String>,
}

/// Outcome of an accepted upload.
#[derive(Debug, Clone, PartialEq)]
pub struct EvidenceUploadResult {
    /// Stored record.
    pub record: EvidenceRecord,
    /// Whether an earlier record for the stage was replaced.
    pub replaced: bool,
    /// Whether the stored image carries branding.
    pub branded: bool,
    /// Item completion after the upload.
    pub item_completed: bool,
}

/// Outcome of an evidence deletion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvidenceDeletion {
    /// Whether a record existed and was removed.
    pub deleted: bool,
    /// Item completion after the request.
    pub item_completed: bool,
}

impl ProgressService {
    /// Accepts a photo for a stage.
    ///
    /// Inputs are validated and the stage gate is checked before anything is
    /// stored. Missing coordinates are read from the image metadata, and a
    /// failed branding pass stores the original image instead.
    pub async fn upload_evidence(
        &self,
        actor: &UserIdentity,
        upload: EvidenceUpload,
    ) -> AppResult<EvidenceUploadResult> {
        let supplied_gps =
            GpsCoordinates::parse_optional(upload.latitude.as_deref(), upload.longitude.as_deref())?;
        if upload.image.is_empty() {
            return Err(AppError::Validation("evidence image is empty".to_owned()));
        }

        let context = self.authorized_item(actor, upload.item_id).await?;
        require_active_project(&context.project)?;

        let stages = context.project_type.stages();
        let stage = context.project_type.stage(upload.stage_id).ok_or_else(|| {
            AppError::Validation(format!(
                "stage '{}' does not belong to project type '{}'",
                upload.stage_id,
                context.project_type.name()
            ))
        })?;

        let evidenced = self.evidenced_stages(context.item.id).await?;
        if let StageGate::Reject { missing_stages } = can_accept(stage, stages, &evidenced) {
            return Err(AppError::SequenceViolation(missing_stages));
        }

        let gps = match supplied_gps {
            Some(gps) => Some(gps),
            None => {
                let extracted = self.geotagger.extract(&upload.image);
                if extracted.is_none() {
                    debug!(item_id = %context.item.id, "no embedded gps in evidence image");
                }
                extracted
            }
        };

        let branding = self.watermarker.brand(upload.image, gps).await;
        if let BrandingOutcome::Unbranded { reason, .. } = &branding {
            warn!(
                item_id = %context.item.id,
                stage_id = %stage.id(),
                reason = %reason,
                "watermarking failed, storing original image"
            );
        }
        let branded = branding.is_branded();

        let image_key = self
            .media
            .put(EVIDENCE_NAMESPACE, &upload.filename, branding.into_bytes())
            .await?;

        let previous = self
            .evidence
            .delete_evidence(context.item.id, stage.id())
            .await?;
        let record = EvidenceRecord {
            id: EvidenceId::new(),
            item_id: context.item.id,
            stage_id: stage.id(),
            image_key,
            gps,
            captured_at: chrono::Utc::now(),
            uploaded_by: Some(actor.user_id()),
        };
        self.evidence.insert_evidence(record.clone()).await?;

        if let Some(previous) = &previous {
            self.discard_image(&previous.image_key).await;
        }

        let item_completed = self
            .recompute_item_completion(context.item.id, stages)
            .await?;

        let replaced = previous.is_some();
        self.audit
            .record(AuditRecord {
                project_id: context.project.id(),
                actor: Some(audit_actor(actor)),
                action: if replaced {
                    AuditAction::EvidenceReuploaded
                } else {
                    AuditAction::EvidenceUploaded
                },
                target: context.item.identifier.clone(),
                details: format!("Stage: {}", stage.name()),
                gps,
            })
            .await;

        Ok(EvidenceUploadResult {
            record,
            replaced,
            branded,
            item_completed,
        })
    }

    /// Removes the evidence of one stage and recomputes completion.
    ///
    /// Deleting a stage without evidence changes nothing and is not audited.
    pub async fn delete_stage_evidence(
        &self,
        actor: &UserIdentity,
        item_id: ItemId,
        stage_id: StageId,
    ) -> AppResult<EvidenceDeletion> {
        let context = self.authorized_item(actor, item_id).await?;
        require_active_project(&context.project)?;

        let stage = context.project_type.stage(stage_id).ok_or_else(|| {
            AppError::Validation(format!(
                "stage '{stage_id}' does not belong to project type '{}'",
                context.project_type.name()
            ))
        })?;

        let Some(removed) = self.evidence.delete_evidence(item_id, stage_id).await? else {
            return Ok(EvidenceDeletion {
                deleted: false,
                item_completed: context.item.is_completed,
            });
        };

        self.discard_image(&removed.image_key).await;
        let item_completed = self
            .recompute_item_completion(item_id, context.project_type.stages())
            .await?;

        self.audit
            .record(AuditRecord {
                project_id: context.project.id(),
                actor: Some(audit_actor(actor)),
                action: AuditAction::EvidenceDeleted,
                target: context.item.identifier.clone(),
                details: format!("Stage: {}", stage.name()),
                gps: removed.gps,
            })
            .await;

        Ok(EvidenceDeletion {
            deleted: true,
            item_completed,
        })
    }

    async fn discard_image(&self, image_key: &str) {
        if let Err(error) = self.media.delete(image_key).await {
            warn!(error = %error, image_key, "failed to remove replaced evidence image");
        }
    }
}
