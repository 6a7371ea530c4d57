//! Evidence sequencing, upload protocol and item completion.

use std::collections::HashSet;
use std::sync::Arc;

use fieldtrack_core::{AppError, AppResult, UserIdentity};
use fieldtrack_domain::{
    EvidenceRecord, Item, ItemId, Project, ProjectType, StageDefinition, StageId, item_is_complete,
};

use crate::service_support::project_type_of;
use crate::{
    AccessPolicyService, AuditLogService, EvidenceRepository, GeoTagger, ItemRepository,
    MediaStore, ProjectRepository, Watermarker,
};

mod upload;
mod views;

#[cfg(test)]
mod tests;

pub use upload::{EvidenceDeletion, EvidenceUpload, EvidenceUploadResult};
pub use views::{ItemProgressView, StageProgress};

/// Application service owning the evidence workflow of items.
#[derive(Clone)]
pub struct ProgressService {
    access: AccessPolicyService,
    audit: AuditLogService,
    projects: Arc<dyn ProjectRepository>,
    items: Arc<dyn ItemRepository>,
    evidence: Arc<dyn EvidenceRepository>,
    media: Arc<dyn MediaStore>,
    geotagger: Arc<dyn GeoTagger>,
    watermarker: Arc<dyn Watermarker>,
}

/// Collaborators of [`ProgressService`].
pub struct ProgressServiceDependencies {
    /// Access policy.
    pub access: AccessPolicyService,
    /// Audit trail.
    pub audit: AuditLogService,
    /// Project repository.
    pub projects: Arc<dyn ProjectRepository>,
    /// Item repository.
    pub items: Arc<dyn ItemRepository>,
    /// Evidence repository.
    pub evidence: Arc<dyn EvidenceRepository>,
    /// Image storage.
    pub media: Arc<dyn MediaStore>,
    /// EXIF reader.
    pub geotagger: Arc<dyn GeoTagger>,
    /// Branding renderer.
    pub watermarker: Arc<dyn Watermarker>,
}

/// Item together with the project context it is evaluated in.
struct ItemContext {
    item: Item,
    project: Project,
    project_type: ProjectType,
}

impl ProgressService {
    /// Creates a new progress service.
    #[must_use]
    pub fn new(dependencies: ProgressServiceDependencies) -> Self {
        Self {
            access: dependencies.access,
            audit: dependencies.audit,
            projects: dependencies.projects,
            items: dependencies.items,
            evidence: dependencies.evidence,
            media: dependencies.media,
            geotagger: dependencies.geotagger,
            watermarker: dependencies.watermarker,
        }
    }

    /// Recomputes and persists the completion flag of an item.
    ///
    /// Runs synchronously after every evidence create or delete.
    pub async fn recompute_item_completion(
        &self,
        item_id: ItemId,
        stages: &[StageDefinition],
    ) -> AppResult<bool> {
        let evidenced = self.evidenced_stages(item_id).await?;
        let is_completed = item_is_complete(stages, &evidenced);
        self.items
            .set_item_completion(item_id, is_completed)
            .await?;
        Ok(is_completed)
    }

    async fn evidenced_stages(&self, item_id: ItemId) -> AppResult<HashSet<StageId>> {
        Ok(self
            .evidence
            .list_item_evidence(item_id)
            .await?
            .into_iter()
            .map(|record: EvidenceRecord| record.stage_id)
            .collect())
    }

    async fn authorized_item(&self, actor: &UserIdentity, item_id: ItemId) -> AppResult<ItemContext> {
        let item = self
            .items
            .find_item(item_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("item '{item_id}' does not exist")))?;
        let project = self.access.authorize_project(actor, item.project_id).await?;
        let project_type = project_type_of(self.projects.as_ref(), &project).await?;

        Ok(ItemContext {
            item,
            project,
            project_type,
        })
    }
}
