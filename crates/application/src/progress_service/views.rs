use std::collections::HashMap;

use fieldtrack_core::{AppError, AppResult, UserIdentity};
use fieldtrack_domain::{
    EvidenceRecord, Item, ItemId, ProjectId, ProjectStatus, StageDefinition, StageId,
    compute_stage_locks,
};

use super::ProgressService;

/// Stage row of an item detail view.
#[derive(Debug, Clone, PartialEq)]
pub struct StageProgress {
    /// Stage definition.
    pub stage: StageDefinition,
    /// Display lock, derived on every read.
    pub is_locked: bool,
    /// Current evidence for the stage.
    pub evidence: Option<EvidenceRecord>,
}

/// Item detail as seen by contractors and admins.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemProgressView {
    /// The item.
    pub item: Item,
    /// Owning project.
    pub project_id: ProjectId,
    /// Owning project name.
    pub project_name: String,
    /// Owning project status.
    pub project_status: ProjectStatus,
    /// Stages in ascending order.
    pub stages: Vec<StageProgress>,
    /// Captured custom answers as `(label, value)`.
    pub field_values: Vec<(String, String)>,
}

impl ProgressService {
    /// Returns the stage list of an item with lock state and evidence.
    pub async fn item_progress(
        &self,
        actor: &UserIdentity,
        item_id: ItemId,
    ) -> AppResult<ItemProgressView> {
        let context = self.authorized_item(actor, item_id).await?;

        let mut evidence_by_stage = self
            .evidence
            .list_item_evidence(item_id)
            .await?
            .into_iter()
            .map(|record| (record.stage_id, record))
            .collect::<HashMap<_, _>>();
        let evidenced = evidence_by_stage.keys().copied().collect();

        let stages = compute_stage_locks(context.project_type.stages(), &evidenced)
            .into_iter()
            .map(|lock| StageProgress {
                stage: lock.stage.clone(),
                is_locked: lock.is_locked,
                evidence: evidence_by_stage.remove(&lock.stage.id()),
            })
            .collect();

        let labels = self
            .projects
            .list_field_definitions(context.project.id())
            .await?
            .into_iter()
            .map(|definition| (definition.id(), definition.label().to_owned()))
            .collect::<Vec<_>>();
        let values = self.items.list_field_values(item_id).await?;
        let field_values = labels
            .into_iter()
            .filter_map(|(field_id, label)| {
                values
                    .iter()
                    .find(|value| value.field_id == field_id)
                    .map(|value| (label, value.value.clone()))
            })
            .collect();

        Ok(ItemProgressView {
            project_id: context.project.id(),
            project_name: context.project.name().to_owned(),
            project_status: context.project.status(),
            item: context.item,
            stages,
            field_values,
        })
    }

    /// Loads the stored photo of one stage for a contractor or admin.
    pub async fn evidence_image(
        &self,
        actor: &UserIdentity,
        item_id: ItemId,
        stage_id: StageId,
    ) -> AppResult<Vec<u8>> {
        self.authorized_item(actor, item_id).await?;
        self.load_evidence_image(item_id, stage_id).await
    }

    /// Loads the stored photo of one stage through a project magic link.
    pub async fn client_evidence_image(
        &self,
        project_link: &str,
        item_id: ItemId,
        stage_id: StageId,
    ) -> AppResult<Vec<u8>> {
        let project = self.access.resolve_project_link(project_link).await?;
        self.items
            .find_item(item_id)
            .await?
            .filter(|item| item.project_id == project.id())
            .ok_or_else(|| AppError::NotFound(format!("item '{item_id}' does not exist")))?;

        self.load_evidence_image(item_id, stage_id).await
    }

    async fn load_evidence_image(&self, item_id: ItemId, stage_id: StageId) -> AppResult<Vec<u8>> {
        let record = self
            .evidence
            .find_evidence(item_id, stage_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "no evidence for item '{item_id}' at stage '{stage_id}'"
                ))
            })?;

        self.media.get(&record.image_key).await?.ok_or_else(|| {
            AppError::NotFound(format!("evidence image '{}' is missing", record.image_key))
        })
    }
}
