//! Item creation with custom field capture and identifier allocation.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::warn;

use fieldtrack_core::{AppError, AppResult, UserIdentity};
use fieldtrack_domain::{
    AuditAction, AuditRecord, FieldDefinitionId, Item, ItemFieldSchema, ItemId, Project,
    ProjectId, candidate_identifier, suffixed_identifier,
};

use crate::service_support::{audit_actor, project_type_of, require_active_project};
use crate::{AccessPolicyService, AuditLogService, DataFileService, ItemRepository, ProjectRepository};

#[cfg(test)]
mod tests;

const MAX_IDENTIFIER_ATTEMPTS: u32 = 1_000;

/// Input for creating one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateItemInput {
    /// Target project.
    pub project_id: ProjectId,
    /// Raw answers keyed by field definition.
    pub field_values: BTreeMap<FieldDefinitionId, String>,
}

/// Application service for item creation.
#[derive(Clone)]
pub struct ItemService {
    access: AccessPolicyService,
    audit: AuditLogService,
    projects: Arc<dyn ProjectRepository>,
    items: Arc<dyn ItemRepository>,
    data_files: DataFileService,
}

impl ItemService {
    /// Creates a new item service.
    #[must_use]
    pub fn new(
        access: AccessPolicyService,
        audit: AuditLogService,
        projects: Arc<dyn ProjectRepository>,
        items: Arc<dyn ItemRepository>,
        data_files: DataFileService,
    ) -> Self {
        Self {
            access,
            audit,
            projects,
            items,
            data_files,
        }
    }

    /// Creates an item and names it.
    ///
    /// Answers are validated before anything is written. The item is stored
    /// under a placeholder, its answers are persisted, and only then is the
    /// identifier derived, so the grouping count includes the new item.
    pub async fn create_item(
        &self,
        actor: &UserIdentity,
        input: CreateItemInput,
    ) -> AppResult<Item> {
        let project = self.access.authorize_project(actor, input.project_id).await?;
        require_active_project(&project)?;
        let project_type = project_type_of(self.projects.as_ref(), &project).await?;

        let schema =
            ItemFieldSchema::new(self.projects.list_field_definitions(project.id()).await?)?;
        let options = self.data_files.dropdown_options(&project, &schema).await;
        let captured = schema.validate_values(&input.field_values, &options)?;

        let group = schema
            .grouping_field()
            .and_then(|field| captured.get(field.id()).map(|value| (field.id(), value.to_owned())));

        let mut item = Item::pending(project.id(), Some(actor.user_id()), chrono::Utc::now());
        self.items.insert_item(item.clone()).await?;
        self.items
            .save_field_values(captured.into_values(item.id))
            .await?;

        let group_count = match &group {
            Some((field_id, value)) => {
                self.items
                    .count_items_with_field_value(project.id(), *field_id, value)
                    .await?
            }
            None => 0,
        };
        let total_count = self.items.count_items(project.id()).await?;
        let candidate = candidate_identifier(
            project.name(),
            project_type.unit_name(),
            group.as_ref().map(|(_, value)| value.as_str()),
            group_count,
            total_count,
        );

        item.identifier = self.assign_identifier(&project, item.id, candidate).await?;

        self.audit
            .record(AuditRecord {
                project_id: project.id(),
                actor: Some(audit_actor(actor)),
                action: AuditAction::ItemCreated,
                target: item.identifier.clone(),
                details: format!("Created new {}", project_type.unit_name()),
                gps: None,
            })
            .await;

        Ok(item)
    }

    async fn assign_identifier(
        &self,
        project: &Project,
        item_id: ItemId,
        candidate: String,
    ) -> AppResult<String> {
        if self.items.try_assign_identifier(item_id, &candidate).await? {
            return Ok(candidate);
        }

        for attempt in 1..=MAX_IDENTIFIER_ATTEMPTS {
            let identifier = suffixed_identifier(&candidate, attempt);
            if self.items.try_assign_identifier(item_id, &identifier).await? {
                warn!(
                    project_id = %project.id(),
                    item_id = %item_id,
                    candidate = %candidate,
                    attempt,
                    "identifier collision resolved with suffix"
                );
                return Ok(identifier);
            }
        }

        Err(AppError::Conflict(format!(
            "could not allocate a unique identifier for '{candidate}'"
        )))
    }
}
