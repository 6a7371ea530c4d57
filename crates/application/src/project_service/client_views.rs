use std::collections::{BTreeMap, HashMap};

use fieldtrack_core::{AppResult, UserIdentity};
use fieldtrack_domain::{
    Client, EvidenceRecord, Item, ItemFieldSchema, ItemId, ProjectId, ProjectType,
    StageDefinition,
};

use crate::service_support::project_type_of;

use super::{ProjectService, ProjectSummary};

/// Client organisation dashboard reached through the client link.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientDashboard {
    /// The client.
    pub client: Client,
    /// The client's projects.
    pub projects: Vec<ProjectSummary>,
}

/// Evidence photo for one stage.
#[derive(Debug, Clone, PartialEq)]
pub struct StageEvidence {
    /// Evidenced stage.
    pub stage: StageDefinition,
    /// Stored record.
    pub evidence: EvidenceRecord,
}

/// Item with its evidence sorted by stage order.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemEvidenceHistory {
    /// The item.
    pub item: Item,
    /// Evidence in ascending stage order.
    pub evidence: Vec<StageEvidence>,
}

/// Items sharing one grouping value.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemGroup {
    /// Grouping value; `None` collects items without one.
    pub label: Option<String>,
    /// Items in creation order.
    pub items: Vec<ItemEvidenceHistory>,
}

/// Read-only project view reached through the project magic link.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientProjectView {
    /// Progress figures.
    pub summary: ProjectSummary,
    /// Label of the grouping field, if configured.
    pub grouping_label: Option<String>,
    /// Item groups sorted by value, ungrouped items last.
    pub groups: Vec<ItemGroup>,
}

impl ProjectService {
    /// Returns the dashboard of a client organisation.
    pub async fn client_dashboard(&self, client_link: &str) -> AppResult<ClientDashboard> {
        let client = self.access.resolve_client_link(client_link).await?;
        let projects = self.projects.list_projects_for_client(client.id()).await?;

        Ok(ClientDashboard {
            projects: self.summarize_all(projects).await?,
            client,
        })
    }

    /// Returns the client view of a project.
    pub async fn client_project_view(&self, project_link: &str) -> AppResult<ClientProjectView> {
        let project = self.access.resolve_project_link(project_link).await?;
        let project_type = project_type_of(self.projects.as_ref(), &project).await?;

        let schema =
            ItemFieldSchema::new(self.projects.list_field_definitions(project.id()).await?)?;
        let grouping_field = schema.grouping_field().cloned();
        let group_values = match &grouping_field {
            Some(field) => self
                .items
                .list_project_field_values(project.id(), field.id())
                .await?
                .into_iter()
                .map(|value| (value.item_id, value.value))
                .collect::<HashMap<_, _>>(),
            None => HashMap::new(),
        };

        let histories = self.evidence_histories(project.id(), &project_type).await?;

        let mut grouped = BTreeMap::<String, Vec<ItemEvidenceHistory>>::new();
        let mut ungrouped = Vec::new();
        for history in histories {
            match group_values
                .get(&history.item.id)
                .filter(|value| !value.trim().is_empty())
            {
                Some(value) => grouped.entry(value.clone()).or_default().push(history),
                None => ungrouped.push(history),
            }
        }

        let mut groups = grouped
            .into_iter()
            .map(|(label, items)| ItemGroup {
                label: Some(label),
                items,
            })
            .collect::<Vec<_>>();
        if !ungrouped.is_empty() {
            groups.push(ItemGroup {
                label: None,
                items: ungrouped,
            });
        }

        Ok(ClientProjectView {
            summary: self.summarize(project).await?,
            grouping_label: grouping_field.map(|field| field.label().to_owned()),
            groups,
        })
    }

    /// Returns every item's evidence in stage order. Admin only.
    pub async fn admin_inspection(
        &self,
        actor: &UserIdentity,
        project_id: ProjectId,
    ) -> AppResult<Vec<ItemEvidenceHistory>> {
        self.access
            .require_admin(actor, Some(project_id), "inspect project evidence")
            .await?;
        let project = self.access.authorize_project(actor, project_id).await?;
        let project_type = project_type_of(self.projects.as_ref(), &project).await?;

        self.evidence_histories(project.id(), &project_type).await
    }

    async fn evidence_histories(
        &self,
        project_id: ProjectId,
        project_type: &ProjectType,
    ) -> AppResult<Vec<ItemEvidenceHistory>> {
        let mut evidence_by_item = HashMap::<ItemId, Vec<EvidenceRecord>>::new();
        for record in self.evidence.list_project_evidence(project_id).await? {
            evidence_by_item
                .entry(record.item_id)
                .or_default()
                .push(record);
        }

        Ok(self
            .items
            .list_items(project_id)
            .await?
            .into_iter()
            .map(|item| {
                let records = evidence_by_item.remove(&item.id).unwrap_or_default();
                let evidence = project_type
                    .stages()
                    .iter()
                    .filter_map(|stage| {
                        records
                            .iter()
                            .find(|record| record.stage_id == stage.id())
                            .map(|record| StageEvidence {
                                stage: stage.clone(),
                                evidence: record.clone(),
                            })
                    })
                    .collect();
                ItemEvidenceHistory { item, evidence }
            })
            .collect())
    }
}
