use fieldtrack_application::{EvidenceRepository, IssueRepository, ItemRepository};
use fieldtrack_domain::StageId;

use super::*;

impl InMemoryTrackerRepository {
    async fn project_item_ids(&self, project_id: ProjectId) -> Vec<ItemId> {
        self.items
            .read()
            .await
            .iter()
            .filter(|item| item.project_id == project_id)
            .map(|item| item.id)
            .collect()
    }
}

fn count(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}

#[async_trait]
impl ItemRepository for InMemoryTrackerRepository {
    async fn insert_item(&self, item: Item) -> AppResult<()> {
        let mut items = self.items.write().await;
        if items.iter().any(|stored| {
            stored.project_id == item.project_id && stored.identifier == item.identifier
        }) {
            return Err(AppError::Conflict(format!(
                "item identifier '{}' already exists",
                item.identifier
            )));
        }

        items.push(item);
        Ok(())
    }

    async fn find_item(&self, item_id: ItemId) -> AppResult<Option<Item>> {
        Ok(self
            .items
            .read()
            .await
            .iter()
            .find(|item| item.id == item_id)
            .cloned())
    }

    async fn list_items(&self, project_id: ProjectId) -> AppResult<Vec<Item>> {
        let mut items = self
            .items
            .read()
            .await
            .iter()
            .filter(|item| item.project_id == project_id)
            .cloned()
            .collect::<Vec<_>>();
        items.sort_by_key(|item| item.created_at);
        Ok(items)
    }

    async fn count_items(&self, project_id: ProjectId) -> AppResult<u64> {
        Ok(count(self.project_item_ids(project_id).await.len()))
    }

    async fn count_completed_items(&self, project_id: ProjectId) -> AppResult<u64> {
        Ok(count(
            self.items
                .read()
                .await
                .iter()
                .filter(|item| item.project_id == project_id && item.is_completed)
                .count(),
        ))
    }

    async fn save_field_values(&self, values: Vec<ItemFieldValue>) -> AppResult<()> {
        let mut stored = self.field_values.write().await;
        for value in values {
            stored.insert((value.item_id, value.field_id), value);
        }
        Ok(())
    }

    async fn list_field_values(&self, item_id: ItemId) -> AppResult<Vec<ItemFieldValue>> {
        Ok(self
            .field_values
            .read()
            .await
            .values()
            .filter(|value| value.item_id == item_id)
            .cloned()
            .collect())
    }

    async fn list_project_field_values(
        &self,
        project_id: ProjectId,
        field_id: FieldDefinitionId,
    ) -> AppResult<Vec<ItemFieldValue>> {
        let item_ids = self.project_item_ids(project_id).await;
        Ok(self
            .field_values
            .read()
            .await
            .values()
            .filter(|value| value.field_id == field_id && item_ids.contains(&value.item_id))
            .cloned()
            .collect())
    }

    async fn count_items_with_field_value(
        &self,
        project_id: ProjectId,
        field_id: FieldDefinitionId,
        value: &str,
    ) -> AppResult<u64> {
        Ok(count(
            self.list_project_field_values(project_id, field_id)
                .await?
                .iter()
                .filter(|stored| stored.value == value)
                .count(),
        ))
    }

    async fn try_assign_identifier(&self, item_id: ItemId, identifier: &str) -> AppResult<bool> {
        let mut items = self.items.write().await;
        let project_id = items
            .iter()
            .find(|item| item.id == item_id)
            .map(|item| item.project_id)
            .ok_or_else(|| AppError::NotFound(format!("item '{item_id}' not found")))?;

        if items.iter().any(|item| {
            item.id != item_id && item.project_id == project_id && item.identifier == identifier
        }) {
            return Ok(false);
        }

        for item in items.iter_mut().filter(|item| item.id == item_id) {
            item.identifier = identifier.to_owned();
        }
        Ok(true)
    }

    async fn set_item_completion(&self, item_id: ItemId, is_completed: bool) -> AppResult<()> {
        let mut items = self.items.write().await;
        let item = items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or_else(|| AppError::NotFound(format!("item '{item_id}' not found")))?;
        item.is_completed = is_completed;
        Ok(())
    }
}

#[async_trait]
impl EvidenceRepository for InMemoryTrackerRepository {
    async fn list_item_evidence(&self, item_id: ItemId) -> AppResult<Vec<EvidenceRecord>> {
        Ok(self
            .evidence
            .read()
            .await
            .iter()
            .filter(|record| record.item_id == item_id)
            .cloned()
            .collect())
    }

    async fn list_project_evidence(
        &self,
        project_id: ProjectId,
    ) -> AppResult<Vec<EvidenceRecord>> {
        let item_ids = self.project_item_ids(project_id).await;
        Ok(self
            .evidence
            .read()
            .await
            .iter()
            .filter(|record| item_ids.contains(&record.item_id))
            .cloned()
            .collect())
    }

    async fn find_evidence(
        &self,
        item_id: ItemId,
        stage_id: StageId,
    ) -> AppResult<Option<EvidenceRecord>> {
        Ok(self
            .evidence
            .read()
            .await
            .iter()
            .find(|record| record.item_id == item_id && record.stage_id == stage_id)
            .cloned())
    }

    async fn insert_evidence(&self, record: EvidenceRecord) -> AppResult<()> {
        let mut evidence = self.evidence.write().await;
        if evidence
            .iter()
            .any(|stored| stored.item_id == record.item_id && stored.stage_id == record.stage_id)
        {
            return Err(AppError::Conflict(format!(
                "evidence for item '{}' stage '{}' already exists",
                record.item_id, record.stage_id
            )));
        }

        evidence.push(record);
        Ok(())
    }

    async fn delete_evidence(
        &self,
        item_id: ItemId,
        stage_id: StageId,
    ) -> AppResult<Option<EvidenceRecord>> {
        let mut evidence = self.evidence.write().await;
        let position = evidence
            .iter()
            .position(|record| record.item_id == item_id && record.stage_id == stage_id);

        Ok(position.map(|position| evidence.remove(position)))
    }
}

#[async_trait]
impl IssueRepository for InMemoryTrackerRepository {
    async fn insert_issue(&self, issue: Issue) -> AppResult<()> {
        self.issues.write().await.insert(issue.id, issue);
        Ok(())
    }

    async fn find_issue(&self, issue_id: IssueId) -> AppResult<Option<Issue>> {
        Ok(self.issues.read().await.get(&issue_id).cloned())
    }

    async fn save_issue(&self, issue: &Issue) -> AppResult<()> {
        let mut issues = self.issues.write().await;
        let stored = issues
            .get_mut(&issue.id)
            .ok_or_else(|| AppError::NotFound(format!("issue '{}' not found", issue.id)))?;
        *stored = issue.clone();
        Ok(())
    }

    async fn list_project_issues(&self, project_id: ProjectId) -> AppResult<Vec<Issue>> {
        let mut issues = self
            .issues
            .read()
            .await
            .values()
            .filter(|issue| issue.project_id == project_id)
            .cloned()
            .collect::<Vec<_>>();
        issues.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        Ok(issues)
    }
}
