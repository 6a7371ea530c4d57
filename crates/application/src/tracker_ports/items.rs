use async_trait::async_trait;
use fieldtrack_core::AppResult;
use fieldtrack_domain::{
    EvidenceRecord, FieldDefinitionId, Issue, IssueId, Item, ItemFieldValue, ItemId, ProjectId,
    StageId,
};

/// Repository port for items and their captured field values.
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Persists a new item.
    async fn insert_item(&self, item: Item) -> AppResult<()>;

    /// Finds an item by identifier.
    async fn find_item(&self, item_id: ItemId) -> AppResult<Option<Item>>;

    /// Lists the items of a project in creation order.
    async fn list_items(&self, project_id: ProjectId) -> AppResult<Vec<Item>>;

    /// Counts the items of a project.
    async fn count_items(&self, project_id: ProjectId) -> AppResult<u64>;

    /// Counts the completed items of a project.
    async fn count_completed_items(&self, project_id: ProjectId) -> AppResult<u64>;

    /// Persists captured answers for one item.
    async fn save_field_values(&self, values: Vec<ItemFieldValue>) -> AppResult<()>;

    /// Lists captured answers of one item.
    async fn list_field_values(&self, item_id: ItemId) -> AppResult<Vec<ItemFieldValue>>;

    /// Lists every captured answer to one field across a project.
    async fn list_project_field_values(
        &self,
        project_id: ProjectId,
        field_id: FieldDefinitionId,
    ) -> AppResult<Vec<ItemFieldValue>>;

    /// Counts items of a project whose answer to `field_id` equals `value`.
    async fn count_items_with_field_value(
        &self,
        project_id: ProjectId,
        field_id: FieldDefinitionId,
        value: &str,
    ) -> AppResult<u64>;

    /// Atomically renames an item unless another item of the same project
    /// already carries `identifier`. Returns whether the rename happened.
    async fn try_assign_identifier(&self, item_id: ItemId, identifier: &str) -> AppResult<bool>;

    /// Persists the derived completion flag.
    async fn set_item_completion(&self, item_id: ItemId, is_completed: bool) -> AppResult<()>;
}

/// Repository port for stage evidence.
#[async_trait]
pub trait EvidenceRepository: Send + Sync {
    /// Lists evidence of one item.
    async fn list_item_evidence(&self, item_id: ItemId) -> AppResult<Vec<EvidenceRecord>>;

    /// Lists evidence of every item of a project.
    async fn list_project_evidence(&self, project_id: ProjectId)
    -> AppResult<Vec<EvidenceRecord>>;

    /// Finds the evidence for one (item, stage) pair.
    async fn find_evidence(
        &self,
        item_id: ItemId,
        stage_id: StageId,
    ) -> AppResult<Option<EvidenceRecord>>;

    /// Persists new evidence. Fails with a conflict when the pair already has a record.
    async fn insert_evidence(&self, record: EvidenceRecord) -> AppResult<()>;

    /// Removes the evidence for one (item, stage) pair, returning it when present.
    async fn delete_evidence(
        &self,
        item_id: ItemId,
        stage_id: StageId,
    ) -> AppResult<Option<EvidenceRecord>>;
}

/// Repository port for client-reported issues.
#[async_trait]
pub trait IssueRepository: Send + Sync {
    /// Persists a new issue.
    async fn insert_issue(&self, issue: Issue) -> AppResult<()>;

    /// Finds an issue by identifier.
    async fn find_issue(&self, issue_id: IssueId) -> AppResult<Option<Issue>>;

    /// Saves the resolution state of an issue.
    async fn save_issue(&self, issue: &Issue) -> AppResult<()>;

    /// Lists issues of a project, newest first.
    async fn list_project_issues(&self, project_id: ProjectId) -> AppResult<Vec<Issue>>;
}
