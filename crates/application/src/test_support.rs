//! In-memory fakes and fixtures shared by service tests.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use fieldtrack_core::{AppError, AppResult, UserId, UserIdentity, UserRole};
use fieldtrack_domain::{
    AuditLogEntry, Client, ClientId, ClientLink, EvidenceRecord, FieldDefinitionId, FieldKind,
    GpsCoordinates, Issue, IssueId, Item, ItemFieldDefinition, ItemFieldValue, ItemId, Project,
    ProjectId, ProjectType, ProjectTypeId, StageDefinition, StageId,
};

use crate::{
    AccessPolicyService, AuditLogRepository, AuditLogService, BrandingOutcome, DataFileService,
    EvidenceRepository, GeoTagger, IssueRepository, IssueService, ItemRepository, ItemService,
    MediaStore, PasswordHasher, ProgressService, ProgressServiceDependencies, ProjectRepository,
    ProjectService, ProjectServiceDependencies, SecurityEvent, SecurityEventRepository,
    SpreadsheetAdapter, UserRecord, UserRepository, UserService, Watermarker,
};

#[derive(Default)]
pub(crate) struct FakeState {
    pub clients: Vec<Client>,
    pub project_types: Vec<ProjectType>,
    pub projects: Vec<Project>,
    pub field_definitions: HashMap<ProjectId, Vec<ItemFieldDefinition>>,
    pub items: Vec<Item>,
    pub field_values: Vec<ItemFieldValue>,
    pub evidence: Vec<EvidenceRecord>,
    pub issues: Vec<Issue>,
    pub audit: Vec<AuditLogEntry>,
    pub security_events: Vec<SecurityEvent>,
    pub media: HashMap<String, Vec<u8>>,
    pub users: Vec<UserRecord>,
    pub fail_audit_appends: bool,
}

#[derive(Default)]
pub(crate) struct FakeStore {
    pub state: Mutex<FakeState>,
}

#[async_trait]
impl ProjectRepository for FakeStore {
    async fn insert_client(&self, client: Client) -> AppResult<()> {
        self.state.lock().await.clients.push(client);
        Ok(())
    }

    async fn find_client(&self, client_id: ClientId) -> AppResult<Option<Client>> {
        let state = self.state.lock().await;
        Ok(state.clients.iter().find(|client| client.id() == client_id).cloned())
    }

    async fn find_client_by_link(&self, link: ClientLink) -> AppResult<Option<Client>> {
        let state = self.state.lock().await;
        Ok(state.clients.iter().find(|client| client.link() == link).cloned())
    }

    async fn list_clients(&self) -> AppResult<Vec<Client>> {
        Ok(self.state.lock().await.clients.clone())
    }

    async fn insert_project_type(&self, project_type: ProjectType) -> AppResult<()> {
        self.state.lock().await.project_types.push(project_type);
        Ok(())
    }

    async fn find_project_type(
        &self,
        project_type_id: ProjectTypeId,
    ) -> AppResult<Option<ProjectType>> {
        let state = self.state.lock().await;
        Ok(state
            .project_types
            .iter()
            .find(|project_type| project_type.id() == project_type_id)
            .cloned())
    }

    async fn list_project_types(&self) -> AppResult<Vec<ProjectType>> {
        Ok(self.state.lock().await.project_types.clone())
    }

    async fn insert_project(&self, project: Project) -> AppResult<()> {
        self.state.lock().await.projects.push(project);
        Ok(())
    }

    async fn save_project(&self, project: &Project) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let stored = state
            .projects
            .iter_mut()
            .find(|stored| stored.id() == project.id())
            .ok_or_else(|| AppError::NotFound("project".to_owned()))?;
        *stored = project.clone();
        Ok(())
    }

    async fn find_project(&self, project_id: ProjectId) -> AppResult<Option<Project>> {
        let state = self.state.lock().await;
        Ok(state.projects.iter().find(|project| project.id() == project_id).cloned())
    }

    async fn find_project_by_link(&self, link: ClientLink) -> AppResult<Option<Project>> {
        let state = self.state.lock().await;
        Ok(state
            .projects
            .iter()
            .find(|project| project.client_link() == link)
            .cloned())
    }

    async fn list_projects(&self) -> AppResult<Vec<Project>> {
        Ok(self.state.lock().await.projects.clone())
    }

    async fn list_projects_for_contractor(&self, user_id: UserId) -> AppResult<Vec<Project>> {
        let state = self.state.lock().await;
        Ok(state
            .projects
            .iter()
            .filter(|project| project.has_contractor(user_id))
            .cloned()
            .collect())
    }

    async fn list_projects_for_client(&self, client_id: ClientId) -> AppResult<Vec<Project>> {
        let state = self.state.lock().await;
        Ok(state
            .projects
            .iter()
            .filter(|project| project.client_id() == Some(client_id))
            .cloned()
            .collect())
    }

    async fn replace_field_definitions(
        &self,
        project_id: ProjectId,
        definitions: Vec<ItemFieldDefinition>,
    ) -> AppResult<()> {
        self.state
            .lock()
            .await
            .field_definitions
            .insert(project_id, definitions);
        Ok(())
    }

    async fn list_field_definitions(
        &self,
        project_id: ProjectId,
    ) -> AppResult<Vec<ItemFieldDefinition>> {
        let state = self.state.lock().await;
        Ok(state
            .field_definitions
            .get(&project_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl ItemRepository for FakeStore {
    async fn insert_item(&self, item: Item) -> AppResult<()> {
        self.state.lock().await.items.push(item);
        Ok(())
    }

    async fn find_item(&self, item_id: ItemId) -> AppResult<Option<Item>> {
        let state = self.state.lock().await;
        Ok(state.items.iter().find(|item| item.id == item_id).cloned())
    }

    async fn list_items(&self, project_id: ProjectId) -> AppResult<Vec<Item>> {
        let state = self.state.lock().await;
        Ok(state
            .items
            .iter()
            .filter(|item| item.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn count_items(&self, project_id: ProjectId) -> AppResult<u64> {
        let state = self.state.lock().await;
        Ok(state
            .items
            .iter()
            .filter(|item| item.project_id == project_id)
            .count() as u64)
    }

    async fn count_completed_items(&self, project_id: ProjectId) -> AppResult<u64> {
        let state = self.state.lock().await;
        Ok(state
            .items
            .iter()
            .filter(|item| item.project_id == project_id && item.is_completed)
            .count() as u64)
    }

    async fn save_field_values(&self, values: Vec<ItemFieldValue>) -> AppResult<()> {
        self.state.lock().await.field_values.extend(values);
        Ok(())
    }

    async fn list_field_values(&self, item_id: ItemId) -> AppResult<Vec<ItemFieldValue>> {
        let state = self.state.lock().await;
        Ok(state
            .field_values
            .iter()
            .filter(|value| value.item_id == item_id)
            .cloned()
            .collect())
    }

    async fn list_project_field_values(
        &self,
        project_id: ProjectId,
        field_id: FieldDefinitionId,
    ) -> AppResult<Vec<ItemFieldValue>> {
        let state = self.state.lock().await;
        Ok(state
            .field_values
            .iter()
            .filter(|value| {
                value.field_id == field_id
                    && state
                        .items
                        .iter()
                        .any(|item| item.id == value.item_id && item.project_id == project_id)
            })
            .cloned()
            .collect())
    }

    async fn count_items_with_field_value(
        &self,
        project_id: ProjectId,
        field_id: FieldDefinitionId,
        value: &str,
    ) -> AppResult<u64> {
        Ok(self
            .list_project_field_values(project_id, field_id)
            .await?
            .iter()
            .filter(|stored| stored.value == value)
            .count() as u64)
    }

    async fn try_assign_identifier(&self, item_id: ItemId, identifier: &str) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        let project_id = state
            .items
            .iter()
            .find(|item| item.id == item_id)
            .map(|item| item.project_id)
            .ok_or_else(|| AppError::NotFound("item".to_owned()))?;
        let taken = state.items.iter().any(|item| {
            item.project_id == project_id && item.id != item_id && item.identifier == identifier
        });
        if taken {
            return Ok(false);
        }

        if let Some(item) = state.items.iter_mut().find(|item| item.id == item_id) {
            item.identifier = identifier.to_owned();
        }
        Ok(true)
    }

    async fn set_item_completion(&self, item_id: ItemId, is_completed: bool) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if let Some(item) = state.items.iter_mut().find(|item| item.id == item_id) {
            item.is_completed = is_completed;
        }
        Ok(())
    }
}

#[async_trait]
impl EvidenceRepository for FakeStore {
    async fn list_item_evidence(&self, item_id: ItemId) -> AppResult<Vec<EvidenceRecord>> {
        let state = self.state.lock().await;
        Ok(state
            .evidence
            .iter()
            .filter(|record| record.item_id == item_id)
            .cloned()
            .collect())
    }

    async fn list_project_evidence(
        &self,
        project_id: ProjectId,
    ) -> AppResult<Vec<EvidenceRecord>> {
        let state = self.state.lock().await;
        Ok(state
            .evidence
            .iter()
            .filter(|record| {
                state
                    .items
                    .iter()
                    .any(|item| item.id == record.item_id && item.project_id == project_id)
            })
            .cloned()
            .collect())
    }

    async fn find_evidence(
        &self,
        item_id: ItemId,
        stage_id: StageId,
    ) -> AppResult<Option<EvidenceRecord>> {
        let state = self.state.lock().await;
        Ok(state
            .evidence
            .iter()
            .find(|record| record.item_id == item_id && record.stage_id == stage_id)
            .cloned())
    }

    async fn insert_evidence(&self, record: EvidenceRecord) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if state
            .evidence
            .iter()
            .any(|stored| stored.item_id == record.item_id && stored.stage_id == record.stage_id)
        {
            return Err(AppError::Conflict("evidence already exists".to_owned()));
        }
        state.evidence.push(record);
        Ok(())
    }

    async fn delete_evidence(
        &self,
        item_id: ItemId,
        stage_id: StageId,
    ) -> AppResult<Option<EvidenceRecord>> {
        let mut state = self.state.lock().await;
        let position = state
            .evidence
            .iter()
            .position(|record| record.item_id == item_id && record.stage_id == stage_id);
        Ok(position.map(|position| state.evidence.remove(position)))
    }
}

#[async_trait]
impl IssueRepository for FakeStore {
    async fn insert_issue(&self, issue: Issue) -> AppResult<()> {
        self.state.lock().await.issues.push(issue);
        Ok(())
    }

    async fn find_issue(&self, issue_id: IssueId) -> AppResult<Option<Issue>> {
        let state = self.state.lock().await;
        Ok(state.issues.iter().find(|issue| issue.id == issue_id).cloned())
    }

    async fn save_issue(&self, issue: &Issue) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if let Some(stored) = state.issues.iter_mut().find(|stored| stored.id == issue.id) {
            *stored = issue.clone();
        }
        Ok(())
    }

    async fn list_project_issues(&self, project_id: ProjectId) -> AppResult<Vec<Issue>> {
        let state = self.state.lock().await;
        Ok(state
            .issues
            .iter()
            .filter(|issue| issue.project_id == project_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AuditLogRepository for FakeStore {
    async fn append_entry(&self, entry: AuditLogEntry) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if state.fail_audit_appends {
            return Err(AppError::Internal("audit store offline".to_owned()));
        }
        state.audit.push(entry);
        Ok(())
    }

    async fn list_project_entries(&self, project_id: ProjectId) -> AppResult<Vec<AuditLogEntry>> {
        let state = self.state.lock().await;
        Ok(state
            .audit
            .iter()
            .filter(|entry| entry.project_id == project_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SecurityEventRepository for FakeStore {
    async fn append_event(&self, event: SecurityEvent) -> AppResult<()> {
        self.state.lock().await.security_events.push(event);
        Ok(())
    }
}

#[async_trait]
impl MediaStore for FakeStore {
    async fn put(&self, namespace: &str, filename: &str, bytes: Vec<u8>) -> AppResult<String> {
        let key = format!("{namespace}/{}-{filename}", ItemId::new());
        self.state.lock().await.media.insert(key.clone(), bytes);
        Ok(key)
    }

    async fn get(&self, key: &str) -> AppResult<Option<Vec<u8>>> {
        Ok(self.state.lock().await.media.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.state.lock().await.media.remove(key);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for FakeStore {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<UserRecord>> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .iter()
            .find(|user| user.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        let state = self.state.lock().await;
        Ok(state.users.iter().find(|user| user.id == user_id).cloned())
    }

    async fn create(&self, user: UserRecord) -> AppResult<()> {
        self.state.lock().await.users.push(user);
        Ok(())
    }

    async fn list_by_role(&self, role: UserRole) -> AppResult<Vec<UserRecord>> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .iter()
            .filter(|user| user.role == role)
            .cloned()
            .collect())
    }
}

/// Geotagger returning fixed coordinates.
pub(crate) struct FixedGeoTagger(pub Option<GpsCoordinates>);

impl GeoTagger for FixedGeoTagger {
    fn extract(&self, _image: &[u8]) -> Option<GpsCoordinates> {
        self.0
    }
}

/// Watermarker prefixing branded images, or failing on demand.
pub(crate) struct PrefixWatermarker {
    pub fail: bool,
}

#[async_trait]
impl Watermarker for PrefixWatermarker {
    async fn brand(&self, image: Vec<u8>, _gps: Option<GpsCoordinates>) -> BrandingOutcome {
        if self.fail {
            return BrandingOutcome::Unbranded {
                original: image,
                reason: "font missing".to_owned(),
            };
        }
        let mut branded = b"BRANDED:".to_vec();
        branded.extend(image);
        BrandingOutcome::Branded(branded)
    }
}

/// Comma-separated reader without quoting support.
pub(crate) struct NaiveCsvSpreadsheet;

impl SpreadsheetAdapter for NaiveCsvSpreadsheet {
    fn headers(&self, file: &[u8], _filename: &str) -> Vec<String> {
        String::from_utf8_lossy(file)
            .lines()
            .next()
            .map(|line| line.split(',').map(|cell| cell.trim().to_owned()).collect())
            .unwrap_or_default()
    }

    fn column_values(&self, file: &[u8], filename: &str, column: &str) -> BTreeSet<String> {
        let Some(index) = self
            .headers(file, filename)
            .iter()
            .position(|header| header == column)
        else {
            return BTreeSet::new();
        };

        String::from_utf8_lossy(file)
            .lines()
            .skip(1)
            .filter_map(|line| line.split(',').nth(index).map(str::trim))
            .filter(|cell| !cell.is_empty())
            .map(str::to_owned)
            .collect()
    }
}

/// Password hasher storing plaintext with a marker, for tests only.
pub(crate) struct PlainPasswordHasher;

impl PasswordHasher for PlainPasswordHasher {
    fn hash_password(&self, password: &str) -> AppResult<String> {
        Ok(format!("plain:{password}"))
    }

    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        Ok(hash == format!("plain:{password}"))
    }
}

/// Fully wired services over one [`FakeStore`].
pub(crate) struct Fixture {
    pub store: Arc<FakeStore>,
    pub access: AccessPolicyService,
    pub audit: AuditLogService,
    pub progress: ProgressService,
    pub items: ItemService,
    pub issues: IssueService,
    pub projects: ProjectService,
    pub users: UserService,
    pub admin: UserIdentity,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_collaborators(None, false)
    }

    pub fn with_collaborators(embedded_gps: Option<GpsCoordinates>, watermark_fails: bool) -> Self {
        let store = Arc::new(FakeStore::default());
        let access = AccessPolicyService::new(store.clone(), store.clone());
        let audit = AuditLogService::new(store.clone(), access.clone());
        let data_files = DataFileService::new(store.clone(), Arc::new(NaiveCsvSpreadsheet));

        let progress = ProgressService::new(ProgressServiceDependencies {
            access: access.clone(),
            audit: audit.clone(),
            projects: store.clone(),
            items: store.clone(),
            evidence: store.clone(),
            media: store.clone(),
            geotagger: Arc::new(FixedGeoTagger(embedded_gps)),
            watermarker: Arc::new(PrefixWatermarker {
                fail: watermark_fails,
            }),
        });
        let items = ItemService::new(
            access.clone(),
            audit.clone(),
            store.clone(),
            store.clone(),
            data_files.clone(),
        );
        let issues = IssueService::new(access.clone(), audit.clone(), store.clone(), store.clone());
        let projects = ProjectService::new(ProjectServiceDependencies {
            access: access.clone(),
            audit: audit.clone(),
            data_files,
            projects: store.clone(),
            items: store.clone(),
            evidence: store.clone(),
            issues: store.clone(),
            users: store.clone(),
        });
        let users = UserService::new(store.clone(), Arc::new(PlainPasswordHasher), access.clone());

        Self {
            store,
            access,
            audit,
            progress,
            items,
            issues,
            projects,
            users,
            admin: UserIdentity::new(UserId::new(), "admin", UserRole::Admin),
        }
    }

    /// Registers a contractor account and returns its identity.
    pub async fn contractor(&self, username: &str) -> UserIdentity {
        let identity = UserIdentity::new(UserId::new(), username, UserRole::Contractor);
        self.store.state.lock().await.users.push(UserRecord {
            id: identity.user_id(),
            username: username.to_owned(),
            password_hash: format!("plain:{username}-password"),
            role: UserRole::Contractor,
        });
        identity
    }

    /// Seeds a project type with `(name, order, required)` stages and a
    /// project using it.
    pub async fn project(&self, name: &str, stages: &[(&str, u32, bool)]) -> (Project, ProjectType) {
        let stages = stages
            .iter()
            .map(|(stage_name, order, is_required)| {
                StageDefinition::new(StageId::new(), *stage_name, *order, *is_required)
                    .unwrap_or_else(|_| unreachable!())
            })
            .collect();
        let project_type = ProjectType::new(ProjectTypeId::new(), "Poles", "Pole", None, stages)
            .unwrap_or_else(|_| unreachable!());
        let project = Project::new(name, project_type.id(), None, chrono::Utc::now())
            .unwrap_or_else(|_| unreachable!());

        let mut state = self.store.state.lock().await;
        state.project_types.push(project_type.clone());
        state.projects.push(project.clone());
        (project, project_type)
    }

    /// Adds a required text field to a project.
    pub async fn text_field(
        &self,
        project: &Project,
        label: &str,
        is_grouping_key: bool,
    ) -> FieldDefinitionId {
        self.add_text_field(project, label, is_grouping_key, true)
            .await
    }

    /// Adds a text field that may be left blank.
    pub async fn optional_text_field(
        &self,
        project: &Project,
        label: &str,
        is_grouping_key: bool,
    ) -> FieldDefinitionId {
        self.add_text_field(project, label, is_grouping_key, false)
            .await
    }

    async fn add_text_field(
        &self,
        project: &Project,
        label: &str,
        is_grouping_key: bool,
        is_required: bool,
    ) -> FieldDefinitionId {
        let definition = ItemFieldDefinition::new(
            FieldDefinitionId::new(),
            project.id(),
            label,
            FieldKind::Text,
            is_grouping_key,
        )
        .unwrap_or_else(|_| unreachable!())
        .with_required(is_required);
        let field_id = definition.id();
        self.store
            .state
            .lock()
            .await
            .field_definitions
            .entry(project.id())
            .or_default()
            .push(definition);
        field_id
    }

    /// Creates an item as admin with the given answers.
    pub async fn item(&self, project: &Project, answers: &[(FieldDefinitionId, &str)]) -> Item {
        self.items
            .create_item(
                &self.admin,
                crate::CreateItemInput {
                    project_id: project.id(),
                    field_values: answers
                        .iter()
                        .map(|(field_id, value)| (*field_id, (*value).to_owned()))
                        .collect::<BTreeMap<_, _>>(),
                },
            )
            .await
            .unwrap_or_else(|_| unreachable!())
    }
}
