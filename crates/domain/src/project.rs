use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use fieldtrack_core::{AppError, AppResult, NonEmptyString, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ClientId, ProjectId, ProjectTypeId};

/// Unguessable bearer token identifying a project or client in magic links.
///
/// Always generated from a random v4 UUID, never sequential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientLink(Uuid);

impl ClientLink {
    /// Generates a new random link token.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Restores a link token from storage.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Display for ClientLink {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl FromStr for ClientLink {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value.trim())
            .map(Self)
            .map_err(|_| AppError::NotFound("client link does not exist".to_owned()))
    }
}

/// Lifecycle status of a project. The only transition is Active to Completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    /// Work is ongoing.
    Active,
    /// Work was signed off by an admin.
    Completed,
}

impl ProjectStatus {
    /// Returns a stable storage value for the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Completed => "COMPLETED",
        }
    }
}

impl FromStr for ProjectStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "ACTIVE" => Ok(Self::Active),
            "COMPLETED" => Ok(Self::Completed),
            _ => Err(AppError::Validation(format!(
                "unknown project status '{value}'"
            ))),
        }
    }
}

/// Client organisation owning one or more projects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    id: ClientId,
    name: NonEmptyString,
    link: ClientLink,
    created_at: DateTime<Utc>,
}

impl Client {
    /// Creates a client with a freshly generated dashboard link.
    pub fn new(name: impl Into<String>, created_at: DateTime<Utc>) -> AppResult<Self> {
        Ok(Self {
            id: ClientId::new(),
            name: NonEmptyString::new(name)?,
            link: ClientLink::generate(),
            created_at,
        })
    }

    /// Restores a persisted client.
    pub fn restore(
        id: ClientId,
        name: impl Into<String>,
        link: ClientLink,
        created_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            name: NonEmptyString::new(name)?,
            link,
            created_at,
        })
    }

    /// Returns the client identifier.
    #[must_use]
    pub fn id(&self) -> ClientId {
        self.id
    }

    /// Returns the client name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the dashboard link token.
    #[must_use]
    pub fn link(&self) -> ClientLink {
        self.link
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Uploaded tabular file backing dropdown custom fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataFile {
    /// Opaque media storage key.
    pub storage_key: String,
    /// Original file name; the extension selects the parser.
    pub filename: String,
}

/// Persisted shape of a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectParts {
    /// Project identifier.
    pub id: ProjectId,
    /// Project name.
    pub name: String,
    /// Workflow template.
    pub project_type_id: ProjectTypeId,
    /// Owning client organisation.
    pub client_id: Option<ClientId>,
    /// Magic link token.
    pub client_link: ClientLink,
    /// Lifecycle status.
    pub status: ProjectStatus,
    /// Assigned contractors.
    pub contractors: BTreeSet<UserId>,
    /// Uploaded data file.
    pub data_file: Option<DataFile>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Instance of a project type for one client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    id: ProjectId,
    name: NonEmptyString,
    project_type_id: ProjectTypeId,
    client_id: Option<ClientId>,
    client_link: ClientLink,
    status: ProjectStatus,
    contractors: BTreeSet<UserId>,
    data_file: Option<DataFile>,
    created_at: DateTime<Utc>,
}

impl Project {
    /// Creates an active project with a freshly generated magic link.
    pub fn new(
        name: impl Into<String>,
        project_type_id: ProjectTypeId,
        client_id: Option<ClientId>,
        created_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        Ok(Self {
            id: ProjectId::new(),
            name: NonEmptyString::new(name)?,
            project_type_id,
            client_id,
            client_link: ClientLink::generate(),
            status: ProjectStatus::Active,
            contractors: BTreeSet::new(),
            data_file: None,
            created_at,
        })
    }

    /// Restores a persisted project.
    pub fn from_parts(parts: ProjectParts) -> AppResult<Self> {
        Ok(Self {
            id: parts.id,
            name: NonEmptyString::new(parts.name)?,
            project_type_id: parts.project_type_id,
            client_id: parts.client_id,
            client_link: parts.client_link,
            status: parts.status,
            contractors: parts.contractors,
            data_file: parts.data_file,
            created_at: parts.created_at,
        })
    }

    /// Returns the project identifier.
    #[must_use]
    pub fn id(&self) -> ProjectId {
        self.id
    }

    /// Returns the project name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the workflow template identifier.
    #[must_use]
    pub fn project_type_id(&self) -> ProjectTypeId {
        self.project_type_id
    }

    /// Returns the owning client, if any.
    #[must_use]
    pub fn client_id(&self) -> Option<ClientId> {
        self.client_id
    }

    /// Returns the magic link token.
    #[must_use]
    pub fn client_link(&self) -> ClientLink {
        self.client_link
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub fn status(&self) -> ProjectStatus {
        self.status
    }

    /// Returns whether the project still accepts field work and issue reports.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == ProjectStatus::Active
    }

    /// Returns assigned contractors.
    #[must_use]
    pub fn contractors(&self) -> &BTreeSet<UserId> {
        &self.contractors
    }

    /// Returns whether the user is assigned to the project.
    #[must_use]
    pub fn has_contractor(&self, user_id: UserId) -> bool {
        self.contractors.contains(&user_id)
    }

    /// Returns the uploaded data file, if any.
    #[must_use]
    pub fn data_file(&self) -> Option<&DataFile> {
        self.data_file.as_ref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Moves the project to Completed. Fails when already completed.
    pub fn mark_completed(&mut self) -> AppResult<()> {
        if self.status == ProjectStatus::Completed {
            return Err(AppError::Conflict(format!(
                "project '{}' is already completed",
                self.id
            )));
        }

        self.status = ProjectStatus::Completed;
        Ok(())
    }

    /// Assigns a contractor. Returns false when already assigned.
    pub fn assign_contractor(&mut self, user_id: UserId) -> bool {
        self.contractors.insert(user_id)
    }

    /// Removes a contractor. Returns false when not assigned.
    pub fn unassign_contractor(&mut self, user_id: UserId) -> bool {
        self.contractors.remove(&user_id)
    }

    /// Replaces the uploaded data file, returning the previous one.
    pub fn attach_data_file(&mut self, data_file: DataFile) -> Option<DataFile> {
        self.data_file.replace(data_file)
    }
}
