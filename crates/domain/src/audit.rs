use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use fieldtrack_core::UserId;
use serde::{Deserialize, Serialize};

use crate::{AuditEntryId, GpsCoordinates, ProjectId};

/// Kind of state-mutating action recorded in a project's audit log.
///
/// The vocabulary is open: unknown kinds round-trip through [`AuditAction::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AuditAction {
    /// A contractor created an item.
    ItemCreated,
    /// First evidence for a stage.
    EvidenceUploaded,
    /// Evidence replaced an existing record for the same stage.
    EvidenceReuploaded,
    /// Evidence was removed.
    EvidenceDeleted,
    /// A client flagged an issue through a magic link.
    IssueFlagged,
    /// An issue was resolved.
    IssueResolved,
    /// An admin signed the project off.
    ProjectCompleted,
    /// An admin created the project.
    ProjectCreated,
    /// A contractor was assigned to the project.
    ContractorAssigned,
    /// A contractor was removed from the project.
    ContractorUnassigned,
    /// A dropdown data file was uploaded or replaced.
    DataFileUploaded,
    /// The project's custom fields were replaced.
    FieldsConfigured,
    /// Any other action label.
    Other(String),
}

impl AuditAction {
    /// Returns the display label stored with each entry.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::ItemCreated => "Created Item",
            Self::EvidenceUploaded => "Uploaded Evidence",
            Self::EvidenceReuploaded => "Re-uploaded Evidence (Overwrite)",
            Self::EvidenceDeleted => "Deleted Evidence",
            Self::IssueFlagged => "Issue Flagged",
            Self::IssueResolved => "Resolved Issue",
            Self::ProjectCompleted => "Marked Project Complete",
            Self::ProjectCreated => "Created Project",
            Self::ContractorAssigned => "Assigned Contractor",
            Self::ContractorUnassigned => "Unassigned Contractor",
            Self::DataFileUploaded => "Uploaded Data File",
            Self::FieldsConfigured => "Configured Item Fields",
            Self::Other(label) => label.as_str(),
        }
    }
}

impl From<String> for AuditAction {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Created Item" => Self::ItemCreated,
            "Uploaded Evidence" => Self::EvidenceUploaded,
            "Re-uploaded Evidence (Overwrite)" => Self::EvidenceReuploaded,
            "Deleted Evidence" => Self::EvidenceDeleted,
            "Issue Flagged" => Self::IssueFlagged,
            "Resolved Issue" => Self::IssueResolved,
            "Marked Project Complete" => Self::ProjectCompleted,
            "Created Project" => Self::ProjectCreated,
            "Assigned Contractor" => Self::ContractorAssigned,
            "Unassigned Contractor" => Self::ContractorUnassigned,
            "Uploaded Data File" => Self::DataFileUploaded,
            "Configured Item Fields" => Self::FieldsConfigured,
            _ => Self::Other(value),
        }
    }
}

impl From<AuditAction> for String {
    fn from(value: AuditAction) -> Self {
        match value {
            AuditAction::Other(label) => label,
            known => known.as_str().to_owned(),
        }
    }
}

impl Display for AuditAction {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Authenticated user responsible for an audited action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditActor {
    /// Acting user.
    pub user_id: UserId,
    /// Username at the time of the action.
    pub username: String,
}

/// Input for one audit log append.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditRecord {
    /// Project the action belongs to.
    pub project_id: ProjectId,
    /// Acting user; `None` for anonymous client actions.
    pub actor: Option<AuditActor>,
    /// Action kind.
    pub action: AuditAction,
    /// Short label of the affected object (e.g. "Pole #4").
    pub target: String,
    /// Free-text details.
    pub details: String,
    /// Position associated with the action.
    pub gps: Option<GpsCoordinates>,
}

/// Immutable audit log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    /// Entry identifier.
    pub id: AuditEntryId,
    /// Project the action belongs to.
    pub project_id: ProjectId,
    /// Acting user; `None` for anonymous client actions.
    pub actor: Option<AuditActor>,
    /// Action kind.
    pub action: AuditAction,
    /// Affected object label.
    pub target: String,
    /// Free-text details.
    pub details: String,
    /// Position associated with the action.
    pub gps: Option<GpsCoordinates>,
    /// Append timestamp.
    pub created_at: DateTime<Utc>,
}

impl AuditLogEntry {
    /// Stamps a record into an entry.
    #[must_use]
    pub fn from_record(record: AuditRecord, created_at: DateTime<Utc>) -> Self {
        Self {
            id: AuditEntryId::new(),
            project_id: record.project_id,
            actor: record.actor,
            action: record.action,
            target: record.target,
            details: record.details,
            gps: record.gps,
            created_at,
        }
    }
}
