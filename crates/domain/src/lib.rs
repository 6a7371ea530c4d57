//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod access;
mod audit;
mod evidence;
mod identifier;
mod ids;
mod issue;
mod item;
mod item_field;
mod progress;
mod project;
mod project_type;

pub use access::{AccessDecision, project_access};
pub use audit::{AuditAction, AuditActor, AuditLogEntry, AuditRecord};
pub use evidence::{COORDINATE_MAX_LENGTH, EvidenceRecord, GpsCoordinates};
pub use identifier::{candidate_identifier, suffixed_identifier};
pub use ids::{
    AuditEntryId, ClientId, EvidenceId, FieldDefinitionId, IssueId, ItemId, ProjectId,
    ProjectTypeId, StageId,
};
pub use issue::{ISSUE_MESSAGE_MAX_LENGTH, Issue, IssueStatus};
pub use item::{Item, PENDING_IDENTIFIER_PREFIX};
pub use item_field::{
    CapturedFieldValues, FIELD_VALUE_MAX_LENGTH, FieldKind, ItemFieldDefinition, ItemFieldSchema,
    ItemFieldValue,
};
pub use progress::{
    StageGate, StageLock, can_accept, compute_stage_locks, item_is_complete,
    project_progress_percent,
};
pub use project::{Client, ClientLink, DataFile, Project, ProjectParts, ProjectStatus};
pub use project_type::{ProjectType, StageDefinition};
