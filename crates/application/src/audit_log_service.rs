//! Append-only project audit trail and CSV export.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::error;

use fieldtrack_core::{AppResult, UserIdentity};
use fieldtrack_domain::{AuditLogEntry, AuditRecord, ProjectId};

use crate::AccessPolicyService;

mod export;


pub use export::{AUDIT_EXPORT_HEADER, AuditExport};

/// Repository port for audit log persistence.
#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    /// Appends one immutable entry.
    async fn append_entry(&self, entry: AuditLogEntry) -> AppResult<()>;

    /// Lists the entries of a project in chronological order.
    async fn list_project_entries(&self, project_id: ProjectId) -> AppResult<Vec<AuditLogEntry>>;
}

/// Result of a best-effort audit append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditRecordOutcome {
    /// The entry was stored.
    Recorded,
    /// Storage failed; the failure was reported to telemetry only.
    Dropped,
}

/// Application service for the project audit log.
#[derive(Clone)]
pub struct AuditLogService {
    repository: Arc<dyn AuditLogRepository>,
    access: AccessPolicyService,
}

impl AuditLogService {
    /// Creates a new audit log service.
    #[must_use]
    pub fn new(repository: Arc<dyn AuditLogRepository>, access: AccessPolicyService) -> Self {
        Self { repository, access }
    }

    /// Appends an entry without ever failing the calling action.
    pub async fn record(&self, record: AuditRecord) -> AuditRecordOutcome {
        let project_id = record.project_id;
        let action = record.action.clone();
        let entry = AuditLogEntry::from_record(record, Utc::now());

        match self.repository.append_entry(entry).await {
            Ok(()) => AuditRecordOutcome::Recorded,
            Err(append_error) => {
                error!(
                    error = %append_error,
                    project_id = %project_id,
                    action = %action,
                    "failed to append audit log entry"
                );
                AuditRecordOutcome::Dropped
            }
        }
    }

    /// Lists a project's entries newest first. Admin only.
    pub async fn list_entries(
        &self,
        actor: &UserIdentity,
        project_id: ProjectId,
    ) -> AppResult<Vec<AuditLogEntry>> {
        self.access
            .require_admin(actor, Some(project_id), "view project logs")
            .await?;
        self.access.authorize_project(actor, project_id).await?;

        let mut entries = self.repository.list_project_entries(project_id).await?;
        entries.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        Ok(entries)
    }

    /// Renders a project's entries as CSV in chronological order. Admin only.
    pub async fn export_csv(
        &self,
        actor: &UserIdentity,
        project_id: ProjectId,
    ) -> AppResult<AuditExport> {
        self.access
            .require_admin(actor, Some(project_id), "export project logs")
            .await?;
        let project = self.access.authorize_project(actor, project_id).await?;

        let mut entries = self.repository.list_project_entries(project_id).await?;
        entries.sort_by(|left, right| left.created_at.cmp(&right.created_at));

        export::render_csv(project.name(), &entries)
    }
}
