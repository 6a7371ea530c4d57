//! Client issue reporting and resolution.

use std::sync::Arc;

use fieldtrack_core::{AppError, AppResult, UserIdentity};
use fieldtrack_domain::{
    AuditAction, AuditRecord, Issue, IssueId, IssueStatus, ItemId, ProjectId,
};

use crate::service_support::{audit_actor, require_active_project};
use crate::{AccessPolicyService, AuditLogService, IssueRepository, ItemRepository};

#[cfg(test)]
mod tests;

/// Issue together with the identifier of the flagged item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueView {
    /// The issue.
    pub issue: Issue,
    /// Identifier of the flagged item.
    pub item_identifier: String,
}

/// Application service for client-reported issues.
#[derive(Clone)]
pub struct IssueService {
    access: AccessPolicyService,
    audit: AuditLogService,
    items: Arc<dyn ItemRepository>,
    issues: Arc<dyn IssueRepository>,
}

impl IssueService {
    /// Creates a new issue service.
    #[must_use]
    pub fn new(
        access: AccessPolicyService,
        audit: AuditLogService,
        items: Arc<dyn ItemRepository>,
        issues: Arc<dyn IssueRepository>,
    ) -> Self {
        Self {
            access,
            audit,
            items,
            issues,
        }
    }

    /// Files an issue through a project magic link.
    ///
    /// Only active projects accept reports, and the item must belong to the
    /// linked project.
    pub async fn report_issue(
        &self,
        project_link: &str,
        item_id: ItemId,
        message: &str,
        reporter: Option<String>,
    ) -> AppResult<Issue> {
        let project = self.access.resolve_project_link(project_link).await?;
        require_active_project(&project)?;

        let item = self
            .items
            .find_item(item_id)
            .await?
            .filter(|item| item.project_id == project.id())
            .ok_or_else(|| AppError::NotFound(format!("item '{item_id}' does not exist")))?;

        let issue = Issue::report(project.id(), item.id, message, reporter, chrono::Utc::now())?;
        self.issues.insert_issue(issue.clone()).await?;

        self.audit
            .record(AuditRecord {
                project_id: project.id(),
                actor: None,
                action: AuditAction::IssueFlagged,
                target: item.identifier,
                details: issue.message.clone(),
                gps: None,
            })
            .await;

        Ok(issue)
    }

    /// Resolves an issue. Resolving a resolved issue changes nothing.
    pub async fn resolve_issue(&self, actor: &UserIdentity, issue_id: IssueId) -> AppResult<Issue> {
        let mut issue = self
            .issues
            .find_issue(issue_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("issue '{issue_id}' does not exist")))?;
        let project = self.access.authorize_project(actor, issue.project_id).await?;

        if !issue.resolve(actor.user_id(), chrono::Utc::now()) {
            return Ok(issue);
        }
        self.issues.save_issue(&issue).await?;

        let target = self
            .items
            .find_item(issue.item_id)
            .await?
            .map_or_else(|| issue.item_id.to_string(), |item| item.identifier);
        self.audit
            .record(AuditRecord {
                project_id: project.id(),
                actor: Some(audit_actor(actor)),
                action: AuditAction::IssueResolved,
                target,
                details: issue.message.clone(),
                gps: None,
            })
            .await;

        Ok(issue)
    }

    /// Lists a project's issues, open ones first and newest first within each status.
    pub async fn list_project_issues(
        &self,
        actor: &UserIdentity,
        project_id: ProjectId,
    ) -> AppResult<Vec<IssueView>> {
        let project = self.access.authorize_project(actor, project_id).await?;

        let identifiers = self
            .items
            .list_items(project.id())
            .await?
            .into_iter()
            .map(|item| (item.id, item.identifier))
            .collect::<std::collections::HashMap<_, _>>();

        let mut issues = self.issues.list_project_issues(project.id()).await?;
        issues.sort_by(|left, right| {
            let open_first = |issue: &Issue| u8::from(issue.status != IssueStatus::Open);
            open_first(left)
                .cmp(&open_first(right))
                .then_with(|| right.created_at.cmp(&left.created_at))
        });

        Ok(issues
            .into_iter()
            .map(|issue| IssueView {
                item_identifier: identifiers
                    .get(&issue.item_id)
                    .cloned()
                    .unwrap_or_else(|| issue.item_id.to_string()),
                issue,
            })
            .collect())
    }
}
