use std::str::FromStr;

use chrono::{DateTime, Utc};
use fieldtrack_core::{AppError, AppResult, UserId};
use serde::{Deserialize, Serialize};

use crate::{IssueId, ItemId, ProjectId};

/// Longest accepted issue message.
pub const ISSUE_MESSAGE_MAX_LENGTH: usize = 2_000;

/// Resolution state of a client-reported issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueStatus {
    /// Awaiting action.
    Open,
    /// Handled by an admin or contractor.
    Resolved,
}

impl IssueStatus {
    /// Returns a stable storage value for the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Resolved => "RESOLVED",
        }
    }
}

impl FromStr for IssueStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "OPEN" => Ok(Self::Open),
            "RESOLVED" => Ok(Self::Resolved),
            _ => Err(AppError::Validation(format!(
                "unknown issue status '{value}'"
            ))),
        }
    }
}

/// Problem flagged by a client on one item (e.g. "pole is leaning").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Issue identifier.
    pub id: IssueId,
    /// Project of the flagged item.
    pub project_id: ProjectId,
    /// Flagged item.
    pub item_id: ItemId,
    /// Client message.
    pub message: String,
    /// Resolution state.
    pub status: IssueStatus,
    /// Free-form reporter label; anonymous clients have none.
    pub reporter: Option<String>,
    /// Report timestamp.
    pub created_at: DateTime<Utc>,
    /// Resolver.
    pub resolved_by: Option<UserId>,
    /// Resolution timestamp.
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Issue {
    /// Creates an open issue from a client report.
    pub fn report(
        project_id: ProjectId,
        item_id: ItemId,
        message: &str,
        reporter: Option<String>,
        now: DateTime<Utc>,
    ) -> AppResult<Self> {
        let message = message.trim();
        if message.is_empty() {
            return Err(AppError::Validation(
                "issue message must not be empty".to_owned(),
            ));
        }
        if message.chars().count() > ISSUE_MESSAGE_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "issue message must not exceed {ISSUE_MESSAGE_MAX_LENGTH} characters"
            )));
        }

        Ok(Self {
            id: IssueId::new(),
            project_id,
            item_id,
            message: message.to_owned(),
            status: IssueStatus::Open,
            reporter: reporter.filter(|value| !value.trim().is_empty()),
            created_at: now,
            resolved_by: None,
            resolved_at: None,
        })
    }

    /// Marks the issue resolved. Returns false when it already was.
    pub fn resolve(&mut self, resolved_by: UserId, now: DateTime<Utc>) -> bool {
        if self.status == IssueStatus::Resolved {
            return false;
        }

        self.status = IssueStatus::Resolved;
        self.resolved_by = Some(resolved_by);
        self.resolved_at = Some(now);
        true
    }
}
