use chrono::{DateTime, Utc};
use fieldtrack_core::UserId;
use serde::{Deserialize, Serialize};

use crate::{ItemId, ProjectId};

/// Prefix of the temporary identifier an item carries until it is named.
pub const PENDING_IDENTIFIER_PREFIX: &str = "pending-";

/// One trackable physical unit (e.g. a utility pole) within a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Item identifier.
    pub id: ItemId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Human-readable identifier, unique within the project.
    pub identifier: String,
    /// Derived from evidence; persisted after every evidence change.
    pub is_completed: bool,
    /// Contractor or admin who created the item.
    pub created_by: Option<UserId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Item {
    /// Creates an item carrying a unique placeholder identifier.
    ///
    /// The final identifier is assigned once the custom field answers are
    /// persisted, because naming reads the grouping value back from storage.
    #[must_use]
    pub fn pending(project_id: ProjectId, created_by: Option<UserId>, now: DateTime<Utc>) -> Self {
        let id = ItemId::new();
        Self {
            id,
            project_id,
            identifier: format!("{PENDING_IDENTIFIER_PREFIX}{id}"),
            is_completed: false,
            created_by,
            created_at: now,
        }
    }

    /// Returns whether the item still carries its placeholder identifier.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.identifier.starts_with(PENDING_IDENTIFIER_PREFIX)
    }
}
