use std::fmt::{Display, Formatter};
use std::str::FromStr;

use fieldtrack_core::AppError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID value.
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

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Display for $name {
            fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
                write!(formatter, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = AppError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(value.trim()).map(Self).map_err(|error| {
                    AppError::Validation(format!("malformed {} '{value}': {error}", $label))
                })
            }
        }
    };
}

uuid_identifier!(
    /// Identifier of a client organisation.
    ClientId,
    "client id"
);
uuid_identifier!(
    /// Identifier of a workflow template.
    ProjectTypeId,
    "project type id"
);
uuid_identifier!(
    /// Identifier of one stage inside a workflow template.
    StageId,
    "stage id"
);
uuid_identifier!(
    /// Identifier of a project.
    ProjectId,
    "project id"
);
uuid_identifier!(
    /// Identifier of a trackable item (pole).
    ItemId,
    "item id"
);
uuid_identifier!(
    /// Identifier of a custom per-item field definition.
    FieldDefinitionId,
    "field definition id"
);
uuid_identifier!(
    /// Identifier of an evidence record.
    EvidenceId,
    "evidence id"
);
uuid_identifier!(
    /// Identifier of a client-reported issue.
    IssueId,
    "issue id"
);
uuid_identifier!(
    /// Identifier of an audit log entry.
    AuditEntryId,
    "audit entry id"
);
