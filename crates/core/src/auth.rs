use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{AppError, UserId};

/// Role of an authenticated account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Superuser/staff with unrestricted access.
    Admin,
    /// Field contractor limited to assigned projects.
    Contractor,
}

impl UserRole {
    /// Returns a stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Contractor => "contractor",
        }
    }
}

impl FromStr for UserRole {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "admin" => Ok(Self::Admin),
            "contractor" => Ok(Self::Contractor),
            _ => Err(AppError::Validation(format!("unknown user role '{value}'"))),
        }
    }
}

/// Acting identity persisted in the authenticated session.
///
/// Passed explicitly into every policy and audit call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    user_id: UserId,
    username: String,
    role: UserRole,
}

impl UserIdentity {
    /// Creates a user identity.
    #[must_use]
    pub fn new(user_id: UserId, username: impl Into<String>, role: UserRole) -> Self {
        Self {
            user_id,
            username: username.into(),
            role,
        }
    }

    /// Returns the stable account identifier.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the login name.
    #[must_use]
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Returns the account role.
    #[must_use]
    pub fn role(&self) -> UserRole {
        self.role
    }

    /// Returns whether the identity carries admin privileges.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}
