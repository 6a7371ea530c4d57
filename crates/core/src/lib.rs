//! Shared primitives for all Rust crates in Fieldtrack.

#![forbid(unsafe_code)]

/// Authentication primitives shared across services.
pub mod auth;

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use auth::{UserIdentity, UserRole};

/// Result type used across Fieldtrack crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string. Surrounding whitespace is trimmed.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for NonEmptyString {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Identifier of an authenticated account (admin or contractor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a random user identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a user identifier from an existing UUID value.
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

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for UserId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// User is not authenticated.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// User is authenticated but blocked by authorization policy.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Evidence was submitted for a stage whose predecessors lack evidence.
    ///
    /// Carries the missing stage names in ascending stage order.
    #[error("stage is locked, missing evidence for: {}", .0.join(", "))]
    SequenceViolation(Vec<String>),

    /// Caller exceeded a rate limit budget.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}
