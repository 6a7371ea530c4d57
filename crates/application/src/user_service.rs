//! Account ports and password authentication.

use std::sync::Arc;

use async_trait::async_trait;

use fieldtrack_core::{AppError, AppResult, NonEmptyString, UserId, UserIdentity, UserRole};

use crate::AccessPolicyService;

#[cfg(test)]
mod tests;

/// Minimum accepted password length.
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Maximum accepted password length, bounding hashing cost.
pub const PASSWORD_MAX_LENGTH: usize = 128;

/// User record returned by repository queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Unique user identifier.
    pub id: UserId,
    /// Login name.
    pub username: String,
    /// Argon2id password hash.
    pub password_hash: String,
    /// Account role.
    pub role: UserRole,
}

impl UserRecord {
    /// Returns the session identity of the account.
    #[must_use]
    pub fn identity(&self) -> UserIdentity {
        UserIdentity::new(self.id, self.username.clone(), self.role)
    }
}

/// Repository port for user persistence.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds a user by login name (case-insensitive).
    async fn find_by_username(&self, username: &str) -> AppResult<Option<UserRecord>>;

    /// Finds a user by identifier.
    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>>;

    /// Persists a new user. Fails with a conflict when the username is taken.
    async fn create(&self, user: UserRecord) -> AppResult<()>;

    /// Lists users with the given role ordered by username.
    async fn list_by_role(&self, role: UserRole) -> AppResult<Vec<UserRecord>>;
}

/// Port for password hashing operations.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password.
    fn hash_password(&self, password: &str) -> AppResult<String>;

    /// Verifies a plaintext password against a stored hash.
    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool>;
}

/// Result of a login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Credentials matched.
    Authenticated(UserIdentity),
    /// Unknown user or wrong password, deliberately indistinguishable.
    Failed,
}

/// Input for creating an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Login name.
    pub username: String,
    /// Plaintext password.
    pub password: String,
    /// Account role.
    pub role: UserRole,
}

/// Application service for accounts and authentication.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
    access: AccessPolicyService,
}

impl UserService {
    /// Creates a new user service.
    #[must_use]
    pub fn new(
        users: Arc<dyn UserRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
        access: AccessPolicyService,
    ) -> Self {
        Self {
            users,
            password_hasher,
            access,
        }
    }

    /// Authenticates a user with username and password.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<AuthOutcome> {
        let Some(user) = self.users.find_by_username(username.trim()).await? else {
            // Hash anyway so unknown usernames take as long as wrong passwords.
            let _ = self.password_hasher.hash_password(password);
            return Ok(AuthOutcome::Failed);
        };

        if !self
            .password_hasher
            .verify_password(password, &user.password_hash)?
        {
            return Ok(AuthOutcome::Failed);
        }

        Ok(AuthOutcome::Authenticated(user.identity()))
    }

    /// Creates an account. Admin only.
    pub async fn create_user(&self, actor: &UserIdentity, input: NewUser) -> AppResult<UserIdentity> {
        self.access.require_admin(actor, None, "create users").await?;
        self.register(input).await
    }

    /// Creates an account unless the username already exists.
    ///
    /// Used by bootstrap and development seeding only.
    pub async fn ensure_user(&self, input: NewUser) -> AppResult<UserIdentity> {
        if let Some(existing) = self.users.find_by_username(input.username.trim()).await? {
            return Ok(existing.identity());
        }
        self.register(input).await
    }

    /// Lists contractor accounts. Admin only.
    pub async fn list_contractors(&self, actor: &UserIdentity) -> AppResult<Vec<UserIdentity>> {
        self.access
            .require_admin(actor, None, "list contractors")
            .await?;
        Ok(self
            .users
            .list_by_role(UserRole::Contractor)
            .await?
            .iter()
            .map(UserRecord::identity)
            .collect())
    }

    /// Returns the identity of a user, if it still exists.
    pub async fn find_identity(&self, user_id: UserId) -> AppResult<Option<UserIdentity>> {
        Ok(self
            .users
            .find_by_id(user_id)
            .await?
            .map(|user| user.identity()))
    }

    async fn register(&self, input: NewUser) -> AppResult<UserIdentity> {
        let username = NonEmptyString::new(input.username)?;
        validate_password(&input.password)?;

        if self
            .users
            .find_by_username(username.as_str())
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "username '{username}' is already taken"
            )));
        }

        let user = UserRecord {
            id: UserId::new(),
            username: username.into(),
            password_hash: self.password_hasher.hash_password(&input.password)?,
            role: input.role,
        };
        self.users.create(user.clone()).await?;
        Ok(user.identity())
    }
}

/// Validates password length bounds.
pub fn validate_password(password: &str) -> AppResult<()> {
    let length = password.chars().count();
    if length < PASSWORD_MIN_LENGTH {
        return Err(AppError::Validation(format!(
            "password must be at least {PASSWORD_MIN_LENGTH} characters"
        )));
    }
    if length > PASSWORD_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "password must not exceed {PASSWORD_MAX_LENGTH} characters"
        )));
    }
    Ok(())
}
