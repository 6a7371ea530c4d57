//! PostgreSQL-backed user repository.

use async_trait::async_trait;
use sqlx::PgPool;

use fieldtrack_application::{UserRecord, UserRepository};
use fieldtrack_core::{AppError, AppResult, UserId, UserRole};

/// PostgreSQL implementation of the user repository port.
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: uuid::Uuid,
    username: String,
    password_hash: String,
    role: String,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::from_uuid(row.id),
            username: row.username,
            password_hash: row.password_hash,
            role: row.role.parse()?,
        })
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, password_hash, role
            FROM users
            WHERE LOWER(username) = LOWER($1)
            LIMIT 1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find user by username: {error}"))
        })?;

        row.map(UserRecord::try_from).transpose()
    }

    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, password_hash, role
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find user by id: {error}")))?;

        row.map(UserRecord::try_from).transpose()
    }

    async fn create(&self, user: UserRecord) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, password_hash, role)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(user.username.as_str())
        .bind(user.password_hash.as_str())
        .bind(user.role.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| username_conflict_or_internal(error, &user.username))?;

        Ok(())
    }

    async fn list_by_role(&self, role: UserRole) -> AppResult<Vec<UserRecord>> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, password_hash, role
            FROM users
            WHERE role = $1
            ORDER BY LOWER(username)
            "#,
        )
        .bind(role.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list users: {error}")))?
        .into_iter()
        .map(UserRecord::try_from)
        .collect()
    }
}

fn username_conflict_or_internal(error: sqlx::Error, username: &str) -> AppError {
    if let sqlx::Error::Database(ref database_error) = error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict(format!("username '{username}' is already taken"));
    }

    AppError::Internal(format!("failed to create user: {error}"))
}
