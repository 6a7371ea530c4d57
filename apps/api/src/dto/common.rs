use fieldtrack_core::UserIdentity;
use serde::Serialize;
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// API representation of an account.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/user-identity-response.ts"
)]
pub struct UserIdentityResponse {
    pub user_id: String,
    pub username: String,
    /// `"admin"` or `"contractor"`.
    pub role: String,
    pub is_admin: bool,
}

impl From<UserIdentity> for UserIdentityResponse {
    fn from(identity: UserIdentity) -> Self {
        Self {
            user_id: identity.user_id().to_string(),
            username: identity.username().to_owned(),
            role: identity.role().as_str().to_owned(),
            is_admin: identity.is_admin(),
        }
    }
}
