use fieldtrack_core::{AppError, UserRole};

use crate::test_support::Fixture;
use crate::{AuthOutcome, NewUser};

fn new_contractor(username: &str) -> NewUser {
    NewUser {
        username: username.to_owned(),
        password: "correct horse".to_owned(),
        role: UserRole::Contractor,
    }
}

#[tokio::test]
async fn created_users_can_log_in() {
    let fixture = Fixture::new();
    let created = fixture
        .users
        .create_user(&fixture.admin, new_contractor("ade"))
        .await
        .unwrap_or_else(|_| unreachable!());

    let outcome = fixture
        .users
        .login("ADE", "correct horse")
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(outcome, AuthOutcome::Authenticated(created));

    let outcome = fixture
        .users
        .login("ade", "wrong password")
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(outcome, AuthOutcome::Failed);

    let outcome = fixture
        .users
        .login("nobody", "correct horse")
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(outcome, AuthOutcome::Failed);
}

#[tokio::test]
async fn duplicate_usernames_conflict() {
    let fixture = Fixture::new();
    fixture
        .users
        .create_user(&fixture.admin, new_contractor("ade"))
        .await
        .unwrap_or_else(|_| unreachable!());

    let result = fixture
        .users
        .create_user(&fixture.admin, new_contractor("ade"))
        .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn short_passwords_are_rejected() {
    let fixture = Fixture::new();
    let mut input = new_contractor("ade");
    input.password = "short".to_owned();

    let result = fixture.users.create_user(&fixture.admin, input).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn ensure_user_is_idempotent() {
    let fixture = Fixture::new();
    let first = fixture
        .users
        .ensure_user(new_contractor("ade"))
        .await
        .unwrap_or_else(|_| unreachable!());
    let second = fixture
        .users
        .ensure_user(new_contractor("ade"))
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(first, second);
    let contractors = fixture
        .users
        .list_contractors(&fixture.admin)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(contractors.len(), 1);
}
