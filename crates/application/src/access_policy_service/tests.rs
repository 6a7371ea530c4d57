use fieldtrack_core::AppError;
use fieldtrack_domain::ProjectId;

use crate::test_support::Fixture;

#[tokio::test]
async fn unassigned_contractor_is_denied_and_event_is_logged() {
    let fixture = Fixture::new();
    let (project, _) = fixture.project("Kano North", &[("Dig", 0, true)]).await;
    let contractor = fixture.contractor("ade").await;

    let result = fixture
        .projects
        .project_detail(&contractor, project.id())
        .await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));

    let state = fixture.store.state.lock().await;
    assert_eq!(state.security_events.len(), 1);
    assert_eq!(state.security_events[0].user_id, Some(contractor.user_id()));
    assert_eq!(state.security_events[0].project_id, Some(project.id()));
}

#[tokio::test]
async fn assigned_contractor_is_allowed() {
    let fixture = Fixture::new();
    let (project, _) = fixture.project("Kano North", &[("Dig", 0, true)]).await;
    let contractor = fixture.contractor("ade").await;
    fixture
        .projects
        .assign_contractor(&fixture.admin, project.id(), contractor.user_id())
        .await
        .unwrap_or_else(|_| unreachable!());

    let allowed = fixture
        .access
        .authorize_project(&contractor, project.id())
        .await;
    assert!(allowed.is_ok());
    assert!(fixture.store.state.lock().await.security_events.is_empty());
}

#[tokio::test]
async fn missing_project_is_not_found_rather_than_forbidden() {
    let fixture = Fixture::new();
    let contractor = fixture.contractor("ade").await;

    let result = fixture
        .access
        .authorize_project(&contractor, ProjectId::new())
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn non_admins_cannot_use_admin_operations() {
    let fixture = Fixture::new();
    let contractor = fixture.contractor("ade").await;

    let result = fixture.projects.create_client(&contractor, "Acme").await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
    assert_eq!(fixture.store.state.lock().await.security_events.len(), 1);
}

#[tokio::test]
async fn malformed_and_unknown_links_are_not_found() {
    let fixture = Fixture::new();

    assert!(matches!(
        fixture.access.resolve_project_link("not-a-uuid").await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        fixture
            .access
            .resolve_client_link("3f2504e0-4f89-41d3-9a0c-0305e82c3301")
            .await,
        Err(AppError::NotFound(_))
    ));
}
