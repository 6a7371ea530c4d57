use fieldtrack_core::AppError;
use fieldtrack_domain::{AuditAction, IssueStatus, ItemId};

use crate::test_support::Fixture;

#[tokio::test]
async fn clients_report_issues_through_the_project_link() {
    let fixture = Fixture::new();
    let (project, _) = fixture.project("Kano", &[("Dig", 0, true)]).await;
    let item = fixture.item(&project, &[]).await;

    let issue = fixture
        .issues
        .report_issue(
            &project.client_link().to_string(),
            item.id,
            "  Pole is leaning ",
            None,
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(issue.status, IssueStatus::Open);
    assert_eq!(issue.message, "Pole is leaning");

    let state = fixture.store.state.lock().await;
    let flagged = state
        .audit
        .iter()
        .find(|entry| entry.action == AuditAction::IssueFlagged)
        .unwrap_or_else(|| unreachable!());
    assert!(flagged.actor.is_none());
    assert_eq!(flagged.target, item.identifier);
}

#[tokio::test]
async fn items_of_other_projects_cannot_be_flagged() {
    let fixture = Fixture::new();
    let (project, _) = fixture.project("Kano", &[("Dig", 0, true)]).await;
    let (other, _) = fixture.project("Zaria", &[("Dig", 0, true)]).await;
    let foreign = fixture.item(&other, &[]).await;

    let result = fixture
        .issues
        .report_issue(&project.client_link().to_string(), foreign.id, "Bad", None)
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    let result = fixture
        .issues
        .report_issue(&project.client_link().to_string(), ItemId::new(), "Bad", None)
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn completed_projects_reject_reports() {
    let fixture = Fixture::new();
    let (project, _) = fixture.project("Kano", &[("Dig", 0, true)]).await;
    let item = fixture.item(&project, &[]).await;
    fixture
        .projects
        .mark_project_completed(&fixture.admin, project.id())
        .await
        .unwrap_or_else(|_| unreachable!());

    let result = fixture
        .issues
        .report_issue(&project.client_link().to_string(), item.id, "Bad", None)
        .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
    assert!(fixture.store.state.lock().await.issues.is_empty());
}

#[tokio::test]
async fn resolving_twice_is_audited_once() {
    let fixture = Fixture::new();
    let (project, _) = fixture.project("Kano", &[("Dig", 0, true)]).await;
    let item = fixture.item(&project, &[]).await;
    let issue = fixture
        .issues
        .report_issue(&project.client_link().to_string(), item.id, "Blurry", None)
        .await
        .unwrap_or_else(|_| unreachable!());

    let resolved = fixture
        .issues
        .resolve_issue(&fixture.admin, issue.id)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(resolved.status, IssueStatus::Resolved);
    fixture
        .issues
        .resolve_issue(&fixture.admin, issue.id)
        .await
        .unwrap_or_else(|_| unreachable!());

    let state = fixture.store.state.lock().await;
    let resolutions = state
        .audit
        .iter()
        .filter(|entry| entry.action == AuditAction::IssueResolved)
        .count();
    assert_eq!(resolutions, 1);
}

#[tokio::test]
async fn open_issues_are_listed_first() {
    let fixture = Fixture::new();
    let (project, _) = fixture.project("Kano", &[("Dig", 0, true)]).await;
    let item = fixture.item(&project, &[]).await;
    let link = project.client_link().to_string();

    let first = fixture
        .issues
        .report_issue(&link, item.id, "First", None)
        .await
        .unwrap_or_else(|_| unreachable!());
    fixture
        .issues
        .report_issue(&link, item.id, "Second", None)
        .await
        .unwrap_or_else(|_| unreachable!());
    fixture
        .issues
        .resolve_issue(&fixture.admin, first.id)
        .await
        .unwrap_or_else(|_| unreachable!());

    let listed = fixture
        .issues
        .list_project_issues(&fixture.admin, project.id())
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].issue.message, "Second");
    assert_eq!(listed[1].issue.status, IssueStatus::Resolved);
    assert_eq!(listed[0].item_identifier, item.identifier);
}
