use chrono::{Duration, Utc};
use fieldtrack_application::{EvidenceRepository, ItemRepository, UserRepository};
use fieldtrack_core::UserRole;
use fieldtrack_domain::StageId;

use super::*;

fn project(name: &str, offset_minutes: i64) -> Project {
    Project::new(
        name,
        ProjectTypeId::new(),
        None,
        Utc::now() + Duration::minutes(offset_minutes),
    )
    .unwrap_or_else(|_| unreachable!())
}

#[tokio::test]
async fn identifiers_stay_unique_within_a_project() {
    let repository = InMemoryTrackerRepository::new();
    let project_id = ProjectId::new();
    let first = Item::pending(project_id, None, Utc::now());
    let second = Item::pending(project_id, None, Utc::now());
    let elsewhere = Item::pending(ProjectId::new(), None, Utc::now());

    for item in [first.clone(), second.clone(), elsewhere.clone()] {
        assert!(repository.insert_item(item).await.is_ok());
    }

    assert!(matches!(
        repository.try_assign_identifier(first.id, "Pole #1").await,
        Ok(true)
    ));
    assert!(matches!(
        repository.try_assign_identifier(second.id, "Pole #1").await,
        Ok(false)
    ));
    assert!(matches!(
        repository.try_assign_identifier(elsewhere.id, "Pole #1").await,
        Ok(true)
    ));
    assert!(matches!(
        repository.try_assign_identifier(ItemId::new(), "Pole #9").await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn projects_are_listed_newest_first() {
    let repository = InMemoryTrackerRepository::new();
    assert!(repository.insert_project(project("Older", -10)).await.is_ok());
    assert!(repository.insert_project(project("Newer", 0)).await.is_ok());

    let names = repository
        .list_projects()
        .await
        .unwrap_or_default()
        .iter()
        .map(|project| project.name().to_owned())
        .collect::<Vec<_>>();

    assert_eq!(names, vec!["Newer".to_owned(), "Older".to_owned()]);
}

#[tokio::test]
async fn evidence_pairs_are_unique_and_deletion_returns_the_record() {
    let repository = InMemoryTrackerRepository::new();
    let item = Item::pending(ProjectId::new(), None, Utc::now());
    let stage_id = StageId::new();
    let record = EvidenceRecord {
        id: fieldtrack_domain::EvidenceId::new(),
        item_id: item.id,
        stage_id,
        image_key: "evidence/photo.jpg".to_owned(),
        gps: None,
        captured_at: Utc::now(),
        uploaded_by: None,
    };

    assert!(repository.insert_evidence(record.clone()).await.is_ok());
    assert!(matches!(
        repository.insert_evidence(record.clone()).await,
        Err(AppError::Conflict(_))
    ));

    let removed = repository
        .delete_evidence(item.id, stage_id)
        .await
        .unwrap_or_default();
    assert_eq!(removed, Some(record));
    assert!(
        repository
            .delete_evidence(item.id, stage_id)
            .await
            .unwrap_or_default()
            .is_none()
    );
}

#[tokio::test]
async fn usernames_are_unique_ignoring_case() {
    let repository = InMemoryTrackerRepository::new();
    let user = UserRecord {
        id: UserId::new(),
        username: "Ade".to_owned(),
        password_hash: "hash".to_owned(),
        role: UserRole::Contractor,
    };

    assert!(repository.create(user.clone()).await.is_ok());
    assert!(matches!(
        repository
            .create(UserRecord {
                id: UserId::new(),
                username: "ADE".to_owned(),
                ..user
            })
            .await,
        Err(AppError::Conflict(_))
    ));
    assert!(
        repository
            .find_by_username("ade")
            .await
            .unwrap_or_default()
            .is_some()
    );
}
