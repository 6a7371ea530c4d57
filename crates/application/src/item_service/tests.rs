use std::collections::{BTreeMap, HashSet};

use fieldtrack_core::AppError;
use fieldtrack_domain::{AuditAction, FieldDefinitionId, FieldKind, ItemFieldDefinition};

use crate::CreateItemInput;
use crate::test_support::Fixture;

#[tokio::test]
async fn grouped_items_are_numbered_within_their_group() {
    let fixture = Fixture::new();
    let (project, _) = fixture.project("Kano", &[("Dig", 0, true)]).await;
    let village = fixture.text_field(&project, "Village", true).await;

    let mut identifiers = Vec::new();
    for _ in 0..3 {
        identifiers.push(fixture.item(&project, &[(village, "Bari")]).await.identifier);
    }
    let other = fixture.item(&project, &[(village, "Dala")]).await;

    assert_eq!(
        identifiers,
        vec![
            "Kano_Bari #1".to_owned(),
            "Kano_Bari #2".to_owned(),
            "Kano_Bari #3".to_owned(),
        ]
    );
    assert_eq!(other.identifier, "Kano_Dala #1");
}

#[tokio::test]
async fn projects_without_grouping_use_the_unit_name_and_total_count() {
    let fixture = Fixture::new();
    let (project, _) = fixture.project("Kano", &[("Dig", 0, true)]).await;
    let ward = fixture.text_field(&project, "Ward", false).await;

    let first = fixture.item(&project, &[(ward, "North")]).await;
    let second = fixture.item(&project, &[(ward, "North")]).await;

    assert_eq!(first.identifier, "Pole #1");
    assert_eq!(second.identifier, "Pole #2");
}

#[tokio::test]
async fn blank_optional_group_value_falls_back_to_the_unit_count() {
    let fixture = Fixture::new();
    let (project, _) = fixture.project("Kano", &[("Dig", 0, true)]).await;
    let village = fixture.optional_text_field(&project, "Village", true).await;

    let mut identifiers = Vec::new();
    for _ in 0..3 {
        identifiers.push(fixture.item(&project, &[(village, "Bari")]).await.identifier);
    }
    let blank = fixture.item(&project, &[(village, "  ")]).await;
    let unanswered = fixture.item(&project, &[]).await;

    assert_eq!(
        identifiers,
        vec![
            "Kano_Bari #1".to_owned(),
            "Kano_Bari #2".to_owned(),
            "Kano_Bari #3".to_owned(),
        ]
    );
    assert_eq!(blank.identifier, "Pole #4");
    assert_eq!(unanswered.identifier, "Pole #5");

    let state = fixture.store.state.lock().await;
    assert!(
        !state
            .field_values
            .iter()
            .any(|value| value.item_id == blank.id || value.item_id == unanswered.id)
    );
}

#[tokio::test]
async fn taken_identifiers_receive_a_suffix() {
    let fixture = Fixture::new();
    let (project, _) = fixture.project("Kano", &[("Dig", 0, true)]).await;
    let first = fixture.item(&project, &[]).await;
    {
        let mut state = fixture.store.state.lock().await;
        if let Some(item) = state.items.iter_mut().find(|item| item.id == first.id) {
            item.identifier = "Pole #2".to_owned();
        }
    }

    let second = fixture.item(&project, &[]).await;
    assert_eq!(second.identifier, "Pole #2-1");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creations_get_distinct_identifiers() {
    let fixture = Fixture::new();
    let (project, _) = fixture.project("Kano", &[("Dig", 0, true)]).await;
    let village = fixture.text_field(&project, "Village", true).await;

    let handles = (0..8)
        .map(|_| {
            let items = fixture.items.clone();
            let admin = fixture.admin.clone();
            let project_id = project.id();
            tokio::spawn(async move {
                items
                    .create_item(
                        &admin,
                        CreateItemInput {
                            project_id,
                            field_values: BTreeMap::from([(village, "Bari".to_owned())]),
                        },
                    )
                    .await
            })
        })
        .collect::<Vec<_>>();

    let mut identifiers = HashSet::new();
    for handle in handles {
        let item = handle
            .await
            .unwrap_or_else(|_| unreachable!())
            .unwrap_or_else(|_| unreachable!());
        identifiers.insert(item.identifier);
    }

    assert_eq!(identifiers.len(), 8);
}

#[tokio::test]
async fn missing_answers_are_rejected_without_writing() {
    let fixture = Fixture::new();
    let (project, _) = fixture.project("Kano", &[("Dig", 0, true)]).await;
    fixture.text_field(&project, "Village", true).await;

    let result = fixture
        .items
        .create_item(
            &fixture.admin,
            CreateItemInput {
                project_id: project.id(),
                field_values: BTreeMap::new(),
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    let state = fixture.store.state.lock().await;
    assert!(state.items.is_empty());
    assert!(state.field_values.is_empty());
}

#[tokio::test]
async fn dropdown_answers_are_checked_against_the_data_file() {
    let fixture = Fixture::new();
    let (project, _) = fixture.project("Kano", &[("Dig", 0, true)]).await;
    fixture
        .projects
        .attach_data_file(
            &fixture.admin,
            project.id(),
            "villages.csv",
            b"Village,Ward\nBari,North\nDala,South\n".to_vec(),
        )
        .await
        .unwrap_or_else(|_| unreachable!());
    let field = ItemFieldDefinition::new(
        FieldDefinitionId::new(),
        project.id(),
        "Village",
        FieldKind::DropdownFromColumn {
            column: "Village".to_owned(),
        },
        true,
    )
    .unwrap_or_else(|_| unreachable!());
    let field_id = field.id();
    fixture
        .store
        .state
        .lock()
        .await
        .field_definitions
        .insert(project.id(), vec![field]);

    let rejected = fixture
        .items
        .create_item(
            &fixture.admin,
            CreateItemInput {
                project_id: project.id(),
                field_values: BTreeMap::from([(field_id, "Kura".to_owned())]),
            },
        )
        .await;
    assert!(matches!(rejected, Err(AppError::Validation(_))));

    let accepted = fixture.item(&project, &[(field_id, "Dala")]).await;
    assert_eq!(accepted.identifier, "Kano_Dala #1");
}

#[tokio::test]
async fn creation_is_audited() {
    let fixture = Fixture::new();
    let (project, _) = fixture.project("Kano", &[("Dig", 0, true)]).await;
    let item = fixture.item(&project, &[]).await;

    let state = fixture.store.state.lock().await;
    assert_eq!(state.audit.len(), 1);
    assert_eq!(state.audit[0].action, AuditAction::ItemCreated);
    assert_eq!(state.audit[0].target, item.identifier);
}

#[tokio::test]
async fn unassigned_contractors_cannot_create_items() {
    let fixture = Fixture::new();
    let (project, _) = fixture.project("Kano", &[("Dig", 0, true)]).await;
    let contractor = fixture.contractor("ade").await;

    let result = fixture
        .items
        .create_item(
            &contractor,
            CreateItemInput {
                project_id: project.id(),
                field_values: BTreeMap::new(),
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}
