use fieldtrack_core::{AppError, UserIdentity};
use fieldtrack_domain::{AuditAction, GpsCoordinates, Item, ProjectType, StageId};

use crate::test_support::Fixture;
use crate::{EvidenceUpload, EvidenceUploadResult};

const POLE_STAGES: [(&str, u32, bool); 3] = [
    ("Excavation", 0, true),
    ("Planting", 1, true),
    ("Photo", 2, true),
];

fn photo(item: &Item, stage_id: StageId) -> EvidenceUpload {
    EvidenceUpload {
        item_id: item.id,
        stage_id,
        image: b"jpeg-bytes".to_vec(),
        filename: "photo.jpg".to_owned(),
        latitude: None,
        longitude: None,
    }
}

async fn upload(
    fixture: &Fixture,
    actor: &UserIdentity,
    item: &Item,
    stage_id: StageId,
) -> EvidenceUploadResult {
    fixture
        .progress
        .upload_evidence(actor, photo(item, stage_id))
        .await
        .unwrap_or_else(|_| unreachable!())
}

fn stage_id(project_type: &ProjectType, position: usize) -> StageId {
    project_type.stages()[position].id()
}

#[tokio::test]
async fn stages_unlock_in_sequence_until_the_item_completes() {
    let fixture = Fixture::new();
    let (project, project_type) = fixture.project("Kano", &POLE_STAGES).await;
    let item = fixture.item(&project, &[]).await;

    let view = fixture
        .progress
        .item_progress(&fixture.admin, item.id)
        .await
        .unwrap_or_else(|_| unreachable!());
    let locks = view
        .stages
        .iter()
        .map(|stage| stage.is_locked)
        .collect::<Vec<_>>();
    assert_eq!(locks, vec![false, true, true]);

    let rejected = fixture
        .progress
        .upload_evidence(&fixture.admin, photo(&item, stage_id(&project_type, 1)))
        .await;
    match rejected {
        Err(AppError::SequenceViolation(missing)) => {
            assert_eq!(missing, vec!["Excavation".to_owned()]);
        }
        other => panic!("expected a sequence violation, got {other:?}"),
    }
    assert!(fixture.store.state.lock().await.evidence.is_empty());

    let first = upload(&fixture, &fixture.admin, &item, stage_id(&project_type, 0)).await;
    assert!(!first.item_completed);
    let second = upload(&fixture, &fixture.admin, &item, stage_id(&project_type, 1)).await;
    assert!(!second.item_completed);
    let third = upload(&fixture, &fixture.admin, &item, stage_id(&project_type, 2)).await;
    assert!(third.item_completed);

    let stored = fixture
        .progress
        .item_progress(&fixture.admin, item.id)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert!(stored.item.is_completed);
    assert!(stored.stages.iter().all(|stage| !stage.is_locked));
}

#[tokio::test]
async fn gate_lists_every_missing_predecessor_in_order() {
    let fixture = Fixture::new();
    let (project, project_type) = fixture.project("Kano", &POLE_STAGES).await;
    let item = fixture.item(&project, &[]).await;

    let rejected = fixture
        .progress
        .upload_evidence(&fixture.admin, photo(&item, stage_id(&project_type, 2)))
        .await;

    assert!(matches!(
        rejected,
        Err(AppError::SequenceViolation(missing))
            if missing == vec!["Excavation".to_owned(), "Planting".to_owned()]
    ));
}

#[tokio::test]
async fn reupload_replaces_evidence_and_is_audited_separately() {
    let fixture = Fixture::new();
    let (project, project_type) = fixture.project("Kano", &[("Dig", 0, true)]).await;
    let item = fixture.item(&project, &[]).await;

    let first = upload(&fixture, &fixture.admin, &item, stage_id(&project_type, 0)).await;
    let second = upload(&fixture, &fixture.admin, &item, stage_id(&project_type, 0)).await;

    assert!(!first.replaced);
    assert!(second.replaced);
    assert!(second.item_completed);

    let state = fixture.store.state.lock().await;
    assert_eq!(state.evidence.len(), 1);
    assert_eq!(state.evidence[0].id, second.record.id);
    assert!(!state.media.contains_key(&first.record.image_key));
    let actions = state
        .audit
        .iter()
        .map(|entry| entry.action.clone())
        .collect::<Vec<_>>();
    assert!(actions.contains(&AuditAction::EvidenceUploaded));
    assert!(actions.contains(&AuditAction::EvidenceReuploaded));
}

#[tokio::test]
async fn deleting_required_evidence_reopens_the_item() {
    let fixture = Fixture::new();
    let (project, project_type) = fixture.project("Kano", &[("Dig", 0, true)]).await;
    let item = fixture.item(&project, &[]).await;
    upload(&fixture, &fixture.admin, &item, stage_id(&project_type, 0)).await;

    let deletion = fixture
        .progress
        .delete_stage_evidence(&fixture.admin, item.id, stage_id(&project_type, 0))
        .await
        .unwrap_or_else(|_| unreachable!());
    assert!(deletion.deleted);
    assert!(!deletion.item_completed);

    let audit_len = fixture.store.state.lock().await.audit.len();
    let repeated = fixture
        .progress
        .delete_stage_evidence(&fixture.admin, item.id, stage_id(&project_type, 0))
        .await
        .unwrap_or_else(|_| unreachable!());
    assert!(!repeated.deleted);
    assert!(!repeated.item_completed);
    assert_eq!(fixture.store.state.lock().await.audit.len(), audit_len);
}

#[tokio::test]
async fn embedded_gps_is_used_when_none_is_supplied() {
    let embedded = GpsCoordinates::new(11.5, 8.25).unwrap_or_else(|_| unreachable!());
    let fixture = Fixture::with_collaborators(Some(embedded), false);
    let (project, project_type) = fixture.project("Kano", &[("Dig", 0, true)]).await;
    let item = fixture.item(&project, &[]).await;

    let result = upload(&fixture, &fixture.admin, &item, stage_id(&project_type, 0)).await;
    assert_eq!(result.record.gps, Some(embedded));

    let mut supplied = photo(&item, stage_id(&project_type, 0));
    supplied.latitude = Some("1.0".to_owned());
    supplied.longitude = Some("2.0".to_owned());
    let result = fixture
        .progress
        .upload_evidence(&fixture.admin, supplied)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(
        result.record.gps,
        Some(GpsCoordinates::new(1.0, 2.0).unwrap_or_else(|_| unreachable!()))
    );
}

#[tokio::test]
async fn watermark_failure_stores_the_original_image() {
    let fixture = Fixture::with_collaborators(None, true);
    let (project, project_type) = fixture.project("Kano", &[("Dig", 0, true)]).await;
    let item = fixture.item(&project, &[]).await;

    let result = upload(&fixture, &fixture.admin, &item, stage_id(&project_type, 0)).await;
    assert!(!result.branded);

    let state = fixture.store.state.lock().await;
    assert_eq!(
        state.media.get(&result.record.image_key),
        Some(&b"jpeg-bytes".to_vec())
    );
}

#[tokio::test]
async fn invalid_coordinates_are_rejected_before_anything_is_stored() {
    let fixture = Fixture::new();
    let (project, project_type) = fixture.project("Kano", &[("Dig", 0, true)]).await;
    let item = fixture.item(&project, &[]).await;

    let mut invalid = photo(&item, stage_id(&project_type, 0));
    invalid.latitude = Some("9".repeat(40));
    invalid.longitude = Some("1.0".to_owned());

    let result = fixture.progress.upload_evidence(&fixture.admin, invalid).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
    let state = fixture.store.state.lock().await;
    assert!(state.evidence.is_empty());
    assert!(state.media.is_empty());
}

#[tokio::test]
async fn stage_from_another_template_is_rejected() {
    let fixture = Fixture::new();
    let (project, _) = fixture.project("Kano", &[("Dig", 0, true)]).await;
    let item = fixture.item(&project, &[]).await;

    let result = fixture
        .progress
        .upload_evidence(&fixture.admin, photo(&item, StageId::new()))
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn completed_projects_reject_uploads() {
    let fixture = Fixture::new();
    let (project, project_type) = fixture.project("Kano", &[("Dig", 0, true)]).await;
    let item = fixture.item(&project, &[]).await;
    fixture
        .projects
        .mark_project_completed(&fixture.admin, project.id())
        .await
        .unwrap_or_else(|_| unreachable!());

    let result = fixture
        .progress
        .upload_evidence(&fixture.admin, photo(&item, stage_id(&project_type, 0)))
        .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn optional_stage_evidence_is_not_needed_for_completion() {
    let fixture = Fixture::new();
    let (project, project_type) = fixture
        .project("Kano", &[("Dig", 0, true), ("Extra", 1, false)])
        .await;
    let item = fixture.item(&project, &[]).await;

    let result = upload(&fixture, &fixture.admin, &item, stage_id(&project_type, 0)).await;
    assert!(result.item_completed);
}

#[tokio::test]
async fn evidence_images_are_served_to_staff_and_project_links() {
    let fixture = Fixture::new();
    let (project, project_type) = fixture.project("Kano", &[("Dig", 0, true)]).await;
    let item = fixture.item(&project, &[]).await;
    let dig = stage_id(&project_type, 0);
    upload(&fixture, &fixture.admin, &item, dig).await;

    let staff_copy = fixture
        .progress
        .evidence_image(&fixture.admin, item.id, dig)
        .await
        .unwrap_or_default();
    assert_eq!(staff_copy, b"BRANDED:jpeg-bytes".to_vec());

    let link = project.client_link().to_string();
    let client_copy = fixture
        .progress
        .client_evidence_image(&link, item.id, dig)
        .await
        .unwrap_or_default();
    assert_eq!(client_copy, staff_copy);

    let (other, _) = fixture.project("Zaria", &[("Dig", 0, true)]).await;
    let foreign = fixture
        .progress
        .client_evidence_image(&other.client_link().to_string(), item.id, dig)
        .await;
    assert!(matches!(foreign, Err(AppError::NotFound(_))));

    let outsider = fixture.contractor("ade").await;
    let denied = fixture.progress.evidence_image(&outsider, item.id, dig).await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));
}
