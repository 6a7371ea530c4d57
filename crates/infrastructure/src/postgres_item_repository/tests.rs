use chrono::Utc;
use fieldtrack_application::{EvidenceRepository, ItemRepository, ProjectRepository};
use fieldtrack_core::AppError;
use fieldtrack_domain::{
    EvidenceId, EvidenceRecord, GpsCoordinates, Item, Project, ProjectType, ProjectTypeId,
    StageDefinition, StageId,
};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

use super::PostgresItemRepository;
use crate::PostgresProjectRepository;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(4)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres item tests: {error}");
    }

    Some(pool)
}

async fn seed_project(pool: &PgPool) -> (Project, ProjectType) {
    let projects = PostgresProjectRepository::new(pool.clone());
    let stage = StageDefinition::new(StageId::new(), "Excavation", 0, true)
        .unwrap_or_else(|_| unreachable!());
    let project_type = ProjectType::new(ProjectTypeId::new(), "Poles", "Pole", None, vec![stage])
        .unwrap_or_else(|_| unreachable!());
    let project = Project::new("Kano North", project_type.id(), None, Utc::now())
        .unwrap_or_else(|_| unreachable!());

    assert!(projects.insert_project_type(project_type.clone()).await.is_ok());
    assert!(projects.insert_project(project.clone()).await.is_ok());
    (project, project_type)
}

#[tokio::test]
async fn identifiers_are_unique_per_project() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresItemRepository::new(pool.clone());
    let (project, _) = seed_project(&pool).await;

    let first = Item::pending(project.id(), None, Utc::now());
    let second = Item::pending(project.id(), None, Utc::now());
    assert!(repository.insert_item(first.clone()).await.is_ok());
    assert!(repository.insert_item(second.clone()).await.is_ok());

    assert!(matches!(
        repository.try_assign_identifier(first.id, "Pole #1").await,
        Ok(true)
    ));
    assert!(matches!(
        repository.try_assign_identifier(second.id, "Pole #1").await,
        Ok(false)
    ));
    assert!(matches!(
        repository.try_assign_identifier(second.id, "Pole #1-1").await,
        Ok(true)
    ));
    assert_eq!(repository.count_items(project.id()).await.unwrap_or(0), 2);
}

#[tokio::test]
async fn evidence_is_unique_per_stage_and_deletes_return_the_record() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresItemRepository::new(pool.clone());
    let (project, project_type) = seed_project(&pool).await;
    let item = Item::pending(project.id(), None, Utc::now());
    assert!(repository.insert_item(item.clone()).await.is_ok());

    let record = EvidenceRecord {
        id: EvidenceId::new(),
        item_id: item.id,
        stage_id: project_type.stages()[0].id(),
        image_key: "evidence/pole.jpg".to_owned(),
        gps: GpsCoordinates::new(12.0022, 8.5919).ok(),
        captured_at: Utc::now(),
        uploaded_by: None,
    };
    assert!(repository.insert_evidence(record.clone()).await.is_ok());

    let duplicate = EvidenceRecord {
        id: EvidenceId::new(),
        ..record.clone()
    };
    assert!(matches!(
        repository.insert_evidence(duplicate).await,
        Err(AppError::Conflict(_))
    ));

    let deleted = repository
        .delete_evidence(item.id, record.stage_id)
        .await
        .unwrap_or_default();
    assert_eq!(deleted.map(|found| found.id), Some(record.id));
    assert!(
        repository
            .find_evidence(item.id, record.stage_id)
            .await
            .unwrap_or_default()
            .is_none()
    );
}
