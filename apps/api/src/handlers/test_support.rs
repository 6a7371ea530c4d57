use std::path::PathBuf;
use std::sync::Arc;

use fieldtrack_application::{
    CreateProjectInput, CreateProjectTypeInput, FieldDefinitionInput, NewUser, StageInput,
};
use fieldtrack_core::{UserIdentity, UserRole};
use fieldtrack_domain::{FieldKind, Project, ProjectType};
use fieldtrack_infrastructure::{
    InMemoryRateLimitRepository, InMemoryTrackerRepository, WatermarkConfig,
};

use crate::api_services::{Collaborators, StateSettings, TrackerStores, assemble_app_state};
use crate::state::AppState;

pub(crate) const FRONTEND_URL: &str = "http://localhost:3000";

pub(crate) struct TestApp {
    pub state: AppState,
    pub admin: UserIdentity,
    pub contractor: UserIdentity,
    pub media_root: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.media_root);
    }
}

pub(crate) async fn test_app() -> TestApp {
    let media_root = std::env::temp_dir().join(format!("fieldtrack-api-{}", uuid::Uuid::new_v4()));
    let state = assemble_app_state(
        TrackerStores::in_memory(Arc::new(InMemoryTrackerRepository::new())),
        Collaborators::new(
            media_root.clone(),
            WatermarkConfig {
                brand: "Fieldtrack".to_owned(),
                logo: None,
            },
        ),
        Arc::new(InMemoryRateLimitRepository::new()),
        StateSettings {
            frontend_url: FRONTEND_URL.to_owned(),
            public_base_url: "https://track.example.com".to_owned(),
            trusted_proxies: Vec::new(),
        },
    );

    let admin = ensure(&state, "root", UserRole::Admin).await;
    let contractor = ensure(&state, "ade", UserRole::Contractor).await;

    TestApp {
        state,
        admin,
        contractor,
        media_root,
    }
}

async fn ensure(state: &AppState, username: &str, role: UserRole) -> UserIdentity {
    state
        .user_service
        .ensure_user(NewUser {
            username: username.to_owned(),
            password: format!("{username}-password"),
            role,
        })
        .await
        .unwrap_or_else(|_| unreachable!())
}

/// Creates a two-stage project with a grouping text field and the contractor assigned.
pub(crate) async fn seed_project(app: &TestApp) -> (Project, ProjectType) {
    let service = &app.state.project_service;
    let client = service
        .create_client(&app.admin, "Kano Board")
        .await
        .unwrap_or_else(|_| unreachable!());
    let project_type = service
        .create_project_type(
            &app.admin,
            CreateProjectTypeInput {
                name: "Poles".to_owned(),
                unit_name: "Pole".to_owned(),
                description: None,
                stages: vec![
                    StageInput {
                        name: "Excavation".to_owned(),
                        order: 0,
                        is_required: true,
                    },
                    StageInput {
                        name: "Planting".to_owned(),
                        order: 1,
                        is_required: true,
                    },
                ],
            },
        )
        .await
        .unwrap_or_else(|_| unreachable!());
    let project = service
        .create_project(
            &app.admin,
            CreateProjectInput {
                name: "Kano North".to_owned(),
                project_type_id: project_type.id(),
                client_id: Some(client.id()),
                contractors: vec![app.contractor.user_id()],
            },
        )
        .await
        .unwrap_or_else(|_| unreachable!());
    service
        .configure_fields(
            &app.admin,
            project.id(),
            vec![FieldDefinitionInput {
                label: "Street".to_owned(),
                kind: FieldKind::Text,
                is_grouping_key: true,
                is_required: false,
            }],
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    (project, project_type)
}
