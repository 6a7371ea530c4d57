use fieldtrack_application::{
    CreateProjectInput, CreateProjectTypeInput, FieldDefinitionInput, NewUser, StageInput,
};
use fieldtrack_core::{AppResult, UserRole};
use fieldtrack_domain::FieldKind;
use tracing::info;

use crate::state::AppState;

const DEV_SEED_ADMIN_USERNAME: &str = "admin";
const DEV_SEED_ADMIN_PASSWORD: &str = "fieldtrack-admin";
const DEV_SEED_CONTRACTOR_USERNAME: &str = "contractor";
const DEV_SEED_CONTRACTOR_PASSWORD: &str = "fieldtrack-contractor";

const DEV_SEED_CLIENT_NAME: &str = "Kano State Electricity Board";
const DEV_SEED_PROJECT_TYPE_NAME: &str = "Pole Installation";
const DEV_SEED_PROJECT_NAME: &str = "Kano North";
const DEV_SEED_STAGES: [&str; 3] = ["Excavation", "Planting", "Photo"];

/// Creates demo accounts and, on an empty database, one demo project.
pub async fn run(state: &AppState) -> AppResult<()> {
    let admin = state
        .user_service
        .ensure_user(NewUser {
            username: DEV_SEED_ADMIN_USERNAME.to_owned(),
            password: DEV_SEED_ADMIN_PASSWORD.to_owned(),
            role: UserRole::Admin,
        })
        .await?;
    let contractor = state
        .user_service
        .ensure_user(NewUser {
            username: DEV_SEED_CONTRACTOR_USERNAME.to_owned(),
            password: DEV_SEED_CONTRACTOR_PASSWORD.to_owned(),
            role: UserRole::Contractor,
        })
        .await?;

    if !state
        .project_service
        .list_dashboard_projects(&admin)
        .await?
        .is_empty()
    {
        info!("dev seed skipped, projects already exist");
        return Ok(());
    }

    let client = state
        .project_service
        .create_client(&admin, DEV_SEED_CLIENT_NAME)
        .await?;
    let project_type = state
        .project_service
        .create_project_type(
            &admin,
            CreateProjectTypeInput {
                name: DEV_SEED_PROJECT_TYPE_NAME.to_owned(),
                unit_name: "Pole".to_owned(),
                description: Some("Concrete pole installation with photo sign-off".to_owned()),
                stages: DEV_SEED_STAGES
                    .iter()
                    .zip(0_u32..)
                    .map(|(name, order)| StageInput {
                        name: (*name).to_owned(),
                        order,
                        is_required: true,
                    })
                    .collect(),
            },
        )
        .await?;
    let project = state
        .project_service
        .create_project(
            &admin,
            CreateProjectInput {
                name: DEV_SEED_PROJECT_NAME.to_owned(),
                project_type_id: project_type.id(),
                client_id: Some(client.id()),
                contractors: vec![contractor.user_id()],
            },
        )
        .await?;
    state
        .project_service
        .configure_fields(
            &admin,
            project.id(),
            vec![FieldDefinitionInput {
                label: "Street".to_owned(),
                kind: FieldKind::Text,
                is_grouping_key: true,
                is_required: false,
            }],
        )
        .await?;

    info!(
        project_id = %project.id(),
        project_url = %state.project_link_url(&project.client_link().to_string()),
        client_url = %state.client_link_url(&client.link().to_string()),
        "dev seed created demo project"
    );
    Ok(())
}
