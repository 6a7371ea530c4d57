use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post, put};
use fieldtrack_application::RateLimitRule;
use fieldtrack_core::AppError;
use tower_http::trace::TraceLayer;
use tower_sessions::SessionManagerLayer;
use tower_sessions_sqlx_store::PostgresStore;

use crate::state::{AppState, RateLimitRules};
use crate::{auth, handlers, middleware};

mod cors;

/// Upper bound for photo and data file uploads.
const UPLOAD_BODY_LIMIT_BYTES: usize = 25 * 1024 * 1024;

pub fn build_router(
    app_state: AppState,
    rate_limits: &RateLimitRules,
    session_layer: SessionManagerLayer<PostgresStore>,
) -> Result<Router, AppError> {
    let upload_routes = Router::new()
        .route(
            "/api/items/{item_id}/stages/{stage_id}/evidence",
            put(handlers::items::upload_evidence_handler)
                .delete(handlers::items::delete_evidence_handler),
        )
        .route(
            "/api/projects/{project_id}/data-file",
            post(handlers::projects::upload_data_file_handler),
        )
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT_BYTES));

    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me_handler))
        .route(
            "/api/projects",
            get(handlers::projects::list_projects_handler)
                .post(handlers::projects::create_project_handler),
        )
        .route(
            "/api/projects/{project_id}",
            get(handlers::projects::project_detail_handler),
        )
        .route(
            "/api/projects/{project_id}/complete",
            post(handlers::projects::complete_project_handler),
        )
        .route(
            "/api/projects/{project_id}/contractors/{user_id}",
            put(handlers::projects::assign_contractor_handler)
                .delete(handlers::projects::unassign_contractor_handler),
        )
        .route(
            "/api/projects/{project_id}/fields",
            put(handlers::projects::configure_fields_handler),
        )
        .route(
            "/api/projects/{project_id}/fields/{field_id}/options",
            get(handlers::projects::field_options_handler),
        )
        .route(
            "/api/projects/{project_id}/data-file/headers",
            get(handlers::projects::data_file_headers_handler),
        )
        .route(
            "/api/projects/{project_id}/items",
            post(handlers::projects::create_item_handler),
        )
        .route(
            "/api/projects/{project_id}/inspection",
            get(handlers::projects::project_inspection_handler),
        )
        .route(
            "/api/projects/{project_id}/issues",
            get(handlers::projects::list_project_issues_handler),
        )
        .route(
            "/api/projects/{project_id}/audit-log",
            get(handlers::projects::list_audit_log_handler),
        )
        .route(
            "/api/projects/{project_id}/audit-log/export",
            get(handlers::projects::export_audit_log_handler),
        )
        .route(
            "/api/items/{item_id}",
            get(handlers::items::item_progress_handler),
        )
        .route(
            "/api/items/{item_id}/stages/{stage_id}/evidence/image",
            get(handlers::items::evidence_image_handler),
        )
        .route(
            "/api/issues/{issue_id}/resolve",
            post(handlers::items::resolve_issue_handler),
        )
        .route(
            "/api/clients",
            get(handlers::catalog::list_clients_handler)
                .post(handlers::catalog::create_client_handler),
        )
        .route(
            "/api/project-types",
            get(handlers::catalog::list_project_types_handler)
                .post(handlers::catalog::create_project_type_handler),
        )
        .route(
            "/api/users/contractors",
            get(handlers::catalog::list_contractors_handler),
        )
        .route("/api/users", post(handlers::catalog::create_user_handler))
        .merge(upload_routes)
        .route_layer(from_fn(middleware::require_auth));

    let login_routes = rate_limited(
        &app_state,
        rate_limits.login.clone(),
        Router::new().route("/auth/login", post(auth::login_handler)),
    );
    let public_routes = public_routes(&app_state, rate_limits);

    let cors_layer = cors::build_cors_layer(&app_state.frontend_url)?;

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .merge(login_routes)
        .merge(public_routes)
        .merge(protected_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .layer(session_layer)
        .with_state(app_state))
}

/// Anonymous magic-link routes, each group with its own budget.
fn public_routes(app_state: &AppState, rate_limits: &RateLimitRules) -> Router<AppState> {
    let client_dashboard_routes = rate_limited(
        app_state,
        rate_limits.client_dashboard.clone(),
        Router::new().route(
            "/api/public/clients/{client_link}",
            get(handlers::public::client_dashboard_handler),
        ),
    );
    let client_view_routes = rate_limited(
        app_state,
        rate_limits.client_view.clone(),
        Router::new().route(
            "/api/public/projects/{project_link}",
            get(handlers::public::client_project_view_handler),
        ),
    );
    let client_image_routes = rate_limited(
        app_state,
        rate_limits.client_image.clone(),
        Router::new().route(
            "/api/public/projects/{project_link}/items/{item_id}/stages/{stage_id}/image",
            get(handlers::public::client_evidence_image_handler),
        ),
    );
    let issue_report_routes = rate_limited(
        app_state,
        rate_limits.issue_report.clone(),
        Router::new().route(
            "/api/public/projects/{project_link}/items/{item_id}/issues",
            post(handlers::public::report_issue_handler),
        ),
    );

    Router::new()
        .merge(client_dashboard_routes)
        .merge(client_view_routes)
        .merge(client_image_routes)
        .merge(issue_report_routes)
}

fn rate_limited(
    app_state: &AppState,
    rule: RateLimitRule,
    routes: Router<AppState>,
) -> Router<AppState> {
    routes
        .route_layer(from_fn_with_state(app_state.clone(), middleware::rate_limit))
        .layer(axum::Extension(rule))
}
