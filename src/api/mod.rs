use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::state::SharedState;

mod announcements;
mod assets;
pub mod auth;
mod error;
mod groups;
mod meetings;
mod mentees;
mod observability;
mod reports;
mod types;
mod users;
pub mod validation;

pub use error::ApiError;
pub use types::*;

use auth::LoginThrottle;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub login_throttle: Arc<LoginThrottle>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn uploads(&self) -> &Arc<crate::services::UploadService> {
        &self.shared.uploads
    }
}

pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        login_throttle: Arc::new(LoginThrottle::default()),
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub async fn router(state: Arc<AppState>) -> Router {
    let (storage_path, cors_origins) = {
        let config = state.config().read().await;
        (
            config.uploads.storage_path.clone(),
            config.server.cors_allowed_origins.clone(),
        )
    };

    let protected_routes = create_protected_router(state.clone());

    let api_router = Router::new()
        .merge(protected_routes)
        .route("/health", get(observability::health))
        .route("/auth/login", post(auth::login))
        .with_state(state.clone());

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .nest_service(
            "/storage",
            tower_http::services::ServeDir::new(storage_path),
        )
        .fallback(assets::serve_asset)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(middleware::from_fn(
            observability::security_headers_middleware,
        ))
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    // Visible to every authenticated role. Mentor scoping happens in the
    // handlers, which check group and meeting ownership.
    let common = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/auth/logout-all", post(auth::logout_all))
        .route("/auth/me", get(auth::me))
        .route("/profile", get(users::get_profile))
        .route("/profile", put(users::update_profile))
        .route("/profile/picture", post(users::upload_picture))
        .route("/groups", get(groups::list))
        .route("/groups/{id}", get(groups::get))
        .route("/meetings", get(meetings::list))
        .route("/meetings/{id}", get(meetings::get))
        .route("/meetings", post(meetings::create))
        .route("/meetings/{id}", put(meetings::update))
        .route("/meetings/{id}", delete(meetings::delete))
        .route("/meetings/{id}/attendances", post(meetings::record_attendance))
        .route("/meetings/attendance-report", get(meetings::attendance_report))
        .route("/meetings/export/pdf", get(meetings::export_pdf))
        .route("/meetings/export/excel", get(meetings::export_excel))
        .route("/announcements", get(announcements::list))
        .route("/announcements/{id}", get(announcements::get))
        .route("/metrics", get(observability::get_metrics));

    let admin = Router::new()
        .route("/mentees", get(mentees::list))
        .route("/mentees", post(mentees::create))
        .route("/mentees/available", get(mentees::list_available))
        .route("/mentees/trashed", get(mentees::list_trashed))
        .route("/mentees/{id}", get(mentees::get))
        .route("/mentees/{id}", put(mentees::update))
        .route("/mentees/{id}", delete(mentees::delete))
        .route("/mentees/{id}/move", post(mentees::move_mentee))
        .route("/mentees/{id}/restore", post(mentees::restore))
        .route("/mentees/{id}/force", delete(mentees::force_delete))
        .route("/groups", post(groups::create))
        .route("/groups/bulk-delete", post(groups::bulk_delete))
        .route("/groups/trashed", get(groups::list_trashed))
        .route("/groups/{id}", put(groups::update))
        .route("/groups/{id}", delete(groups::delete))
        .route("/groups/{id}/move-mentees", post(groups::move_mentees))
        .route("/groups/{id}/delete-info", get(groups::delete_info))
        .route("/groups/{id}/restore", post(groups::restore))
        .route("/groups/{id}/force", delete(groups::force_delete))
        .route("/meetings/trashed", get(meetings::list_trashed))
        .route("/meetings/{id}/restore", post(meetings::restore))
        .route("/meetings/{id}/force", delete(meetings::force_delete))
        .route("/announcements", post(announcements::create))
        .route("/announcements/archived", get(announcements::list_archived))
        .route("/announcements/bulk-delete", post(announcements::bulk_delete))
        .route("/announcements/{id}", post(announcements::update))
        .route("/announcements/{id}", delete(announcements::delete))
        .route("/announcements/{id}/archive", post(announcements::archive))
        .route("/announcements/{id}/unarchive", post(announcements::unarchive))
        .route("/reports/monthly", get(reports::monthly))
        .route("/reports/monthly/export/pdf", get(reports::export_pdf))
        .route("/reports/monthly/export/excel", get(reports::export_excel))
        .route("/mentors", get(users::list_mentors))
        .route("/mentors", post(users::create_mentor))
        .route("/mentors/{id}", put(users::update_mentor))
        .route("/mentors/{id}", delete(users::delete_mentor))
        .route("/users/{id}/block", post(users::block))
        .route("/users/{id}/unblock", post(users::unblock))
        .route_layer(middleware::from_fn(auth::require_admin));

    let super_admin = Router::new()
        .route("/admins", get(users::list_admins))
        .route("/admins", post(users::create_admin))
        .route("/admins/{id}", put(users::update_admin))
        .route("/admins/{id}", delete(users::delete_admin))
        .route_layer(middleware::from_fn(auth::require_super_admin));

    Router::new()
        .merge(common)
        .merge(admin)
        .merge(super_admin)
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
