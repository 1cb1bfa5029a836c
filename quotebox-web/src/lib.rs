//! quotebox-web library - HTTP surface of the quote service
//!
//! Pages, fragments, the JSON API and the staff endpoints, all served from
//! one axum router over a shared SQLite pool.

use axum::Router;
use chrono::{DateTime, Utc};
use quotebox_common::settings::SettingsCache;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod session;
pub mod ui;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Cached AppSettings row
    pub settings: SettingsCache,
    /// Staff login password; None disables staff access entirely
    pub staff_password: Option<String>,
    /// Absolute base for permalinks; falls back to the request's Host
    pub public_base_url: Option<String>,
    /// Server startup time (for uptime calculation)
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        db: SqlitePool,
        staff_password: Option<String>,
        public_base_url: Option<String>,
    ) -> Self {
        Self {
            db,
            settings: SettingsCache::new(),
            staff_password,
            public_base_url,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    // Staff-only routes
    let protected = Router::new()
        .route(
            "/api/settings",
            get(api::get_settings).put(api::update_settings),
        )
        .route_layer(middleware::from_fn(api::require_staff));

    let public = Router::new()
        .route("/", get(api::home))
        .route("/random/", get(api::random_partial))
        .route("/add/", get(api::add_quote_form).post(api::add_quote))
        .route("/vote/", post(api::vote))
        .route("/top/", get(api::top))
        .route("/dashboard/", get(api::dashboard))
        .route("/q/:id/", get(api::quote_detail))
        .route("/api/random/", get(api::api_random))
        .route("/api/top/", get(api::api_top))
        .route("/admin/login/", get(api::login_form).post(api::login))
        .route("/admin/logout/", post(api::logout))
        .merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session::session_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
