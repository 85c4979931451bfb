use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use std::sync::Arc;

use crate::auth::ThrottleGate;
use crate::db::NavStore;
use crate::handlers;
use crate::middleware::auth::AuthRuntime;

/// Request bodies larger than this are rejected with 413 before any
/// handler runs. Snapshots fit comfortably.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Shared application state. Built from explicit parts, never from the
/// process environment, so tests can assemble any combination.
#[derive(Clone)]
pub struct WaypostState {
    pub store: NavStore,
    pub auth: Arc<AuthRuntime>,
    pub throttle: Arc<dyn ThrottleGate>,
}

impl WaypostState {
    pub fn new(store: NavStore, auth: AuthRuntime, throttle: Arc<dyn ThrottleGate>) -> Self {
        Self {
            store,
            auth: Arc::new(auth),
            throttle,
        }
    }
}

pub fn waypost_router(state: WaypostState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health::health))
        .route("/api/login", post(handlers::auth::login))
        .route("/api/logout", post(handlers::auth::logout))
        .route("/api/auth/status", get(handlers::auth::status))
        .route(
            "/api/groups",
            get(handlers::groups::list).post(handlers::groups::create),
        )
        .route(
            "/api/groups/{id}",
            get(handlers::groups::get_one)
                .put(handlers::groups::update)
                .delete(handlers::groups::remove),
        )
        .route("/api/group-orders", put(handlers::groups::reorder))
        .route("/api/groups-with-sites", get(handlers::groups::with_sites))
        .route(
            "/api/sites",
            get(handlers::sites::list).post(handlers::sites::create),
        )
        .route(
            "/api/sites/{id}",
            get(handlers::sites::get_one)
                .put(handlers::sites::update)
                .delete(handlers::sites::remove),
        )
        .route("/api/site-orders", put(handlers::sites::reorder))
        .route("/api/configs", get(handlers::configs::list))
        .route(
            "/api/configs/{key}",
            get(handlers::configs::get_one).put(handlers::configs::set),
        )
        .route("/api/export", get(handlers::transfer::export_snapshot))
        .route("/api/import", post(handlers::transfer::import_snapshot))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}
