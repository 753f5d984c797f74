pub mod extractors;
pub mod gamification;
pub mod guests;
pub mod invitations;
pub mod invites;
pub mod openapi;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Json, Router,
};
use tower_http::services::ServeDir;
use utoipa::OpenApi;

use crate::config::CONFIG;
use crate::middleware::{require_staff, security_headers};
use crate::state::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/api/health", get(health_check))
        .route("/api/system/version", get(get_version))
        .route("/api/openapi.json", get(openapi_json))
        .nest("/invitations", invitations::invitation_routes(state.clone()))
        .nest("/gamification", gamification::gamification_routes(state.clone()));

    // Staff routes (bearer token required)
    let staff_routes = Router::new()
        .nest("/api/guests", guests::guest_routes(state.clone()))
        .nest("/api/invites", invites::invite_routes(state.clone()))
        .layer(from_fn_with_state(state.clone(), require_staff));

    let mut router = public_routes.merge(staff_routes);
    if let Some(media_dir) = &state.media_dir {
        router = router.nest_service("/media", ServeDir::new(media_dir));
    }

    router.layer(from_fn(security_headers))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Version info endpoint
async fn get_version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "version": CONFIG.version,
        "commit_hash": CONFIG.commit_hash,
        "backend": "rust"
    }))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(openapi::ApiDoc::openapi())
}
