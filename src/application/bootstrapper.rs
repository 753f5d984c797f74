//! Application bootstrapper
//!
//! Handles all initialization and setup for the invitation backend.

use std::net::SocketAddr;

use axum::{http::HeaderValue, Router};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::storage::StorageBackend;
use crate::config::CONFIG;
use crate::db;
use crate::endpoints;
use crate::services::cache::InviteCache;
use crate::services::clock::system_clock;
use crate::services::storage::build_storage;
use crate::state::AppState;

/// Bootstrap and run the application
pub async fn run() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!("Starting digital-invite backend v{}", CONFIG.version);

    let state = init_services().await?;
    let app = create_app(state);

    serve(app).await
}

/// Initialize tracing/logging
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("digital_invite={},tower_http=info", CONFIG.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_ansi(false))
        .init();
}

/// Initialize all application services
async fn init_services() -> anyhow::Result<AppState> {
    let conn = db::connect().await?;
    tracing::info!("Database connection established");

    let storage = build_storage(&CONFIG.storage)?;
    let clock = system_clock();
    let cache = InviteCache::new(CONFIG.invites.cache_ttl_secs, clock.clone());
    if !cache.is_enabled() {
        tracing::info!("Invite lookup cache disabled");
    }

    let mut state = AppState::new(
        conn,
        storage,
        clock,
        cache,
        &CONFIG.invites.public_base_url,
        CONFIG.invites.staff_token.clone(),
    );

    if CONFIG.invites.staff_token.is_none() {
        tracing::warn!("INVITE_STAFF_TOKEN not set - staff API is disabled");
    }
    if CONFIG.storage.backend == StorageBackend::Local {
        state = state.with_media_dir(CONFIG.storage.media_dir.clone());
    }

    Ok(state)
}

/// Create the main application router
fn create_app(state: AppState) -> Router {
    endpoints::create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&CONFIG.server.allowed_origins))
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Start the HTTP server
async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", CONFIG.server.host, CONFIG.server.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
