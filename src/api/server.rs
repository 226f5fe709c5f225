//! Axum API server for briefsmith.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::gate::{CooldownThrottle, DailyQuota};
use crate::providers::GenerativeProvider;

/// Shared state for all API handlers.
///
/// The brief and image operations each get their own quota counter and
/// cooldown throttle, so exhausting one does not touch the other. All four
/// maps are empty on process start and lost on restart.
pub struct AppState {
    pub config: Config,
    pub provider: Arc<dyn GenerativeProvider>,
    pub brief_quota: DailyQuota,
    pub brief_cooldown: CooldownThrottle,
    pub image_quota: DailyQuota,
    pub image_cooldown: CooldownThrottle,
}

impl AppState {
    pub fn new(config: Config, provider: Arc<dyn GenerativeProvider>) -> Self {
        let mode = config.gate.mode;
        Self {
            config,
            provider,
            brief_quota: DailyQuota::new(mode),
            brief_cooldown: CooldownThrottle::new(mode),
            image_quota: DailyQuota::new(mode),
            image_cooldown: CooldownThrottle::new(mode),
        }
    }
}

/// Build the axum router with all API routes.
pub fn build_router(state: AppState) -> Router {
    let shared_state = Arc::new(state);

    // The browser UI may be served from anywhere; the API carries no
    // credentials, so a permissive CORS policy is fine here.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([HeaderName::from_static("content-type")]);

    Router::new()
        .route("/api/health", get(super::routes::health::get_health))
        .route("/api/brief", post(super::routes::brief::create_brief))
        .route(
            "/api/generate",
            get(super::routes::generate::usage_hint).post(super::routes::generate::generate_image),
        )
        // Body size limit: 1 MiB. Brief payloads are a few KiB of form
        // fields; anything bigger is rejected before JSON parsing.
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state)
}

/// Start the API server.
pub async fn start_server(state: AppState) -> crate::error::Result<()> {
    let addr = format!("{}:{}", state.config.server.bind, state.config.server.port);
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("briefsmith API server listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::routes::testing::NullProvider;

    #[test]
    fn test_app_state_new() {
        let state = AppState::new(Config::default(), Arc::new(NullProvider));
        assert_eq!(state.config.gate.daily_limit, 10);
        assert!(state.brief_quota.snapshot().is_empty());
        assert_eq!(state.image_cooldown.tracked(), 0);
    }

    #[test]
    fn test_build_router() {
        let state = AppState::new(Config::default(), Arc::new(NullProvider));
        let _router = build_router(state);
    }
}
