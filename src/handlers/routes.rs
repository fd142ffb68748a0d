use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::post,
    Router,
};
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::api::{create_v1_router, proxy_auth_handler};
use crate::application::services::SessionBridge;
use crate::infrastructure::auth::AuthRelay;

#[derive(Clone)]
pub struct AppState {
    pub bridge: Arc<RwLock<SessionBridge>>,
    pub relay: Arc<AuthRelay>,
}

impl AppState {
    pub fn new(bridge: SessionBridge, relay: AuthRelay) -> Self {
        Self {
            bridge: Arc::new(RwLock::new(bridge)),
            relay: Arc::new(relay),
        }
    }
}

pub fn create_router(state: AppState, allowed_origins: &[String]) -> Router {
    let origins = allowed_origins
        .iter()
        .filter(|origin| {
            let wildcard = origin.as_str() == "*";
            if wildcard {
                warn!("Ignoring wildcard CORS origin; credentialed requests need explicit origins");
            }
            !wildcard
        })
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin {}: {}", origin, e);
                None
            }
        })
        .collect::<Vec<_>>();

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_origin(origins)
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
        .allow_credentials(true);

    Router::new()
        .route("/api/proxy", post(proxy_auth_handler))
        .nest("/api/v1", create_v1_router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
