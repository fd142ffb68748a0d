use axum::{
    routing::{get, post, put},
    Router,
};

use crate::handlers::AppState;
use super::{
    connect_handler, exchange_handler, snapshot_handler, sync_handler,
    // Contract endpoints
    create_certificate, get_certificate, get_temp_count, has_role, set_temp_count, update_role,
};

async fn health_check() -> &'static str {
    "OK"
}

pub fn create_v1_router() -> Router<AppState> {
    // Session routes
    let session_routes = Router::new()
        .route("/session", get(snapshot_handler))
        .route("/session/connect", post(connect_handler))
        .route("/session/sync", post(sync_handler))
        .route("/session/exchange", post(exchange_handler));

    // Contract routes
    let contract_routes = Router::new()
        .route("/certificates", post(create_certificate))
        .route("/certificates/{id}", get(get_certificate))
        .route("/count", get(get_temp_count).post(set_temp_count))
        .route("/roles", put(update_role))
        .route("/roles/{address}", get(has_role));

    // Health check route
    let health_route = Router::new()
        .route("/health", get(health_check));

    Router::new()
        .merge(session_routes)
        .nest("/contract", contract_routes)
        .merge(health_route)
}
