use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use crate::api::dto::ProxyAuthRequest;
use crate::handlers::AppState;

/// Same-origin relay to the backend auth endpoint. Upstream status and body
/// are returned as-is; failures become `{"message":"Internal server error"}`.
pub async fn proxy_auth_handler(State(state): State<AppState>, body: Bytes) -> Response {
    // a missing or malformed body is relayed with no address, like an undefined field
    let request = serde_json::from_slice::<ProxyAuthRequest>(&body)
        .unwrap_or(ProxyAuthRequest { wallet_address: None });
    debug!("Relaying auth request for {:?}", request.wallet_address);

    let relayed = state.relay.forward(request.wallet_address).await;
    let status = StatusCode::from_u16(relayed.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (status, Json(relayed.body)).into_response()
}
