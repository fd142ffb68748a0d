use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    response::IntoResponse,
    Json,
};
use ethers::utils::to_checksum;
use tracing::{debug, info};

use crate::{
    api::dto::{ApiResponse, ConnectResponse, ExchangeResponse, SyncResponse},
    api::errors::{ApiError, ApiResult},
    application::services::SessionBridge,
    domain::models::ACCESS_TOKEN_KEY,
    handlers::AppState,
};

/// Current session state
pub async fn snapshot_handler(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let bridge = state.bridge.read().await;
    Ok(Json(ApiResponse::ok(bridge.snapshot())))
}

/// Request account access and bind the contract
pub async fn connect_handler(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let mut bridge = state.bridge.write().await;
    let account = bridge.connect().await?;

    let snapshot = bridge.snapshot();
    Ok(Json(ApiResponse::ok(ConnectResponse {
        account: to_checksum(&account, None),
        contract_address: snapshot.contract_address,
        provider: snapshot.provider,
    })))
}

/// Re-read the wallet's active account
pub async fn sync_handler(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let change = SessionBridge::sync_shared(&state.bridge).await?;

    Ok(Json(ApiResponse::ok(SyncResponse {
        previous: change.previous.map(|a| to_checksum(&a, None)),
        current: change.current.map(|a| to_checksum(&a, None)),
        changed: change.changed(),
    })))
}

/// Exchange the session account for a backend token. A request that already
/// carries the `access_token` cookie is answered without contacting the backend.
pub async fn exchange_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    if let Some(token) = cookie_value(&headers, ACCESS_TOKEN_KEY) {
        debug!("access_token cookie present; skipping exchange");
        return Ok((
            HeaderMap::new(),
            Json(ApiResponse::ok(ExchangeResponse {
                access_token: token,
                reused: true,
            })),
        ));
    }

    let exchange = {
        let bridge = state.bridge.read().await;
        bridge.exchange_current_session().await?
    };

    let cookie = format!("{}={}; Path=/; SameSite=Lax", ACCESS_TOKEN_KEY, exchange.token.as_str());
    let cookie = HeaderValue::from_str(&cookie)
        .map_err(|e| ApiError::internal_server_error(format!("Token is not a valid cookie value: {}", e)))?;

    let mut response_headers = HeaderMap::new();
    response_headers.insert(header::SET_COOKIE, cookie);
    info!("Session exchange complete (reused: {})", exchange.reused);

    Ok((
        response_headers,
        Json(ApiResponse::ok(ExchangeResponse {
            access_token: exchange.token.into_inner(),
            reused: exchange.reused,
        })),
    ))
}

/// Value of cookie `name` across all `Cookie` headers, ignoring empty values.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_value() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; access_token=abc.def.ghi"));
        assert_eq!(cookie_value(&headers, "access_token").as_deref(), Some("abc.def.ghi"));
        assert_eq!(cookie_value(&headers, "missing"), None);

        let mut empty = HeaderMap::new();
        empty.insert(header::COOKIE, HeaderValue::from_static("access_token="));
        assert_eq!(cookie_value(&empty, "access_token"), None);
    }
}
