use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::models::{AuthRequest, AuthResponse};
use crate::domain::services::{AuthGateway, SessionError};

/// Posts the wallet address to the backend auth endpoint (or the local relay).
#[derive(Clone)]
pub struct HttpAuthGateway {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpAuthGateway {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, SessionError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SessionError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl AuthGateway for HttpAuthGateway {
    async fn authenticate(&self, request: &AuthRequest) -> Result<AuthResponse, SessionError> {
        debug!("Exchanging {} for a session token at {}", request.wallet_address, self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .header(ACCEPT, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;

        if !status.is_success() {
            warn!("Auth endpoint {} answered {}", self.endpoint, status);
            return Err(SessionError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        parse_auth_response(&body)
    }
}

/// Pull `access_token` (and `token_type` when present) out of an auth response body.
pub fn parse_auth_response(body: &str) -> Result<AuthResponse, SessionError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| SessionError::InvalidToken(format!("Auth response is not JSON: {}", e)))?;

    let access_token = value
        .get("access_token")
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
        .ok_or(SessionError::MissingToken)?;

    Ok(AuthResponse {
        access_token: access_token.to_string(),
        token_type: value
            .get("token_type")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}
