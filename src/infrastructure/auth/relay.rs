use std::time::Duration;

use reqwest::header::ACCEPT;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::domain::services::SessionError;

/// Status and JSON body to hand back to the caller of the relay.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayResponse {
    pub status: u16,
    pub body: Value,
}

impl RelayResponse {
    fn internal_error(status: u16) -> Self {
        Self {
            status,
            body: json!({ "message": "Internal server error" }),
        }
    }
}

/// Same-origin relay in front of the backend auth endpoint. Upstream status
/// and body are passed through unchanged.
#[derive(Clone)]
pub struct AuthRelay {
    client: reqwest::Client,
    upstream: String,
}

impl AuthRelay {
    pub fn new(upstream: impl Into<String>, timeout: Duration) -> Result<Self, SessionError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SessionError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            upstream: upstream.into(),
        })
    }

    pub fn upstream(&self) -> &str {
        &self.upstream
    }

    pub async fn forward(&self, wallet_address: Option<String>) -> RelayResponse {
        let payload = json!({ "wallet_address": wallet_address });

        let response = match self
            .client
            .post(&self.upstream)
            .header(ACCEPT, "application/json")
            .json(&payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!("Relay to {} failed: {}", self.upstream, e);
                return RelayResponse::internal_error(500);
            }
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                error!("Reading relay response from {} failed: {}", self.upstream, e);
                return RelayResponse::internal_error(status.as_u16());
            }
        };

        info!("Relayed auth request to {} -> {}", self.upstream, status);

        if text.trim().is_empty() {
            return if status.is_success() {
                RelayResponse { status: status.as_u16(), body: Value::String(text) }
            } else {
                RelayResponse::internal_error(status.as_u16())
            };
        }

        let body = match serde_json::from_str::<Value>(&text) {
            Ok(value) => value,
            Err(_) => Value::String(text),
        };

        RelayResponse { status: status.as_u16(), body }
    }
}
