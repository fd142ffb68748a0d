use serde::{Deserialize, Serialize};

/// Body of the same-origin auth relay. The address is forwarded as given.
#[derive(Debug, Deserialize)]
pub struct ProxyAuthRequest {
    #[serde(default)]
    pub wallet_address: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConnectResponse {
    pub account: String,
    pub contract_address: String,
    pub provider: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SyncResponse {
    pub previous: Option<String>,
    pub current: Option<String>,
    pub changed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExchangeResponse {
    pub access_token: String,
    /// True when an existing token was honoured and no request went upstream.
    pub reused: bool,
}
