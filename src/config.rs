use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use ethers::types::Address;
use thiserror::Error;

use crate::utils::RetryPolicy;

pub const DEFAULT_AUTH_URL: &str = "http://localhost:8000/api/v1/users/auth";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct ContractSettings {
    pub address: Address,
    /// Build artifact to load the interface from; the bundled ABI is used when unset.
    pub abi_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct WalletSettings {
    /// JSON-RPC endpoint of the wallet. Unset means no wallet is available.
    pub rpc_url: Option<String>,
    pub private_key: Option<String>,
    pub chain_id: u64,
    pub poll_interval: Duration,
    /// Bound on account queries and eth_call.
    pub rpc_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub auth_url: String,
    pub relay_upstream: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub contract: ContractSettings,
    pub wallet: WalletSettings,
    pub auth: AuthSettings,
    pub retry: RetryPolicy,
    /// Interval of the account-change watcher; `ACCOUNT_POLL_SECS=0` disables it.
    pub account_poll_interval: Option<Duration>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        // No default: deployments disagree on the address, it must come from the environment.
        let address = get("CONTRACT_ADDRESS")
            .ok_or(ConfigError::Missing("CONTRACT_ADDRESS"))?
            .parse::<Address>()
            .map_err(|e| ConfigError::Invalid {
                key: "CONTRACT_ADDRESS",
                reason: e.to_string(),
            })?;

        let auth_url = get("AUTH_URL").unwrap_or_else(|| DEFAULT_AUTH_URL.to_string());
        let relay_upstream = get("RELAY_UPSTREAM_URL").unwrap_or_else(|| auth_url.clone());

        let allowed_origins = get("ALLOWED_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect::<Vec<_>>();

        // the session cookie needs credentialed CORS, which browsers refuse with `*`
        if allowed_origins.iter().any(|origin| origin == "*") {
            return Err(ConfigError::Invalid {
                key: "ALLOWED_ORIGINS",
                reason: "wildcard origin cannot be used with credentialed requests; list origins explicitly"
                    .to_string(),
            });
        }

        let rpc_timeout = Duration::from_secs(parse_or(get("RPC_TIMEOUT_SECS"), "RPC_TIMEOUT_SECS", 30)?);
        let account_poll_secs: u64 = parse_or(get("ACCOUNT_POLL_SECS"), "ACCOUNT_POLL_SECS", 5)?;

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or(get("PORT"), "PORT", 3000)?,
            allowed_origins,
            contract: ContractSettings {
                address,
                abi_path: get("CONTRACT_ABI_PATH").map(PathBuf::from),
            },
            wallet: WalletSettings {
                rpc_url: get("WALLET_RPC_URL"),
                private_key: get("WALLET_PRIVATE_KEY"),
                chain_id: parse_or(get("CHAIN_ID"), "CHAIN_ID", 31337)?,
                poll_interval: Duration::from_millis(parse_or(get("TX_POLL_MS"), "TX_POLL_MS", 1000)?),
                rpc_timeout,
            },
            auth: AuthSettings {
                auth_url,
                relay_upstream,
                timeout: rpc_timeout,
            },
            retry: RetryPolicy::new(
                parse_or(get("RETRY_MAX_ATTEMPTS"), "RETRY_MAX_ATTEMPTS", 3)?,
                Duration::from_millis(parse_or(get("RETRY_BASE_DELAY_MS"), "RETRY_BASE_DELAY_MS", 200)?),
            ),
            account_poll_interval: (account_poll_secs > 0).then(|| Duration::from_secs(account_poll_secs)),
        })
    }
}

fn parse_or<T>(value: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw.parse::<T>().map_err(|e| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
