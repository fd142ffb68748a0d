use std::collections::HashMap;
use std::time::Duration;

use crate::config::{AppConfig, ConfigError, DEFAULT_AUTH_URL};
use crate::tests::support::*;

fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    AppConfig::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn test_contract_address_is_required() {
    let result = config_from(&[]);
    assert!(matches!(result, Err(ConfigError::Missing("CONTRACT_ADDRESS"))));

    // blank counts as unset
    let result = config_from(&[("CONTRACT_ADDRESS", "   ")]);
    assert!(matches!(result, Err(ConfigError::Missing("CONTRACT_ADDRESS"))));
}

#[test]
fn test_malformed_contract_address_is_rejected() {
    let result = config_from(&[("CONTRACT_ADDRESS", "0x1234")]);
    assert!(matches!(result, Err(ConfigError::Invalid { key: "CONTRACT_ADDRESS", .. })));
}

#[test]
fn test_defaults() {
    let config = config_from(&[("CONTRACT_ADDRESS", CONTRACT_ADDRESS)]).unwrap();

    assert_eq!(config.contract.address, contract_address());
    assert_eq!(config.contract.abi_path, None);
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 3000);
    assert_eq!(config.allowed_origins, vec!["http://localhost:3000".to_string()]);
    assert_eq!(config.wallet.rpc_url, None);
    assert_eq!(config.wallet.chain_id, 31337);
    assert_eq!(config.auth.auth_url, DEFAULT_AUTH_URL);
    assert_eq!(config.auth.relay_upstream, DEFAULT_AUTH_URL);
    assert_eq!(config.retry.max_attempts, 3);
    assert_eq!(config.retry.base_delay, Duration::from_millis(200));
    assert_eq!(config.account_poll_interval, Some(Duration::from_secs(5)));
}

#[test]
fn test_account_watcher_can_be_disabled() {
    let config = config_from(&[("CONTRACT_ADDRESS", CONTRACT_ADDRESS), ("ACCOUNT_POLL_SECS", "0")]).unwrap();
    assert_eq!(config.account_poll_interval, None);
}

#[test]
fn test_overrides() {
    let config = config_from(&[
        ("CONTRACT_ADDRESS", CONTRACT_ADDRESS),
        ("CONTRACT_ABI_PATH", "build/contracts/CertificateManagement.json"),
        ("WALLET_RPC_URL", "http://localhost:8545"),
        ("CHAIN_ID", "1337"),
        ("AUTH_URL", "http://backend:8000/api/v1/users/auth"),
        ("PORT", "8080"),
        ("ALLOWED_ORIGINS", "http://localhost:3000, http://127.0.0.1:3000,"),
        ("RETRY_MAX_ATTEMPTS", "5"),
        ("RETRY_BASE_DELAY_MS", "50"),
        ("ACCOUNT_POLL_SECS", "2"),
        ("RPC_TIMEOUT_SECS", "10"),
    ])
    .unwrap();

    assert_eq!(config.wallet.rpc_url.as_deref(), Some("http://localhost:8545"));
    assert_eq!(config.wallet.chain_id, 1337);
    assert_eq!(config.port, 8080);
    assert_eq!(
        config.allowed_origins,
        vec!["http://localhost:3000".to_string(), "http://127.0.0.1:3000".to_string()]
    );
    // the relay follows AUTH_URL unless given its own upstream
    assert_eq!(config.auth.relay_upstream, "http://backend:8000/api/v1/users/auth");
    assert_eq!(config.auth.timeout, Duration::from_secs(10));
    assert_eq!(config.retry.max_attempts, 5);
    assert_eq!(config.account_poll_interval, Some(Duration::from_secs(2)));
    assert!(config.contract.abi_path.is_some());
}

#[test]
fn test_invalid_number_is_reported_with_key() {
    let result = config_from(&[("CONTRACT_ADDRESS", CONTRACT_ADDRESS), ("PORT", "eighty")]);
    assert!(matches!(result, Err(ConfigError::Invalid { key: "PORT", .. })));
}

#[test]
fn test_wildcard_origin_is_rejected() {
    let result = config_from(&[
        ("CONTRACT_ADDRESS", CONTRACT_ADDRESS),
        ("ALLOWED_ORIGINS", "http://localhost:3000, *"),
    ]);
    assert!(matches!(result, Err(ConfigError::Invalid { key: "ALLOWED_ORIGINS", .. })));
}
