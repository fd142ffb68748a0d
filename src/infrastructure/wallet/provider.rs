use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ethers::{
    abi::Abi,
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider, RpcError},
    signers::{LocalWallet, Signer},
    types::Address,
};
use tokio::time::timeout;
use tracing::{debug, info};

use crate::config::WalletSettings;
use crate::domain::services::{ContractCaller, ContractError, WalletError, WalletProvider};
use crate::infrastructure::contracts::EthersContractBinding;

/// EIP-1193 error code for "user rejected the request".
pub const USER_REJECTED_CODE: i64 = 4001;

/// Wallet whose accounts and signing live behind a JSON-RPC endpoint
/// (a node with unlocked accounts, or a wallet exposing eth_requestAccounts).
pub struct RpcWalletProvider {
    provider: Arc<Provider<Http>>,
    rpc_url: String,
    rpc_timeout: Duration,
}

impl RpcWalletProvider {
    pub fn connect(rpc_url: &str, settings: &WalletSettings) -> Result<Self, WalletError> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| WalletError::Rpc(format!("Invalid wallet RPC url {}: {}", rpc_url, e)))?
            .interval(settings.poll_interval);

        Ok(Self {
            provider: Arc::new(provider),
            rpc_url: rpc_url.to_string(),
            rpc_timeout: settings.rpc_timeout,
        })
    }
}

#[async_trait]
impl WalletProvider for RpcWalletProvider {
    fn label(&self) -> &str {
        "rpc"
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        let request = self.provider.request::<_, Vec<Address>>("eth_requestAccounts", ());
        let result = timeout(self.rpc_timeout, request)
            .await
            .map_err(|_| timed_out("eth_requestAccounts", self.rpc_timeout))?;

        match result {
            Ok(accounts) => Ok(accounts),
            Err(e) => {
                if let Some(response) = e.as_error_response() {
                    if response.code == USER_REJECTED_CODE {
                        return Err(WalletError::Rejected(response.message.clone()));
                    }
                }
                // plain nodes do not implement eth_requestAccounts
                debug!(
                    "eth_requestAccounts unavailable on {} ({}); falling back to eth_accounts",
                    self.rpc_url, e
                );
                self.get_accounts().await
            }
        }
    }

    async fn get_accounts(&self) -> Result<Vec<Address>, WalletError> {
        timeout(self.rpc_timeout, self.provider.get_accounts())
            .await
            .map_err(|_| timed_out("eth_accounts", self.rpc_timeout))?
            .map_err(|e| WalletError::Rpc(e.to_string()))
    }

    fn bind(&self, address: Address, abi: Abi) -> Result<Arc<dyn ContractCaller>, ContractError> {
        Ok(Arc::new(EthersContractBinding::new(
            address,
            abi,
            self.provider.clone(),
            self.rpc_timeout,
        )))
    }
}

/// Single-account wallet signing locally with a private key.
pub struct LocalWalletProvider {
    client: Arc<SignerMiddleware<Provider<Http>, LocalWallet>>,
    address: Address,
    rpc_timeout: Duration,
}

impl LocalWalletProvider {
    pub fn new(rpc_url: &str, private_key: &str, settings: &WalletSettings) -> Result<Self, WalletError> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| WalletError::Rpc(format!("Invalid wallet RPC url {}: {}", rpc_url, e)))?
            .interval(settings.poll_interval);

        let wallet = private_key
            .parse::<LocalWallet>()
            .map_err(|e| WalletError::InvalidSigner { reason: e.to_string() })?
            .with_chain_id(settings.chain_id);
        let address = wallet.address();

        Ok(Self {
            client: Arc::new(SignerMiddleware::new(provider, wallet)),
            address,
            rpc_timeout: settings.rpc_timeout,
        })
    }
}

#[async_trait]
impl WalletProvider for LocalWalletProvider {
    fn label(&self) -> &str {
        "local-signer"
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        Ok(vec![self.address])
    }

    async fn get_accounts(&self) -> Result<Vec<Address>, WalletError> {
        Ok(vec![self.address])
    }

    fn bind(&self, address: Address, abi: Abi) -> Result<Arc<dyn ContractCaller>, ContractError> {
        Ok(Arc::new(EthersContractBinding::new(
            address,
            abi,
            self.client.clone(),
            self.rpc_timeout,
        )))
    }
}

fn timed_out(method: &str, limit: Duration) -> WalletError {
    WalletError::Rpc(format!("{} timed out after {:?}", method, limit))
}

/// Pick the wallet provider for this environment. `None` means no wallet is
/// available, the equivalent of a browser without an injected provider.
pub fn detect_provider(settings: &WalletSettings) -> Result<Option<Arc<dyn WalletProvider>>, WalletError> {
    let Some(rpc_url) = settings.rpc_url.as_deref() else {
        info!("No wallet provider configured (WALLET_RPC_URL unset)");
        return Ok(None);
    };

    let provider: Arc<dyn WalletProvider> = match settings.private_key.as_deref() {
        Some(key) => Arc::new(LocalWalletProvider::new(rpc_url, key, settings)?),
        None => Arc::new(RpcWalletProvider::connect(rpc_url, settings)?),
    };

    info!("Using {} wallet provider at {}", provider.label(), rpc_url);
    Ok(Some(provider))
}
