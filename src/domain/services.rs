use std::sync::Arc;

use async_trait::async_trait;
use ethers::abi::{Abi, Token};
use ethers::types::Address;
use thiserror::Error;

use crate::domain::models::{AuthRequest, AuthResponse, TxReceiptSummary};

// ============ ERROR TYPES ============

/// Failures reported by the wallet provider while discovering accounts.
#[derive(Debug, Clone, Error)]
pub enum WalletError {
    #[error("Account access rejected: {0}")]
    Rejected(String),
    #[error("Wallet RPC error: {0}")]
    Rpc(String),
    #[error("Wallet returned no accounts")]
    NoAccounts,
    #[error("Invalid signer: {reason}")]
    InvalidSigner { reason: String },
}

#[derive(Debug, Clone, Error)]
pub enum ContractError {
    #[error("RPC error: {0}")]
    RpcError(String),
    #[error("Contract call error: {0}")]
    ContractCallError(String),
    #[error("Transaction error: {0}")]
    TransactionError(String),
    #[error("Execution reverted: {0}")]
    Reverted(String),
    #[error("ABI error: {0}")]
    AbiError(String),
    #[error("Decoding error: {0}")]
    DecodingError(String),
}

impl From<ethers::contract::AbiError> for ContractError {
    fn from(err: ethers::contract::AbiError) -> Self {
        ContractError::AbiError(err.to_string())
    }
}

/// Failures of the wallet-address-for-token exchange.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    #[error("Auth endpoint unreachable: {0}")]
    Transport(String),
    #[error("Auth endpoint returned {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("Auth response did not contain an access_token")]
    MissingToken,
    #[error("Invalid session token: {0}")]
    InvalidToken(String),
}

#[derive(Debug, Clone, Error)]
pub enum BridgeError {
    #[error("No wallet provider available")]
    ProviderUnavailable,
    #[error("No wallet account resolved; initialize the session first")]
    AccountNotResolved,
    #[error("Contract not bound; bind the contract first")]
    ContractNotBound,
    #[error(transparent)]
    Wallet(#[from] WalletError),
    #[error(transparent)]
    Contract(#[from] ContractError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl BridgeError {
    /// Transport-level failures that may succeed when repeated.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            BridgeError::Wallet(WalletError::Rpc(_))
                | BridgeError::Contract(ContractError::RpcError(_))
                | BridgeError::Session(SessionError::Transport(_))
        )
    }
}

pub type BridgeResult<T> = Result<T, BridgeError>;

// ============ EXTERNAL COLLABORATORS ============

/// Account discovery and signing capability, the Rust side of an injected
/// browser wallet.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    fn label(&self) -> &str;

    /// Ask the wallet for account access. May prompt the user.
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError>;

    async fn get_accounts(&self) -> Result<Vec<Address>, WalletError>;

    /// Build a contract client whose write path signs through this provider.
    fn bind(&self, address: Address, abi: Abi) -> Result<Arc<dyn ContractCaller>, ContractError>;
}

/// A contract client bound to one address and interface description.
#[async_trait]
pub trait ContractCaller: Send + Sync {
    fn address(&self) -> Address;

    async fn call(&self, method: &str, args: Vec<Token>) -> Result<Token, ContractError>;

    /// Submit a transaction from `from` and wait for inclusion.
    async fn send(
        &self,
        method: &str,
        args: Vec<Token>,
        from: Address,
    ) -> Result<TxReceiptSummary, ContractError>;
}

#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn authenticate(&self, request: &AuthRequest) -> Result<AuthResponse, SessionError>;
}

/// Key/value storage for session credentials (cookie jar equivalent).
pub trait TokenStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
    fn remove(&self, key: &str);
}
