use std::sync::Arc;

use chrono::Utc;
use ethers::abi::{Abi, Token};
use ethers::types::{Address, U256};
use ethers::utils::to_checksum;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::domain::models::{
    AccountChange, AuthRequest, CertificateRecord, CreateCertificateRequest, SessionExchange,
    SessionSnapshot, SessionToken, TxReceiptSummary, ACCESS_TOKEN_KEY,
};
use crate::domain::services::{
    AuthGateway, BridgeError, BridgeResult, ContractCaller, ContractError, TokenStore, WalletError,
    WalletProvider,
};
use crate::infrastructure::contracts::CertificateMethod;
use crate::utils::{retry, RetryPolicy};

/// One wallet session: the provider, the active account, the contract binding
/// built for it and the backend session token.
pub struct SessionBridge {
    provider: Option<Arc<dyn WalletProvider>>,
    contract_address: Address,
    abi: Abi,
    auth: Arc<dyn AuthGateway>,
    tokens: Arc<dyn TokenStore>,
    retry_policy: RetryPolicy,

    current_account: Option<Address>,
    binding: Option<Arc<dyn ContractCaller>>,
    /// Held across check-then-exchange so concurrent callers share one token.
    exchange_lock: Mutex<()>,
}

impl SessionBridge {
    pub fn new(
        provider: Option<Arc<dyn WalletProvider>>,
        contract_address: Address,
        abi: Abi,
        auth: Arc<dyn AuthGateway>,
        tokens: Arc<dyn TokenStore>,
    ) -> Self {
        Self {
            provider,
            contract_address,
            abi,
            auth,
            tokens,
            retry_policy: RetryPolicy::default(),
            current_account: None,
            binding: None,
            exchange_lock: Mutex::new(()),
        }
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn current_account(&self) -> Option<Address> {
        self.current_account
    }

    pub fn contract_address(&self) -> Address {
        self.contract_address
    }

    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            account: self.current_account.map(|a| to_checksum(&a, None)),
            provider: self.provider.as_ref().map(|p| p.label().to_string()),
            contract_address: to_checksum(&self.contract_address, None),
            contract_bound: self.binding.is_some(),
            session_token_present: self.tokens.get(ACCESS_TOKEN_KEY).is_some(),
        }
    }

    // ============ SESSION LIFECYCLE ============

    /// Request account access and adopt the first account returned.
    /// On failure the session keeps its previous (placeholder) account.
    pub async fn initialize(&mut self) -> BridgeResult<Address> {
        let Some(provider) = self.provider.clone() else {
            warn!("No wallet provider detected; session stays disconnected");
            return Err(BridgeError::ProviderUnavailable);
        };

        let result = retry(&self.retry_policy, "eth_requestAccounts", || {
            let provider = provider.clone();
            async move {
                let accounts = provider.request_accounts().await?;
                accounts.first().copied().ok_or(BridgeError::Wallet(WalletError::NoAccounts))
            }
        })
        .await;

        match result {
            Ok(account) => {
                info!("Wallet account connected: {}", to_checksum(&account, None));
                self.current_account = Some(account);
                Ok(account)
            }
            Err(e) => {
                error!("Error requesting accounts: {}", e);
                Err(e)
            }
        }
    }

    /// Construct the contract binding. Only valid once an account is known;
    /// the binding is built at most once per session.
    pub async fn bind_contract(&mut self) -> BridgeResult<Arc<dyn ContractCaller>> {
        let account = self.current_account.ok_or(BridgeError::AccountNotResolved)?;
        let provider = self.provider.clone().ok_or(BridgeError::ProviderUnavailable)?;

        if let Some(binding) = &self.binding {
            return Ok(binding.clone());
        }

        match fetch_accounts(provider.clone(), self.retry_policy).await {
            Ok(accounts) => {
                if let Some(first) = accounts.first().copied() {
                    if first != account {
                        info!(
                            "Provider reports {} as active account, replacing {}",
                            to_checksum(&first, None),
                            to_checksum(&account, None)
                        );
                        self.current_account = Some(first);
                    }
                }
            }
            Err(e) => warn!("Could not re-read accounts before binding: {}", e),
        }

        let binding = provider
            .bind(self.contract_address, self.abi.clone())
            .map_err(|e| {
                error!("Failed to bind contract {:?}: {}", self.contract_address, e);
                BridgeError::from(e)
            })?;

        info!("Contract bound at {}", to_checksum(&self.contract_address, None));
        self.binding = Some(binding.clone());
        Ok(binding)
    }

    /// `initialize` followed by `bind_contract`, the page-load sequence.
    pub async fn connect(&mut self) -> BridgeResult<Address> {
        self.initialize().await?;
        self.bind_contract().await?;
        self.current_account.ok_or(BridgeError::AccountNotResolved)
    }

    /// Re-read the provider's active account. A switch replaces the session
    /// account and drops the token issued for the previous one.
    pub async fn sync_account(&mut self) -> BridgeResult<AccountChange> {
        let provider = self.provider.clone().ok_or(BridgeError::ProviderUnavailable)?;
        let accounts = fetch_accounts(provider, self.retry_policy).await?;
        Ok(self.apply_accounts(&accounts))
    }

    /// `sync_account` for a shared session. The provider is queried with no
    /// lock held; the write lock is taken only to apply the result.
    pub async fn sync_shared(bridge: &RwLock<SessionBridge>) -> BridgeResult<AccountChange> {
        let (provider, policy) = {
            let bridge = bridge.read().await;
            let provider = bridge.provider.clone().ok_or(BridgeError::ProviderUnavailable)?;
            (provider, bridge.retry_policy)
        };

        let accounts = fetch_accounts(provider, policy).await?;
        Ok(bridge.write().await.apply_accounts(&accounts))
    }

    fn apply_accounts(&mut self, accounts: &[Address]) -> AccountChange {
        let change = AccountChange {
            previous: self.current_account,
            current: accounts.first().copied(),
        };

        if change.changed() {
            info!(
                "Wallet account changed from {:?} to {:?}; clearing session token",
                change.previous, change.current
            );
            self.current_account = change.current;
            self.tokens.remove(ACCESS_TOKEN_KEY);
        }

        change
    }

    // ============ CONTRACT CALLS ============

    fn binding(&self) -> BridgeResult<&Arc<dyn ContractCaller>> {
        self.binding.as_ref().ok_or(BridgeError::ContractNotBound)
    }

    /// Non-mutating call, retried on transient RPC failures.
    pub async fn read_method(&self, name: &str, args: Vec<Token>) -> BridgeResult<Token> {
        let binding = self.binding()?.clone();

        let result = retry(&self.retry_policy, name, || {
            let binding = binding.clone();
            let args = args.clone();
            async move { binding.call(name, args).await.map_err(BridgeError::from) }
        })
        .await;

        if let Err(e) = &result {
            error!("Call to {} failed: {}", name, e);
        }
        result
    }

    /// State-changing call from `sender`, awaited until inclusion. Never retried.
    pub async fn write_method(
        &self,
        name: &str,
        args: Vec<Token>,
        sender: Address,
    ) -> BridgeResult<TxReceiptSummary> {
        let binding = self.binding()?;

        match binding.send(name, args, sender).await {
            Ok(receipt) => {
                info!("Transaction successful: {} in {}", name, receipt.transaction_hash);
                Ok(receipt)
            }
            Err(e) => {
                error!("Transaction error in {}: {}", name, e);
                Err(e.into())
            }
        }
    }

    fn sender(&self) -> BridgeResult<Address> {
        self.current_account.ok_or(BridgeError::AccountNotResolved)
    }

    pub async fn get_certificate(&self, id: u64) -> BridgeResult<CertificateRecord> {
        let token = self
            .read_method(CertificateMethod::GetCertificate.name(), vec![Token::Uint(U256::from(id))])
            .await?;
        Ok(CertificateRecord::from_token(token)?)
    }

    pub async fn create_certificate(&self, request: CreateCertificateRequest) -> BridgeResult<TxReceiptSummary> {
        let sender = self.sender()?;
        self.write_method(CertificateMethod::CreateCertificate.name(), request.into_tokens(), sender)
            .await
    }

    /// Certificate owned by the session account, valid from now for one year.
    pub async fn create_certificate_for_year(&self, name: &str) -> BridgeResult<TxReceiptSummary> {
        let owner = self.sender()?;
        let request = CreateCertificateRequest::valid_for_one_year(owner, name, Utc::now());
        self.create_certificate(request).await
    }

    pub async fn get_temp_count(&self) -> BridgeResult<U256> {
        let token = self.read_method(CertificateMethod::GetTempCount.name(), vec![]).await?;
        token.into_uint().ok_or_else(|| {
            BridgeError::Contract(ContractError::DecodingError("getTempCount did not return a uint".to_string()))
        })
    }

    pub async fn set_temp_count(&self) -> BridgeResult<TxReceiptSummary> {
        let sender = self.sender()?;
        self.write_method(CertificateMethod::SetTempCount.name(), vec![], sender).await
    }

    pub async fn has_role(&self, account: Address) -> BridgeResult<bool> {
        let token = self
            .read_method(CertificateMethod::HasRole.name(), vec![Token::Address(account)])
            .await?;
        token.into_bool().ok_or_else(|| {
            BridgeError::Contract(ContractError::DecodingError("hasRole did not return a bool".to_string()))
        })
    }

    pub async fn update_role(&self, account: Address, role_name: &str) -> BridgeResult<TxReceiptSummary> {
        let sender = self.sender()?;
        self.write_method(
            CertificateMethod::UpdateRole.name(),
            vec![Token::Address(account), Token::String(role_name.to_string())],
            sender,
        )
        .await
    }

    // ============ BACKEND SESSION ============

    pub fn stored_token(&self) -> Option<SessionToken> {
        self.tokens.get(ACCESS_TOKEN_KEY).map(SessionToken::new)
    }

    /// Exchange `account` for a backend session token. A token already held
    /// (and not expired) is returned without contacting the backend.
    pub async fn exchange_session(&self, account: Address) -> BridgeResult<SessionExchange> {
        let _exchange = self.exchange_lock.lock().await;

        if let Some(existing) = self.stored_token() {
            if existing.is_expired_at(Utc::now()) {
                info!("Stored session token has expired; exchanging again");
                self.tokens.remove(ACCESS_TOKEN_KEY);
            } else {
                debug!("Session token already present; skipping exchange");
                return Ok(SessionExchange { token: existing, reused: true });
            }
        }

        let request = AuthRequest::for_address(account);
        let response = self.auth.authenticate(&request).await.map_err(|e| {
            error!("Session exchange for {} failed: {}", request.wallet_address, e);
            BridgeError::from(e)
        })?;

        info!("Session token obtained for {}", request.wallet_address);
        self.tokens.set(ACCESS_TOKEN_KEY, response.access_token.clone());
        Ok(SessionExchange {
            token: SessionToken::new(response.access_token),
            reused: false,
        })
    }

    pub async fn exchange_current_session(&self) -> BridgeResult<SessionExchange> {
        let account = self.sender()?;
        self.exchange_session(account).await
    }
}

async fn fetch_accounts(provider: Arc<dyn WalletProvider>, policy: RetryPolicy) -> BridgeResult<Vec<Address>> {
    retry(&policy, "eth_accounts", || {
        let provider = provider.clone();
        async move { provider.get_accounts().await.map_err(BridgeError::from) }
    })
    .await
}
