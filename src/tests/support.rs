//! In-memory wallet, contract and auth backend used across the test modules.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use ethers::abi::{Abi, Token};
use ethers::types::Address;

use crate::application::services::SessionBridge;
use crate::domain::models::{AuthRequest, AuthResponse, TxReceiptSummary};
use crate::domain::services::{
    AuthGateway, ContractCaller, ContractError, SessionError, WalletError, WalletProvider,
};
use crate::infrastructure::auth::MemoryTokenStore;
use crate::infrastructure::contracts::abis::certificate_management_abi;
use crate::utils::RetryPolicy;

pub const CONTRACT_ADDRESS: &str = "0xd0943D108eDE5d2E91C387ba0d7b30020c5d3aF2";
pub const ACCOUNT_A: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
pub const ACCOUNT_B: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

pub fn address(value: &str) -> Address {
    value.parse().expect("valid test address")
}

pub fn contract_address() -> Address {
    address(CONTRACT_ADDRESS)
}

pub fn fast_retry() -> RetryPolicy {
    RetryPolicy::new(3, Duration::from_millis(1))
}

// ============ WALLET ============

pub struct FakeWallet {
    pub accounts: Mutex<Vec<Address>>,
    pub request_error: Mutex<Option<WalletError>>,
    /// Number of upcoming `get_accounts` calls that fail with a transient RPC error.
    pub flaky_get_accounts: AtomicUsize,
    /// `get_accounts` never completes while set.
    pub hang_get_accounts: AtomicBool,
    pub request_calls: AtomicUsize,
    pub get_calls: AtomicUsize,
    pub bound_to: Mutex<Vec<Address>>,
    pub contract: Arc<FakeContract>,
}

impl FakeWallet {
    pub fn with_accounts(accounts: Vec<Address>) -> Arc<Self> {
        Arc::new(Self {
            accounts: Mutex::new(accounts),
            request_error: Mutex::new(None),
            flaky_get_accounts: AtomicUsize::new(0),
            hang_get_accounts: AtomicBool::new(false),
            request_calls: AtomicUsize::new(0),
            get_calls: AtomicUsize::new(0),
            bound_to: Mutex::new(Vec::new()),
            contract: Arc::new(FakeContract::new()),
        })
    }

    pub fn set_accounts(&self, accounts: Vec<Address>) {
        *self.accounts.lock().unwrap() = accounts;
    }

    pub fn bound_to(&self) -> Vec<Address> {
        self.bound_to.lock().unwrap().clone()
    }
}

#[async_trait]
impl WalletProvider for FakeWallet {
    fn label(&self) -> &str {
        "fake"
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        self.request_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.request_error.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(self.accounts.lock().unwrap().clone())
    }

    async fn get_accounts(&self) -> Result<Vec<Address>, WalletError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if self.hang_get_accounts.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        let flaky = self.flaky_get_accounts.load(Ordering::SeqCst);
        if flaky > 0 {
            self.flaky_get_accounts.store(flaky - 1, Ordering::SeqCst);
            return Err(WalletError::Rpc("connection reset".to_string()));
        }
        Ok(self.accounts.lock().unwrap().clone())
    }

    fn bind(&self, address: Address, _abi: Abi) -> Result<Arc<dyn ContractCaller>, ContractError> {
        self.bound_to.lock().unwrap().push(address);
        *self.contract.address.lock().unwrap() = address;
        Ok(self.contract.clone())
    }
}

// ============ CONTRACT ============

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: String,
    pub args: Vec<Token>,
    pub from: Option<Address>,
}

/// Contract double that checks every call against the bundled ABI.
pub struct FakeContract {
    abi: Abi,
    pub address: Mutex<Address>,
    pub calls: Mutex<Vec<RecordedCall>>,
    pub responses: Mutex<HashMap<String, Token>>,
    pub call_failures: Mutex<VecDeque<ContractError>>,
    pub send_failures: Mutex<VecDeque<ContractError>>,
    pub revert_sends: AtomicBool,
}

impl FakeContract {
    pub fn new() -> Self {
        Self {
            abi: certificate_management_abi().expect("bundled ABI parses"),
            address: Mutex::new(Address::zero()),
            calls: Mutex::new(Vec::new()),
            responses: Mutex::new(HashMap::new()),
            call_failures: Mutex::new(VecDeque::new()),
            send_failures: Mutex::new(VecDeque::new()),
            revert_sends: AtomicBool::new(false),
        }
    }

    pub fn respond(&self, method: &str, token: Token) {
        self.responses.lock().unwrap().insert(method.to_string(), token);
    }

    pub fn fail_calls(&self, errors: Vec<ContractError>) {
        self.call_failures.lock().unwrap().extend(errors);
    }

    pub fn fail_sends(&self, errors: Vec<ContractError>) {
        self.send_failures.lock().unwrap().extend(errors);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, method: &str) -> usize {
        self.calls().iter().filter(|c| c.method == method).count()
    }

    fn check_args(&self, method: &str, args: &[Token]) -> Result<(), ContractError> {
        let function = self
            .abi
            .function(method)
            .map_err(|e| ContractError::AbiError(e.to_string()))?;
        function
            .encode_input(args)
            .map(|_| ())
            .map_err(|e| ContractError::AbiError(format!("{}: {}", method, e)))
    }
}

#[async_trait]
impl ContractCaller for FakeContract {
    fn address(&self) -> Address {
        *self.address.lock().unwrap()
    }

    async fn call(&self, method: &str, args: Vec<Token>) -> Result<Token, ContractError> {
        self.calls.lock().unwrap().push(RecordedCall {
            method: method.to_string(),
            args: args.clone(),
            from: None,
        });
        self.check_args(method, &args)?;

        if let Some(error) = self.call_failures.lock().unwrap().pop_front() {
            return Err(error);
        }

        self.responses
            .lock()
            .unwrap()
            .get(method)
            .cloned()
            .ok_or_else(|| ContractError::ContractCallError(format!("no response for {}", method)))
    }

    async fn send(
        &self,
        method: &str,
        args: Vec<Token>,
        from: Address,
    ) -> Result<TxReceiptSummary, ContractError> {
        let nonce = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(RecordedCall {
                method: method.to_string(),
                args: args.clone(),
                from: Some(from),
            });
            calls.len()
        };
        self.check_args(method, &args)?;

        if let Some(error) = self.send_failures.lock().unwrap().pop_front() {
            return Err(error);
        }

        let transaction_hash = format!("0x{:064x}", nonce);
        if self.revert_sends.load(Ordering::SeqCst) {
            return Err(ContractError::Reverted(format!(
                "{} transaction {} reverted",
                method, transaction_hash
            )));
        }

        Ok(TxReceiptSummary {
            transaction_hash,
            block_number: Some(nonce as u64),
            status: Some(1),
            gas_used: Some("21000".to_string()),
            from: format!("{:?}", from),
        })
    }
}

// ============ AUTH BACKEND ============

pub struct FakeAuth {
    pub requests: Mutex<Vec<AuthRequest>>,
    pub next_token: Mutex<String>,
    pub failure: Mutex<Option<SessionError>>,
    /// Time the backend takes to answer.
    pub latency: Mutex<Duration>,
}

impl FakeAuth {
    pub fn issuing(token: &str) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            next_token: Mutex::new(token.to_string()),
            failure: Mutex::new(None),
            latency: Mutex::new(Duration::ZERO),
        })
    }

    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = latency;
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl AuthGateway for FakeAuth {
    async fn authenticate(&self, request: &AuthRequest) -> Result<AuthResponse, SessionError> {
        self.requests.lock().unwrap().push(request.clone());
        let latency = *self.latency.lock().unwrap();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        if let Some(error) = self.failure.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(AuthResponse {
            access_token: self.next_token.lock().unwrap().clone(),
            token_type: Some("bearer".to_string()),
        })
    }
}

// ============ FIXTURE ============

pub struct Fixture {
    pub wallet: Option<Arc<FakeWallet>>,
    pub auth: Arc<FakeAuth>,
    pub tokens: Arc<MemoryTokenStore>,
}

impl Fixture {
    pub fn new(accounts: Vec<Address>) -> Self {
        Self {
            wallet: Some(FakeWallet::with_accounts(accounts)),
            auth: FakeAuth::issuing("token-1"),
            tokens: Arc::new(MemoryTokenStore::new()),
        }
    }

    pub fn without_wallet() -> Self {
        Self {
            wallet: None,
            auth: FakeAuth::issuing("token-1"),
            tokens: Arc::new(MemoryTokenStore::new()),
        }
    }

    pub fn wallet(&self) -> &Arc<FakeWallet> {
        self.wallet.as_ref().expect("fixture has a wallet")
    }

    pub fn contract(&self) -> &Arc<FakeContract> {
        &self.wallet().contract
    }

    pub fn bridge(&self) -> SessionBridge {
        let provider = self
            .wallet
            .clone()
            .map(|wallet| wallet as Arc<dyn WalletProvider>);

        SessionBridge::new(
            provider,
            contract_address(),
            certificate_management_abi().expect("bundled ABI parses"),
            self.auth.clone(),
            self.tokens.clone(),
        )
        .with_retry_policy(fast_retry())
    }
}

/// Serve `router` on an ephemeral loopback port and return its base URL.
pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// A loopback URL with nothing listening on it.
pub async fn closed_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
