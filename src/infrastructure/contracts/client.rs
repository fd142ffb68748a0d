use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ethers::{
    abi::{Abi, Token},
    contract::{Contract, ContractError as EthersContractError},
    providers::Middleware,
    types::{Address, TransactionReceipt, U64},
};
use tokio::time::timeout;
use tracing::{debug, info};

use crate::domain::models::TxReceiptSummary;
use crate::domain::services::{ContractCaller, ContractError};

/// Contract binding backed by an ethers client. `M` is the plain provider for
/// node-managed accounts or a `SignerMiddleware` for a local key.
/// `call_timeout` bounds eth_call; sends wait for inclusion and are not bounded.
pub struct EthersContractBinding<M> {
    contract: Contract<M>,
    call_timeout: Duration,
}

impl<M: Middleware + 'static> EthersContractBinding<M> {
    pub fn new(address: Address, abi: Abi, client: Arc<M>, call_timeout: Duration) -> Self {
        Self {
            contract: Contract::new(address, abi, client),
            call_timeout,
        }
    }
}

#[async_trait]
impl<M: Middleware + 'static> ContractCaller for EthersContractBinding<M> {
    fn address(&self) -> Address {
        self.contract.address()
    }

    async fn call(&self, method: &str, args: Vec<Token>) -> Result<Token, ContractError> {
        let call = self.contract.method::<_, Token>(method, Token::Tuple(args))?;

        debug!("eth_call {} on {:?}", method, self.contract.address());
        timeout(self.call_timeout, call.call())
            .await
            .map_err(|_| ContractError::RpcError(format!("eth_call {} timed out after {:?}", method, self.call_timeout)))?
            .map_err(classify_error)
    }

    async fn send(
        &self,
        method: &str,
        args: Vec<Token>,
        from: Address,
    ) -> Result<TxReceiptSummary, ContractError> {
        let call = self
            .contract
            .method::<_, Token>(method, Token::Tuple(args))?
            .from(from);

        // send the transaction
        let pending_tx = call.send().await.map_err(classify_error)?;
        let tx_hash = *pending_tx;
        info!("Submitted {} as {:?}, waiting for inclusion", method, tx_hash);

        // wait for the transaction to be mined
        let receipt = pending_tx
            .await
            .map_err(|e| ContractError::TransactionError(e.to_string()))?
            .ok_or_else(|| {
                ContractError::TransactionError(format!("Transaction {:?} dropped before inclusion", tx_hash))
            })?;

        let summary = TxReceiptSummary::from(&receipt);
        if receipt.status == Some(U64::zero()) {
            return Err(ContractError::Reverted(format!(
                "{} transaction {} reverted",
                method, summary.transaction_hash
            )));
        }

        Ok(summary)
    }
}

impl From<&TransactionReceipt> for TxReceiptSummary {
    fn from(receipt: &TransactionReceipt) -> Self {
        Self {
            transaction_hash: format!("{:?}", receipt.transaction_hash),
            block_number: receipt.block_number.map(|n| n.as_u64()),
            status: receipt.status.map(|s| s.as_u64()),
            gas_used: receipt.gas_used.map(|g| g.to_string()),
            from: format!("{:?}", receipt.from),
        }
    }
}

fn classify_error<M: Middleware>(err: EthersContractError<M>) -> ContractError {
    if err.is_revert() {
        return ContractError::Reverted(err.to_string());
    }

    match err {
        EthersContractError::ProviderError { e } => ContractError::RpcError(e.to_string()),
        EthersContractError::MiddlewareError { e } => ContractError::RpcError(e.to_string()),
        EthersContractError::DecodingError(e) => ContractError::DecodingError(e.to_string()),
        EthersContractError::DetokenizationError(e) => ContractError::DecodingError(e.to_string()),
        EthersContractError::AbiError(e) => ContractError::AbiError(e.to_string()),
        other => ContractError::ContractCallError(other.to_string()),
    }
}
