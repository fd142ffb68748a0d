pub mod provider;

pub use provider::{detect_provider, LocalWalletProvider, RpcWalletProvider, USER_REJECTED_CODE};
