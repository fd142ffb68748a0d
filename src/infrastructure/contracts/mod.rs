// Contract integration module
// Binding of the CertificateManagement contract behind the ContractCaller seam

pub mod abis;
pub mod client;
pub mod types;

pub use client::EthersContractBinding;
pub use types::*;
