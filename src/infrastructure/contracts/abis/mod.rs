use std::fs;
use std::path::Path;

use ethers::abi::Abi;
use serde_json::Value;

use crate::domain::services::ContractError;

const CERTIFICATE_MANAGEMENT_ARTIFACT: &str =
    include_str!("../../../../abis/CertificateManagement.json");

/// The CertificateManagement interface bundled with the crate.
pub fn certificate_management_abi() -> Result<Abi, ContractError> {
    parse_abi(CERTIFICATE_MANAGEMENT_ARTIFACT, "CertificateManagement.json")
}

/// Load an interface description from disk. Accepts a build artifact with an
/// `abi` field (truffle/hardhat) or a bare ABI array.
pub fn load_abi(path: impl AsRef<Path>) -> Result<Abi, ContractError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        ContractError::AbiError(format!("Failed to read ABI file {}: {}", path.display(), e))
    })?;

    parse_abi(&content, &path.display().to_string())
}

pub fn parse_abi(content: &str, source: &str) -> Result<Abi, ContractError> {
    let value: Value = serde_json::from_str(content)
        .map_err(|e| ContractError::AbiError(format!("Failed to parse ABI file {}: {}", source, e)))?;

    let abi_value = match value {
        Value::Object(mut artifact) => artifact.remove("abi").ok_or_else(|| {
            ContractError::AbiError(format!("Artifact {} has no abi field", source))
        })?,
        array @ Value::Array(_) => array,
        _ => {
            return Err(ContractError::AbiError(format!(
                "ABI file {} must be an artifact object or an ABI array",
                source
            )))
        }
    };

    serde_json::from_value(abi_value)
        .map_err(|e| ContractError::AbiError(format!("Invalid ABI in {}: {}", source, e)))
}
