use serde::{Deserialize, Serialize};
use ethers::types::Address;

/// Validation error types for API requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, Vec<ValidationError>>;

pub const MAX_CERTIFICATE_NAME_LEN: usize = 256;
pub const MAX_ROLE_NAME_LEN: usize = 64;

/// Validation utilities for API requests
pub struct Validator;

impl Validator {
    /// Validate Ethereum address format
    pub fn validate_ethereum_address(address: &str, field_name: &str) -> Result<(), ValidationError> {
        if address.is_empty() {
            return Err(ValidationError {
                field: field_name.to_string(),
                message: "Address cannot be empty".to_string(),
            });
        }

        let clean_address = address.strip_prefix("0x").unwrap_or(address);

        if clean_address.len() != 40 {
            return Err(ValidationError {
                field: field_name.to_string(),
                message: "Address must be 40 characters long (excluding 0x prefix)".to_string(),
            });
        }

        if !clean_address.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ValidationError {
                field: field_name.to_string(),
                message: "Address must contain only hexadecimal characters".to_string(),
            });
        }

        if address.parse::<Address>().is_err() {
            return Err(ValidationError {
                field: field_name.to_string(),
                message: "Invalid Ethereum address format".to_string(),
            });
        }

        Ok(())
    }

    /// Validate string is not empty and within length limits
    pub fn validate_string(value: &str, field_name: &str, min_length: usize, max_length: usize) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError {
                field: field_name.to_string(),
                message: format!("{} cannot be empty", field_name),
            });
        }

        if value.len() < min_length {
            return Err(ValidationError {
                field: field_name.to_string(),
                message: format!("{} must be at least {} characters long", field_name, min_length),
            });
        }

        if value.len() > max_length {
            return Err(ValidationError {
                field: field_name.to_string(),
                message: format!("{} cannot exceed {} characters", field_name, max_length),
            });
        }

        Ok(())
    }

    pub fn validate_certificate_name(name: &str, field_name: &str) -> Result<(), ValidationError> {
        Self::validate_string(name, field_name, 1, MAX_CERTIFICATE_NAME_LEN)
    }

    pub fn validate_role_name(role_name: &str, field_name: &str) -> Result<(), ValidationError> {
        Self::validate_string(role_name, field_name, 1, MAX_ROLE_NAME_LEN)
    }

    /// Validate that a validity window is non-empty (`start < end`)
    pub fn validate_time_window(start_time: u64, end_time: u64, field_name: &str) -> Result<(), ValidationError> {
        if start_time >= end_time {
            return Err(ValidationError {
                field: field_name.to_string(),
                message: format!(
                    "start_time ({}) must be earlier than end_time ({})",
                    start_time, end_time
                ),
            });
        }
        Ok(())
    }

    /// Combine multiple validation results
    pub fn combine_results(results: Vec<Result<(), ValidationError>>) -> ValidationResult<()> {
        let errors: Vec<ValidationError> = results
            .into_iter()
            .filter_map(|result| result.err())
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Trait for validating API request types
pub trait Validate {
    fn validate(&self) -> ValidationResult<()>;
}
