use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::validation::ValidationError;
use crate::domain::services::{BridgeError, ContractError, SessionError, WalletError};

/// API error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub details: Option<serde_json::Value>,
    pub validation_errors: Option<Vec<ValidationError>>,
}

/// API error types with corresponding HTTP status codes
#[derive(Debug)]
pub enum ApiError {
    // Client errors (4xx)
    BadRequest(String),
    ValidationError(Vec<ValidationError>),

    // Server errors (5xx)
    InternalServerError(String),

    // Session bridge errors
    Bridge(BridgeError),
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Bridge(bridge_error) => bridge_status(bridge_error),
        }
    }

    /// Get the error code string for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError(_) => "VALIDATION_ERROR",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::Bridge(BridgeError::ProviderUnavailable) => "PROVIDER_UNAVAILABLE",
            ApiError::Bridge(BridgeError::AccountNotResolved) => "ACCOUNT_NOT_RESOLVED",
            ApiError::Bridge(BridgeError::ContractNotBound) => "CONTRACT_NOT_BOUND",
            ApiError::Bridge(BridgeError::Wallet(_)) => "WALLET_ERROR",
            ApiError::Bridge(BridgeError::Contract(ContractError::Reverted(_))) => "CONTRACT_REVERTED",
            ApiError::Bridge(BridgeError::Contract(_)) => "CONTRACT_ERROR",
            ApiError::Bridge(BridgeError::Session(_)) => "SESSION_ERROR",
        }
    }

    /// Get the error message
    pub fn message(&self) -> String {
        match self {
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::ValidationError(errors) => {
                if errors.len() == 1 {
                    format!("Validation failed: {}", errors[0].message)
                } else {
                    format!("Validation failed with {} errors", errors.len())
                }
            },
            ApiError::InternalServerError(msg) => msg.clone(),
            ApiError::Bridge(bridge_error) => bridge_error.to_string(),
        }
    }

    /// Convert validation errors to API error
    pub fn from_validation_errors(errors: Vec<ValidationError>) -> Self {
        ApiError::ValidationError(errors)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }
}

fn bridge_status(error: &BridgeError) -> StatusCode {
    match error {
        BridgeError::ProviderUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        BridgeError::AccountNotResolved | BridgeError::ContractNotBound => StatusCode::CONFLICT,
        BridgeError::Wallet(WalletError::Rejected(_)) => StatusCode::FORBIDDEN,
        BridgeError::Wallet(WalletError::InvalidSigner { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
        BridgeError::Wallet(_) => StatusCode::BAD_GATEWAY,
        BridgeError::Contract(ContractError::Reverted(_)) => StatusCode::UNPROCESSABLE_ENTITY,
        BridgeError::Contract(ContractError::AbiError(_)) => StatusCode::BAD_REQUEST,
        BridgeError::Contract(_) => StatusCode::BAD_GATEWAY,
        BridgeError::Session(SessionError::Rejected { status, .. }) if *status == 401 || *status == 403 => {
            StatusCode::UNAUTHORIZED
        }
        BridgeError::Session(_) => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.message();

        let validation_errors = match &self {
            ApiError::ValidationError(errors) => Some(errors.clone()),
            _ => None,
        };

        let details = match &self {
            ApiError::Bridge(BridgeError::Contract(contract_error)) => Some(serde_json::json!({
                "contract_error_type": format!("{:?}", contract_error)
            })),
            ApiError::Bridge(BridgeError::Session(SessionError::Rejected { status, body })) => {
                Some(serde_json::json!({
                    "upstream_status": status,
                    "upstream_body": body,
                }))
            }
            _ => None,
        };

        let error_response = ApiErrorResponse {
            success: false,
            error: message,
            error_code: error_code.to_string(),
            details,
            validation_errors,
        };

        (status, Json(error_response)).into_response()
    }
}

impl From<BridgeError> for ApiError {
    fn from(error: BridgeError) -> Self {
        ApiError::Bridge(error)
    }
}

impl From<Vec<ValidationError>> for ApiError {
    fn from(errors: Vec<ValidationError>) -> Self {
        ApiError::ValidationError(errors)
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
