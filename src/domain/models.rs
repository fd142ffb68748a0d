use chrono::{DateTime, Utc};
use ethers::abi::Token;
use ethers::types::{Address, U256};
use ethers::utils::to_checksum;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::services::{ContractError, SessionError};

/// Key under which the backend session token is stored, matching the cookie name.
pub const ACCESS_TOKEN_KEY: &str = "access_token";

pub const ONE_YEAR_SECS: u64 = 365 * 24 * 60 * 60;

// ============ CONTRACT MODELS ============

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CertificateRecord {
    pub owner: Address,
    pub name: String,
    pub start_time: u64,
    pub end_time: u64,
}

impl CertificateRecord {
    /// Decode the `getCertificate` return tuple `(owner, name, startTime, endTime)`.
    pub fn from_token(token: Token) -> Result<Self, ContractError> {
        let fields = match token {
            Token::Tuple(fields) => fields,
            other => {
                return Err(ContractError::DecodingError(format!(
                    "expected certificate tuple, got {:?}",
                    other
                )))
            }
        };

        let mut fields = fields.into_iter();
        let owner = fields
            .next()
            .and_then(Token::into_address)
            .ok_or_else(|| missing_field("owner"))?;
        let name = fields
            .next()
            .and_then(Token::into_string)
            .ok_or_else(|| missing_field("name"))?;
        let start_time = fields
            .next()
            .and_then(Token::into_uint)
            .ok_or_else(|| missing_field("startTime"))?;
        let end_time = fields
            .next()
            .and_then(Token::into_uint)
            .ok_or_else(|| missing_field("endTime"))?;

        Ok(Self {
            owner,
            name,
            start_time: clamp_u64(start_time),
            end_time: clamp_u64(end_time),
        })
    }
}

fn missing_field(field: &str) -> ContractError {
    ContractError::DecodingError(format!("certificate field {} missing or mistyped", field))
}

/// Saturating U256 -> u64 conversion for timestamps and counters.
pub fn clamp_u64(value: U256) -> u64 {
    if value > U256::from(u64::MAX) {
        u64::MAX
    } else {
        value.as_u64()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCertificateRequest {
    pub owner: Address,
    pub name: String,
    pub start_time: u64,
    pub end_time: u64,
}

impl CreateCertificateRequest {
    /// A certificate starting at `now` and ending one year later.
    pub fn valid_for_one_year(owner: Address, name: impl Into<String>, now: DateTime<Utc>) -> Self {
        let start_time = now.timestamp().max(0) as u64;
        Self {
            owner,
            name: name.into(),
            start_time,
            end_time: start_time + ONE_YEAR_SECS,
        }
    }

    /// Arguments in `createCertificate(owner, name, startTime, endTime)` order.
    pub fn into_tokens(self) -> Vec<Token> {
        vec![
            Token::Address(self.owner),
            Token::String(self.name),
            Token::Uint(U256::from(self.start_time)),
            Token::Uint(U256::from(self.end_time)),
        ]
    }
}

/// The parts of a mined transaction receipt the callers care about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TxReceiptSummary {
    pub transaction_hash: String,
    pub block_number: Option<u64>,
    pub status: Option<u64>,
    pub gas_used: Option<String>,
    pub from: String,
}

// ============ SESSION MODELS ============

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthRequest {
    pub wallet_address: String,
}

impl AuthRequest {
    pub fn for_address(address: Address) -> Self {
        Self {
            wallet_address: to_checksum(&address, None),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Claims the backend puts in its access token. Read without signature
/// verification; the bridge only uses them to notice expiry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: Option<String>,
    pub id: Option<serde_json::Value>,
    pub exp: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn claims(&self) -> Result<TokenClaims, SessionError> {
        let mut validation = Validation::default();
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        decode::<TokenClaims>(&self.0, &DecodingKey::from_secret(&[]), &validation)
            .map(|data| data.claims)
            .map_err(|e| SessionError::InvalidToken(e.to_string()))
    }

    /// Opaque tokens and JWTs without `exp` never expire.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.claims() {
            Ok(TokenClaims { exp: Some(exp), .. }) => exp <= now.timestamp(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionExchange {
    pub token: SessionToken,
    pub reused: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountChange {
    pub previous: Option<Address>,
    pub current: Option<Address>,
}

impl AccountChange {
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub account: Option<String>,
    pub provider: Option<String>,
    pub contract_address: String,
    pub contract_bound: bool,
    pub session_token_present: bool,
}
