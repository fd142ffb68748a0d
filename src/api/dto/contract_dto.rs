use serde::{Deserialize, Serialize};

use crate::api::validation::{Validate, ValidationResult, Validator};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// `createCertificate` request. With only `name` set the certificate is
/// issued to the session account, valid from now for one year.
#[derive(Debug, Deserialize)]
pub struct CreateCertificateApiRequest {
    pub name: String,
    pub owner: Option<String>,
    pub start_time: Option<u64>,
    pub end_time: Option<u64>,
}

impl CreateCertificateApiRequest {
    /// Explicit owner or time window supplied.
    pub fn is_explicit(&self) -> bool {
        self.owner.is_some() || self.start_time.is_some() || self.end_time.is_some()
    }
}

impl Validate for CreateCertificateApiRequest {
    fn validate(&self) -> ValidationResult<()> {
        let mut results = vec![Validator::validate_certificate_name(&self.name, "name")];

        if let Some(owner) = &self.owner {
            results.push(Validator::validate_ethereum_address(owner, "owner"));
        }

        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => results.push(Validator::validate_time_window(start, end, "end_time")),
            (None, None) => {}
            (Some(_), None) | (None, Some(_)) => results.push(Err(crate::api::validation::ValidationError {
                field: "end_time".to_string(),
                message: "start_time and end_time must be given together".to_string(),
            })),
        }

        Validator::combine_results(results)
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleApiRequest {
    pub account: String,
    pub role_name: String,
}

impl Validate for UpdateRoleApiRequest {
    fn validate(&self) -> ValidationResult<()> {
        let results = vec![
            Validator::validate_ethereum_address(&self.account, "account"),
            Validator::validate_role_name(&self.role_name, "role_name"),
        ];

        Validator::combine_results(results)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CertificateResponse {
    pub id: u64,
    pub owner: String,
    pub name: String,
    pub start_time: u64,
    pub end_time: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CountResponse {
    /// Decimal string; the counter is a uint256.
    pub count: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RoleResponse {
    pub account: String,
    pub has_role: bool,
}
