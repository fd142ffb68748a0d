use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use ethers::types::Address;
use ethers::utils::to_checksum;

use crate::{
    api::dto::{
        ApiResponse, CertificateResponse, CountResponse, CreateCertificateApiRequest, RoleResponse,
        UpdateRoleApiRequest,
    },
    api::errors::{ApiError, ApiResult},
    api::validation::{Validate, Validator},
    domain::models::CreateCertificateRequest,
    domain::services::BridgeError,
    handlers::AppState,
};

fn parse_address(value: &str, field_name: &str) -> ApiResult<Address> {
    Validator::validate_ethereum_address(value, field_name)
        .map_err(|e| ApiError::from_validation_errors(vec![e]))?;
    value
        .parse::<Address>()
        .map_err(|e| ApiError::bad_request(format!("Invalid {}: {}", field_name, e)))
}

// ============ CERTIFICATES ============

pub async fn get_certificate(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<impl IntoResponse> {
    let bridge = state.bridge.read().await;
    let record = bridge.get_certificate(id).await?;

    Ok(Json(ApiResponse::ok(CertificateResponse {
        id,
        owner: to_checksum(&record.owner, None),
        name: record.name,
        start_time: record.start_time,
        end_time: record.end_time,
    })))
}

/// Issue a certificate. Owner defaults to the session account and the
/// window to one year from now.
pub async fn create_certificate(
    State(state): State<AppState>,
    Json(request): Json<CreateCertificateApiRequest>,
) -> ApiResult<impl IntoResponse> {
    request.validate().map_err(ApiError::from_validation_errors)?;

    let bridge = state.bridge.read().await;

    let receipt = if request.is_explicit() {
        let owner = match &request.owner {
            Some(owner) => parse_address(owner, "owner")?,
            None => bridge.current_account().ok_or(BridgeError::AccountNotResolved)?,
        };
        let certificate = match (request.start_time, request.end_time) {
            (Some(start_time), Some(end_time)) => CreateCertificateRequest {
                owner,
                name: request.name,
                start_time,
                end_time,
            },
            _ => CreateCertificateRequest::valid_for_one_year(owner, request.name, Utc::now()),
        };
        bridge.create_certificate(certificate).await?
    } else {
        bridge.create_certificate_for_year(&request.name).await?
    };

    Ok(Json(ApiResponse::ok(receipt)))
}

// ============ COUNTER ============

pub async fn get_temp_count(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let bridge = state.bridge.read().await;
    let count = bridge.get_temp_count().await?;

    Ok(Json(ApiResponse::ok(CountResponse {
        count: count.to_string(),
    })))
}

pub async fn set_temp_count(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let bridge = state.bridge.read().await;
    let receipt = bridge.set_temp_count().await?;
    Ok(Json(ApiResponse::ok(receipt)))
}

// ============ ROLES ============

pub async fn has_role(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let account = parse_address(&address, "address")?;

    let bridge = state.bridge.read().await;
    let has_role = bridge.has_role(account).await?;

    Ok(Json(ApiResponse::ok(RoleResponse {
        account: to_checksum(&account, None),
        has_role,
    })))
}

pub async fn update_role(
    State(state): State<AppState>,
    Json(request): Json<UpdateRoleApiRequest>,
) -> ApiResult<impl IntoResponse> {
    request.validate().map_err(ApiError::from_validation_errors)?;
    let account = parse_address(&request.account, "account")?;

    let bridge = state.bridge.read().await;
    let receipt = bridge.update_role(account, &request.role_name).await?;
    Ok(Json(ApiResponse::ok(receipt)))
}
