use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

use crate::application::AccountServiceTrait;
use crate::domain::{Account, AccountError, AccountId, CreateAccountRequest, TransactionRequest};

pub type SharedAccountService = Arc<dyn AccountServiceTrait>;

pub const ACCOUNT_DELETED_MESSAGE: &str = "Account deleted successfully";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl AccountError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AccountError::NotFound(_) => StatusCode::NOT_FOUND,
            AccountError::InvalidAmount { .. }
            | AccountError::InsufficientFunds { .. }
            | AccountError::InvalidInitialBalance(_)
            | AccountError::ExcessivePrecision(_)
            | AccountError::AmountOutOfRange { .. } => StatusCode::BAD_REQUEST,
            AccountError::InfrastructureError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AccountError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status.is_server_error() {
            error!("Request failed: {}", self);
            INTERNAL_ERROR_MESSAGE.to_string()
        } else {
            self.to_string()
        };
        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

pub async fn create_account(
    State(service): State<SharedAccountService>,
    Json(payload): Json<CreateAccountRequest>,
) -> Result<impl IntoResponse, AccountError> {
    let account = service.create_account(payload).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

pub async fn get_account(
    State(service): State<SharedAccountService>,
    Path(id): Path<AccountId>,
) -> Result<Json<Account>, AccountError> {
    service.get_account(id).await.map(Json)
}

pub async fn list_accounts(
    State(service): State<SharedAccountService>,
) -> Result<Json<Vec<Account>>, AccountError> {
    service.list_accounts().await.map(Json)
}

pub async fn deposit(
    State(service): State<SharedAccountService>,
    Json(payload): Json<TransactionRequest>,
) -> Result<Json<Account>, AccountError> {
    service.deposit(payload).await.map(Json)
}

pub async fn withdraw(
    State(service): State<SharedAccountService>,
    Json(payload): Json<TransactionRequest>,
) -> Result<Json<Account>, AccountError> {
    service.withdraw(payload).await.map(Json)
}

pub async fn delete_account(
    State(service): State<SharedAccountService>,
    Path(id): Path<AccountId>,
) -> Result<Json<MessageResponse>, AccountError> {
    service.delete_account(id).await?;
    Ok(Json(MessageResponse {
        message: ACCOUNT_DELETED_MESSAGE.to_string(),
    }))
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
