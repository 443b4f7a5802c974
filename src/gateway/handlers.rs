use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use super::response::{ok, ApiResult};
use crate::dto::{
    CreateAccountRequest, CreateAccountResponse, GetAccountResponse, TransferRequest,
    TransferResponse,
};
use crate::error::LedgerError;
use crate::service::LedgerService;

/// POST /accounts
pub async fn create_account(
    State(service): State<Arc<LedgerService>>,
    payload: Result<Json<CreateAccountRequest>, JsonRejection>,
) -> ApiResult<CreateAccountResponse> {
    let Json(req) = payload.map_err(invalid_body)?;
    service.create_account(&req).await?;
    ok(CreateAccountResponse {})
}

/// GET /accounts/{account_id}
pub async fn get_account(
    State(service): State<Arc<LedgerService>>,
    Path(raw_id): Path<String>,
) -> ApiResult<GetAccountResponse> {
    let id = raw_id
        .parse::<i64>()
        .map_err(|_| LedgerError::InvalidAccountId)?;
    let account = service.get_account(id).await?;
    ok(account.into())
}

/// POST /transactions
pub async fn create_transfer(
    State(service): State<Arc<LedgerService>>,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> ApiResult<TransferResponse> {
    let Json(req) = payload.map_err(invalid_body)?;
    let receipt = service.transfer(&req).await?;
    ok(receipt.into())
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// GET /health
pub async fn health() -> ApiResult<HealthResponse> {
    ok(HealthResponse { status: "ok" })
}

fn invalid_body(rejection: JsonRejection) -> LedgerError {
    LedgerError::InvalidParams(format!("invalid request body: {}", rejection.body_text()))
}
