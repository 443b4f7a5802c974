//! Response envelope shared by every endpoint.
//!
//! - success: `{"code":0,"message":"success","data":{...}}`
//! - failure: `{"code":<n>,"message":"..."}` with the mapped HTTP status

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::{LedgerError, SUCCESS_CODE, SUCCESS_MESSAGE};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: SUCCESS_CODE,
            message: SUCCESS_MESSAGE.to_string(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(err: &LedgerError) -> Self {
        Self {
            code: err.code(),
            message: err.message(),
            data: None,
        }
    }
}

#[derive(Debug)]
pub struct ApiError(pub LedgerError);

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ApiResponse::<()>::error(&self.0))).into_response()
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope() {
        let value = serde_json::to_value(ApiResponse::success(serde_json::json!({"a": 1}))).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"code": 0, "message": "success", "data": {"a": 1}})
        );
    }

    #[test]
    fn test_error_envelope_omits_data() {
        let value =
            serde_json::to_value(ApiResponse::<()>::error(&LedgerError::InsufficientFunds))
                .unwrap();
        assert_eq!(
            value,
            serde_json::json!({"code": 9, "message": "insufficient funds for transfer"})
        );
    }

    #[test]
    fn test_error_status() {
        let response = ApiError(LedgerError::AccountExists).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = ApiError(LedgerError::System("boom".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
