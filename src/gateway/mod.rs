//! HTTP surface of the ledger.
//!
//! Each route is bound to a concretely typed handler; request bodies are
//! decoded by the handler's extractor types and decoding failures are
//! reported through the same error envelope as domain errors.

mod handlers;
mod response;

use std::future::Future;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;

use crate::service::LedgerService;

pub use response::{ApiError, ApiResponse, ApiResult};

pub fn router(service: Arc<LedgerService>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/accounts", post(handlers::create_account))
        .route("/accounts/", post(handlers::create_account))
        .route("/accounts/{account_id}", get(handlers::get_account))
        .route("/transactions", post(handlers::create_transfer))
        .route("/transactions/", post(handlers::create_transfer))
        .with_state(service)
}

/// Serves until `shutdown` resolves, then drains in-flight requests.
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}
