//! HTTP transport for the ledger core.
//!
//! Routes:
//! - `POST /auth/login`, `POST /auth/adminLogin`, `POST /auth/logout`
//! - `GET /customer/{cardNumber}/balance`, `GET /customer/{cardNumber}/transactions`
//! - `GET /admin/transactions`
//! - `POST /transaction`
//! - `GET /health`

mod auth;
mod error;
mod queries;
mod transactions;

use std::future::Future;
use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::engine::BankingCore;

pub use auth::{AdminAuth, BearerToken, CustomerAuth};
pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub core: Arc<BankingCore>,
    /// Card numbers must start with this to be routed to the ledger
    pub card_prefix: Arc<str>,
}

impl AppState {
    pub fn new(core: Arc<BankingCore>, card_prefix: &str) -> Self {
        Self {
            core,
            card_prefix: Arc::from(card_prefix),
        }
    }
}

/// Creates the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(auth::routes())
        .merge(queries::routes())
        .merge(transactions::routes())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Serve until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
