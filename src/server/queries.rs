//! Read endpoints: customer balance and history, admin audit view.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use rust_decimal::{prelude::ToPrimitive, Decimal};
use serde_json::Value;

use super::{
    auth::{AdminAuth, CustomerAuth},
    error::ApiError,
    AppState,
};
use crate::engine::Transaction;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/customer/{card_number}/balance", get(balance))
        .route("/customer/{card_number}/transactions", get(customer_transactions))
        .route("/admin/transactions", get(all_transactions))
}

/// GET /customer/{card_number}/balance - Current balance as a JSON number.
async fn balance(
    State(state): State<AppState>,
    CustomerAuth(session): CustomerAuth,
    Path(card_number): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if !session.owns(&card_number) {
        return Err(ApiError::Forbidden);
    }
    let balance = state.core.queries().balance(&card_number)?;
    Ok(Json(decimal_to_json(balance)))
}

/// GET /customer/{card_number}/transactions - The card's history, newest first.
async fn customer_transactions(
    State(state): State<AppState>,
    CustomerAuth(session): CustomerAuth,
    Path(card_number): Path<String>,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    if !session.owns(&card_number) {
        return Err(ApiError::Forbidden);
    }
    let mut transactions = state.core.queries().transactions(&card_number)?;
    transactions.reverse();
    Ok(Json(transactions))
}

/// GET /admin/transactions - Every record across all cards, in id order.
async fn all_transactions(
    State(state): State<AppState>,
    AdminAuth(admin): AdminAuth,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    Ok(Json(state.core.queries().all_transactions(&admin)?))
}

fn decimal_to_json(value: Decimal) -> Value {
    value
        .to_f64()
        .and_then(serde_json::Number::from_f64)
        .map_or(Value::Null, Value::Number)
}
