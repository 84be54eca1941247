//! Money-moving endpoint.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{error::ApiError, AppState};
use crate::engine::{Transaction, TransactionKind, TransactionRequest};

pub(super) fn routes() -> Router<AppState> {
    Router::new().route("/transaction", post(transaction))
}

/// Client payload. Every field is optional here so that a missing amount turns into a
/// recorded decline instead of a deserialization error.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionBody {
    #[serde(default)]
    card_number: String,
    #[serde(default)]
    pin: String,
    #[serde(default)]
    amount: Option<Value>,
    #[serde(default, rename = "type")]
    kind: String,
}

#[derive(Serialize)]
struct TransactionResponse {
    success: bool,
    message: String,
    #[serde(flatten)]
    transaction: Transaction,
}

fn rejected(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "success": false, "message": message }))).into_response()
}

/// JSON numbers and numeric strings are both accepted; anything else is passed on as
/// text the engine will refuse.
fn amount_text(amount: Option<&Value>) -> String {
    match amount {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// POST /transaction - Apply a PIN-checked top-up or withdrawal.
async fn transaction(
    State(state): State<AppState>,
    payload: Result<Json<TransactionBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = match payload {
        Ok(body) => body,
        Err(e) => return Ok(rejected(StatusCode::BAD_REQUEST, &e.body_text())),
    };

    let Ok(kind) = body.kind.parse::<TransactionKind>() else {
        return Ok(rejected(
            StatusCode::BAD_REQUEST,
            "Invalid type (use 'withdraw' or 'topup')",
        ));
    };

    let request = TransactionRequest::new(
        body.card_number,
        body.pin,
        amount_text(body.amount.as_ref()),
        kind,
    );
    if !request.canonical_card().starts_with(&*state.card_prefix) {
        log::warn!(
            "[gateway] card={} refused: outside supported range",
            request.masked_card()
        );
        return Ok(rejected(StatusCode::OK, "Card range not supported"));
    }

    let transaction = state.core.ledger().apply_transaction(request)?;

    Ok(Json(TransactionResponse {
        success: transaction.is_approved(),
        message: transaction.message(),
        transaction,
    })
    .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_text() {
        assert_eq!(amount_text(Some(&json!(100))), "100");
        assert_eq!(amount_text(Some(&json!(12.5))), "12.5");
        assert_eq!(amount_text(Some(&json!("7.25"))), "7.25");
        assert_eq!(amount_text(Some(&json!(true))), "true");
        assert_eq!(amount_text(None), "");
    }
}
