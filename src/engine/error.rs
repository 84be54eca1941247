use serde::Serialize;

use crate::engine::Decimal;

/// Top-level error type for the ledger.
///
/// Business declines never show up here; they are recorded as declined transactions.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Invalid seed account {card}: {reason}")]
    InvalidSeed { card: String, reason: &'static str },
    #[error("Account {card} not found")]
    AccountNotFound { card: String },
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(&'static str),
}

/// Errors while turning raw client input into a request the engine accepts.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    #[error("Unknown transaction type {0:?}")]
    UnknownKind(String),
    #[error("Invalid amount {raw:?}")]
    InvalidAmount {
        raw: String,
        parsed: Option<Decimal>,
    },
}

impl TransactionError {
    /// The submitted amount, when it was a number at all.
    pub fn submitted_amount(&self) -> Option<Decimal> {
        match self {
            TransactionError::InvalidAmount { parsed, .. } => *parsed,
            TransactionError::UnknownKind(_) => None,
        }
    }
}

/// Reasons a transaction attempt is declined.
///
/// The `Display` text is the customer-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, thiserror::Error)]
pub enum DeclineReason {
    #[error("Invalid amount")]
    InvalidAmount,
    #[error("Invalid card")]
    AccountNotFound,
    #[error("Invalid PIN")]
    InvalidPin,
    #[error("Insufficient balance")]
    InsufficientFunds,
}

/// Login and session failures.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Account {card} not found")]
    AccountNotFound { card: String },

    #[error("Invalid credentials")]
    InvalidCredential,

    #[error("Session token is not recognised")]
    InvalidSession,

    #[error("Session has expired")]
    SessionExpired,

    #[error("Session does not grant access to this resource")]
    Forbidden,

    #[error(transparent)]
    Storage(#[from] Error),
}
