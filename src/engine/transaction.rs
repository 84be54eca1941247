mod amount;
mod request;

pub use amount::Amount;
pub use request::TransactionRequest;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::error::{DeclineReason, TransactionError};
use super::Decimal;

pub type TransactionId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Withdraw,
    Topup,
}

impl std::str::FromStr for TransactionKind {
    type Err = TransactionError;

    /// Case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "withdraw" => Ok(TransactionKind::Withdraw),
            "topup" => Ok(TransactionKind::Topup),
            _ => Err(TransactionError::UnknownKind(s.to_string())),
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Withdraw => write!(f, "withdraw"),
            TransactionKind::Topup => write!(f, "topup"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Approved,
    Declined,
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionStatus::Approved => write!(f, "approved"),
            TransactionStatus::Declined => write!(f, "declined"),
        }
    }
}

/// An immutable ledger entry, approved or declined.
///
/// Only the transaction log creates these; `id` and `created_at` are assigned at append.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    id: TransactionId,
    /// Masked owning card number
    card_number: String,
    #[serde(rename = "type")]
    kind: TransactionKind,
    /// As submitted; absent when the submitted amount was not a number
    #[serde(with = "rust_decimal::serde::float_option")]
    amount: Option<Decimal>,
    status: TransactionStatus,
    decline_reason: Option<DeclineReason>,
    #[serde(with = "rust_decimal::serde::float_option")]
    balance_after: Option<Decimal>,
    created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn card_number(&self) -> &str {
        &self.card_number
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn amount(&self) -> Option<Decimal> {
        self.amount
    }

    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    pub fn decline_reason(&self) -> Option<DeclineReason> {
        self.decline_reason
    }

    pub fn balance_after(&self) -> Option<Decimal> {
        self.balance_after
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_approved(&self) -> bool {
        self.status == TransactionStatus::Approved
    }

    /// Signed effect on the balance: zero for declines, negative for withdrawals.
    pub fn signed_amount(&self) -> Decimal {
        match (self.status, self.kind, self.amount) {
            (TransactionStatus::Approved, TransactionKind::Topup, Some(amount)) => amount,
            (TransactionStatus::Approved, TransactionKind::Withdraw, Some(amount)) => -amount,
            _ => Decimal::ZERO,
        }
    }

    /// Customer-facing outcome message
    pub fn message(&self) -> String {
        match self.decline_reason {
            Some(reason) => reason.to_string(),
            None => "Approved".to_string(),
        }
    }
}

impl std::fmt::Display for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] id={} card={} amount={} status={}",
            self.kind,
            self.id,
            self.card_number,
            self.amount
                .map_or_else(|| "-".to_string(), |amount| amount.to_string()),
            self.status
        )?;
        if let Some(reason) = self.decline_reason {
            write!(f, " reason={reason:?}")?;
        }
        if let Some(balance) = self.balance_after {
            write!(f, " balance_after={balance}")?;
        }
        Ok(())
    }
}

/// A transaction outcome waiting for its id and timestamp.
#[derive(Debug, Clone)]
pub(crate) struct PendingTransaction {
    card_number: String,
    kind: TransactionKind,
    amount: Option<Decimal>,
    decline_reason: Option<DeclineReason>,
    balance_after: Option<Decimal>,
}

impl PendingTransaction {
    pub(crate) fn approved(
        card_number: &str,
        kind: TransactionKind,
        amount: Amount,
        balance_after: Decimal,
    ) -> Self {
        Self {
            card_number: card_number.to_string(),
            kind,
            amount: Some(amount.value()),
            decline_reason: None,
            balance_after: Some(balance_after),
        }
    }

    pub(crate) fn declined(
        card_number: &str,
        kind: TransactionKind,
        amount: Option<Decimal>,
        reason: DeclineReason,
    ) -> Self {
        Self {
            card_number: card_number.to_string(),
            kind,
            amount,
            decline_reason: Some(reason),
            balance_after: None,
        }
    }

    pub(crate) fn into_transaction(self, id: TransactionId, created_at: DateTime<Utc>) -> Transaction {
        let status = if self.decline_reason.is_some() {
            TransactionStatus::Declined
        } else {
            TransactionStatus::Approved
        };
        Transaction {
            id,
            card_number: self.card_number,
            kind: self.kind,
            amount: self.amount,
            status,
            decline_reason: self.decline_reason,
            balance_after: self.balance_after,
            created_at,
        }
    }
}
