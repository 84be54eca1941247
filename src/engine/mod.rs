//! Ledger core.
//!
//! This module contains the card banking logic including:
//! - `AccountStore` - Card accounts keyed by card digest, one lock per account
//! - `Authenticator` - Customer and administrator logins, server-side sessions
//! - `LedgerEngine` - PIN-checked top-ups and withdrawals
//! - `TransactionLog` - Append-only history of approved and declined attempts
//! - `QueryService` - Balance, per-card history and the admin audit view

mod account;
mod auth;
mod banking_core;
mod error;
mod history;
mod ledger;
mod query;
mod store;
mod transaction;

pub(crate) use rust_decimal::Decimal;

pub use account::{canonical_card_number, mask_card_number, Account, CardKey};
pub use auth::{
    AdminCredential, AdminLogin, AdminSession, Authenticator, CustomerLogin, CustomerSession,
};
pub use banking_core::BankingCore;
pub use error::{AuthError, DeclineReason, Error, TransactionError};
pub use history::TransactionLog;
pub use ledger::LedgerEngine;
pub use query::QueryService;
pub use store::AccountStore;
pub use transaction::{
    Amount, Transaction, TransactionId, TransactionKind, TransactionRequest, TransactionStatus,
};
