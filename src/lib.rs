//! A toy card banking ledger.
//!
//! Customers authenticate with a card number and PIN, move money with PIN-checked
//! top-ups and withdrawals, and read back their balance and history. An administrator
//! can audit every transaction across all cards. Declined attempts are recorded in the
//! ledger alongside approved ones.
//!
//! The [`engine`] module holds the ledger core; [`server`] exposes it over HTTP.

pub mod config;
pub mod engine;
pub mod server;

pub use config::Config;
pub use engine::{
    Account, AccountStore, AdminCredential, AdminSession, AuthError, Authenticator,
    BankingCore, CardKey, CustomerSession, DeclineReason, Error, LedgerEngine, QueryService,
    Transaction, TransactionKind, TransactionLog, TransactionRequest, TransactionStatus,
};
