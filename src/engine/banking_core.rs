use std::sync::Arc;

use super::auth::{AdminCredential, Authenticator};
use super::history::TransactionLog;
use super::ledger::LedgerEngine;
use super::query::QueryService;
use super::store::AccountStore;
use crate::config::Config;

/// Owns the account store and transaction log, and the services built on them.
///
/// Built once at startup and shared (behind an `Arc`) with whatever transport serves it.
#[derive(Debug)]
pub struct BankingCore {
    log: Arc<TransactionLog>,
    ledger: LedgerEngine,
    queries: QueryService,
    auth: Authenticator,
}

impl BankingCore {
    pub fn new(accounts: AccountStore, config: &Config) -> Self {
        let accounts = Arc::new(accounts);
        let log = Arc::new(TransactionLog::new());
        let admin = AdminCredential::new(config.admin_username.clone(), &config.admin_password);

        log::info!(
            "BankingCore initialized with {} accounts, session ttl {}s",
            accounts.len(),
            config.session_ttl.as_secs()
        );
        Self {
            ledger: LedgerEngine::new(Arc::clone(&accounts), Arc::clone(&log)),
            queries: QueryService::new(Arc::clone(&accounts), Arc::clone(&log)),
            auth: Authenticator::new(accounts, admin, config.session_ttl),
            log,
        }
    }

    pub fn ledger(&self) -> &LedgerEngine {
        &self.ledger
    }

    pub fn queries(&self) -> &QueryService {
        &self.queries
    }

    pub fn auth(&self) -> &Authenticator {
        &self.auth
    }

    pub fn log(&self) -> &TransactionLog {
        &self.log
    }
}
