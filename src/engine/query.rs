use std::sync::Arc;

use super::account::{mask_card_number, CardKey};
use super::auth::AdminSession;
use super::error::Error;
use super::history::TransactionLog;
use super::store::{lock_account, AccountStore};
use super::transaction::Transaction;
use super::Decimal;

/// Read-only projections over accounts and the transaction log.
///
/// Per-card reads take the card's lock for their duration. A mutation holds that lock
/// from balance check to log append, so readers see either all of it or none of it.
#[derive(Debug, Clone)]
pub struct QueryService {
    accounts: Arc<AccountStore>,
    log: Arc<TransactionLog>,
}

impl QueryService {
    pub fn new(accounts: Arc<AccountStore>, log: Arc<TransactionLog>) -> Self {
        Self { accounts, log }
    }

    pub fn balance(&self, card_number: &str) -> Result<Decimal, Error> {
        let handle = self
            .accounts
            .get(&CardKey::from_card_number(card_number))
            .ok_or_else(|| Error::AccountNotFound {
                card: mask_card_number(card_number),
            })?;
        let account = lock_account(&handle)?;
        Ok(account.balance())
    }

    /// History of one card in append order. Unknown cards have no history.
    pub fn transactions(&self, card_number: &str) -> Result<Vec<Transaction>, Error> {
        let card_key = CardKey::from_card_number(card_number);
        let Some(handle) = self.accounts.get(&card_key) else {
            return Ok(Vec::new());
        };
        let _account = lock_account(&handle)?;
        self.log.scan_account(&card_key)
    }

    /// Balance and history of one card taken under a single lock.
    pub fn statement(&self, card_number: &str) -> Result<(Decimal, Vec<Transaction>), Error> {
        let card_key = CardKey::from_card_number(card_number);
        let handle = self
            .accounts
            .get(&card_key)
            .ok_or_else(|| Error::AccountNotFound {
                card: mask_card_number(card_number),
            })?;
        let account = lock_account(&handle)?;
        Ok((account.balance(), self.log.scan_account(&card_key)?))
    }

    /// Every record across all cards, in global id order. Admin only.
    pub fn all_transactions(&self, admin: &AdminSession) -> Result<Vec<Transaction>, Error> {
        log::debug!("[audit] {} listed all transactions", admin.username());
        self.log.scan()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::auth::{AdminCredential, Authenticator};
    use crate::engine::ledger::LedgerEngine;
    use crate::engine::transaction::{TransactionKind, TransactionRequest};
    use rust_decimal_macros::dec;
    use std::time::Duration;

    const ALICE: &str = "4123456789012345";
    const BOB: &str = "4987654321098765";

    fn setup() -> (LedgerEngine, QueryService, Authenticator) {
        let accounts = Arc::new(AccountStore::new());
        accounts.insert(ALICE, "1234", dec!(1000)).unwrap();
        accounts.insert(BOB, "4321", dec!(300)).unwrap();
        let log = Arc::new(TransactionLog::new());
        (
            LedgerEngine::new(Arc::clone(&accounts), Arc::clone(&log)),
            QueryService::new(Arc::clone(&accounts), log),
            Authenticator::new(
                accounts,
                AdminCredential::new("admin", "admin"),
                Duration::from_secs(60),
            ),
        )
    }

    #[test]
    fn test_balance() {
        let (_, queries, _) = setup();
        assert_eq!(queries.balance(ALICE).unwrap(), dec!(1000));
        assert!(matches!(
            queries.balance("4000000000000000"),
            Err(Error::AccountNotFound { .. })
        ));
    }

    #[test]
    fn test_transactions_only_for_that_card() {
        let (engine, queries, _) = setup();
        engine
            .apply_transaction(TransactionRequest::new(ALICE, "1234", "10", TransactionKind::Topup))
            .unwrap();
        engine
            .apply_transaction(TransactionRequest::new(BOB, "4321", "20", TransactionKind::Withdraw))
            .unwrap();
        engine
            .apply_transaction(TransactionRequest::new(ALICE, "0000", "30", TransactionKind::Withdraw))
            .unwrap();

        let alice = queries.transactions(ALICE).unwrap();
        assert_eq!(alice.len(), 2);
        assert!(alice.iter().all(|tx| tx.card_number() == "4123********2345"));
        assert!(alice[0].id() < alice[1].id());

        assert_eq!(queries.transactions(BOB).unwrap().len(), 1);
        assert!(queries.transactions("4000000000000000").unwrap().is_empty());
    }

    #[test]
    fn test_statement() {
        let (engine, queries, _) = setup();
        engine
            .apply_transaction(TransactionRequest::new(BOB, "4321", "50", TransactionKind::Withdraw))
            .unwrap();
        let (balance, history) = queries.statement(BOB).unwrap();
        assert_eq!(balance, dec!(250));
        assert_eq!(history.len(), 1);
        assert!(queries.statement("4000000000000000").is_err());
    }

    #[test]
    fn test_all_transactions_is_ordered_superset() {
        let (engine, queries, auth) = setup();
        for (card, pin) in [(ALICE, "1234"), (BOB, "4321"), (ALICE, "1234")] {
            engine
                .apply_transaction(TransactionRequest::new(card, pin, "1", TransactionKind::Topup))
                .unwrap();
        }
        let admin = auth.login_admin("admin", "admin").unwrap().session;
        let all = queries.all_transactions(&admin).unwrap();

        let ids: Vec<_> = all.iter().map(Transaction::id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        for tx in queries.transactions(ALICE).unwrap() {
            assert!(all.contains(&tx));
        }
    }
}
