use std::collections::HashMap;
use std::io::Write;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use serde::Serialize;

use super::account::CardKey;
use super::error::Error;
use super::transaction::{PendingTransaction, Transaction, TransactionId};

#[derive(Debug, Default)]
struct LogInner {
    records: Vec<Transaction>,
    /// Positions in `records` per existing account, in append order
    by_account: HashMap<CardKey, Vec<usize>>,
    last_id: TransactionId,
}

/// Append-only transaction history, approved and declined.
///
/// Ids are assigned under the write lock, so `id` order is also physical append order.
#[derive(Debug, Default)]
pub struct TransactionLog {
    inner: RwLock<LogInner>,
}

/// One exported ledger line; amounts keep their exact two-place decimal form.
#[derive(Debug, Serialize)]
struct LedgerRow<'a> {
    id: TransactionId,
    card_number: &'a str,
    #[serde(rename = "type")]
    kind: String,
    amount: Option<String>,
    status: String,
    decline_reason: Option<String>,
    balance_after: Option<String>,
    created_at: String,
}

impl<'a> From<&'a Transaction> for LedgerRow<'a> {
    fn from(tx: &'a Transaction) -> Self {
        Self {
            id: tx.id(),
            card_number: tx.card_number(),
            kind: tx.kind().to_string(),
            amount: tx.amount().map(|amount| format!("{amount:.2}")),
            status: tx.status().to_string(),
            decline_reason: tx.decline_reason().map(|reason| format!("{reason:?}")),
            balance_after: tx.balance_after().map(|balance| format!("{balance:.2}")),
            created_at: tx.created_at().to_rfc3339(),
        }
    }
}

impl TransactionLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, LogInner>, Error> {
        self.inner
            .read()
            .map_err(|_| Error::StorageUnavailable("transaction log lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, LogInner>, Error> {
        self.inner
            .write()
            .map_err(|_| Error::StorageUnavailable("transaction log lock poisoned"))
    }

    /// Append a record, assigning the next id and the timestamp.
    ///
    /// `owner` is the existing account the record belongs to. Records without one
    /// (unknown cards) only show up in `scan`.
    pub(crate) fn append(
        &self,
        owner: Option<CardKey>,
        pending: PendingTransaction,
    ) -> Result<Transaction, Error> {
        let mut inner = self.write()?;
        inner.last_id += 1;
        let record = pending.into_transaction(inner.last_id, Utc::now());

        let position = inner.records.len();
        inner.records.push(record.clone());
        if let Some(card_key) = owner {
            inner.by_account.entry(card_key).or_default().push(position);
        }

        log::trace!("[log] Appended {record}");
        Ok(record)
    }

    /// All records in append order.
    pub fn scan(&self) -> Result<Vec<Transaction>, Error> {
        Ok(self.read()?.records.clone())
    }

    /// Records of one card in append order.
    pub fn scan_account(&self, card_key: &CardKey) -> Result<Vec<Transaction>, Error> {
        let inner = self.read()?;
        Ok(inner
            .by_account
            .get(card_key)
            .map(|positions| {
                positions
                    .iter()
                    .map(|&position| inner.records[position].clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    pub fn len(&self) -> Result<usize, Error> {
        Ok(self.read()?.records.len())
    }

    pub fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.read()?.records.is_empty())
    }

    /// Write the whole ledger to any sink (File, Stdout, ...) as CSV.
    /// Note that the CSV writer is buffered automatically.
    pub fn export_csv<W: Write>(&self, writer: W) -> Result<(), Error> {
        let inner = self.read()?;
        log::info!("Exporting {} transactions", inner.records.len());

        let mut csv_writer = csv::Writer::from_writer(writer);
        for record in &inner.records {
            csv_writer.serialize(LedgerRow::from(record))?;
        }
        csv_writer.flush()?;

        log::trace!("Export complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::error::DeclineReason;
    use crate::engine::transaction::{Amount, TransactionKind, TransactionStatus};
    use rust_decimal_macros::dec;

    fn approved_topup(card: &str, amount: &str, balance_after: rust_decimal::Decimal) -> PendingTransaction {
        let amount: Amount = amount.parse().unwrap();
        PendingTransaction::approved(card, TransactionKind::Topup, amount, balance_after)
    }

    #[test]
    fn test_append_assigns_increasing_ids() {
        let log = TransactionLog::new();
        let key = CardKey::from_card_number("4123456789012345");

        let first = log.append(Some(key), approved_topup("4123********2345", "10", dec!(10))).unwrap();
        let second = log.append(Some(key), approved_topup("4123********2345", "5", dec!(15))).unwrap();

        assert_eq!(first.id(), 1);
        assert_eq!(second.id(), 2);
        assert!(first.created_at() <= second.created_at());
        assert_eq!(log.len().unwrap(), 2);
    }

    #[test]
    fn test_scan_account_filters_by_card() {
        let log = TransactionLog::new();
        let alice = CardKey::from_card_number("4123456789012345");
        let bob = CardKey::from_card_number("4987654321098765");

        log.append(Some(alice), approved_topup("4123********2345", "1", dec!(1))).unwrap();
        log.append(Some(bob), approved_topup("4987********8765", "2", dec!(2))).unwrap();
        log.append(Some(alice), approved_topup("4123********2345", "3", dec!(4))).unwrap();

        let ids: Vec<_> = log.scan_account(&alice).unwrap().iter().map(Transaction::id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(log.scan_account(&bob).unwrap().len(), 1);
        assert_eq!(log.scan().unwrap().len(), 3);
    }

    #[test]
    fn test_unowned_record_is_not_indexed() {
        let log = TransactionLog::new();
        let stranger = CardKey::from_card_number("4000000000000000");
        log.append(
            None,
            PendingTransaction::declined(
                "4000********0000",
                TransactionKind::Topup,
                Some(dec!(5)),
                DeclineReason::AccountNotFound,
            ),
        )
        .unwrap();

        assert_eq!(log.scan().unwrap().len(), 1);
        assert!(log.scan_account(&stranger).unwrap().is_empty());
    }

    #[test]
    fn test_scan_unknown_account_is_empty() {
        let log = TransactionLog::new();
        assert!(log
            .scan_account(&CardKey::from_card_number("4000000000000000"))
            .unwrap()
            .is_empty());
        assert!(log.is_empty().unwrap());
    }

    #[test]
    fn test_export_csv() {
        let log = TransactionLog::new();
        let key = CardKey::from_card_number("4123456789012345");
        log.append(Some(key), approved_topup("4123********2345", "100", dec!(1100))).unwrap();
        log.append(
            Some(key),
            PendingTransaction::declined(
                "4123********2345",
                TransactionKind::Withdraw,
                Some(dec!(2000)),
                DeclineReason::InsufficientFunds,
            ),
        )
        .unwrap();

        let mut output = Vec::new();
        log.export_csv(&mut output).unwrap();
        let output = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(
            lines[0],
            "id,card_number,type,amount,status,decline_reason,balance_after,created_at"
        );
        assert!(lines[1].starts_with("1,4123********2345,topup,100.00,approved,,1100.00,"));
        assert!(lines[2].starts_with("2,4123********2345,withdraw,2000.00,declined,InsufficientFunds,,"));
    }

    #[test]
    fn test_records_are_copies() {
        let log = TransactionLog::new();
        let key = CardKey::from_card_number("4123456789012345");
        let record = log.append(Some(key), approved_topup("4123********2345", "1", dec!(1))).unwrap();
        assert_eq!(log.scan().unwrap()[0], record);
        assert_eq!(record.status(), TransactionStatus::Approved);
    }
}
