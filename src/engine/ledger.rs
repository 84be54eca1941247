use std::sync::Arc;

use super::account::CardKey;
use super::error::{DeclineReason, Error};
use super::history::TransactionLog;
use super::store::{lock_account, AccountStore};
use super::transaction::{Amount, PendingTransaction, Transaction, TransactionRequest};
use super::Decimal;

/// Applies PIN-checked top-ups and withdrawals.
///
/// Every call appends exactly one record to the log: approved, or declined with the
/// first failed check. Checks run in a fixed order: amount, card, PIN, funds.
#[derive(Debug, Clone)]
pub struct LedgerEngine {
    accounts: Arc<AccountStore>,
    log: Arc<TransactionLog>,
}

impl LedgerEngine {
    pub fn new(accounts: Arc<AccountStore>, log: Arc<TransactionLog>) -> Self {
        log::trace!("LedgerEngine initialized");
        Self { accounts, log }
    }

    /// Apply one transaction attempt and return the record it produced.
    ///
    /// Business declines are returned as `Ok` with a declined record. `Err` means the
    /// ledger itself could not be used and nothing was committed.
    pub fn apply_transaction(&self, request: TransactionRequest) -> Result<Transaction, Error> {
        log::trace!("Processing transaction: {request}");
        let card_key = request.card_key();
        let masked = request.masked_card();
        let kind = request.kind;

        // Step 1: amount
        let amount = match request.amount.parse::<Amount>() {
            Ok(amount) => amount,
            Err(err) => {
                // Only cards that exist get a history entry
                let owner = self.accounts.get(&card_key).map(|_| card_key);
                return self.decline(
                    owner,
                    &masked,
                    &request,
                    err.submitted_amount(),
                    DeclineReason::InvalidAmount,
                );
            }
        };

        // Step 2: card
        let Some(handle) = self.accounts.get(&card_key) else {
            return self.decline(
                None,
                &masked,
                &request,
                Some(amount.value()),
                DeclineReason::AccountNotFound,
            );
        };

        // Everything from here until the append runs under the account lock
        let mut account = lock_account(&handle)?;

        // Step 3: PIN
        if !account.verify_pin(&request.pin) {
            return self.decline(
                Some(card_key),
                &masked,
                &request,
                Some(amount.value()),
                DeclineReason::InvalidPin,
            );
        }

        // Step 4: funds
        let new_balance = match account.balance_after(kind, amount) {
            Ok(balance) => balance,
            Err(reason) => {
                log::trace!(
                    "[{kind}] card={masked} balance={} amount={amount} -> {reason:?}",
                    account.balance()
                );
                return self.decline(Some(card_key), &masked, &request, Some(amount.value()), reason);
            }
        };

        // Append first, then commit: if the append fails the balance stays untouched
        let record = self.log.append(
            Some(card_key),
            PendingTransaction::approved(account.masked_card(), kind, amount, new_balance),
        )?;
        account.commit_balance(new_balance);

        log::info!("[{kind}] card={masked} amount={amount} approved -> balance={new_balance}");
        Ok(record)
    }

    fn decline(
        &self,
        owner: Option<CardKey>,
        masked: &str,
        request: &TransactionRequest,
        amount: Option<Decimal>,
        reason: DeclineReason,
    ) -> Result<Transaction, Error> {
        log::warn!("[{}] card={masked} declined: {reason}", request.kind);
        self.log.append(
            owner,
            PendingTransaction::declined(masked, request.kind, amount, reason),
        )
    }
}
