use std::io::Read;
use std::sync::{Arc, Mutex, MutexGuard};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Deserialize;

use super::account::{canonical_card_number, mask_card_number, Account, CardKey};
use super::error::Error;
use super::Decimal;

/// Cards seeded when no accounts file is given: (card number, PIN, opening balance).
pub const DEMO_ACCOUNTS: [(&str, &str, &str); 2] = [
    ("4123456789012345", "1234", "5000.00"),
    ("4987654321098765", "4321", "3000.00"),
];

/// Seed row as read from an accounts CSV (`card_number,pin,balance`).
#[derive(Debug, Deserialize)]
struct SeedRecord {
    card_number: String,
    pin: String,
    balance: Decimal,
}

/// Card accounts keyed by card digest.
///
/// Each account sits behind its own lock, so operations on different cards never
/// contend. Callers clone the account handle out of the map before locking it; no map
/// guard is held while an account lock is taken.
#[derive(Debug, Default)]
pub struct AccountStore {
    accounts: DashMap<CardKey, Arc<Mutex<Account>>>,
}

impl AccountStore {
    pub fn new() -> Self {
        log::trace!("AccountStore initialized");
        Self {
            accounts: DashMap::new(),
        }
    }

    /// Store seeded with the two demo cards.
    pub fn with_demo_accounts() -> Result<Self, Error> {
        let store = Self::new();
        for (card_number, pin, balance) in DEMO_ACCOUNTS {
            let balance: Decimal = balance.parse().map_err(|_| Error::InvalidSeed {
                card: mask_card_number(card_number),
                reason: "balance is not a decimal",
            })?;
            store.insert(card_number, pin, balance)?;
        }
        Ok(store)
    }

    /// Provision a new account. Card numbers must be digits (separators allowed),
    /// PINs non-empty, balances non-negative, and each card unique.
    pub fn insert(&self, card_number: &str, pin: &str, opening_balance: Decimal) -> Result<(), Error> {
        let canonical = canonical_card_number(card_number);
        let invalid = |reason| Error::InvalidSeed {
            card: mask_card_number(card_number),
            reason,
        };

        if canonical.is_empty() || !canonical.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("card number must be digits"));
        }
        if pin.is_empty() {
            return Err(invalid("PIN must not be empty"));
        }
        if opening_balance < Decimal::ZERO {
            return Err(invalid("opening balance must not be negative"));
        }

        match self.accounts.entry(CardKey::from_card_number(&canonical)) {
            Entry::Occupied(_) => Err(invalid("duplicate card number")),
            Entry::Vacant(slot) => {
                let account = Account::new(&canonical, pin, opening_balance);
                log::debug!(
                    "[store] Created account {} with balance {}",
                    account.masked_card(),
                    opening_balance
                );
                slot.insert(Arc::new(Mutex::new(account)));
                Ok(())
            }
        }
    }

    /// Load seed accounts from any CSV source with columns `card_number,pin,balance`.
    /// Returns the number of accounts created.
    pub fn load_csv<R: Read>(&self, reader: R) -> Result<usize, Error> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut loaded = 0usize;
        for result in csv_reader.deserialize() {
            let record: SeedRecord = result?;
            self.insert(&record.card_number, &record.pin, record.balance)?;
            loaded += 1;
        }

        log::info!("Loaded {loaded} accounts from CSV");
        Ok(loaded)
    }

    /// Handle to an account's lock, if the card exists.
    pub fn get(&self, card_key: &CardKey) -> Option<Arc<Mutex<Account>>> {
        self.accounts
            .get(card_key)
            .map(|entry| Arc::clone(entry.value()))
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

/// Lock an account, mapping a poisoned lock to `StorageUnavailable`.
pub(crate) fn lock_account(handle: &Mutex<Account>) -> Result<MutexGuard<'_, Account>, Error> {
    handle
        .lock()
        .map_err(|_| Error::StorageUnavailable("account lock poisoned"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Cursor;

    fn balance_of(store: &AccountStore, card_number: &str) -> Decimal {
        let handle = store.get(&CardKey::from_card_number(card_number)).unwrap();
        let account = lock_account(&handle).unwrap();
        account.balance()
    }

    #[test]
    fn test_demo_accounts() {
        let store = AccountStore::with_demo_accounts().unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(balance_of(&store, "4123456789012345"), dec!(5000));
        assert_eq!(balance_of(&store, "4987654321098765"), dec!(3000));
    }

    #[test]
    fn test_insert_rejects_duplicates() {
        let store = AccountStore::new();
        store.insert("4123456789012345", "1234", dec!(10)).unwrap();
        let err = store.insert("4123 4567 8901 2345", "9999", dec!(20)).unwrap_err();

        assert!(matches!(err, Error::InvalidSeed { reason: "duplicate card number", .. }));
        assert_eq!(balance_of(&store, "4123456789012345"), dec!(10));
    }

    #[test]
    fn test_insert_rejects_bad_input() {
        let store = AccountStore::new();
        assert!(store.insert("4123abcd", "1234", dec!(1)).is_err());
        assert!(store.insert("", "1234", dec!(1)).is_err());
        assert!(store.insert("4123456789012345", "", dec!(1)).is_err());
        assert!(store.insert("4123456789012345", "1234", dec!(-1)).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_csv() {
        let input = "card_number, pin, balance
4111111111111111, 1111, 100.50
4222222222222222, 2222, 0
";
        let store = AccountStore::new();
        let loaded = store.load_csv(Cursor::new(input)).unwrap();

        assert_eq!(loaded, 2);
        assert_eq!(balance_of(&store, "4111111111111111"), dec!(100.50));
        assert_eq!(balance_of(&store, "4222222222222222"), dec!(0));
    }

    #[test]
    fn test_load_csv_rejects_malformed_balance() {
        let input = "card_number,pin,balance
4111111111111111,1111,lots
";
        let store = AccountStore::new();
        assert!(matches!(
            store.load_csv(Cursor::new(input)),
            Err(Error::Csv(_))
        ));
    }

    #[test]
    fn test_get_unknown_card() {
        let store = AccountStore::with_demo_accounts().unwrap();
        assert!(store.get(&CardKey::from_card_number("4000000000000000")).is_none());
    }
}
