use sha2::{Digest, Sha256};

use super::error::DeclineReason;
use super::transaction::{Amount, TransactionKind};
use super::Decimal;

/// Strips the separators people type into card numbers (spaces and dashes).
pub fn canonical_card_number(card_number: &str) -> String {
    card_number
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

/// Masks a card number for display and logs: first four, eight stars, last four.
/// Anything shorter than eight characters becomes `****`.
pub fn mask_card_number(card_number: &str) -> String {
    let card: Vec<char> = canonical_card_number(card_number).chars().collect();
    if card.len() < 8 {
        return "****".to_string();
    }
    let head: String = card[..4].iter().collect();
    let tail: String = card[card.len() - 4..].iter().collect();
    format!("{head}********{tail}")
}

/// SHA-256 digest of a canonical card number.
///
/// Accounts and history are keyed by this digest; the plain card number is never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CardKey([u8; 32]);

impl CardKey {
    pub fn from_card_number(card_number: &str) -> Self {
        let canonical = canonical_card_number(card_number);
        Self(Sha256::digest(canonical.as_bytes()).into())
    }
}

/// PIN digest salted with the card key, so equal PINs on different cards differ.
#[derive(Clone, Copy, PartialEq, Eq)]
struct PinDigest([u8; 32]);

impl PinDigest {
    fn new(card_key: &CardKey, pin: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(card_key.0);
        hasher.update(pin.as_bytes());
        Self(hasher.finalize().into())
    }
}

impl std::fmt::Debug for PinDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PinDigest(..)")
    }
}

/// A card account: identity, PIN digest and balance.
#[derive(Debug, Clone)]
pub struct Account {
    card_key: CardKey,
    masked_card: String,
    pin_digest: PinDigest,
    balance: Decimal,
}

impl Account {
    pub(super) fn new(card_number: &str, pin: &str, opening_balance: Decimal) -> Self {
        debug_assert!(
            opening_balance >= Decimal::ZERO,
            "opening balance must not be negative"
        );
        let card_key = CardKey::from_card_number(card_number);
        Self {
            card_key,
            masked_card: mask_card_number(card_number),
            pin_digest: PinDigest::new(&card_key, pin),
            balance: opening_balance,
        }
    }

    pub fn card_key(&self) -> CardKey {
        self.card_key
    }

    /// Masked card number, safe to show and log
    pub fn masked_card(&self) -> &str {
        &self.masked_card
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub(super) fn verify_pin(&self, pin: &str) -> bool {
        PinDigest::new(&self.card_key, pin) == self.pin_digest
    }

    /// Computes the balance this account would have after the operation, without applying it.
    pub(super) fn balance_after(
        &self,
        kind: TransactionKind,
        amount: Amount,
    ) -> Result<Decimal, DeclineReason> {
        match kind {
            TransactionKind::Withdraw => {
                if self.balance < amount.value() {
                    return Err(DeclineReason::InsufficientFunds);
                }
                Ok(self.balance - amount.value())
            }
            // Overflowing the decimal range is treated as an unusable amount
            TransactionKind::Topup => self
                .balance
                .checked_add(amount.value())
                .ok_or(DeclineReason::InvalidAmount),
        }
    }

    /// Commits a balance previously computed by `balance_after`.
    ///
    /// # Panics (debug only)
    /// Panics if the new balance is negative.
    pub(super) fn commit_balance(&mut self, new_balance: Decimal) {
        debug_assert!(
            new_balance >= Decimal::ZERO,
            "Invariant violated: balance would become {new_balance}"
        );
        self.balance = new_balance;
    }
}
