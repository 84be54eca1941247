use crate::engine::{
    account::{canonical_card_number, mask_card_number, CardKey},
    transaction::TransactionKind,
};

/// Raw transaction request as submitted by a client.
/// The amount is kept as text: validating it is the engine's first check, and a
/// malformed amount still produces a declined ledger entry.
#[derive(Clone)]
pub struct TransactionRequest {
    pub card_number: String,
    pub pin: String,
    pub amount: String,
    pub kind: TransactionKind,
}

impl TransactionRequest {
    pub fn new(
        card_number: impl Into<String>,
        pin: impl Into<String>,
        amount: impl ToString,
        kind: TransactionKind,
    ) -> Self {
        Self {
            card_number: card_number.into(),
            pin: pin.into(),
            amount: amount.to_string(),
            kind,
        }
    }

    pub(crate) fn card_key(&self) -> CardKey {
        CardKey::from_card_number(&self.card_number)
    }

    pub(crate) fn masked_card(&self) -> String {
        mask_card_number(&self.card_number)
    }

    /// Card number without separators
    pub fn canonical_card(&self) -> String {
        canonical_card_number(&self.card_number)
    }
}

// The PIN must never end up in logs
impl std::fmt::Debug for TransactionRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionRequest")
            .field("card_number", &self.masked_card())
            .field("pin", &"****")
            .field("amount", &self.amount)
            .field("kind", &self.kind)
            .finish()
    }
}

impl std::fmt::Display for TransactionRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (card: {}, amount: {})",
            self.kind,
            self.masked_card(),
            self.amount
        )
    }
}
