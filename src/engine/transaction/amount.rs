use std::str::FromStr;

use crate::engine::{error::TransactionError, Decimal};

/// Largest number of fractional digits an amount may carry (minor currency units).
pub const MAX_SCALE: u32 = 2;

/// A validated, strictly positive monetary amount with at most two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Amount(Decimal);

impl Amount {
    pub fn value(self) -> Decimal {
        self.0
    }
}

impl FromStr for Amount {
    type Err = TransactionError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        // Exact parsing: input beyond the decimal's precision is refused, not rounded
        let parsed = Decimal::from_str_exact(raw.trim()).ok();
        match parsed {
            Some(amount) if amount > Decimal::ZERO && amount.normalize().scale() <= MAX_SCALE => {
                Ok(Amount(amount))
            }
            _ => Err(TransactionError::InvalidAmount {
                raw: raw.to_string(),
                parsed,
            }),
        }
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
