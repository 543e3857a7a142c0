//! Money handling for the Matchfund real-time path.
//!
//! Amounts cross two representations:
//!
//! - `rust_decimal::Decimal` at the durable/public boundary (withdrawal
//!   records, funding snapshots, donation amounts);
//! - integer **minor units** (`i64`) inside the counter store, where the
//!   only operation is atomic fetch-and-add.
//!
//! Conversion between the two is exact or it is an error — an amount with a
//! sub-minor-unit remainder is rejected rather than rounded.

use std::fmt;
use std::hash::{Hash, Hasher};

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::{MatchfundError, Result};

/// A currency with its ISO-4217 minor-unit exponent (GBP → 2, so £1.50 is
/// 150 minor units).
///
/// Equality and hashing are by code alone: two `Currency` values with the
/// same code must carry the same exponent or the deployment configuration
/// is broken.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Currency {
    code: String,
    exponent: u32,
}

impl Currency {
    /// Create a currency from its code and minor-unit exponent.
    ///
    /// # Panics
    /// Panics if `exponent` exceeds 6 — no ISO currency subdivides further,
    /// and larger exponents would overflow the minor-unit scale factor.
    #[must_use]
    pub fn new(code: impl Into<String>, exponent: u32) -> Self {
        assert!(exponent <= 6, "Currency exponent must be <= 6");
        Self {
            code: code.into(),
            exponent,
        }
    }

    /// Pound sterling.
    #[must_use]
    pub fn gbp() -> Self {
        Self::new("GBP", 2)
    }

    /// US dollar.
    #[must_use]
    pub fn usd() -> Self {
        Self::new("USD", 2)
    }

    /// Euro.
    #[must_use]
    pub fn eur() -> Self {
        Self::new("EUR", 2)
    }

    /// The ISO-4217 code (e.g., "GBP").
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The minor-unit exponent (e.g., 2 for GBP).
    #[must_use]
    pub fn exponent(&self) -> u32 {
        self.exponent
    }

    fn scale_factor(&self) -> Decimal {
        Decimal::from(10_u64.pow(self.exponent))
    }

    /// Convert a decimal amount to integer minor units.
    ///
    /// # Errors
    /// - [`MatchfundError::PrecisionLoss`] if the amount has a sub-minor-unit
    ///   remainder (e.g., £1.005 in GBP);
    /// - [`MatchfundError::AmountOverflow`] if the result does not fit `i64`.
    pub fn to_minor_units(&self, amount: Decimal) -> Result<i64> {
        let scaled = amount
            .checked_mul(self.scale_factor())
            .ok_or_else(|| MatchfundError::AmountOverflow {
                amount,
                currency: self.code.clone(),
            })?;

        if !scaled.fract().is_zero() {
            return Err(MatchfundError::PrecisionLoss {
                amount,
                currency: self.code.clone(),
            });
        }

        scaled
            .to_i64()
            .ok_or_else(|| MatchfundError::AmountOverflow {
                amount,
                currency: self.code.clone(),
            })
    }

    /// Convert integer minor units back to a decimal amount.
    #[must_use]
    pub fn from_minor_units(&self, minor_units: i64) -> Decimal {
        Decimal::new(minor_units, self.exponent)
    }
}

impl PartialEq for Currency {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl Eq for Currency {}

impl Hash for Currency {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.code.hash(state);
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)
    }
}
