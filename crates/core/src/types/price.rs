//! Type-safe price representation using decimal arithmetic.
//!
//! The store trades in a single currency, so a price is just a non-negative
//! decimal amount in dollars with display helpers.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input is not a decimal number.
    #[error("price must be a number")]
    NotANumber,
    /// The amount is below the minimum sellable price.
    #[error("price must be at least {min}")]
    TooLow {
        /// Minimum allowed amount.
        min: Decimal,
    },
    /// The amount does not fit the stored `NUMERIC(10,2)` column.
    #[error("price must be at most {max}")]
    TooHigh {
        /// Maximum allowed amount.
        max: Decimal,
    },
    /// The amount has fractions of a cent.
    #[error("price must not have more than two decimal places")]
    TooPrecise,
}

impl PriceError {
    /// Message shown next to the price field of a form.
    #[must_use]
    pub const fn form_message(&self) -> &'static str {
        match self {
            Self::NotANumber => "Please enter a price",
            Self::TooLow { .. } => "Please enter a positive price",
            Self::TooHigh { .. } => "Please enter a price of at most $99,999,999.99",
            Self::TooPrecise => "Please enter a price in whole cents",
        }
    }
}

/// A price in the store currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Smallest price a product can be listed at.
    pub const MIN_LISTED: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

    /// Largest price the catalog can store, 99,999,999.99.
    pub const MAX_LISTED: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

    /// A zero amount (used as the starting point for totals).
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from whole cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Parse a price entered by an admin, enforcing the listing bounds.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::NotANumber` if the input is not a decimal, or the
    /// error from [`Price::check_listed`].
    pub fn parse_listed(input: &str) -> Result<Self, PriceError> {
        let amount = Decimal::from_str(input.trim().trim_start_matches('$'))
            .map_err(|_| PriceError::NotANumber)?;
        let price = Self(amount);
        price.check_listed()?;
        Ok(price)
    }

    /// Check that a product can be listed at this price.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::TooLow` below [`Price::MIN_LISTED`],
    /// `PriceError::TooHigh` above [`Price::MAX_LISTED`] and
    /// `PriceError::TooPrecise` for fractions of a cent.
    pub fn check_listed(&self) -> Result<(), PriceError> {
        if self.0 < Self::MIN_LISTED {
            return Err(PriceError::TooLow {
                min: Self::MIN_LISTED,
            });
        }
        if self.0 > Self::MAX_LISTED {
            return Err(PriceError::TooHigh {
                max: Self::MAX_LISTED,
            });
        }
        if self.0.normalize().scale() > 2 {
            return Err(PriceError::TooPrecise);
        }
        Ok(())
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Format for display (e.g., "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        format!("${:.2}", self.0.round_dp(2))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, quantity: u32) -> Self::Output {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}
