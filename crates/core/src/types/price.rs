//! Type-safe price representation using decimal arithmetic.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product price in the store currency.
///
/// Backed by [`Decimal`] so discount arithmetic never accumulates binary
/// floating-point error. The store operates in a single currency, so no
/// currency code is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Apply a percentage discount, rounding to 2 decimal places.
    ///
    /// Percentages above 100 are clamped to 100 (a free product, not a
    /// negative price).
    #[must_use]
    pub fn discounted(&self, percent: u8) -> Self {
        let percent = percent.min(100);
        let remaining = Decimal::from(100 - u32::from(percent));
        Self((self.0 * remaining / Decimal::from(100_u32)).round_dp(2))
    }

    /// The amount saved by a percentage discount.
    #[must_use]
    pub fn discount_amount(&self, percent: u8) -> Self {
        Self((self.0 - self.discounted(percent).0).round_dp(2))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn price(s: &str) -> Price {
        Price::new(s.parse().unwrap())
    }

    #[test]
    fn test_discounted() {
        assert_eq!(price("100.00").discounted(25), price("75.00"));
        assert_eq!(price("19.99").discounted(10), price("17.99"));
        assert_eq!(price("19.99").discounted(0), price("19.99"));
    }

    #[test]
    fn test_discount_clamped_at_100() {
        assert_eq!(price("50.00").discounted(150), Price::ZERO);
    }

    #[test]
    fn test_discount_amount() {
        assert_eq!(price("100.00").discount_amount(30), price("30.00"));
    }

    #[test]
    fn test_display_two_places() {
        assert_eq!(price("5").to_string(), "5.00");
    }
}
