//! Decimal price representation.
//!
//! Product documents carry a display string (`"1 250 ₾"`, `"$19.99"`) next
//! to an optional numeric value. Cart totals are computed with [`Price`]
//! so summing many line items never accumulates floating-point error.

use std::iter::Sum;
use std::ops::Add;

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};

/// A unit or line price.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// A zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a float read out of a document.
    ///
    /// Non-finite and negative values become zero.
    #[must_use]
    pub fn from_f64(amount: f64) -> Self {
        if !amount.is_finite() || amount < 0.0 {
            return Self::ZERO;
        }
        Decimal::from_f64(amount).map_or(Self::ZERO, |d| Self(d.round_dp(2)))
    }

    /// Extract a price from a display label such as `"1 250,50 ₾"` or
    /// `"$1,299.00"`.
    ///
    /// A comma is read as the decimal separator only when no dot is present
    /// and it is followed by one or two digits; otherwise commas are
    /// thousands separators.
    #[must_use]
    pub fn parse_label(label: &str) -> Option<Self> {
        let kept: String = label
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
            .collect();
        if !kept.chars().any(|c| c.is_ascii_digit()) {
            return None;
        }

        let normalized = match kept.rfind(',') {
            Some(pos) if !kept.contains('.') && (2..=3).contains(&(kept.len() - pos)) => {
                let (whole, frac) = kept.split_at(pos);
                format!("{}.{}", whole.replace(',', ""), frac.trim_start_matches(','))
            }
            _ => kept.replace(',', ""),
        };

        normalized.parse::<Decimal>().ok().map(Self)
    }

    /// Get the decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units.
    ///
    /// Saturates at [`Decimal::MAX`] instead of overflowing.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self(self.0.checked_mul(Decimal::from(quantity)).unwrap_or(Decimal::MAX))
    }

    /// Format with two decimal places (e.g. `"19.99"`).
    #[must_use]
    pub fn display(&self) -> String {
        format!("{:.2}", self.0)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.checked_add(rhs.0).unwrap_or(Decimal::MAX))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_from_f64_rounds_to_cents() {
        assert_eq!(Price::from_f64(19.999).amount(), dec("20.00"));
        assert_eq!(Price::from_f64(12.5).amount(), dec("12.5"));
    }

    #[test]
    fn test_from_f64_rejects_negative_and_nan() {
        assert_eq!(Price::from_f64(-3.0), Price::ZERO);
        assert_eq!(Price::from_f64(f64::NAN), Price::ZERO);
    }

    #[test]
    fn test_parse_label_with_currency_symbols() {
        assert_eq!(Price::parse_label("$1,299.00").unwrap().amount(), dec("1299.00"));
        assert_eq!(Price::parse_label("1 250 ₾").unwrap().amount(), dec("1250"));
        assert_eq!(Price::parse_label("45,50 ₾").unwrap().amount(), dec("45.50"));
    }

    #[test]
    fn test_parse_label_without_digits() {
        assert!(Price::parse_label("on request").is_none());
        assert!(Price::parse_label("").is_none());
    }

    #[test]
    fn test_times_and_sum() {
        let unit = Price::new(dec("12.50"));
        let total: Price = [unit.times(2), Price::new(dec("5"))].into_iter().sum();
        assert_eq!(total.amount(), dec("30.00"));
        assert_eq!(total.display(), "30.00");
    }

    #[test]
    fn test_arithmetic_saturates_on_huge_labels() {
        let huge = Price::parse_label("70000000000000000000000000000 ₾").unwrap();
        assert_eq!(huge.times(2).amount(), Decimal::MAX);

        let total: Price = [huge, huge, Price::new(dec("1"))].into_iter().sum();
        assert_eq!(total.amount(), Decimal::MAX);
    }
}
