//! Money amounts and the display-time price math.
//!
//! All amounts are Indian rupees. The backend sends them as JSON numbers;
//! they are held as [`Decimal`] so that summing a cart never drifts.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::de::{self, Deserializer};
use serde::ser::{self, Serializer};
use serde::{Deserialize, Serialize};

/// An amount in rupees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// Zero rupees.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from whole rupees.
    #[must_use]
    pub fn rupees(amount: i64) -> Self {
        Self(Decimal::from(amount))
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// True when the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "₹{}", self.0.normalize())
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value = f64::try_from(self.0).map_err(ser::Error::custom)?;
        serializer.serialize_f64(value)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <Decimal as Deserialize>::deserialize(deserializer).map(Self)
    }
}

/// Shipping charge on a listing.
///
/// Sellers enter either an amount or the word "free"; the backend passes the
/// value through untouched, so it arrives as a number, a numeric string, or
/// a free-text string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShippingCharge {
    /// No shipping charge.
    #[default]
    Free,
    /// Flat charge per unit.
    Amount(Price),
}

impl ShippingCharge {
    /// Charge for `quantity` units; free shipping is zero.
    #[must_use]
    pub fn for_quantity(self, quantity: u32) -> Price {
        match self {
            Self::Free => Price::ZERO,
            Self::Amount(price) => price.times(quantity),
        }
    }

    /// True when nothing is charged.
    #[must_use]
    pub const fn is_free(&self) -> bool {
        match self {
            Self::Free => true,
            Self::Amount(price) => price.is_zero(),
        }
    }
}

impl fmt::Display for ShippingCharge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Amount(price) if !price.is_zero() => price.fmt(f),
            _ => f.write_str("Free"),
        }
    }
}

impl Serialize for ShippingCharge {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Free => serializer.serialize_str("free"),
            Self::Amount(price) => price.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for ShippingCharge {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(Decimal),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(amount) => Ok(Self::Amount(Price(amount))),
            Raw::Text(text) => {
                let text = text.trim();
                if text.is_empty() || text.eq_ignore_ascii_case("free") {
                    return Ok(Self::Free);
                }
                text.parse::<Decimal>()
                    .map(|amount| Self::Amount(Price(amount)))
                    .map_err(|_| de::Error::custom(format!("invalid shipping charge: {text}")))
            }
        }
    }
}

/// Discount shown on a listing, in whole percent.
///
/// `round((price - final_price) / price * 100)` when the list price is
/// positive and above the final price, otherwise zero. Halves round up.
#[must_use]
pub fn discount_percent(price: Price, final_price: Price) -> u32 {
    if price.0 <= Decimal::ZERO || price.0 <= final_price.0 {
        return 0;
    }

    ((price.0 - final_price.0) / price.0 * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
        .unwrap_or(0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_discount_percent() {
        assert_eq!(discount_percent(Price::rupees(500), Price::rupees(400)), 20);
        assert_eq!(discount_percent(Price::rupees(300), Price::rupees(199)), 34);
    }

    #[test]
    fn test_discount_percent_rounds_half_up() {
        // 1/8 = 12.5%
        assert_eq!(discount_percent(Price::rupees(8), Price::rupees(7)), 13);
    }

    #[test]
    fn test_discount_percent_no_discount() {
        assert_eq!(discount_percent(Price::ZERO, Price::ZERO), 0);
        assert_eq!(discount_percent(Price::ZERO, Price::rupees(10)), 0);
        assert_eq!(discount_percent(Price::rupees(250), Price::rupees(250)), 0);
        assert_eq!(discount_percent(Price::rupees(250), Price::rupees(300)), 0);
    }

    #[test]
    fn test_price_wire_format() {
        let price: Price = serde_json::from_str("499.5").unwrap();
        assert_eq!(price.to_string(), "₹499.5");
        assert_eq!(serde_json::to_string(&Price::rupees(120)).unwrap(), "120.0");
    }

    #[test]
    fn test_price_inside_a_record() {
        #[derive(Deserialize)]
        struct Line {
            price: Price,
            total: Price,
        }
        let line: Line = serde_json::from_str(r#"{"price": 350, "total": "700.00"}"#).unwrap();
        assert_eq!(line.price, Price::rupees(350));
        assert_eq!(line.total, Price::rupees(700));
    }

    #[test]
    fn test_shipping_charge_variants() {
        let free: ShippingCharge = serde_json::from_str("\"Free\"").unwrap();
        assert_eq!(free, ShippingCharge::Free);

        let number: ShippingCharge = serde_json::from_str("40").unwrap();
        assert_eq!(number, ShippingCharge::Amount(Price::rupees(40)));

        let text: ShippingCharge = serde_json::from_str("\" 40 \"").unwrap();
        assert_eq!(text.for_quantity(2), Price::rupees(80));

        assert!(serde_json::from_str::<ShippingCharge>("\"ask seller\"").is_err());
    }

    #[test]
    fn test_zero_shipping_is_free() {
        let zero: ShippingCharge = serde_json::from_str("0").unwrap();
        assert!(zero.is_free());
        assert_eq!(zero.to_string(), "Free");
    }
}
