//! [`Amount`] represents a monetary amount as the gateway expects to see it rendered.
//!
//! This module holds its type definition and implementations.

use std::{fmt::Display, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Represents a monetary amount on an order.
///
/// The value is kept normalized, so integral amounts render without a
/// fractional part (`15`, never `15.00`) and fractional amounts drop trailing
/// zeros (`15.5`). The signature hash covers the rendered form, so the
/// rendering must be identical everywhere the amount is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    pub fn new(value: Decimal) -> Self {
        Amount(value.normalize())
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl From<u32> for Amount {
    fn from(value: u32) -> Self {
        Amount(Decimal::from(value))
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Amount(Decimal::from(value))
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl FromStr for Amount {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim()).map(Amount::new)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_integral_amounts_have_no_fraction() {
        assert_eq!(Amount::from(15u32).to_string(), "15");
        assert_eq!(Amount::new(dec!(15.00)).to_string(), "15");
        assert_eq!("1500".parse::<Amount>().unwrap().to_string(), "1500");
    }

    #[test]
    fn test_fractional_amounts_drop_trailing_zeros() {
        assert_eq!(Amount::new(dec!(15.50)).to_string(), "15.5");
        assert_eq!("0.01".parse::<Amount>().unwrap().to_string(), "0.01");
        assert_eq!(Amount::ZERO.to_string(), "0");
    }

    #[test]
    fn test_serde_as_string() {
        let amount: Amount = serde_json::from_value(serde_json::json!("12.30")).unwrap();
        assert_eq!(amount, Amount::new(dec!(12.3)));
        assert_eq!(
            serde_json::to_value(amount).unwrap(),
            serde_json::json!("12.3")
        );
        assert!(serde_json::from_value::<Amount>(serde_json::json!("twelve")).is_err());
    }
}
