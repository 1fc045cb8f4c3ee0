//! Amount type for handling monetary values.
//!
//! This module provides the `Amount` type which wraps `Decimal`. Amounts are written to the ledger
//! file as JSON numbers carrying every digit of the decimal, but are read leniently: a numeric string, optionally carrying a dollar
//! sign and thousands separators, is also accepted.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{ser, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Represents how dollar amounts should be rendered. Amounts are always rendered with exactly two
/// decimal places.
///
/// # Examples
///  - `AmountFormat{ dollar: true, commas: true }` -> `$60,000.00`
///  - `AmountFormat{ dollar: true, commas: false }` -> `$60000.00`
///  - `AmountFormat{ dollar: false, commas: false }` -> `60000.00`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AmountFormat {
    /// Whether a dollar sign is written.
    dollar: bool,
    /// Whether commas are written as thousands separators.
    commas: bool,
}

impl AmountFormat {
    pub const fn new(dollar: bool, commas: bool) -> Self {
        Self { dollar, commas }
    }
}

impl Default for AmountFormat {
    fn default() -> Self {
        DEFAULT_FORMAT
    }
}

/// The default format has a dollar sign and no commas: e.g. `$60000.00`.
const DEFAULT_FORMAT: AmountFormat = AmountFormat {
    dollar: true,
    commas: false,
};

/// Represents a dollar amount.
///
/// # Examples
///
/// ```
/// # use spend_ledger::model::Amount;
/// # use std::str::FromStr;
/// let a = Amount::from_str("5000").unwrap();
/// let b = Amount::from_str("$5,000.00").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), "$5000.00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }

    /// Interprets a JSON value as an amount. Numbers and numeric strings are accepted; anything
    /// else returns `None`.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => {
                let s = n.to_string();
                Decimal::from_str(&s)
                    .or_else(|_| Decimal::from_scientific(&s))
                    .ok()
                    .or_else(|| n.as_f64().and_then(Decimal::from_f64))
                    .map(Amount)
            }
            serde_json::Value::String(s) => Amount::from_str(s).ok(),
            _ => None,
        }
    }

    /// Returns a `Display` implementation that renders this amount with `format`.
    pub fn display(&self, format: AmountFormat) -> impl Display + '_ {
        Formatted {
            amount: self,
            format,
        }
    }

    /// Adds two amounts, returning `None` if the result cannot be represented.
    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    /// Adds two amounts, clamping at the largest or smallest representable value.
    pub fn saturating_add(self, rhs: Amount) -> Amount {
        Amount(self.0.saturating_add(rhs.0))
    }
}

/// An error that can occur when parsing strings into `Decimal` values.
pub struct AmountError(rust_decimal::Error);

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        // "-$50.00", "$50.00" and "50.00" are all accepted
        let without_dollar = if let Some(after_minus) = trimmed.strip_prefix('-') {
            match after_minus.strip_prefix('$') {
                Some(after_dollar) => format!("-{after_dollar}"),
                None => trimmed.to_string(),
            }
        } else if let Some(after_dollar) = trimmed.strip_prefix('$') {
            after_dollar.to_string()
        } else {
            trimmed.to_string()
        };

        let without_commas = without_dollar.replace(',', "");
        let value = Decimal::from_str(&without_commas)
            .or_else(|e| Decimal::from_scientific(&without_commas).map_err(|_| e))
            .map_err(AmountError)?;
        Ok(Amount(value))
    }
}

struct Formatted<'a> {
    amount: &'a Amount,
    format: AmountFormat,
}

impl Display for Formatted<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let (sign, num) = if self.amount.is_negative() {
            ("-", self.amount.value().abs())
        } else {
            ("", self.amount.value().abs())
        };

        let dol = if self.format.dollar { "$" } else { "" };

        let digits = if self.format.commas {
            format_num::format_num!(",.2", num.to_f64().unwrap_or_default())
        } else {
            let mut rounded = num.round_dp(2);
            rounded.rescale(2);
            rounded.to_string()
        };
        f.pad(&format!("{sign}{dol}{digits}"))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.display(DEFAULT_FORMAT), f)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Written from the decimal text, an f64 rounds past ~16 significant digits
        let number = serde_json::Number::from_str(&self.0.to_string())
            .map_err(<S::Error as ser::Error>::custom)?;
        number.serialize(serializer)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn amt(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_plain() {
        assert_eq!(amt("12.5").value(), Decimal::from_str("12.5").unwrap());
    }

    #[test]
    fn test_parse_with_dollar_and_commas() {
        assert_eq!(amt(" $1,234.50 ").value(), Decimal::from_str("1234.5").unwrap());
        assert_eq!(amt("-$50").value(), Decimal::from_str("-50").unwrap());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(Amount::from_str("twelve").is_err());
        assert!(Amount::from_str("").is_err());
    }

    #[test]
    fn test_display_two_places() {
        assert_eq!(amt("10").to_string(), "$10.00");
        assert_eq!(amt("5.5").to_string(), "$5.50");
        assert_eq!(amt("3.456").to_string(), "$3.46");
        assert_eq!(amt("-4").to_string(), "-$4.00");
    }

    #[test]
    fn test_display_with_commas() {
        let f = AmountFormat::new(true, true);
        assert_eq!(amt("60000").display(f).to_string(), "$60,000.00");
        let f = AmountFormat::new(false, false);
        assert_eq!(amt("60000").display(f).to_string(), "60000.00");
    }

    #[test]
    fn test_display_pads() {
        assert_eq!(format!("{:>8}", amt("3")), "   $3.00");
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&amt("15.5")).unwrap();
        assert_eq!(json, "15.5");
    }

    #[test]
    fn test_from_json() {
        assert_eq!(Amount::from_json(&json!(0.1)), Some(amt("0.1")));
        assert_eq!(Amount::from_json(&json!("7.25")), Some(amt("7.25")));
        assert_eq!(Amount::from_json(&json!(1e20)).map(|a| a.is_zero()), Some(false));
        assert_eq!(Amount::from_json(&json!(null)), None);
        assert_eq!(Amount::from_json(&json!("abc")), None);
        assert_eq!(Amount::from_json(&json!([1])), None);
    }

    #[test]
    fn test_add() {
        let total = amt("10.00").saturating_add(amt("5.50"));
        assert_eq!(total.to_string(), "$15.50");
        assert_eq!(amt("1").checked_add(amt("2")), Some(amt("3")));
    }

    #[test]
    fn test_add_at_the_limit_does_not_panic() {
        let max = Amount::new(Decimal::MAX);
        assert_eq!(max.checked_add(amt("1")), None);
        assert_eq!(max.saturating_add(max), max);
    }

    #[test]
    fn test_serialize_keeps_every_digit() {
        let a = amt("12345678901234567.89");
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, "12345678901234567.89");
        let back = Amount::from_json(&serde_json::from_str(&json).unwrap()).unwrap();
        assert_eq!(back, a);
        assert_eq!(back.value().scale(), 2);
    }

    #[test]
    fn test_negative_zero_is_not_negative() {
        assert!(!amt("-0").is_negative());
        assert!(amt("-0.01").is_negative());
    }
}
