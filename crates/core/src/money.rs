//! Currency codes and monetary amount checks.
//!
//! Amounts are plain `rust_decimal::Decimal` values; the currency travels
//! alongside them as a [`CurrencyCode`].

use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// ISO-4217 style currency code: exactly three uppercase ASCII letters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Canadian dollar, the fixed default for quotes and listings.
    pub fn cad() -> Self {
        Self("CAD".to_string())
    }

    pub fn parse(raw: &str) -> DomainResult<Self> {
        let code = raw.trim().to_ascii_uppercase();
        if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(DomainError::validation(format!(
                "currency must be a three-letter code, got '{raw}'"
            )));
        }
        Ok(Self(code))
    }

    /// Parse an optional caller-supplied code, treating missing or blank input as `default`.
    pub fn or_default(raw: Option<&str>, default: &CurrencyCode) -> DomainResult<Self> {
        match raw {
            Some(s) if !s.trim().is_empty() => Self::parse(s),
            _ => Ok(default.clone()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::cad()
    }
}

impl ValueObject for CurrencyCode {}

impl core::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CurrencyCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(value: CurrencyCode) -> Self {
        value.0
    }
}

/// Largest storable amount, the range of a `NUMERIC(14,2)` column.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 2);

/// Reject negative or out-of-range monetary amounts, naming the offending field.
pub fn ensure_amount(amount: Decimal, field: &str) -> DomainResult<Decimal> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(DomainError::validation(format!("{field} cannot be negative")));
    }
    if amount > MAX_AMOUNT {
        return Err(DomainError::validation(format!(
            "{field} cannot exceed {MAX_AMOUNT}"
        )));
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn currency_is_normalized_to_uppercase() {
        assert_eq!(CurrencyCode::parse(" usd ").unwrap().as_str(), "USD");
    }

    #[test]
    fn currency_rejects_wrong_length_and_digits() {
        assert!(CurrencyCode::parse("CA").is_err());
        assert!(CurrencyCode::parse("CADX").is_err());
        assert!(CurrencyCode::parse("C4D").is_err());
    }

    #[test]
    fn blank_currency_falls_back_to_default() {
        let default = CurrencyCode::cad();
        assert_eq!(CurrencyCode::or_default(None, &default).unwrap(), default);
        assert_eq!(CurrencyCode::or_default(Some("  "), &default).unwrap(), default);
        assert_eq!(
            CurrencyCode::or_default(Some("eur"), &default).unwrap().as_str(),
            "EUR"
        );
    }

    #[test]
    fn currency_deserializes_through_validation() {
        let ok: CurrencyCode = serde_json::from_str("\"jpy\"").unwrap();
        assert_eq!(ok.as_str(), "JPY");
        assert!(serde_json::from_str::<CurrencyCode>("\"yen!\"").is_err());
    }

    #[test]
    fn amount_accepts_zero_and_rejects_negative() {
        assert_eq!(ensure_amount(dec!(0), "cost").unwrap(), dec!(0));
        assert_eq!(ensure_amount(dec!(12.50), "cost").unwrap(), dec!(12.50));
        let err = ensure_amount(dec!(-0.01), "cost").unwrap_err();
        assert_eq!(err, DomainError::validation("cost cannot be negative"));
    }

    #[test]
    fn amount_is_bounded_by_numeric_14_2() {
        assert_eq!(MAX_AMOUNT, dec!(999999999999.99));
        assert_eq!(ensure_amount(MAX_AMOUNT, "cost").unwrap(), MAX_AMOUNT);
        assert!(ensure_amount(dec!(1000000000000), "cost").is_err());
        assert!(ensure_amount(dec!(70000000000000000000000000000), "cost").is_err());
    }
}
