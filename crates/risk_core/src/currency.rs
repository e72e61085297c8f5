//! Currency codes.

use std::fmt;
use std::str::FromStr;

use crate::error::RiskEngineError;

/// An ISO 4217 currency code, stored as its uppercase three-letter alphabetic
/// form.
///
/// Unlike a closed enum, positions and market data in this domain reference
/// whatever currencies a portfolio trades, so the code is validated for
/// shape (three ASCII letters) rather than membership in a fixed list.
///
/// # Examples
///
/// ```
/// use risk_core::currency::Currency;
///
/// let usd: Currency = "usd".parse().unwrap();
/// assert_eq!(usd.code(), "USD");
/// assert_eq!(usd.decimal_places(), 2);
///
/// let jpy: Currency = "JPY".parse().unwrap();
/// assert_eq!(jpy.decimal_places(), 0);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    /// The three-letter ISO 4217 code, uppercase.
    pub fn code(&self) -> &str {
        &self.0
    }

    /// Minor-unit decimal places for rounding currency amounts at
    /// serialization time. JPY has none; everything else defaults to 2.
    pub fn decimal_places(&self) -> u32 {
        match self.0.as_str() {
            "JPY" => 0,
            _ => 2,
        }
    }
}

impl FromStr for Currency {
    type Err = RiskEngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        if upper.len() != 3 || !upper.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(RiskEngineError::InputValidation(format!(
                "invalid currency code: '{s}'"
            )));
        }
        Ok(Currency(upper))
    }
}

impl TryFrom<String> for Currency {
    type Error = RiskEngineError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Currency> for String {
    fn from(c: Currency) -> Self {
        c.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A currency pair, quoted as `base/quote` (e.g. `EUR/USD` means "units of
/// USD per one EUR").
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct CurrencyPair {
    /// Base currency of the quote.
    pub base: Currency,
    /// Quote (price) currency.
    pub quote: Currency,
}

impl CurrencyPair {
    /// Construct a currency pair.
    pub fn new(base: Currency, quote: Currency) -> Self {
        Self { base, quote }
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("usd".parse::<Currency>().unwrap().code(), "USD");
        assert_eq!("USD".parse::<Currency>().unwrap().code(), "USD");
    }

    #[test]
    fn test_jpy_has_zero_decimal_places() {
        let jpy: Currency = "JPY".parse().unwrap();
        assert_eq!(jpy.decimal_places(), 0);
    }

    #[test]
    fn test_usd_has_two_decimal_places() {
        let usd: Currency = "USD".parse().unwrap();
        assert_eq!(usd.decimal_places(), 2);
    }

    #[test]
    fn test_rejects_malformed_code() {
        assert!("US".parse::<Currency>().is_err());
        assert!("US1".parse::<Currency>().is_err());
        assert!("USDOLLAR".parse::<Currency>().is_err());
    }

    #[test]
    fn test_pair_display() {
        let pair = CurrencyPair::new("EUR".parse().unwrap(), "USD".parse().unwrap());
        assert_eq!(pair.to_string(), "EUR/USD");
    }
}
