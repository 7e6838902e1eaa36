//! Decimal prices and their display formatting.
//!
//! The backend stores amounts as decimal strings without a currency; the
//! dealership's currency is a deployment setting, so a [`Price`] is built at
//! render time from an amount and the configured [`CurrencyCode`].

use core::fmt;
use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Format for display, e.g. `$45,990.00` or `R$ 45.990,00`.
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let negative = rounded.is_sign_negative() && !rounded.is_zero();
        let text = format!("{:.2}", rounded.abs());
        let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

        let (group_sep, decimal_sep) = self.currency_code.separators();
        let grouped = group_thousands(whole, group_sep);
        let sign = if negative { "-" } else { "" };

        format!(
            "{sign}{}{grouped}{decimal_sep}{cents}",
            self.currency_code.prefix()
        )
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

fn group_thousands(digits: &str, separator: char) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}

/// Currencies the dealership can be configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    BRL,
    EUR,
}

impl CurrencyCode {
    /// Symbol printed before the amount.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::USD => "$",
            Self::BRL => "R$ ",
            Self::EUR => "€",
        }
    }

    /// Thousands and decimal separators for this currency's locale.
    const fn separators(self) -> (char, char) {
        match self {
            Self::USD => (',', '.'),
            Self::BRL | Self::EUR => ('.', ','),
        }
    }
}

/// Error returned for an unknown currency code.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unsupported currency code: {0}")]
pub struct UnknownCurrency(pub String);

impl FromStr for CurrencyCode {
    type Err = UnknownCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Self::USD),
            "BRL" => Ok(Self::BRL),
            "EUR" => Ok(Self::EUR),
            other => Err(UnknownCurrency(other.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_display_usd() {
        let price = Price::new(dec("45990"), CurrencyCode::USD);
        assert_eq!(price.display(), "$45,990.00");
    }

    #[test]
    fn test_display_brl() {
        let price = Price::new(dec("1234567.891"), CurrencyCode::BRL);
        assert_eq!(price.display(), "R$ 1.234.567,89");
    }

    #[test]
    fn test_display_small_and_negative() {
        assert_eq!(Price::new(dec("999.5"), CurrencyCode::USD).display(), "$999.50");
        assert_eq!(Price::new(dec("-1500"), CurrencyCode::EUR).display(), "-€1.500,00");
        assert_eq!(Price::new(Decimal::ZERO, CurrencyCode::USD).display(), "$0.00");
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!("brl".parse::<CurrencyCode>().unwrap(), CurrencyCode::BRL);
        assert!("XYZ".parse::<CurrencyCode>().is_err());
    }
}
