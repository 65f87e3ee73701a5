// Monetary Amounts
//
// A decimal magnitude tagged with a currency code. Only addition within
// one currency is supported; the store never subtracts money.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Three-letter currency code, always upper case.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    pub fn new(code: &str) -> Result<Self, MoneyError> {
        let code = code.trim();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(MoneyError::InvalidCurrency(code.to_string()));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    /// Japanese yen, the ledger currency used when none is configured.
    pub fn jpy() -> Self {
        Self("JPY".into())
    }

    pub fn code(&self) -> &str {
        &self.0
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::jpy()
    }
}

impl TryFrom<String> for Currency {
    type Error = MoneyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Currency> for String {
    fn from(value: Currency) -> Self {
        value.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("malformed money value: {0:?} (expected `<CODE> <amount>`)")]
    Malformed(String),

    #[error("invalid currency code: {0:?}")]
    InvalidCurrency(String),

    #[error("invalid amount: {0:?}")]
    InvalidAmount(String),

    #[error("currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: Currency, right: Currency },

    #[error("amount overflow: {left} + {right}")]
    Overflow { left: Decimal, right: Decimal },
}

/// An amount of money in a single currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub amount: Decimal,
    pub currency: Currency,
}

impl Money {
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency,
        }
    }

    /// Parse `"<CODE> <amount>"`, e.g. `"JPY 1.0"`.
    pub fn parse(text: &str) -> Result<Self, MoneyError> {
        let mut parts = text.split_whitespace();
        let (code, amount) = match (parts.next(), parts.next(), parts.next()) {
            (Some(code), Some(amount), None) => (code, amount),
            _ => return Err(MoneyError::Malformed(text.to_string())),
        };

        let currency = Currency::new(code)?;
        let amount = Decimal::from_str(amount)
            .map_err(|_| MoneyError::InvalidAmount(amount.to_string()))?;

        Ok(Self { amount, currency })
    }

    /// Add two amounts of the same currency. Fails instead of overflowing.
    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch {
                left: self.currency.clone(),
                right: other.currency.clone(),
            });
        }

        let amount = self
            .amount
            .checked_add(other.amount)
            .ok_or(MoneyError::Overflow {
                left: self.amount,
                right: other.amount,
            })?;

        Ok(Money {
            amount,
            currency: self.currency.clone(),
        })
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.currency, self.amount)
    }
}
