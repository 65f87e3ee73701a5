// Accounting Ledger
//
// Cumulative money spent per buyer. Entries are created lazily on the
// first charge and only ever grow.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::money::{Currency, Money, MoneyError};

/// Ledger table, ordered by buyer name (case-sensitive).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    spent: BTreeMap<String, Money>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total spent by `buyer`, if they have ever been charged.
    pub fn spent(&self, buyer: &str) -> Option<&Money> {
        self.spent.get(buyer)
    }

    /// Add `price` to the running total of `buyer` and return the new total.
    ///
    /// A buyer without an entry starts from zero in `currency`. Nothing is
    /// written if the addition fails.
    pub fn charge(
        &mut self,
        buyer: &str,
        price: &Money,
        currency: &Currency,
    ) -> Result<Money, MoneyError> {
        let total = match self.spent.get(buyer) {
            Some(current) => current.checked_add(price)?,
            None => Money::zero(currency.clone()).checked_add(price)?,
        };
        self.spent.insert(buyer.to_string(), total.clone());
        Ok(total)
    }

    /// Entries in ascending buyer-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Money)> {
        self.spent.iter().map(|(buyer, money)| (buyer.as_str(), money))
    }

    pub fn len(&self) -> usize {
        self.spent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spent.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jpy(text: &str) -> Money {
        Money::parse(&format!("JPY {text}")).unwrap()
    }

    #[test]
    fn first_charge_creates_entry() {
        let mut ledger = Ledger::new();
        assert!(ledger.spent("alice").is_none());

        let total = ledger.charge("alice", &jpy("1.00"), &Currency::jpy()).unwrap();
        assert_eq!(total, jpy("1.00"));
        assert_eq!(ledger.spent("alice"), Some(&jpy("1.00")));
    }

    #[test]
    fn charges_accumulate_per_buyer() {
        let mut ledger = Ledger::new();
        ledger.charge("alice", &jpy("1.00"), &Currency::jpy()).unwrap();
        ledger.charge("bob", &jpy("5"), &Currency::jpy()).unwrap();
        ledger.charge("alice", &jpy("1.00"), &Currency::jpy()).unwrap();

        assert_eq!(ledger.spent("alice"), Some(&jpy("2.00")));
        assert_eq!(ledger.spent("bob"), Some(&jpy("5")));
        assert!(ledger.spent("Alice").is_none());

        let names: Vec<_> = ledger.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["alice", "bob"]);
    }

    #[test]
    fn mismatched_currency_leaves_ledger_untouched() {
        let mut ledger = Ledger::new();
        let usd = Money::parse("USD 1.0").unwrap();

        let err = ledger.charge("alice", &usd, &Currency::jpy()).unwrap_err();
        assert!(matches!(err, MoneyError::CurrencyMismatch { .. }));
        assert!(ledger.is_empty());
    }
}
