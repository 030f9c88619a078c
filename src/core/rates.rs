//! Rate table: base-relative exchange rates keyed by currency code.

use crate::core::convert::ConversionError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;

/// Rate of one unit of the base currency expressed in `code`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateRecord {
    pub code: String,
    pub rate: Decimal,
}

impl RateRecord {
    pub fn new(code: impl Into<String>, rate: Decimal) -> Self {
        Self {
            code: code.into(),
            rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateTableError {
    #[error("Malformed rate {rate} for currency {code}")]
    MalformedRate { code: String, rate: Decimal },
    #[error("Base currency {code} must have a rate of exactly 1, got {rate}")]
    BaseRateMismatch { code: String, rate: Decimal },
}

/// Immutable snapshot of rates relative to a single base currency.
///
/// The base currency is only known when a record for it was supplied, and
/// that record must carry a rate of exactly 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateTable {
    base_currency: String,
    rates: HashMap<String, Decimal>,
}

impl RateTable {
    /// Builds a table from `records`. A later record for the same code
    /// replaces an earlier one.
    pub fn new<I>(base_currency: impl Into<String>, records: I) -> Result<Self, RateTableError>
    where
        I: IntoIterator<Item = RateRecord>,
    {
        let base_currency = base_currency.into();
        let mut rates = HashMap::new();

        for record in records {
            if record.rate <= Decimal::ZERO {
                return Err(RateTableError::MalformedRate {
                    code: record.code,
                    rate: record.rate,
                });
            }
            rates.insert(record.code, record.rate);
        }

        if let Some(rate) = rates.get(&base_currency)
            && *rate != Decimal::ONE
        {
            return Err(RateTableError::BaseRateMismatch {
                code: base_currency,
                rate: *rate,
            });
        }

        Ok(Self {
            base_currency,
            rates,
        })
    }

    /// A table that knows no currency at all.
    pub fn empty(base_currency: impl Into<String>) -> Self {
        Self {
            base_currency: base_currency.into(),
            rates: HashMap::new(),
        }
    }

    pub fn has(&self, code: &str) -> bool {
        self.rates.contains_key(code)
    }

    pub fn rate_of(&self, code: &str) -> Result<Decimal, ConversionError> {
        self.rates
            .get(code)
            .copied()
            .ok_or_else(|| ConversionError::UnknownCurrency(code.to_string()))
    }

    pub fn base_currency(&self) -> &str {
        &self.base_currency
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Known codes in lexical order.
    pub fn codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.rates.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }
}

/// Handle to the current rate table that can be replaced while readers
/// hold on to older snapshots.
#[derive(Debug, Clone)]
pub struct SharedRates {
    inner: Arc<RwLock<Arc<RateTable>>>,
}

impl SharedRates {
    pub fn new(table: RateTable) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(table))),
        }
    }

    /// The table current at the time of the call.
    pub fn snapshot(&self) -> Arc<RateTable> {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Swaps in `table` and returns the one it replaced.
    pub fn replace(&self, table: RateTable) -> Arc<RateTable> {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, Arc::new(table))
    }

    /// Converts against a single snapshot of the current table.
    pub fn convert(
        &self,
        amount: Decimal,
        from: &str,
        to: &str,
    ) -> crate::core::convert::ConversionResult {
        crate::core::convert::convert(&self.snapshot(), amount, from, to)
    }
}
