//! Rate persistence abstractions

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A persisted currency row, keyed by `code`.
///
/// A row may exist without a rate when the currency name was synced but no
/// rates were fetched yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRate {
    pub code: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub rate: Option<Decimal>,
    /// Unix timestamp of the rate, in seconds.
    #[serde(default)]
    pub rate_timestamp: Option<i64>,
}

impl StoredRate {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: None,
            rate: None,
            rate_timestamp: None,
        }
    }
}

#[async_trait]
pub trait RateStore: Send + Sync {
    /// All rows ordered by code.
    async fn load(&self) -> Result<Vec<StoredRate>>;

    async fn get(&self, code: &str) -> Result<Option<StoredRate>>;

    /// Inserts `row`, replacing any row with the same code.
    async fn put(&self, row: StoredRate) -> Result<()>;
}
