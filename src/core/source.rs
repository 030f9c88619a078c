//! Rate source abstractions

use crate::core::rates::RateRecord;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Latest rates published by a source, relative to `base`.
#[derive(Debug, Clone, PartialEq)]
pub struct RateSnapshot {
    pub base: String,
    pub rates: Vec<RateRecord>,
    pub as_of: DateTime<Utc>,
}

#[async_trait]
pub trait RateSource: Send + Sync {
    /// Currency codes the source supports, mapped to their display names.
    async fn fetch_symbols(&self) -> Result<BTreeMap<String, String>>;

    /// Latest rates of `symbols` relative to `base`.
    async fn fetch_latest(&self, base: &str, symbols: &[String]) -> Result<RateSnapshot>;
}
