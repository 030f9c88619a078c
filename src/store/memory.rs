use crate::core::store::{RateStore, StoredRate};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory rate store, ordered by currency code.
#[derive(Clone, Default)]
pub struct MemoryRateStore {
    inner: Arc<Mutex<BTreeMap<String, StoredRate>>>,
}

impl MemoryRateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateStore for MemoryRateStore {
    async fn load(&self) -> Result<Vec<StoredRate>> {
        let rows = self.inner.lock().await;
        Ok(rows.values().cloned().collect())
    }

    async fn get(&self, code: &str) -> Result<Option<StoredRate>> {
        let rows = self.inner.lock().await;
        Ok(rows.get(code).cloned())
    }

    async fn put(&self, row: StoredRate) -> Result<()> {
        let mut rows = self.inner.lock().await;
        debug!("Store PUT for code: {}", row.code);
        rows.insert(row.code.clone(), row);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_store_get_put() {
        let store = MemoryRateStore::new();

        // Initially, store is empty
        assert!(store.get("USD").await.unwrap().is_none());

        let mut row = StoredRate::new("USD");
        row.rate = Some(dec!(1.1));
        store.put(row.clone()).await.unwrap();

        assert_eq!(store.get("USD").await.unwrap(), Some(row));
        assert!(store.get("EUR").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_put_replaces() {
        let store = MemoryRateStore::new();
        store.put(StoredRate::new("USD")).await.unwrap();

        let mut row = StoredRate::new("USD");
        row.name = Some("US Dollar".to_string());
        store.put(row).await.unwrap();

        let rows = store.load().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name.as_deref(), Some("US Dollar"));
    }

    #[tokio::test]
    async fn test_store_load_is_ordered() {
        let store = MemoryRateStore::new();
        for code in ["USD", "EUR", "GBP"] {
            store.put(StoredRate::new(code)).await.unwrap();
        }

        let codes: Vec<String> = store
            .load()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.code)
            .collect();
        assert_eq!(codes, vec!["EUR", "GBP", "USD"]);
    }
}
