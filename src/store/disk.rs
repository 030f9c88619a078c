use crate::core::store::{RateStore, StoredRate};
use anyhow::{Context, Result};
use async_trait::async_trait;
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::debug;

const PARTITION: &str = "rates";

/// Rate store backed by a fjall partition. Rows are stored as JSON under
/// their currency code.
pub struct DiskRateStore {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskRateStore {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;

        let keyspace = Config::new(path)
            .open()
            .with_context(|| format!("Failed to open rate store at {}", path.display()))?;
        let partition = keyspace
            .open_partition(PARTITION, PartitionCreateOptions::default())
            .context("Failed to open rates partition")?;
        debug!("Opened rate store at {}", path.display());

        Ok(Self {
            keyspace,
            partition,
        })
    }

    fn persist(&self) -> Result<()> {
        self.keyspace
            .persist(PersistMode::SyncAll)
            .context("Failed to persist rate store")
    }
}

#[async_trait]
impl RateStore for DiskRateStore {
    async fn load(&self) -> Result<Vec<StoredRate>> {
        let mut rows = Vec::new();
        for item in self.partition.iter() {
            let (key, value) = item?;
            let row: StoredRate = serde_json::from_slice(&value).with_context(|| {
                format!(
                    "Failed to parse stored rate for {}",
                    String::from_utf8_lossy(&key)
                )
            })?;
            rows.push(row);
        }
        debug!("Loaded {} stored rates", rows.len());
        Ok(rows)
    }

    async fn get(&self, code: &str) -> Result<Option<StoredRate>> {
        match self.partition.get(code)? {
            Some(value) => {
                debug!("Store HIT for code: {}", code);
                let row = serde_json::from_slice(&value)
                    .with_context(|| format!("Failed to parse stored rate for {code}"))?;
                Ok(Some(row))
            }
            None => {
                debug!("Store MISS for code: {}", code);
                Ok(None)
            }
        }
    }

    async fn put(&self, row: StoredRate) -> Result<()> {
        self.partition
            .insert(row.code.as_str(), serde_json::to_vec(&row)?)?;
        debug!("Store PUT for code: {}", row.code);
        self.persist()
    }
}
