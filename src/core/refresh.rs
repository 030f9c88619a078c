//! Moves rates from a [`RateSource`] into a [`RateStore`] and builds rate
//! tables from what is stored.

use crate::core::config::AppConfig;
use crate::core::rates::{RateRecord, RateTable};
use crate::core::source::{RateSnapshot, RateSource};
use crate::core::store::{RateStore, StoredRate};
use anyhow::{Context, Result, bail};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Outcome of writing a rate snapshot to the store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RefreshReport {
    pub updated: Vec<String>,
    pub skipped: Vec<String>,
}

/// Stores the display names of the configured currencies.
pub async fn sync_currencies(
    source: &dyn RateSource,
    store: &dyn RateStore,
    config: &AppConfig,
) -> Result<usize> {
    let symbols = source
        .fetch_symbols()
        .await
        .context("Failed to fetch the list of currencies")?;
    store_names(store, config, &symbols).await
}

/// Fetches the latest rates of the configured currencies and stores them.
pub async fn refresh_rates(
    source: &dyn RateSource,
    store: &dyn RateStore,
    config: &AppConfig,
) -> Result<RefreshReport> {
    let snapshot = source
        .fetch_latest(&config.base, &config.currencies)
        .await
        .context("Failed to fetch the latest rates")?;
    store_snapshot(store, config, &snapshot).await
}

/// Syncs names and rates, fetching both concurrently.
pub async fn sync_all(
    source: &dyn RateSource,
    store: &dyn RateStore,
    config: &AppConfig,
) -> Result<(usize, RefreshReport)> {
    let (symbols, snapshot) = futures::try_join!(
        source.fetch_symbols(),
        source.fetch_latest(&config.base, &config.currencies)
    )
    .context("Failed to fetch currencies from the rate source")?;

    let named = store_names(store, config, &symbols).await?;
    let report = store_snapshot(store, config, &snapshot).await?;
    Ok((named, report))
}

async fn store_names(
    store: &dyn RateStore,
    config: &AppConfig,
    symbols: &BTreeMap<String, String>,
) -> Result<usize> {
    let mut count = 0;
    for code in &config.currencies {
        let Some(name) = symbols.get(code) else {
            warn!("Currency {} is not offered by the rate source", code);
            continue;
        };

        let mut row = store
            .get(code)
            .await?
            .unwrap_or_else(|| StoredRate::new(code.as_str()));
        row.name = Some(name.clone());
        store.put(row).await?;
        debug!("Stored name {} for {}", name, code);
        count += 1;
    }
    info!("Stored names for {} currencies", count);
    Ok(count)
}

async fn store_snapshot(
    store: &dyn RateStore,
    config: &AppConfig,
    snapshot: &RateSnapshot,
) -> Result<RefreshReport> {
    if snapshot.base != config.base {
        bail!(
            "Rate source answered with base {} but {} is configured",
            snapshot.base,
            config.base
        );
    }

    let timestamp = snapshot.as_of.timestamp();
    let mut report = RefreshReport::default();

    for record in &snapshot.rates {
        let admissible = record.rate > Decimal::ZERO
            && (record.code != config.base || record.rate == Decimal::ONE);
        if !admissible {
            warn!(
                "Skipping malformed rate {} for {}",
                record.rate, record.code
            );
            report.skipped.push(record.code.clone());
            continue;
        }
        upsert_rate(store, &record.code, record.rate, timestamp).await?;
        report.updated.push(record.code.clone());
    }

    if !report.updated.contains(&config.base) {
        upsert_rate(store, &config.base, Decimal::ONE, timestamp).await?;
        report.updated.push(config.base.clone());
    }

    info!(
        "Stored {} rates, skipped {}",
        report.updated.len(),
        report.skipped.len()
    );
    Ok(report)
}

async fn upsert_rate(store: &dyn RateStore, code: &str, rate: Decimal, timestamp: i64) -> Result<()> {
    let mut row = store
        .get(code)
        .await?
        .unwrap_or_else(|| StoredRate::new(code));
    row.rate = Some(rate);
    row.rate_timestamp = Some(timestamp);
    store.put(row).await
}

/// Builds a rate table from the stored rows. Rows without a usable rate are
/// left out and logged.
pub async fn load_table(store: &dyn RateStore, base: &str) -> Result<RateTable> {
    let rows = store.load().await.context("Failed to load stored rates")?;

    let records = rows.into_iter().filter_map(|row| match row.rate {
        None => {
            debug!("No rate stored for {}", row.code);
            None
        }
        Some(rate) if rate <= Decimal::ZERO => {
            warn!("Ignoring malformed stored rate {} for {}", rate, row.code);
            None
        }
        Some(rate) if row.code == base && rate != Decimal::ONE => {
            warn!("Ignoring stored rate {} for base currency {}", rate, base);
            None
        }
        Some(rate) => Some(RateRecord::new(row.code, rate)),
    });

    let records: Vec<RateRecord> = records.collect();
    debug!("Loaded {} rates relative to {}", records.len(), base);
    RateTable::new(base, records).context("Failed to build the rate table")
}
