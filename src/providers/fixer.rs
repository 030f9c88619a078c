use crate::core::rates::RateRecord;
use crate::core::source::{RateSnapshot, RateSource};
use crate::providers::util::{RetryPolicy, with_retry};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use tracing::{debug, instrument, warn};

/// Rate source for Fixer-style `latest` and `symbols` endpoints.
pub struct FixerProvider {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl FixerProvider {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("fxc/1.0")
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str, query: &str) -> Result<T> {
        let url = format!(
            "{}/{}?access_key={}{}",
            self.base_url, endpoint, self.api_key, query
        );
        debug!("Requesting {} from {}", endpoint, self.base_url);

        let response = with_retry(|| self.client.get(&url).send(), self.retry)
            .await
            .with_context(|| format!("Request to {endpoint} failed"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("HTTP error: {} for {}", status, endpoint));
        }

        let text = response
            .text()
            .await
            .with_context(|| format!("Failed to get response text for {endpoint}"))?;

        serde_json::from_str(&text).with_context(|| {
            format!("Failed to parse {endpoint} response. Response: '{text}'")
        })
    }
}

#[derive(Debug, Deserialize)]
struct FixerError {
    code: i64,
    #[serde(rename = "type")]
    kind: Option<String>,
    info: Option<String>,
}

impl FixerError {
    fn into_error(self) -> anyhow::Error {
        let kind = self.kind.unwrap_or_else(|| "unknown_error".to_string());
        match self.info {
            Some(info) => anyhow!("{} -> {}: {}", self.code, kind, info),
            None => anyhow!("{} -> {}", self.code, kind),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LatestResponse {
    success: bool,
    timestamp: Option<i64>,
    base: Option<String>,
    #[serde(default)]
    rates: BTreeMap<String, serde_json::Value>,
    error: Option<FixerError>,
}

#[derive(Debug, Deserialize)]
struct SymbolsResponse {
    success: bool,
    #[serde(default)]
    symbols: BTreeMap<String, String>,
    error: Option<FixerError>,
}

fn failure(error: Option<FixerError>) -> anyhow::Error {
    error
        .map(FixerError::into_error)
        .unwrap_or_else(|| anyhow!("Rate source reported an unspecified error"))
}

/// Reads a rate given as a JSON number or numeric string.
fn parse_rate(value: &serde_json::Value) -> Option<Decimal> {
    let text = match value {
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    text.parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

#[async_trait]
impl RateSource for FixerProvider {
    #[instrument(name = "FixerSymbols", skip(self))]
    async fn fetch_symbols(&self) -> Result<BTreeMap<String, String>> {
        let data: SymbolsResponse = self.get_json("symbols", "").await?;
        if !data.success {
            return Err(failure(data.error));
        }
        debug!("Received {} symbols", data.symbols.len());
        Ok(data.symbols)
    }

    #[instrument(name = "FixerLatest", skip(self, symbols), fields(base = %base))]
    async fn fetch_latest(&self, base: &str, symbols: &[String]) -> Result<RateSnapshot> {
        let mut query = format!("&base={base}");
        if !symbols.is_empty() {
            query.push_str("&symbols=");
            query.push_str(&symbols.join(","));
        }

        let data: LatestResponse = self.get_json("latest", &query).await?;
        if !data.success {
            return Err(failure(data.error));
        }

        let rates = data
            .rates
            .into_iter()
            .filter_map(|(code, value)| match parse_rate(&value) {
                Some(rate) => Some(RateRecord::new(code, rate)),
                None => {
                    warn!("Skipping non-numeric rate {} for {}", value, code);
                    None
                }
            })
            .collect::<Vec<_>>();

        let as_of = data
            .timestamp
            .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
            .unwrap_or_else(|| {
                debug!("No usable timestamp in response, using current time");
                Utc::now()
            });

        debug!("Received {} rates relative to {}", rates.len(), base);
        Ok(RateSnapshot {
            base: data.base.unwrap_or_else(|| base.to_string()),
            rates,
            as_of,
        })
    }
}
