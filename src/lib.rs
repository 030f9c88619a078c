pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::AppConfig;
use crate::core::store::RateStore;
use crate::providers::FixerProvider;
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use tracing::{debug, info};

pub enum AppCommand {
    Sync,
    Refresh,
    Rates,
    Convert {
        amount: Decimal,
        from: String,
        to: String,
        json: bool,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fxc starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let store = store::open_store(&config)?;
    execute(command, &config, &store).await
}

/// Runs a command against an already opened store.
pub async fn execute(command: AppCommand, config: &AppConfig, store: &dyn RateStore) -> Result<()> {
    match command {
        AppCommand::Sync => {
            let source = rate_source(config)?;
            cli::refresh::run_sync(&source, store, config).await?;
            Ok(())
        }
        AppCommand::Refresh => {
            let source = rate_source(config)?;
            cli::refresh::run_refresh(&source, store, config).await?;
            Ok(())
        }
        AppCommand::Rates => cli::rates::run(store, config).await,
        AppCommand::Convert {
            amount,
            from,
            to,
            json,
        } => cli::convert::run(store, &config.base, amount, &from, &to, json).await,
    }
}

fn rate_source(config: &AppConfig) -> Result<FixerProvider> {
    let api_key = config.api_key().context(
        "No API key is provided. Set providers.fixer.api_key in the configuration file.",
    )?;
    FixerProvider::new(&config.providers.fixer.base_url, api_key)
}
