use super::ui;
use crate::core::config::AppConfig;
use crate::core::refresh::{self, RefreshReport};
use crate::core::source::RateSource;
use crate::core::store::RateStore;
use anyhow::Result;

fn report_lines(report: &RefreshReport) -> String {
    let mut output = format!(
        "Updated rates for {}",
        ui::style_text(&report.updated.join(", "), ui::StyleType::Value)
    );
    if !report.skipped.is_empty() {
        output.push_str(&format!(
            "\nSkipped malformed rates for {}",
            ui::style_text(&report.skipped.join(", "), ui::StyleType::Warning)
        ));
    }
    output
}

/// Fetches the latest rates and stores them.
pub async fn run_refresh(
    source: &dyn RateSource,
    store: &dyn RateStore,
    config: &AppConfig,
) -> Result<RefreshReport> {
    let pb = ui::new_spinner("Fetching latest rates...");
    let result = refresh::refresh_rates(source, store, config).await;
    pb.finish_and_clear();

    let report = result?;
    println!("{}", report_lines(&report));
    Ok(report)
}

/// Stores currency names and latest rates.
pub async fn run_sync(
    source: &dyn RateSource,
    store: &dyn RateStore,
    config: &AppConfig,
) -> Result<RefreshReport> {
    let pb = ui::new_spinner("Syncing currencies...");
    let result = refresh::sync_all(source, store, config).await;
    pb.finish_and_clear();

    let (named, report) = result?;
    println!(
        "Created or updated {} currency entries",
        ui::style_text(&named.to_string(), ui::StyleType::Value)
    );
    println!("{}", report_lines(&report));
    Ok(report)
}
