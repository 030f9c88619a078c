use super::ui;
use crate::core::config::AppConfig;
use crate::core::store::{RateStore, StoredRate};
use anyhow::Result;
use chrono::DateTime;
use comfy_table::Cell;

/// Renders the stored currencies as a table.
pub fn display_rates(rows: &[StoredRate], base: &str) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell("Code"),
        ui::header_cell(&format!("Rate (1 {base})")),
        ui::header_cell("Last update"),
    ]);

    for row in rows {
        let name = row.name.clone().unwrap_or_else(|| row.code.clone());
        let rate = ui::format_optional_cell(row.rate, |r| r.normalize().to_string());
        let updated = ui::format_optional_cell(
            row.rate_timestamp
                .and_then(|ts| DateTime::from_timestamp(ts, 0)),
            |dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        );
        table.add_row(vec![Cell::new(name), Cell::new(&row.code), rate, updated]);
    }

    format!(
        "Rates relative to {}\n\n{}",
        ui::style_text(base, ui::StyleType::Title),
        table
    )
}

pub async fn run(store: &dyn RateStore, config: &AppConfig) -> Result<()> {
    if config.api_key().is_none() {
        println!(
            "{}",
            ui::style_text(
                "You need to add an API key (providers.fixer.api_key) to be able to sync and refresh rates.",
                ui::StyleType::Warning
            )
        );
    }

    let rows = store.load().await?;
    if rows.is_empty() {
        println!(
            "{}",
            ui::style_text(
                "Unable to load currencies. Run `fxc sync` first.",
                ui::StyleType::Error
            )
        );
        return Ok(());
    }

    println!("{}", display_rates(&rows, &config.base));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_display_rates() {
        let rows = vec![
            StoredRate {
                code: "EUR".to_string(),
                name: Some("Euro".to_string()),
                rate: Some(dec!(1)),
                rate_timestamp: Some(1_700_000_000),
            },
            StoredRate {
                code: "USD".to_string(),
                name: Some("United States Dollar".to_string()),
                rate: Some(dec!(1.087200)),
                rate_timestamp: Some(1_700_000_000),
            },
            StoredRate::new("GBP"),
        ];

        let output = console::strip_ansi_codes(&display_rates(&rows, "EUR")).to_string();

        assert!(output.contains("Rates relative to EUR"));
        assert!(output.contains("Rate (1 EUR)"));
        assert!(output.contains("United States Dollar"));
        assert!(output.contains("1.0872"));
        assert!(!output.contains("1.087200"));
        assert!(output.contains("2023-11-14 22:13:20 UTC"));
        // GBP has neither a name nor a rate
        assert!(output.contains("GBP"));
        assert!(output.contains("N/A"));
    }
}
