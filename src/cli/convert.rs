use super::ui;
use crate::core::convert::{ConversionResponse, ConversionResult, Converter};
use crate::core::refresh::load_table;
use crate::core::store::RateStore;
use anyhow::{Context, Result};
use rust_decimal::Decimal;

/// Converts with the stored rates and returns the outcome as printed.
pub async fn convert_stored(
    store: &dyn RateStore,
    base: &str,
    amount: Decimal,
    from: &str,
    to: &str,
) -> Result<ConversionResult> {
    let table = load_table(store, base).await?;
    Ok(Converter::new(&table).convert(amount, from, to))
}

pub fn format_outcome(result: &ConversionResult, json: bool) -> Result<String> {
    if json {
        return serde_json::to_string(&ConversionResponse::from(result))
            .context("Failed to serialize conversion result");
    }
    Ok(match result {
        Ok(value) => value.to_string(),
        Err(e) => ui::style_text(&e.to_string(), ui::StyleType::Error),
    })
}

pub async fn run(
    store: &dyn RateStore,
    base: &str,
    amount: Decimal,
    from: &str,
    to: &str,
    json: bool,
) -> Result<()> {
    let result = convert_stored(store, base, amount, from, to).await?;
    println!("{}", format_outcome(&result, json)?);

    result
        .map(|_| ())
        .with_context(|| format!("Cannot convert {amount} {from} to {to}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::convert::ConversionError;
    use crate::core::store::StoredRate;
    use crate::store::memory::MemoryRateStore;
    use rust_decimal_macros::dec;

    async fn store() -> MemoryRateStore {
        let store = MemoryRateStore::new();
        for (code, rate) in [("EUR", dec!(1)), ("USD", dec!(2)), ("GBP", dec!(4))] {
            let mut row = StoredRate::new(code);
            row.rate = Some(rate);
            store.put(row).await.unwrap();
        }
        store.put(StoredRate::new("JPY")).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_convert_stored() {
        let store = store().await;

        let result = convert_stored(&store, "EUR", dec!(10), "USD", "GBP")
            .await
            .unwrap();
        assert_eq!(result.unwrap().to_string(), "20.000000000000");

        // JPY has a row but no rate yet
        let result = convert_stored(&store, "EUR", dec!(10), "JPY", "GBP")
            .await
            .unwrap();
        assert!(matches!(
            result,
            Err(ConversionError::CurrenciesUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_run_fails_on_conversion_error() {
        let store = store().await;

        let err = run(&store, "EUR", dec!(-1), "USD", "GBP", false)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Cannot convert -1 USD to GBP");
        assert_eq!(
            err.root_cause().to_string(),
            "Amount must not be negative"
        );

        assert!(run(&store, "EUR", dec!(1), "USD", "GBP", true).await.is_ok());
    }

    #[test]
    fn test_format_outcome() {
        let ok: ConversionResult = Ok(dec!(5.000000000000));
        assert_eq!(format_outcome(&ok, false).unwrap(), "5.000000000000");
        assert_eq!(
            format_outcome(&ok, true).unwrap(),
            r#"{"result":"5.000000000000"}"#
        );

        let err: ConversionResult = Err(ConversionError::CurrenciesUnavailable {
            from: "AAA".to_string(),
            to: "BBB".to_string(),
        });
        assert_eq!(
            format_outcome(&err, true).unwrap(),
            r#"{"errorKind":"CurrenciesUnavailable","message":"There are no rates available for AAA and BBB"}"#
        );
    }
}
