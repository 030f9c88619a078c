//! Property-based tests for the conversion engine.

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use super::convert::{ConversionError, convert};
use super::rates::{RateRecord, RateTable, SharedRates};

const CODES: [&str; 4] = ["B", "X", "Y", "Z"];

/// Positive amounts from 0.01 to 1,000,000.00.
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Negative amounts from -1,000,000.00 to -0.01.
fn negative_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(-cents, 2))
}

/// Rates between 0.5 and 5 with four decimals, the range the round trip
/// tolerance below is valid for.
fn moderate_rate() -> impl Strategy<Value = Decimal> {
    (5_000i64..50_000i64).prop_map(|v| Decimal::new(v, 4))
}

fn rate_table() -> impl Strategy<Value = RateTable> {
    (moderate_rate(), moderate_rate(), moderate_rate()).prop_map(|(x, y, z)| {
        RateTable::new(
            "B",
            vec![
                RateRecord::new("B", Decimal::ONE),
                RateRecord::new("X", x),
                RateRecord::new("Y", y),
                RateRecord::new("Z", z),
            ],
        )
        .unwrap()
    })
}

/// Rates whose reciprocal has a short decimal expansion, so the pivot
/// through the base loses nothing at 12 digits.
fn terminating_rate() -> impl Strategy<Value = Decimal> {
    prop::sample::select(vec![
        dec!(0.25),
        dec!(0.5),
        dec!(0.8),
        dec!(1.25),
        dec!(2),
        dec!(4),
        dec!(5),
    ])
}

fn code() -> impl Strategy<Value = &'static str> {
    (0usize..CODES.len()).prop_map(|i| CODES[i])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Zero converts to zero for any pair of codes, known or not.
    #[test]
    fn prop_zero_short_circuits(
        table in rate_table(),
        from in "[A-Z]{1,4}",
        to in "[A-Z]{1,4}",
    ) {
        let result = convert(&table, Decimal::ZERO, &from, &to);
        prop_assert_eq!(result, Ok(Decimal::ZERO));
    }

    /// Negative amounts are rejected before currencies are looked at.
    #[test]
    fn prop_negative_amount_rejected(
        table in rate_table(),
        amount in negative_amount(),
        from in "[A-Z]{1,4}",
        to in "[A-Z]{1,4}",
    ) {
        let result = convert(&table, amount, &from, &to);
        prop_assert_eq!(result, Err(ConversionError::InvalidAmount));
    }

    /// Converting there and back lands within 1e-10 of the start.
    #[test]
    fn prop_round_trip_is_close(
        table in rate_table(),
        amount in positive_amount(),
        from in code(),
        to in code(),
    ) {
        let there = convert(&table, amount, from, to).unwrap();
        let back = convert(&table, there, to, from).unwrap();
        let drift = (back - amount).abs();
        prop_assert!(
            drift <= dec!(0.0000000001),
            "{} {} -> {} -> {} drifted by {}",
            amount, from, to, back, drift
        );
    }

    /// The base converted to itself keeps its amount.
    #[test]
    fn prop_base_self_conversion_is_identity(
        table in rate_table(),
        amount in positive_amount(),
    ) {
        let result = convert(&table, amount, "B", "B").unwrap();
        prop_assert_eq!(result, amount);
        prop_assert_eq!(result.scale(), 12);
    }

    /// A non-base currency converted to itself keeps its amount when the
    /// pivot through the base divides exactly.
    #[test]
    fn prop_self_conversion_with_exact_pivot_is_identity(
        rate in terminating_rate(),
        amount in positive_amount(),
    ) {
        let table = RateTable::new(
            "B",
            vec![RateRecord::new("B", Decimal::ONE), RateRecord::new("X", rate)],
        )
        .unwrap();
        let result = convert(&table, amount, "X", "X").unwrap();
        prop_assert_eq!(result, amount);
    }

    /// Results always carry exactly 12 fractional digits.
    #[test]
    fn prop_results_have_fixed_scale(
        table in rate_table(),
        amount in positive_amount(),
        from in code(),
        to in code(),
    ) {
        let result = convert(&table, amount, from, to).unwrap();
        prop_assert_eq!(result.scale(), 12);
        prop_assert!(result > Decimal::ZERO);
    }
}

#[test]
fn test_replacement_is_never_observed_half_done() {
    let first = RateTable::new(
        "B",
        vec![
            RateRecord::new("B", dec!(1)),
            RateRecord::new("X", dec!(2)),
            RateRecord::new("Y", dec!(4)),
        ],
    )
    .unwrap();
    let second = RateTable::new(
        "B",
        vec![
            RateRecord::new("B", dec!(1)),
            RateRecord::new("X", dec!(4)),
            RateRecord::new("Y", dec!(2)),
        ],
    )
    .unwrap();

    let shared = SharedRates::new(first.clone());
    let done = Arc::new(AtomicBool::new(false));

    let writer = {
        let shared = shared.clone();
        let done = Arc::clone(&done);
        thread::spawn(move || {
            for i in 0..2_000 {
                let next = if i % 2 == 0 {
                    second.clone()
                } else {
                    first.clone()
                };
                shared.replace(next);
            }
            done.store(true, Ordering::SeqCst);
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let shared = shared.clone();
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut seen = 0usize;
                while !done.load(Ordering::SeqCst) || seen == 0 {
                    let result = shared.convert(dec!(10), "X", "Y").unwrap();
                    // a mix of both tables would give 10
                    assert!(
                        result == dec!(20) || result == dec!(5),
                        "unexpected result {result}"
                    );
                    seen += 1;
                }
                seen
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        assert!(reader.join().unwrap() > 0);
    }
}
