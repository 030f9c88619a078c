//! Conversion between two currencies of a [`RateTable`].
//!
//! Rates are relative to the table's base currency, so a conversion between
//! two non-base currencies pivots through the base. Every intermediate and
//! final value is truncated (rounded toward zero) to [`SCALE`] fractional
//! digits, which keeps results identical to a fixed-scale decimal pipeline.

use crate::core::rates::RateTable;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use thiserror::Error;

/// Fractional digits carried by every conversion result.
pub const SCALE: u32 = 12;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("Amount must not be negative")]
    InvalidAmount,
    #[error("There are no rates available for {from} and {to}")]
    CurrenciesUnavailable { from: String, to: String },
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),
    #[error("Conversion result is out of range")]
    Overflow,
}

impl ConversionError {
    /// Stable name of the failure, used in machine-readable output.
    pub fn kind(&self) -> &'static str {
        match self {
            ConversionError::InvalidAmount => "InvalidAmount",
            ConversionError::CurrenciesUnavailable { .. } => "CurrenciesUnavailable",
            ConversionError::UnknownCurrency(_) => "UnknownCurrency",
            ConversionError::Overflow => "Overflow",
        }
    }
}

pub type ConversionResult = Result<Decimal, ConversionError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub amount: Decimal,
    pub from: String,
    pub to: String,
}

/// Response body for callers that want the outcome as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ConversionResponse {
    Success {
        result: String,
    },
    Failure {
        #[serde(rename = "errorKind")]
        error_kind: String,
        message: String,
    },
}

impl From<&ConversionResult> for ConversionResponse {
    fn from(result: &ConversionResult) -> Self {
        match result {
            Ok(value) => ConversionResponse::Success {
                result: value.to_string(),
            },
            Err(e) => ConversionResponse::Failure {
                error_kind: e.kind().to_string(),
                message: e.to_string(),
            },
        }
    }
}

/// Borrows a rate table for the duration of one or more conversions.
pub struct Converter<'a> {
    table: &'a RateTable,
}

impl<'a> Converter<'a> {
    pub fn new(table: &'a RateTable) -> Self {
        Self { table }
    }

    pub fn convert(&self, amount: Decimal, from: &str, to: &str) -> ConversionResult {
        if amount < Decimal::ZERO {
            return Err(ConversionError::InvalidAmount);
        }
        if amount.is_zero() {
            return fixed(Decimal::ZERO);
        }
        if !self.table.has(from) || !self.table.has(to) {
            return Err(ConversionError::CurrenciesUnavailable {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        let base = self.table.base_currency();
        let result = if to == base {
            divide(amount, self.table.rate_of(from)?)?
        } else if from == base {
            multiply(amount, self.table.rate_of(to)?)?
        } else {
            let cross = divide(amount, self.table.rate_of(from)?)?;
            multiply(cross, self.table.rate_of(to)?)?
        };

        fixed(result)
    }

    pub fn convert_request(&self, request: &ConversionRequest) -> ConversionResult {
        self.convert(request.amount, &request.from, &request.to)
    }
}

/// Converts `amount` of `from` into `to` using `table`.
pub fn convert(table: &RateTable, amount: Decimal, from: &str, to: &str) -> ConversionResult {
    Converter::new(table).convert(amount, from, to)
}

/// Divides and truncates to [`SCALE`] digits.
///
/// `checked_div` rounds its quotient to fit the mantissa, which can carry
/// into the last kept digit. The quotient is stepped back when
/// `quotient * rate` exceeds `amount`. The product is split into whole and
/// fractional parts so that the check itself does not round.
fn divide(amount: Decimal, rate: Decimal) -> ConversionResult {
    let quotient = fixed(amount.checked_div(rate).ok_or(ConversionError::Overflow)?)?;

    let whole = quotient
        .trunc()
        .checked_mul(rate)
        .and_then(|w| w.checked_sub(amount));
    let fraction = quotient.fract().checked_mul(rate);
    let excess = whole
        .zip(fraction)
        .and_then(|(w, f)| w.checked_add(f))
        .ok_or(ConversionError::Overflow)?;

    if excess > Decimal::ZERO {
        return quotient
            .checked_sub(Decimal::new(1, SCALE))
            .ok_or(ConversionError::Overflow)
            .and_then(fixed);
    }
    Ok(quotient)
}

fn multiply(amount: Decimal, rate: Decimal) -> ConversionResult {
    amount
        .checked_mul(rate)
        .ok_or(ConversionError::Overflow)
        .and_then(fixed)
}

/// Truncates to [`SCALE`] digits and pads so the value always prints with
/// exactly that many. Values too large to carry all of them are out of range.
fn fixed(value: Decimal) -> ConversionResult {
    let mut value = value.round_dp_with_strategy(SCALE, RoundingStrategy::ToZero);
    value.rescale(SCALE);
    if value.scale() != SCALE {
        return Err(ConversionError::Overflow);
    }
    Ok(value)
}
