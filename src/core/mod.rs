//! Core business logic abstractions

pub mod config;
pub mod convert;
pub mod log;
pub mod rates;
pub mod refresh;
pub mod source;
pub mod store;

#[cfg(test)]
mod convert_props;

// Re-export main types for cleaner imports
pub use convert::{ConversionError, ConversionResult, Converter, convert};
pub use rates::{RateRecord, RateTable, RateTableError, SharedRates};
pub use source::{RateSnapshot, RateSource};
pub use store::{RateStore, StoredRate};
