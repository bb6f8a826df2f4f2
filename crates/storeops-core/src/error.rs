use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreOpsError {
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Target margin {target_margin_pct}% is not achievable at tax rate {tax_rate}")]
    UnsolvableMargin {
        target_margin_pct: Decimal,
        tax_rate: Decimal,
    },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for StoreOpsError {
    fn from(e: serde_json::Error) -> Self {
        StoreOpsError::SerializationError(e.to_string())
    }
}
