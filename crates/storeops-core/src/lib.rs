pub mod error;
pub mod types;

#[cfg(feature = "forecasting")]
pub mod forecasting;

#[cfg(feature = "pricing")]
pub mod pricing;

pub use error::StoreOpsError;
pub use types::*;

/// Standard result type for all storeops operations
pub type StoreOpsResult<T> = Result<T, StoreOpsError>;
