pub mod forecasting;
pub mod pricing;
