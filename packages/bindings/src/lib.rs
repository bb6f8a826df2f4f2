use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use storeops_core::pricing::margin::PricingConfig;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Forecasting
// ---------------------------------------------------------------------------

#[napi]
pub fn count_business_days(input_json: String) -> NapiResult<String> {
    #[derive(Deserialize)]
    struct BusinessDaysQuery {
        range: storeops_core::types::DateRange,
        #[serde(default)]
        calendar: storeops_core::forecasting::calendar::BusinessCalendarConfig,
        reference_date: chrono::NaiveDate,
    }

    let query: BusinessDaysQuery = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let counts = storeops_core::forecasting::calendar::count_business_days(
        &query.range,
        &query.calendar,
        query.reference_date,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&counts).map_err(to_napi_error)
}

#[napi]
pub fn build_daily_series(input_json: String) -> NapiResult<String> {
    let input: storeops_core::forecasting::series::DailySeriesInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = storeops_core::forecasting::series::build_daily_series(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn project_period(input_json: String) -> NapiResult<String> {
    let input: storeops_core::forecasting::projection::ProjectionInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        storeops_core::forecasting::projection::project(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Pricing
// ---------------------------------------------------------------------------

#[napi]
pub fn margin_with_discount(input_json: String) -> NapiResult<String> {
    #[derive(Deserialize)]
    struct MarginQuery {
        list_price: Decimal,
        unit_cost: Decimal,
        discount_pct: Decimal,
        tax_rate: Decimal,
    }

    let query: MarginQuery = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let config = PricingConfig::new(query.tax_rate);
    let margin_pct = storeops_core::pricing::margin::margin_with_discount(
        query.list_price,
        query.unit_cost,
        query.discount_pct,
        &config,
    );
    serde_json::to_string(&serde_json::json!({
        "margin_pct": margin_pct,
        "sale_price": storeops_core::pricing::margin::price_after_discount(
            query.list_price,
            query.discount_pct,
        ),
    }))
    .map_err(to_napi_error)
}

#[napi]
pub fn discount_for_target_margin(input_json: String) -> NapiResult<String> {
    #[derive(Deserialize)]
    struct DiscountQuery {
        list_price: Decimal,
        unit_cost: Decimal,
        target_margin_pct: Decimal,
        tax_rate: Decimal,
    }

    let query: DiscountQuery = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let config = PricingConfig::new(query.tax_rate);
    let discount_pct = storeops_core::pricing::margin::discount_for_target_margin(
        query.list_price,
        query.unit_cost,
        query.target_margin_pct,
        &config,
    )
    .map_err(to_napi_error)?;
    let achieved_margin_pct = storeops_core::pricing::margin::margin_with_discount(
        query.list_price,
        query.unit_cost,
        discount_pct,
        &config,
    );
    serde_json::to_string(&serde_json::json!({
        "discount_pct": discount_pct,
        "achieved_margin_pct": achieved_margin_pct,
    }))
    .map_err(to_napi_error)
}

#[napi]
pub fn discount_for_target_value(input_json: String) -> NapiResult<String> {
    #[derive(Deserialize)]
    struct TargetValueQuery {
        list_total: Decimal,
        target_value: Decimal,
    }

    let query: TargetValueQuery = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let discount_pct = storeops_core::pricing::margin::discount_for_target_value(
        query.list_total,
        query.target_value,
    );
    serde_json::to_string(&serde_json::json!({ "discount_pct": discount_pct }))
        .map_err(to_napi_error)
}

#[napi]
pub fn run_simulation(input_json: String) -> NapiResult<String> {
    let input: storeops_core::pricing::simulation::SimulationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        storeops_core::pricing::simulation::run_simulation(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
