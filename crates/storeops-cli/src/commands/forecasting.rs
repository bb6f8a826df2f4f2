use chrono::{NaiveDate, NaiveTime};
use clap::Args;
use serde_json::Value;

use storeops_core::forecasting::calendar::{self, BusinessCalendarConfig};
use storeops_core::forecasting::projection::{self, ProjectionInput, WorkingHoursConfig};
use storeops_core::forecasting::series::{self, DailySeriesInput};
use storeops_core::types::DateRange;

use crate::input;

/// Arguments for business-day counting
#[derive(Args)]
pub struct BusinessDaysArgs {
    /// Range start (YYYY-MM-DD, inclusive)
    #[arg(long)]
    pub start: NaiveDate,

    /// Range end (YYYY-MM-DD, inclusive)
    #[arg(long)]
    pub end: NaiveDate,

    /// Reference "today" for the elapsed/remaining split
    #[arg(long)]
    pub reference: NaiveDate,

    /// Path to a JSON calendar config (weekend rule + holidays); the default
    /// Saturday/Sunday weekend with no holidays is used when omitted
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for building the daily revenue series
#[derive(Args)]
pub struct ForecastSeriesArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the end-of-period projection
#[derive(Args)]
pub struct ProjectArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,

    /// Working-day open time (HH:MM); with --closes-at and --now, overrides
    /// the elapsed fraction from the input file
    #[arg(long)]
    pub opens_at: Option<NaiveTime>,

    /// Working-day close time (HH:MM)
    #[arg(long)]
    pub closes_at: Option<NaiveTime>,

    /// Current time on the reference day (HH:MM)
    #[arg(long)]
    pub now: Option<NaiveTime>,
}

pub fn run_business_days(args: BusinessDaysArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let config: BusinessCalendarConfig = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        BusinessCalendarConfig::default()
    };

    let range = DateRange::new(args.start, args.end)?;
    let counts = calendar::count_business_days(&range, &config, args.reference)?;
    Ok(serde_json::to_value(counts)?)
}

pub fn run_forecast_series(args: ForecastSeriesArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let series_input: DailySeriesInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required for the forecast series".into());
    };
    let result = series::build_daily_series(&series_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_project(args: ProjectArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut proj_input: ProjectionInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required for the projection".into());
    };

    if let (Some(opens_at), Some(closes_at), Some(now)) = (args.opens_at, args.closes_at, args.now)
    {
        let window = WorkingHoursConfig { opens_at, closes_at };
        proj_input.reference_day_elapsed_fraction = window.elapsed_fraction(now);
    }

    let result = projection::project(&proj_input)?;
    Ok(serde_json::to_value(result)?)
}
