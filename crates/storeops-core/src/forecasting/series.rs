use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::forecasting::calendar::{self, BusinessCalendarConfig};
use crate::types::{safe_div, with_metadata, ComputationOutput, DateRange, Money, Percent};
use crate::StoreOpsResult;

// ---------------------------------------------------------------------------
// Types — Daily revenue series
// ---------------------------------------------------------------------------

/// Raw measured revenue for one calendar date. Dates absent from the input
/// set imply zero revenue for that day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyObservation {
    pub date: NaiveDate,
    pub revenue: Money,
}

/// Input for building the accumulated/target/forecast daily series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySeriesInput {
    /// Measured daily revenue, order-independent
    pub observations: Vec<DailyObservation>,
    /// The charted period, usually one calendar month
    pub range: DateRange,
    /// Revenue target for the whole period
    pub monthly_target: Money,
    /// Weekend and holiday rules
    #[serde(default)]
    pub calendar: BusinessCalendarConfig,
    /// "Today" for this calculation, captured once by the caller
    pub reference_date: NaiveDate,
}

/// One charted day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySeriesPoint {
    pub date: NaiveDate,
    pub is_business_day: bool,
    pub daily_revenue: Money,
    /// Running actuals through the reference date; zero beyond it
    pub accumulated_revenue: Money,
    /// Running target, advanced by one increment per business day
    pub accumulated_target: Money,
    /// Equals accumulated_revenue through the reference date, then grows by
    /// one daily average per remaining business day
    pub forecast_revenue: Money,
}

/// The full series plus the whole-period figures derived while building it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySeriesOutput {
    pub points: Vec<DailySeriesPoint>,
    pub total_business_days: u32,
    /// Business days with date <= reference date
    pub business_days_passed: u32,
    /// monthly_target / total_business_days
    pub daily_target_increment: Money,
    /// accumulated_revenue at the reference date / business_days_passed
    pub daily_average: Money,
    /// Actuals through the reference date
    pub accumulated_revenue: Money,
    /// Percentage of the monthly target reached at the reference date
    pub target_attainment_pct: Percent,
}

// ---------------------------------------------------------------------------
// Function: build_daily_series
// ---------------------------------------------------------------------------

/// Turn sparse daily observations plus a monthly target into a dense series
/// with running actuals, running target, and a naive daily-average forecast.
///
/// Pure and idempotent: the only notion of "today" is the explicit
/// `reference_date`, so identical inputs always produce identical output.
pub fn build_daily_series(
    input: &DailySeriesInput,
) -> StoreOpsResult<ComputationOutput<DailySeriesOutput>> {
    let start = Instant::now();
    input.range.validate()?;

    let mut warnings: Vec<String> = Vec::new();

    // --- Index observations by date ---
    let mut revenue_by_date: BTreeMap<NaiveDate, Money> = BTreeMap::new();
    let mut out_of_range = 0usize;
    let mut coerced = 0usize;
    let mut duplicates = 0usize;

    for obs in &input.observations {
        if !input.range.contains(obs.date) {
            out_of_range += 1;
            continue;
        }
        let revenue = if obs.revenue < Decimal::ZERO {
            coerced += 1;
            Decimal::ZERO
        } else {
            obs.revenue
        };
        if revenue_by_date.insert(obs.date, revenue).is_some() {
            duplicates += 1;
        }
    }

    if out_of_range > 0 {
        warnings.push(format!(
            "{} observation(s) outside the range were ignored",
            out_of_range
        ));
    }
    if coerced > 0 {
        warnings.push(format!(
            "{} observation(s) had negative revenue and were treated as 0",
            coerced
        ));
    }
    if duplicates > 0 {
        warnings.push(format!(
            "{} duplicate observation date(s); the last value was kept",
            duplicates
        ));
    }

    // --- Target increment per business day ---
    let counts = calendar::count_business_days(&input.range, &input.calendar, input.reference_date)?;
    let daily_target_increment = if counts.total == 0 {
        warnings.push("Range contains no business days; target line stays at 0".to_string());
        Decimal::ZERO
    } else {
        input.monthly_target / Decimal::from(counts.total)
    };

    // --- Accumulation pass ---
    let mut points: Vec<DailySeriesPoint> = Vec::new();
    let mut accumulated_revenue = Decimal::ZERO;
    let mut accumulated_target = Decimal::ZERO;
    let mut business_days_passed = 0u32;

    for date in input.range.iter_days() {
        let is_business_day = calendar::is_business_day(date, &input.calendar);
        let daily_revenue = revenue_by_date.get(&date).copied().unwrap_or(Decimal::ZERO);

        if is_business_day {
            accumulated_target += daily_target_increment;
        }

        // No future actuals: the accumulated line stops at the reference
        // date; later points report zero rather than a stale carry-forward.
        let point_accumulated = if date <= input.reference_date {
            accumulated_revenue += daily_revenue;
            if is_business_day {
                business_days_passed += 1;
            }
            accumulated_revenue
        } else {
            Decimal::ZERO
        };

        points.push(DailySeriesPoint {
            date,
            is_business_day,
            daily_revenue,
            accumulated_revenue: point_accumulated,
            accumulated_target,
            forecast_revenue: Decimal::ZERO,
        });
    }

    let daily_average = safe_div(accumulated_revenue, Decimal::from(business_days_passed));

    // --- Forecast pass ---
    // Through the reference date the forecast reproduces actuals; beyond it,
    // it carries the last value forward and adds one average per business day.
    let mut forecast = Decimal::ZERO;
    for point in &mut points {
        if point.date <= input.reference_date {
            forecast = point.accumulated_revenue;
        } else if point.is_business_day {
            forecast += daily_average;
        }
        point.forecast_revenue = forecast;
    }

    let target_attainment_pct =
        safe_div(accumulated_revenue, input.monthly_target) * Decimal::ONE_HUNDRED;

    let output = DailySeriesOutput {
        points,
        total_business_days: counts.total,
        business_days_passed,
        daily_target_increment,
        daily_average,
        accumulated_revenue,
        target_attainment_pct,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Business-day Revenue Accumulation with Naive Daily-Average Forecast",
        &serde_json::json!({
            "range_start": input.range.start,
            "range_end": input.range.end,
            "reference_date": input.reference_date,
            "monthly_target": input.monthly_target.to_string(),
            "observations": input.observations.len(),
            "holidays": input.calendar.holidays.len(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Feb 2025, default weekends, no holidays: 20 business days.
    fn feb_input() -> DailySeriesInput {
        DailySeriesInput {
            observations: vec![
                DailyObservation {
                    date: date(2025, 2, 3),
                    revenue: dec!(900000),
                },
                DailyObservation {
                    date: date(2025, 2, 4),
                    revenue: dec!(1100000),
                },
                DailyObservation {
                    date: date(2025, 2, 5),
                    revenue: dec!(1000000),
                },
            ],
            range: DateRange::new(date(2025, 2, 1), date(2025, 2, 28)).unwrap(),
            monthly_target: dec!(20300000),
            calendar: BusinessCalendarConfig::default(),
            reference_date: date(2025, 2, 5),
        }
    }

    #[test]
    fn test_daily_target_increment() {
        let output = build_daily_series(&feb_input()).unwrap().result;
        assert_eq!(output.total_business_days, 20);
        assert_eq!(output.daily_target_increment, dec!(1015000));
    }

    #[test]
    fn test_target_accumulates_on_business_days_only() {
        let output = build_daily_series(&feb_input()).unwrap().result;
        // Feb 1 (Sat) and Feb 2 (Sun) carry zero; Feb 3 (Mon) gets the first
        // increment; Feb 8 (Sat) carries Feb 7's value unchanged.
        assert_eq!(output.points[0].accumulated_target, Decimal::ZERO);
        assert_eq!(output.points[1].accumulated_target, Decimal::ZERO);
        assert_eq!(output.points[2].accumulated_target, dec!(1015000));
        assert_eq!(output.points[7].accumulated_target, output.points[6].accumulated_target);
        // Last point carries the full target
        assert_eq!(output.points[27].accumulated_target, dec!(20300000));
    }

    #[test]
    fn test_accumulated_revenue_stops_at_reference_date() {
        let output = build_daily_series(&feb_input()).unwrap().result;
        assert_eq!(output.accumulated_revenue, dec!(3000000));
        // Point at the reference date holds the running total
        assert_eq!(output.points[4].accumulated_revenue, dec!(3000000));
        // Beyond the reference date there are no actuals
        for point in &output.points[5..] {
            assert_eq!(point.accumulated_revenue, Decimal::ZERO);
        }
    }

    #[test]
    fn test_forecast_reproduces_actuals_through_reference_date() {
        let input = feb_input();
        let output = build_daily_series(&input).unwrap().result;
        for point in &output.points {
            if point.date <= input.reference_date {
                assert_eq!(point.forecast_revenue, point.accumulated_revenue);
            }
        }
    }

    #[test]
    fn test_forecast_grows_only_on_business_days() {
        let output = build_daily_series(&feb_input()).unwrap().result;
        // 3 business days passed, 3,000,000 accumulated => average 1,000,000
        assert_eq!(output.daily_average, dec!(1000000));
        // Feb 6 (Thu) and Feb 7 (Fri) each add one average
        assert_eq!(output.points[5].forecast_revenue, dec!(4000000));
        assert_eq!(output.points[6].forecast_revenue, dec!(5000000));
        // Feb 8 (Sat) carries Feb 7 forward
        assert_eq!(output.points[7].forecast_revenue, dec!(5000000));
        // 17 business days remain after the reference date
        assert_eq!(output.points[27].forecast_revenue, dec!(20000000));
    }

    #[test]
    fn test_missing_dates_imply_zero_revenue() {
        let output = build_daily_series(&feb_input()).unwrap().result;
        // Feb 1 has no observation
        assert_eq!(output.points[0].daily_revenue, Decimal::ZERO);
        assert_eq!(output.points[0].accumulated_revenue, Decimal::ZERO);
    }

    #[test]
    fn test_negative_revenue_is_coerced_with_warning() {
        let mut input = feb_input();
        input.observations.push(DailyObservation {
            date: date(2025, 2, 5),
            revenue: dec!(-500),
        });
        let output = build_daily_series(&input).unwrap();
        // The duplicate negative observation replaced Feb 5 with 0
        assert_eq!(output.result.accumulated_revenue, dec!(2000000));
        assert!(output.warnings.iter().any(|w| w.contains("negative revenue")));
        assert!(output.warnings.iter().any(|w| w.contains("duplicate")));
    }

    #[test]
    fn test_out_of_range_observation_is_ignored() {
        let mut input = feb_input();
        input.observations.push(DailyObservation {
            date: date(2025, 3, 3),
            revenue: dec!(999999),
        });
        let output = build_daily_series(&input).unwrap();
        assert_eq!(output.result.accumulated_revenue, dec!(3000000));
        assert!(output.warnings.iter().any(|w| w.contains("outside the range")));
    }

    #[test]
    fn test_no_business_days_passed_yields_zero_average() {
        let mut input = feb_input();
        input.reference_date = date(2025, 1, 15);
        let output = build_daily_series(&input).unwrap().result;
        assert_eq!(output.business_days_passed, 0);
        assert_eq!(output.daily_average, Decimal::ZERO);
        assert_eq!(output.accumulated_revenue, Decimal::ZERO);
    }

    #[test]
    fn test_zero_target_yields_zero_increment() {
        let mut input = feb_input();
        input.monthly_target = Decimal::ZERO;
        let output = build_daily_series(&input).unwrap().result;
        assert_eq!(output.daily_target_increment, Decimal::ZERO);
        assert_eq!(output.target_attainment_pct, Decimal::ZERO);
    }

    #[test]
    fn test_build_is_idempotent() {
        let input = feb_input();
        let first = build_daily_series(&input).unwrap();
        let second = build_daily_series(&input).unwrap();
        assert_eq!(first.result, second.result);
        assert_eq!(first.warnings, second.warnings);
    }

    #[test]
    fn test_invalid_range_is_rejected() {
        let mut input = feb_input();
        input.range = DateRange {
            start: date(2025, 3, 1),
            end: date(2025, 2, 1),
        };
        assert!(build_daily_series(&input).is_err());
    }
}
