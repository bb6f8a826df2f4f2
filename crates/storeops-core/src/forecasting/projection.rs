use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::types::{safe_div, with_metadata, ComputationOutput, Money};
use crate::StoreOpsResult;

// ---------------------------------------------------------------------------
// Types — End-of-period projection
// ---------------------------------------------------------------------------

/// The working-day window used to judge how much of the reference day has
/// elapsed. Configuration, not a constant: store hours differ per branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHoursConfig {
    pub opens_at: NaiveTime,
    pub closes_at: NaiveTime,
}

impl WorkingHoursConfig {
    /// Fraction of the working day already elapsed at `now`, clamped to
    /// [0, 1]. A degenerate window (close <= open) reports 1: the day is
    /// treated as over rather than dividing by zero downstream.
    pub fn elapsed_fraction(&self, now: NaiveTime) -> Decimal {
        let window_seconds = (self.closes_at - self.opens_at).num_seconds();
        if window_seconds <= 0 {
            return Decimal::ONE;
        }
        let elapsed_seconds = (now - self.opens_at).num_seconds();
        let fraction = Decimal::from(elapsed_seconds) / Decimal::from(window_seconds);
        fraction.clamp(Decimal::ZERO, Decimal::ONE)
    }
}

/// Whole-period projection inputs, usually taken from a
/// [`BusinessDayCount`](crate::forecasting::calendar::BusinessDayCount) and
/// the running total of a daily series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionInput {
    /// Revenue billed from period start through the reference date
    pub actual_to_date: Money,
    pub business_days_elapsed: u32,
    pub business_days_remaining: u32,
    pub business_days_total: u32,
    /// True when the reference day is the period's last business day
    pub is_reference_day_last_business_day: bool,
    /// Fraction of the working-hours window already elapsed on the
    /// reference day; only consulted on the last business day
    pub reference_day_elapsed_fraction: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub daily_average: Money,
    pub projected_total: Money,
}

// ---------------------------------------------------------------------------
// Function: project
// ---------------------------------------------------------------------------

/// Project the end-of-period total from the run rate so far.
///
/// Normal days extrapolate the daily average over the remaining business
/// days. On the last business day the average is scaled by the inverse of
/// the elapsed working-hours fraction to estimate the day's eventual total,
/// and only the portion not yet billed is added, floored at zero, so the
/// projection never drops below what is already on the books.
pub fn project(input: &ProjectionInput) -> StoreOpsResult<ComputationOutput<ProjectionResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.business_days_elapsed + input.business_days_remaining != input.business_days_total {
        warnings.push(format!(
            "Elapsed ({}) + remaining ({}) business days do not sum to total ({})",
            input.business_days_elapsed, input.business_days_remaining, input.business_days_total
        ));
    }

    let mut fraction = input.reference_day_elapsed_fraction;
    if fraction < Decimal::ZERO || fraction > Decimal::ONE {
        warnings.push(format!(
            "Reference-day elapsed fraction {} clamped to [0, 1]",
            fraction
        ));
        fraction = fraction.clamp(Decimal::ZERO, Decimal::ONE);
    }

    let daily_average = safe_div(
        input.actual_to_date,
        Decimal::from(input.business_days_elapsed),
    );

    let projected_total = if input.business_days_elapsed == 0 {
        // Nothing to extrapolate from
        input.actual_to_date
    } else if input.is_reference_day_last_business_day {
        if fraction >= Decimal::ONE {
            // Window closed: the day is fully realized
            input.actual_to_date
        } else if fraction.is_zero() {
            // Day not started: expect one more average day
            input.actual_to_date + daily_average
        } else {
            let day_estimate = daily_average / fraction;
            let still_expected = (day_estimate - input.actual_to_date).max(Decimal::ZERO);
            input.actual_to_date + still_expected
        }
    } else {
        input.actual_to_date + daily_average * Decimal::from(input.business_days_remaining)
    };

    let result = ProjectionResult {
        daily_average,
        projected_total,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "End-of-period Projection from Business-day Run Rate",
        &serde_json::json!({
            "business_days_elapsed": input.business_days_elapsed,
            "business_days_remaining": input.business_days_remaining,
            "is_last_business_day": input.is_reference_day_last_business_day,
            "reference_day_elapsed_fraction": input.reference_day_elapsed_fraction.to_string(),
        }),
        warnings,
        elapsed,
        result,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
