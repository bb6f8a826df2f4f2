use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::types::DateRange;
use crate::StoreOpsResult;

// ---------------------------------------------------------------------------
// Types — Business calendar
// ---------------------------------------------------------------------------

/// Weekend and holiday rules for one deployment. Supplied per calculation,
/// never read from a global table, so alternate jurisdictions are just
/// alternate configs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessCalendarConfig {
    /// Weekdays treated as non-business days
    #[serde(default = "default_weekend_days")]
    pub weekend_days: Vec<Weekday>,
    /// Explicit non-business dates on top of the weekend rule
    #[serde(default)]
    pub holidays: BTreeSet<NaiveDate>,
}

impl Default for BusinessCalendarConfig {
    fn default() -> Self {
        BusinessCalendarConfig {
            weekend_days: default_weekend_days(),
            holidays: BTreeSet::new(),
        }
    }
}

fn default_weekend_days() -> Vec<Weekday> {
    vec![Weekday::Sat, Weekday::Sun]
}

/// Business days in a range, split relative to a reference "today".
///
/// The reference day itself always counts as remaining: the day is not yet
/// complete, so its revenue cannot be treated as a finished business day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessDayCount {
    pub total: u32,
    pub elapsed: u32,
    pub remaining: u32,
}

// ---------------------------------------------------------------------------
// Functions
// ---------------------------------------------------------------------------

/// True when `date` is neither a configured weekend day nor a holiday.
pub fn is_business_day(date: NaiveDate, config: &BusinessCalendarConfig) -> bool {
    !config.weekend_days.contains(&date.weekday()) && !config.holidays.contains(&date)
}

/// Count business days in `range` (inclusive), classified against
/// `reference_date`: strictly earlier dates are elapsed, everything else is
/// remaining. A reference before the range leaves every day remaining; one
/// after the range leaves every day elapsed.
pub fn count_business_days(
    range: &DateRange,
    config: &BusinessCalendarConfig,
    reference_date: NaiveDate,
) -> StoreOpsResult<BusinessDayCount> {
    range.validate()?;

    let mut count = BusinessDayCount {
        total: 0,
        elapsed: 0,
        remaining: 0,
    };

    for date in range.iter_days() {
        if !is_business_day(date, config) {
            continue;
        }
        count.total += 1;
        if date < reference_date {
            count.elapsed += 1;
        } else {
            count.remaining += 1;
        }
    }

    Ok(count)
}

/// The last business day in the range, if any. Callers compare this against
/// the reference date to drive the partial-day projection branch.
pub fn last_business_day(
    range: &DateRange,
    config: &BusinessCalendarConfig,
) -> StoreOpsResult<Option<NaiveDate>> {
    range.validate()?;
    Ok(range
        .iter_days()
        .filter(|d| is_business_day(*d, config))
        .last())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
