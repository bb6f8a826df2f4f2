use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::StoreOpsError;
use crate::types::{Money, Percent, Rate};
use crate::StoreOpsResult;

// ---------------------------------------------------------------------------
// Types — Pricing configuration
// ---------------------------------------------------------------------------

/// Deployment-specific pricing parameters. The tax rate is the fraction of
/// revenue deducted inside the margin formula (0.268 in the reference
/// deployment) and must be supplied explicitly; there is no default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingConfig {
    pub tax_rate: Rate,
}

impl PricingConfig {
    pub fn new(tax_rate: Rate) -> Self {
        PricingConfig { tax_rate }
    }
}

// ---------------------------------------------------------------------------
// Margin and discount algebra
// ---------------------------------------------------------------------------
//
// Every function here is pure and independent of the others: simultaneous
// what-if computations (global discount vs. target margin vs. target value)
// share no state.

/// The margin formula used everywhere in the system:
/// `((R - (R * tax + C)) / R) * 100`, defined as 0 when revenue is 0.
/// May be negative.
pub fn margin_pct(revenue: Money, cost: Money, config: &PricingConfig) -> Percent {
    if revenue.is_zero() {
        return Decimal::ZERO;
    }
    (revenue - (revenue * config.tax_rate + cost)) / revenue * Decimal::ONE_HUNDRED
}

/// `list * (1 - d/100)`
pub fn price_after_discount(list_price: Money, discount_pct: Percent) -> Money {
    list_price * (Decimal::ONE - discount_pct / Decimal::ONE_HUNDRED)
}

/// Margin obtained when selling at `list_price` less `discount_pct`.
pub fn margin_with_discount(
    list_price: Money,
    cost: Money,
    discount_pct: Percent,
    config: &PricingConfig,
) -> Percent {
    margin_pct(price_after_discount(list_price, discount_pct), cost, config)
}

/// Discount that yields `target_margin_pct`, solved from
/// `L * (1 - d/100) * (1 - tax - m/100) = C`, clamped to [0, 100].
///
/// A non-positive denominator factor means no discount can reach the target
/// at this tax rate; that is surfaced as `UnsolvableMargin`, never clamped.
/// A zero list price is a legitimate "no activity" state and yields 0.
pub fn discount_for_target_margin(
    list_price: Money,
    cost: Money,
    target_margin_pct: Percent,
    config: &PricingConfig,
) -> StoreOpsResult<Percent> {
    if list_price < Decimal::ZERO {
        return Err(StoreOpsError::InvalidInput {
            field: "list_price".to_string(),
            reason: "List price cannot be negative".to_string(),
        });
    }
    if cost < Decimal::ZERO {
        return Err(StoreOpsError::InvalidInput {
            field: "cost".to_string(),
            reason: "Cost cannot be negative".to_string(),
        });
    }
    if list_price.is_zero() {
        return Ok(Decimal::ZERO);
    }

    let factor = Decimal::ONE - config.tax_rate - target_margin_pct / Decimal::ONE_HUNDRED;
    if factor <= Decimal::ZERO {
        return Err(StoreOpsError::UnsolvableMargin {
            target_margin_pct,
            tax_rate: config.tax_rate,
        });
    }

    let discount = (Decimal::ONE - cost / (list_price * factor)) * Decimal::ONE_HUNDRED;
    Ok(discount.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED))
}

/// The break-even discount: target margin of exactly zero.
pub fn discount_for_zero_margin(
    list_price: Money,
    cost: Money,
    config: &PricingConfig,
) -> StoreOpsResult<Percent> {
    discount_for_target_margin(list_price, cost, Decimal::ZERO, config)
}

/// Uniform discount that turns a list-price total `T` into a target order
/// value `V`: `(T - V) / T * 100`. Deliberately unclamped: a target above
/// the list total produces a negative discount, i.e. a surcharge.
pub fn discount_for_target_value(list_total: Money, target_value: Money) -> Percent {
    if list_total.is_zero() {
        return Decimal::ZERO;
    }
    (list_total - target_value) / list_total * Decimal::ONE_HUNDRED
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
