use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::pricing::margin::{self, PricingConfig};
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::StoreOpsResult;

// ---------------------------------------------------------------------------
// Types — Quotation line items
// ---------------------------------------------------------------------------

/// One quotation line. `group` carries the product group used by the
/// group-level discount selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub list_price: Money,
    pub unit_cost: Money,
    pub quantity: Decimal,
    pub discount_pct: Percent,
}

impl LineItem {
    pub fn final_unit_price(&self) -> Money {
        margin::price_after_discount(self.list_price, self.discount_pct)
    }

    pub fn line_revenue(&self) -> Money {
        self.final_unit_price() * self.quantity
    }

    pub fn line_cost(&self) -> Money {
        self.unit_cost * self.quantity
    }

    pub fn line_list_value(&self) -> Money {
        self.list_price * self.quantity
    }
}

/// Which line items a discount applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountSelector {
    All,
    Group(String),
    Item(String),
}

impl DiscountSelector {
    /// Parse the selector strings used by the UI: `"all"`,
    /// `"group:<name>"`, or a bare item id.
    pub fn parse(raw: &str) -> Self {
        if raw == "all" {
            DiscountSelector::All
        } else if let Some(name) = raw.strip_prefix("group:") {
            DiscountSelector::Group(name.to_string())
        } else {
            DiscountSelector::Item(raw.to_string())
        }
    }

    fn matches(&self, item: &LineItem) -> bool {
        match self {
            DiscountSelector::All => true,
            DiscountSelector::Group(name) => item.group.as_deref() == Some(name.as_str()),
            DiscountSelector::Item(id) => item.id == *id,
        }
    }
}

/// Aggregate totals for a quotation. Margin is computed on the aggregate
/// revenue and cost, never averaged per item: per-item averaging would
/// misweight high- and low-ticket lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteSummary {
    pub list_total: Money,
    pub revenue_total: Money,
    pub cost_total: Money,
    pub quantity_total: Decimal,
    pub margin_pct: Percent,
}

/// Mean discount currently assigned to one product group. A display value:
/// applying it back is an explicit user action, never implicit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDiscount {
    pub group: String,
    pub mean_discount_pct: Percent,
    pub item_count: usize,
}

/// How the simulated discount is chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountAction {
    /// Apply this discount percentage as-is
    Fixed { discount_pct: Percent },
    /// Solve the uniform discount that yields this margin on the selected
    /// items' aggregate list and cost totals
    TargetMargin { margin_pct: Percent },
    /// Solve the uniform discount that brings the selected items' revenue
    /// to this value (may be negative, i.e. a surcharge)
    TargetValue { value: Money },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationInput {
    pub items: Vec<LineItem>,
    pub selector: DiscountSelector,
    pub action: DiscountAction,
    pub pricing: PricingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationOutput {
    /// The uniform discount that was applied to the selected items
    pub applied_discount_pct: Percent,
    pub items: Vec<LineItem>,
    pub before: QuoteSummary,
    pub after: QuoteSummary,
    pub group_discounts: Vec<GroupDiscount>,
}

// ---------------------------------------------------------------------------
// Functions
// ---------------------------------------------------------------------------

/// Return a new list with `discount_pct` set on every item the selector
/// matches; all other items are returned untouched.
pub fn apply_discount(
    items: &[LineItem],
    selector: &DiscountSelector,
    discount_pct: Percent,
) -> Vec<LineItem> {
    items
        .iter()
        .map(|item| {
            if selector.matches(item) {
                LineItem {
                    discount_pct,
                    ..item.clone()
                }
            } else {
                item.clone()
            }
        })
        .collect()
}

/// Aggregate totals with the system-wide margin formula applied to them.
pub fn summarize(items: &[LineItem], config: &PricingConfig) -> QuoteSummary {
    let list_total = items.iter().map(LineItem::line_list_value).sum();
    let revenue_total = items.iter().map(LineItem::line_revenue).sum();
    let cost_total = items.iter().map(LineItem::line_cost).sum();
    let quantity_total = items.iter().map(|i| i.quantity).sum();

    QuoteSummary {
        list_total,
        revenue_total,
        cost_total,
        quantity_total,
        margin_pct: margin::margin_pct(revenue_total, cost_total, config),
    }
}

/// Arithmetic mean of the discounts currently assigned per product group.
/// Ungrouped items are not reported.
pub fn group_discounts(items: &[LineItem]) -> Vec<GroupDiscount> {
    let mut by_group: BTreeMap<&str, (Decimal, usize)> = BTreeMap::new();
    for item in items {
        if let Some(group) = item.group.as_deref() {
            let entry = by_group.entry(group).or_insert((Decimal::ZERO, 0));
            entry.0 += item.discount_pct;
            entry.1 += 1;
        }
    }

    by_group
        .into_iter()
        .map(|(group, (sum, count))| GroupDiscount {
            group: group.to_string(),
            mean_discount_pct: sum / Decimal::from(count as u64),
            item_count: count,
        })
        .collect()
}

/// Solve the requested discount, apply it to the selected items, and
/// recompute aggregate totals before and after.
pub fn run_simulation(
    input: &SimulationInput,
) -> StoreOpsResult<ComputationOutput<SimulationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let selected: Vec<&LineItem> = input
        .items
        .iter()
        .filter(|item| input.selector.matches(item))
        .collect();
    if selected.is_empty() {
        warnings.push("Selector matched no line items; totals are unchanged".to_string());
    }

    let selected_list_total: Money = selected.iter().map(|i| i.line_list_value()).sum();

    let applied_discount_pct = match &input.action {
        DiscountAction::Fixed { discount_pct } => *discount_pct,
        DiscountAction::TargetMargin { margin_pct } => {
            let selected_cost_total: Money = selected.iter().map(|i| i.line_cost()).sum();
            margin::discount_for_target_margin(
                selected_list_total,
                selected_cost_total,
                *margin_pct,
                &input.pricing,
            )?
        }
        DiscountAction::TargetValue { value } => {
            let discount = margin::discount_for_target_value(selected_list_total, *value);
            if discount < Decimal::ZERO {
                warnings.push(format!(
                    "Target value exceeds the list total; applying a {}% surcharge",
                    -discount
                ));
            }
            discount
        }
    };

    let before = summarize(&input.items, &input.pricing);
    let items = apply_discount(&input.items, &input.selector, applied_discount_pct);
    let after = summarize(&items, &input.pricing);
    let groups = group_discounts(&items);

    let output = SimulationOutput {
        applied_discount_pct,
        items,
        before,
        after,
        group_discounts: groups,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Uniform Discount Simulation over Quotation Line Items",
        &serde_json::json!({
            "items": input.items.len(),
            "selected": selected.len(),
            "selector": &input.selector,
            "action": &input.action,
            "tax_rate": input.pricing.tax_rate.to_string(),
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

    const TOLERANCE: Decimal = dec!(0.000001);

    fn config() -> PricingConfig {
        PricingConfig::new(dec!(0.268))
    }

    fn item(id: &str, group: Option<&str>, list: Decimal, cost: Decimal, qty: Decimal) -> LineItem {
        LineItem {
            id: id.to_string(),
            group: group.map(str::to_string),
            list_price: list,
            unit_cost: cost,
            quantity: qty,
            discount_pct: Decimal::ZERO,
        }
    }

    fn quote() -> Vec<LineItem> {
        vec![
            item("A-1", Some("shelving"), dec!(1000), dec!(600), dec!(2)),
            item("A-2", Some("shelving"), dec!(500), dec!(350), dec!(4)),
            item("B-1", Some("lighting"), dec!(250), dec!(100), dec!(10)),
        ]
    }

    #[test]
    fn test_line_item_derived_values() {
        let mut line = item("A-1", None, dec!(1000), dec!(600), dec!(3));
        line.discount_pct = dec!(10);
        assert_eq!(line.final_unit_price(), dec!(900));
        assert_eq!(line.line_revenue(), dec!(2700));
        assert_eq!(line.line_cost(), dec!(1800));
        assert_eq!(line.line_list_value(), dec!(3000));
    }

    #[test]
    fn test_selector_parse() {
        assert_eq!(DiscountSelector::parse("all"), DiscountSelector::All);
        assert_eq!(
            DiscountSelector::parse("group:shelving"),
            DiscountSelector::Group("shelving".to_string())
        );
        assert_eq!(
            DiscountSelector::parse("A-1"),
            DiscountSelector::Item("A-1".to_string())
        );
    }

    #[test]
    fn test_apply_discount_to_single_item() {
        let items = quote();
        let updated = apply_discount(&items, &DiscountSelector::Item("A-2".to_string()), dec!(15));
        assert_eq!(updated[1].discount_pct, dec!(15));
        assert_eq!(updated[0].discount_pct, Decimal::ZERO);
        assert_eq!(updated[2].discount_pct, Decimal::ZERO);
        // The input list is untouched
        assert_eq!(items[1].discount_pct, Decimal::ZERO);
    }

    #[test]
    fn test_apply_discount_to_group() {
        let updated = apply_discount(
            &quote(),
            &DiscountSelector::Group("shelving".to_string()),
            dec!(5),
        );
        assert_eq!(updated[0].discount_pct, dec!(5));
        assert_eq!(updated[1].discount_pct, dec!(5));
        assert_eq!(updated[2].discount_pct, Decimal::ZERO);
    }

    #[test]
    fn test_summarize_uses_aggregate_margin() {
        let items = quote();
        let summary = summarize(&items, &config());
        // list totals: 2000 + 2000 + 2500 = 6500, no discounts yet
        assert_eq!(summary.list_total, dec!(6500));
        assert_eq!(summary.revenue_total, dec!(6500));
        // costs: 1200 + 1400 + 1000 = 3600
        assert_eq!(summary.cost_total, dec!(3600));
        assert_eq!(summary.quantity_total, dec!(16));
        // margin on totals, not a per-item mean:
        // (6500 - (6500*0.268 + 3600)) / 6500 * 100
        let expected = margin::margin_pct(dec!(6500), dec!(3600), &config());
        assert_eq!(summary.margin_pct, expected);
    }

    #[test]
    fn test_summarize_empty_quote() {
        let summary = summarize(&[], &config());
        assert_eq!(summary.revenue_total, Decimal::ZERO);
        assert_eq!(summary.margin_pct, Decimal::ZERO);
    }

    #[test]
    fn test_group_discount_means() {
        let mut items = quote();
        items[0].discount_pct = dec!(10);
        items[1].discount_pct = dec!(20);
        items[2].discount_pct = dec!(4);
        let groups = group_discounts(&items);
        assert_eq!(groups.len(), 2);
        // BTreeMap ordering: lighting before shelving
        assert_eq!(groups[0].group, "lighting");
        assert_eq!(groups[0].mean_discount_pct, dec!(4));
        assert_eq!(groups[1].group, "shelving");
        assert_eq!(groups[1].mean_discount_pct, dec!(15));
        assert_eq!(groups[1].item_count, 2);
    }

    #[test]
    fn test_ungrouped_items_are_not_reported() {
        let items = vec![item("X-1", None, dec!(100), dec!(50), dec!(1))];
        assert!(group_discounts(&items).is_empty());
    }

    #[test]
    fn test_simulation_fixed_discount() {
        let output = run_simulation(&SimulationInput {
            items: quote(),
            selector: DiscountSelector::All,
            action: DiscountAction::Fixed {
                discount_pct: dec!(10),
            },
            pricing: config(),
        })
        .unwrap()
        .result;
        assert_eq!(output.applied_discount_pct, dec!(10));
        assert_eq!(output.before.revenue_total, dec!(6500));
        assert_eq!(output.after.revenue_total, dec!(5850));
        assert!(output.after.margin_pct < output.before.margin_pct);
    }

    #[test]
    fn test_simulation_target_value_round_trip() {
        let output = run_simulation(&SimulationInput {
            items: quote(),
            selector: DiscountSelector::All,
            action: DiscountAction::TargetValue { value: dec!(6000) },
            pricing: config(),
        })
        .unwrap()
        .result;
        assert!((output.after.revenue_total - dec!(6000)).abs() < TOLERANCE);
    }

    #[test]
    fn test_simulation_single_item_target_value() {
        // T=1000, V=900 over quantity 1 => d=10
        let items = vec![item("A-1", None, dec!(1000), dec!(600), dec!(1))];
        let output = run_simulation(&SimulationInput {
            items,
            selector: DiscountSelector::All,
            action: DiscountAction::TargetValue { value: dec!(900) },
            pricing: config(),
        })
        .unwrap()
        .result;
        assert_eq!(output.applied_discount_pct, dec!(10));
    }

    #[test]
    fn test_simulation_target_margin_round_trip() {
        let output = run_simulation(&SimulationInput {
            items: quote(),
            selector: DiscountSelector::All,
            action: DiscountAction::TargetMargin {
                margin_pct: dec!(5),
            },
            pricing: config(),
        })
        .unwrap()
        .result;
        assert!((output.after.margin_pct - dec!(5)).abs() < TOLERANCE);
    }

    #[test]
    fn test_simulation_surcharge_warns() {
        let output = run_simulation(&SimulationInput {
            items: quote(),
            selector: DiscountSelector::All,
            action: DiscountAction::TargetValue { value: dec!(7000) },
            pricing: config(),
        })
        .unwrap();
        assert!(output.result.applied_discount_pct < Decimal::ZERO);
        assert!(output.warnings.iter().any(|w| w.contains("surcharge")));
        assert!((output.result.after.revenue_total - dec!(7000)).abs() < TOLERANCE);
    }

    #[test]
    fn test_simulation_empty_selection_warns() {
        let output = run_simulation(&SimulationInput {
            items: quote(),
            selector: DiscountSelector::Group("plumbing".to_string()),
            action: DiscountAction::Fixed {
                discount_pct: dec!(10),
            },
            pricing: config(),
        })
        .unwrap();
        assert!(output
            .warnings
            .iter()
            .any(|w| w.contains("matched no line items")));
        assert_eq!(
            output.result.before.revenue_total,
            output.result.after.revenue_total
        );
    }

    #[test]
    fn test_simulation_group_target_margin_leaves_others_untouched() {
        let output = run_simulation(&SimulationInput {
            items: quote(),
            selector: DiscountSelector::Group("lighting".to_string()),
            action: DiscountAction::TargetMargin {
                margin_pct: dec!(10),
            },
            pricing: config(),
        })
        .unwrap()
        .result;
        assert_eq!(output.items[0].discount_pct, Decimal::ZERO);
        assert_eq!(output.items[1].discount_pct, Decimal::ZERO);
        // The lighting items alone now sit at the target margin
        let lighting: Vec<LineItem> = output
            .items
            .iter()
            .filter(|i| i.group.as_deref() == Some("lighting"))
            .cloned()
            .collect();
        let summary = summarize(&lighting, &config());
        assert!((summary.margin_pct - dec!(10)).abs() < TOLERANCE);
    }
}
