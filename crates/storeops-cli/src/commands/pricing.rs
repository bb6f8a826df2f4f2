use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use storeops_core::pricing::margin::{self, PricingConfig};
use storeops_core::pricing::simulation::{self, DiscountAction, DiscountSelector, SimulationInput};

use crate::input;

/// Arguments for the margin formula
#[derive(Args)]
pub struct MarginArgs {
    /// Revenue (sale price total)
    #[arg(long)]
    pub revenue: Decimal,

    /// Cost total
    #[arg(long)]
    pub cost: Decimal,

    /// Tax rate deducted from revenue inside the margin formula (fraction)
    #[arg(long)]
    pub tax_rate: Decimal,
}

/// Arguments for solving the discount that reaches a target margin
#[derive(Args)]
pub struct DiscountForMarginArgs {
    /// List price
    #[arg(long)]
    pub list: Decimal,

    /// Unit cost
    #[arg(long)]
    pub cost: Decimal,

    /// Target margin percentage
    #[arg(long, allow_hyphen_values = true)]
    pub target_margin: Decimal,

    /// Tax rate (fraction)
    #[arg(long)]
    pub tax_rate: Decimal,
}

/// Arguments for solving the uniform discount that reaches a target value
#[derive(Args)]
pub struct DiscountForValueArgs {
    /// Current list-price total
    #[arg(long)]
    pub list_total: Decimal,

    /// Target order value
    #[arg(long)]
    pub target_value: Decimal,
}

/// Arguments for the line-item discount simulation
#[derive(Args)]
pub struct SimulateArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,

    /// Override the selector from the input: "all", "group:<name>", or an
    /// item id
    #[arg(long)]
    pub selector: Option<String>,

    /// Override the action from the input with a fixed discount percentage
    #[arg(long, allow_hyphen_values = true)]
    pub discount: Option<Decimal>,
}

pub fn run_margin(args: MarginArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let config = PricingConfig::new(args.tax_rate);
    let margin_pct = margin::margin_pct(args.revenue, args.cost, &config);
    Ok(json!({
        "revenue": args.revenue,
        "cost": args.cost,
        "tax_rate": args.tax_rate,
        "margin_pct": margin_pct,
    }))
}

pub fn run_discount_for_margin(
    args: DiscountForMarginArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let config = PricingConfig::new(args.tax_rate);
    let discount_pct =
        margin::discount_for_target_margin(args.list, args.cost, args.target_margin, &config)?;
    let achieved_margin_pct =
        margin::margin_with_discount(args.list, args.cost, discount_pct, &config);
    Ok(json!({
        "discount_pct": discount_pct,
        "sale_price": margin::price_after_discount(args.list, discount_pct),
        "achieved_margin_pct": achieved_margin_pct,
    }))
}

pub fn run_discount_for_value(
    args: DiscountForValueArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let discount_pct = margin::discount_for_target_value(args.list_total, args.target_value);
    Ok(json!({
        "discount_pct": discount_pct,
        "list_total": args.list_total,
        "target_value": args.target_value,
    }))
}

pub fn run_simulate(args: SimulateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut sim_input: SimulationInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required for the simulation".into());
    };

    if let Some(ref raw) = args.selector {
        sim_input.selector = DiscountSelector::parse(raw);
    }
    if let Some(discount_pct) = args.discount {
        sim_input.action = DiscountAction::Fixed { discount_pct };
    }

    let result = simulation::run_simulation(&sim_input)?;
    Ok(serde_json::to_value(result)?)
}
