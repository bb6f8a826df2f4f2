mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::forecasting::{BusinessDaysArgs, ForecastSeriesArgs, ProjectArgs};
use commands::pricing::{DiscountForMarginArgs, DiscountForValueArgs, MarginArgs, SimulateArgs};

/// Retail revenue forecasting and quotation pricing
#[derive(Parser)]
#[command(
    name = "storeops",
    version,
    about = "Retail revenue forecasting and quotation pricing",
    long_about = "A CLI for the storeops calculation engine. Builds business-day-aware \
                  daily revenue series, projects month-end totals from the current run \
                  rate, and solves the discount that reaches a target margin or target \
                  order value over quotation line items."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Count business days in a range, split into elapsed and remaining
    BusinessDays(BusinessDaysArgs),
    /// Build the accumulated/target/forecast daily revenue series
    ForecastSeries(ForecastSeriesArgs),
    /// Project the end-of-period total from the run rate so far
    Project(ProjectArgs),
    /// Margin percentage for a revenue/cost pair
    Margin(MarginArgs),
    /// Discount that reaches a target margin
    DiscountForMargin(DiscountForMarginArgs),
    /// Uniform discount that reaches a target order value
    DiscountForValue(DiscountForValueArgs),
    /// Apply or solve a discount over quotation line items
    Simulate(SimulateArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::BusinessDays(args) => commands::forecasting::run_business_days(args),
        Commands::ForecastSeries(args) => commands::forecasting::run_forecast_series(args),
        Commands::Project(args) => commands::forecasting::run_project(args),
        Commands::Margin(args) => commands::pricing::run_margin(args),
        Commands::DiscountForMargin(args) => commands::pricing::run_discount_for_margin(args),
        Commands::DiscountForValue(args) => commands::pricing::run_discount_for_value(args),
        Commands::Simulate(args) => commands::pricing::run_simulate(args),
        Commands::Version => {
            println!("storeops {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
