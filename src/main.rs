//! Vesting Engine CLI
//!
//! Command-line interface for schedules, forecasts, status and condition evaluation

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;

use vesting_engine::conditions::{
    earned_shares, evaluate_market_detailed, evaluate_performance_detailed, ConditionSet,
    MetricActuals,
};
use vesting_engine::engine::DEFAULT_FORECAST_HORIZON_MONTHS;
use vesting_engine::grant::{
    load_grants, load_tranche_history, DEFAULT_GRANT_BOOK_PATH, DEFAULT_TRANCHE_HISTORY_PATH,
};
use vesting_engine::schedule::shares_vested_as_of;
use vesting_engine::{
    EngineConfig, ForecastSummary, InMemoryGrantStore, StockGrant, VestingEngine,
    VestingStatusReporter,
};

#[derive(Debug, Parser)]
#[command(name = "vesting", version, about = "Equity grant vesting engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the tranche schedule of a grant
    Schedule {
        #[arg(long, default_value = DEFAULT_GRANT_BOOK_PATH)]
        grants: PathBuf,
        #[arg(long)]
        grant_id: String,
        /// Also report shares vested on or before this date (YYYY-MM-DD)
        #[arg(long)]
        as_of: Option<NaiveDate>,
        /// Write the full schedule to a CSV file
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print a month-by-month vesting forecast
    Forecast {
        #[arg(long, default_value = DEFAULT_GRANT_BOOK_PATH)]
        grants: PathBuf,
        #[arg(long)]
        grant_id: String,
        #[arg(long, default_value_t = DEFAULT_FORECAST_HORIZON_MONTHS)]
        horizon: u32,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Report the current vesting status of a grant
    Status {
        #[arg(long, default_value = DEFAULT_GRANT_BOOK_PATH)]
        grants: PathBuf,
        #[arg(long, default_value = DEFAULT_TRANCHE_HISTORY_PATH)]
        tranches: PathBuf,
        #[arg(long)]
        grant_id: String,
    },
    /// Evaluate performance and market conditions against actual metric values
    Evaluate {
        /// JSON file with `performance` and `market` condition lists
        #[arg(long)]
        conditions: PathBuf,
        /// JSON object mapping metric names to actual values
        #[arg(long)]
        actuals: PathBuf,
        /// Target share count to scale by the earned percentage
        #[arg(long)]
        shares: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    match Cli::parse().command {
        Command::Schedule {
            grants,
            grant_id,
            as_of,
            output,
        } => run_schedule(&grants, &grant_id, as_of, output.as_deref()),
        Command::Forecast {
            grants,
            grant_id,
            horizon,
            output,
        } => run_forecast(&grants, &grant_id, horizon, output.as_deref()),
        Command::Status {
            grants,
            tranches,
            grant_id,
        } => run_status(&grants, &tranches, &grant_id).await,
        Command::Evaluate {
            conditions,
            actuals,
            shares,
        } => run_evaluate(&conditions, &actuals, shares),
    }
}

fn find_grant(path: &Path, grant_id: &str) -> anyhow::Result<StockGrant> {
    let grants = load_grants(path)
        .with_context(|| format!("loading grant book {}", path.display()))?;
    match grants.into_iter().find(|g| g.id == grant_id) {
        Some(grant) => Ok(grant),
        None => bail!("grant {} not found in {}", grant_id, path.display()),
    }
}

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = csv::Writer::from_writer(file);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    println!("\nFull results written to: {}", path.display());
    Ok(())
}

fn print_grant(grant: &StockGrant) {
    println!("Grant: {}", grant.id);
    println!("  Employee: {}", grant.employee_id);
    println!("  Type: {}", grant.grant_type.as_str());
    println!("  Grant Date: {}", grant.grant_date);
    println!("  Shares Granted: {}", grant.shares_granted);
    println!(
        "  Schedule: {} month cliff, {} months, {}",
        grant.vesting_schedule.cliff_months,
        grant.vesting_schedule.vesting_months,
        grant.vesting_schedule.vesting_frequency
    );
    println!();
}

fn run_schedule(
    grants: &Path,
    grant_id: &str,
    as_of: Option<NaiveDate>,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let grant = find_grant(grants, grant_id)?;
    print_grant(&grant);

    let tranches = VestingEngine::default().schedule(&grant)?;

    println!("{:>4} {:>12} {:>12} {:>12} {:>10}", "#", "VestDate", "Shares", "Cumulative", "Status");
    println!("{}", "-".repeat(54));
    for (i, t) in tranches.iter().enumerate() {
        println!(
            "{:>4} {:>12} {:>12} {:>12} {:>10}",
            i + 1,
            t.vest_date.to_string(),
            t.shares_vesting,
            t.cumulative_shares,
            t.status.as_str()
        );
    }

    if let Some(date) = as_of {
        println!(
            "\nVested as of {}: {} of {}",
            date,
            shares_vested_as_of(&tranches, date),
            grant.shares_granted
        );
    }

    if let Some(path) = output {
        write_csv(path, &tranches)?;
    }
    Ok(())
}

fn run_forecast(
    grants: &Path,
    grant_id: &str,
    horizon: u32,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let grant = find_grant(grants, grant_id)?;
    print_grant(&grant);

    let engine = VestingEngine::new(EngineConfig::default().with_horizon(horizon));
    let rows = engine.forecast(&grant)?;

    println!("{:>8} {:>12} {:>12}", "Month", "Vesting", "Cumulative");
    println!("{}", "-".repeat(34));
    for row in rows.iter().filter(|r| r.shares_vesting > 0) {
        println!("{:>8} {:>12} {:>12}", row.month, row.shares_vesting, row.cumulative_vested);
    }

    let summary = ForecastSummary::from_rows(&rows);
    println!("\nSummary:");
    println!("  Months: {}", summary.total_months);
    println!("  Months With Vesting: {}", summary.months_with_vesting);
    println!("  Shares Vesting In Horizon: {}", summary.total_vesting);
    if let Some(first) = &summary.first_vest_month {
        println!("  First Vest Month: {}", first);
    }

    if let Some(path) = output {
        write_csv(path, &rows)?;
    }
    Ok(())
}

async fn run_status(grants: &Path, tranches: &Path, grant_id: &str) -> anyhow::Result<()> {
    let book = load_grants(grants)
        .with_context(|| format!("loading grant book {}", grants.display()))?;
    let history = if tranches.exists() {
        load_tranche_history(tranches)
            .with_context(|| format!("loading tranche history {}", tranches.display()))?
    } else {
        log::info!("no tranche history at {}, using computed schedules", tranches.display());
        Default::default()
    };

    let reporter = VestingStatusReporter::new(InMemoryGrantStore::from_book(book, history));
    let status = reporter.get_vesting_status(grant_id).await?;

    println!("Grant: {}", status.grant_id);
    println!("  Total Granted: {}", status.total_granted);
    println!("  Vested: {}", status.vested);
    println!("  Unvested: {}", status.unvested);
    println!("  Forfeited: {}", status.forfeited);
    println!("  Exercised: {}", status.exercised);
    println!("  Exercisable: {}", status.exercisable);
    match (status.next_vest_date, status.next_vest_shares) {
        (Some(date), Some(shares)) => println!("  Next Vest: {} shares on {}", shares, date),
        _ => println!("  Next Vest: none scheduled"),
    }
    Ok(())
}

fn run_evaluate(conditions: &Path, actuals: &Path, shares: Option<u64>) -> anyhow::Result<()> {
    let set: ConditionSet = serde_json::from_reader(
        File::open(conditions).with_context(|| format!("opening {}", conditions.display()))?,
    )?;
    let actuals: MetricActuals = serde_json::from_reader(
        File::open(actuals).with_context(|| format!("opening {}", actuals.display()))?,
    )?;

    println!("Performance Conditions:");
    for outcome in evaluate_performance_detailed(&set.performance, &actuals)? {
        let actual = outcome
            .actual
            .map(|v| format!("{v:.4}"))
            .unwrap_or_else(|| "missing".to_string());
        println!("  {:<24} actual={:<16} earned={:.2}%", outcome.metric, actual, outcome.earned_pct);
    }

    println!("Market Conditions:");
    for outcome in evaluate_market_detailed(&set.market, &actuals) {
        let actual = outcome
            .actual
            .map(|v| format!("{v:.4}"))
            .unwrap_or_else(|| "missing".to_string());
        println!(
            "  {:<24} actual={:<16} {}",
            outcome.metric,
            actual,
            if outcome.met { "met" } else { "NOT met" }
        );
    }

    let earned_pct = set.earned_pct(&actuals)?;
    println!("\nEarned: {:.2}%", earned_pct);
    if let Some(target) = shares {
        println!("Earned Shares: {} of {}", earned_shares(target, earned_pct), target);
    }
    Ok(())
}
