//! Forecast vesting for an entire grant book
//!
//! Outputs monthly aggregated vesting across all grants

use std::fs::File;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use vesting_engine::engine::DEFAULT_FORECAST_HORIZON_MONTHS;
use vesting_engine::grant::{load_grants, DEFAULT_GRANT_BOOK_PATH};
use vesting_engine::{EngineConfig, VestingEngine};

#[derive(Debug, Parser)]
#[command(name = "run_book", about = "Aggregate monthly vesting across a grant book")]
struct Args {
    #[arg(long, default_value = DEFAULT_GRANT_BOOK_PATH)]
    grants: PathBuf,

    #[arg(long, default_value_t = DEFAULT_FORECAST_HORIZON_MONTHS)]
    horizon: u32,

    #[arg(long, default_value = "book_vesting_forecast.csv")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let start = Instant::now();
    log::info!("loading grants from {}", args.grants.display());
    let grants = load_grants(&args.grants)
        .with_context(|| format!("loading grant book {}", args.grants.display()))?;
    println!("Loaded {} grants in {:?}", grants.len(), start.elapsed());

    let engine = VestingEngine::new(EngineConfig::default().with_horizon(args.horizon));

    let proj_start = Instant::now();
    let book = engine.forecast_book(&grants);
    println!("Forecasts complete in {:?}", proj_start.elapsed());

    let file = File::create(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    let mut writer = csv::Writer::from_writer(file);
    for row in &book.rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    println!("Output written to {}", args.output.display());

    println!("\nBook Summary:");
    println!("  Grants Forecast: {}", book.grants_included);
    println!("  Grants Skipped:  {}", book.failures.len());
    for (grant_id, err) in &book.failures {
        println!("    {}: {}", grant_id, err);
    }
    if let (Some(first), Some(last)) = (book.rows.first(), book.rows.last()) {
        println!("  Months: {} to {}", first.month, last.month);
        println!("  Shares Vesting: {}", last.cumulative_vested);
    }

    println!("\nTotal time: {:?}", start.elapsed());
    Ok(())
}
