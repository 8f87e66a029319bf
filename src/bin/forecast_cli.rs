use std::{fs, path::PathBuf, sync::Arc};

use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDate, TimeZone, Utc};
use clap::{ArgAction, Parser, Subcommand};
use consumables_forecast::{
    config,
    forecast::{FixedClock, ForecastResult, Forecaster, ItemRequest, TracingObserver},
    handlers::forecast::{ForecastBatchRequest, ForecastBatchResponse},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Parser)]
#[command(
    name = "forecast-cli",
    about = "Forecast next-quarter consumable usage from a JSON file",
    version
)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON"
    )]
    json: bool,
    #[arg(long, global = true, help = "Log level for diagnostic output", default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Forecast every item in a batch file
    Predict(PredictArgs),
}

#[derive(clap::Args)]
struct PredictArgs {
    /// JSON file holding `{"items": [...]}` or a bare array of items
    file: PathBuf,
    /// Treat this date (UTC midnight) as today when projecting shortages
    #[arg(long)]
    today: Option<NaiveDate>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BatchFile {
    Items(Vec<ItemRequest>),
    Wrapped(ForecastBatchRequest),
}

impl BatchFile {
    fn into_items(self) -> Result<Vec<ItemRequest>> {
        let request = match self {
            BatchFile::Items(items) => ForecastBatchRequest { items: Some(items) },
            BatchFile::Wrapped(request) => request,
        };
        request.into_items(usize::MAX).map_err(|e| anyhow!(e.to_string()))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    config::init_tracing(&cli.log_level, false);

    match cli.command {
        Commands::Predict(args) => handle_predict(args, cli.json),
    }
}

fn handle_predict(args: PredictArgs, json: bool) -> Result<()> {
    let raw = fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let batch: BatchFile = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {}", args.file.display()))?;
    let items = batch.into_items()?;
    debug!("Loaded {} items from {}", items.len(), args.file.display());

    let cfg = config::load_config().context("failed to load configuration")?;
    let mut forecaster =
        Forecaster::new(cfg.forecast.clone()).with_observer(Arc::new(TracingObserver));
    if let Some(today) = args.today {
        let midnight = today
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| anyhow!("invalid date {}", today))?;
        forecaster = forecaster.with_clock(Arc::new(FixedClock(Utc.from_utc_datetime(&midnight))));
    }

    let response = ForecastBatchResponse::new(forecaster.forecast_all(&items));

    if json {
        print_json(&response)?;
    } else {
        render_forecasts(&response.forecast);
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn render_forecasts(forecasts: &[ForecastResult]) {
    if forecasts.is_empty() {
        println!("No items to forecast");
        return;
    }

    println!(
        "{:<10} {:<28} {:>9} {:>10} {:<16} {:<16}",
        "ITEM", "NAME", "PREDICTED", "CONFIDENCE", "SHORTAGE", "METHOD"
    );
    for forecast in forecasts {
        println!(
            "{:<10} {:<28} {:>9} {:>10.3} {:<16} {:<16}",
            forecast.item_id.to_string(),
            forecast.name,
            forecast.predicted_usage,
            forecast.confidence,
            forecast.shortage_date.as_deref().unwrap_or("-"),
            forecast.method.as_ref(),
        );
    }
    println!("{} items forecast", forecasts.len());
}
