use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use clap::Args;
use iexfinance_lib::format::{
    close_records_by_date, close_records_by_symbol, records_by_date, records_by_symbol,
};
use iexfinance_lib::validation;
use iexfinance_lib::{CacheCoordinator, ChartFetcher, Client, CoverageStore};
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;

use crate::output::{
    print_closes_csv, print_closes_markdown, print_closes_table, print_history_csv,
    print_history_markdown, print_history_table, print_json, OutputFormat,
};

#[derive(Args)]
pub struct HistoricalArgs {
    /// Ticker symbols (e.g. AMZN AAPL)
    #[arg(required = true)]
    pub symbols: Vec<String>,

    /// First trading day, YYYY-MM-DD
    #[arg(long)]
    pub start: String,

    /// Last trading day, YYYY-MM-DD (defaults to today)
    #[arg(long)]
    pub end: Option<String>,

    /// Query the API directly without reading or updating the cache
    #[arg(long)]
    pub no_cache: bool,

    /// Only report close and volume
    #[arg(long)]
    pub close_only: bool,
}

fn progress_bar(len: usize) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(ProgressStyle::with_template(
        "[{elapsed_precise}] {bar:40.cyan/blue} {pos:>4}/{len:4} {msg}",
    )?);
    pb.set_message("fetching history...");
    Ok(pb)
}

pub async fn run(
    args: &HistoricalArgs,
    client: Arc<Client>,
    store: Arc<dyn CoverageStore>,
    format: &OutputFormat,
) -> Result<()> {
    let symbols = validation::validate_symbols(&args.symbols)?;
    let start = validation::validate_date(&args.start)?;
    let end = match &args.end {
        Some(end) => validation::validate_date(end)?,
        None => Utc::now().date_naive(),
    };

    let mut coordinator = CacheCoordinator::new(Arc::new(ChartFetcher::new(client)), store);
    let pb = if symbols.len() > 1 {
        Some(progress_bar(symbols.len())?)
    } else {
        None
    };
    if let Some(pb) = &pb {
        let pb = pb.clone();
        coordinator = coordinator.with_progress(move |symbol| {
            pb.set_message(symbol.to_string());
            pb.inc(1);
        });
    }

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling remaining symbols");
            on_interrupt.cancel();
        }
    });

    let use_cache = !args.no_cache;
    let finish = |returned: usize| {
        if let Some(pb) = &pb {
            pb.finish_with_message(format!("{} of {} symbols returned", returned, symbols.len()));
        }
    };

    if args.close_only {
        let data = coordinator
            .get_closes_cancellable(&symbols, start, end, use_cache, &cancel)
            .await?;
        finish(data.len());
        match format {
            OutputFormat::Table => print_closes_table(&data),
            OutputFormat::Json => match (symbols.len(), data.values().next()) {
                (1, Some(rows)) => print_json(&close_records_by_date(rows)),
                _ => print_json(&close_records_by_symbol(&data)),
            },
            OutputFormat::Csv => print_closes_csv(&data)?,
            OutputFormat::Markdown => print_closes_markdown(&data),
        }
    } else {
        let data = coordinator
            .get_historical_cancellable(&symbols, start, end, use_cache, &cancel)
            .await?;
        finish(data.len());
        match format {
            OutputFormat::Table => print_history_table(&data),
            OutputFormat::Json => match (symbols.len(), data.values().next()) {
                (1, Some(rows)) => print_json(&records_by_date(rows)),
                _ => print_json(&records_by_symbol(&data)),
            },
            OutputFormat::Csv => print_history_csv(&data)?,
            OutputFormat::Markdown => print_history_markdown(&data),
        }
    }

    Ok(())
}
