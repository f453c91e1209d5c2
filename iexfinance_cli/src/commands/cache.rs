use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use iexfinance_lib::format::records_by_date;
use iexfinance_lib::validation;
use iexfinance_lib::{CoverageStore, SqliteStore};

use crate::output::{
    print_cache_csv, print_cache_markdown, print_cache_table, print_history_csv,
    print_history_markdown, print_history_table, print_json, CacheEntryRow, OutputFormat,
};

#[derive(Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheCommand,
}

#[derive(Subcommand)]
pub enum CacheCommand {
    /// List cached symbols with their coverage
    List,
    /// Print the cached rows for a symbol
    Show {
        /// Ticker symbol
        symbol: String,
    },
    /// Remove a symbol from the cache
    Clear {
        /// Ticker symbol
        symbol: String,
    },
}

fn cache_entries(store: &dyn CoverageStore) -> Result<Vec<CacheEntryRow>> {
    let mut entries = Vec::new();
    for symbol in store.symbols()? {
        if let Some(series) = store.get(&symbol)? {
            entries.push(CacheEntryRow {
                symbol,
                from: series.min_date.to_string(),
                to: series.max_date.to_string(),
                rows: series.rows.len(),
            });
        }
    }
    Ok(entries)
}

pub fn run(args: &CacheArgs, path: Option<&Path>, format: &OutputFormat) -> Result<()> {
    let Some(path) = path else {
        bail!("no cache file configured; pass --cache <PATH> or set IEX_CACHE_PATH");
    };
    let store = SqliteStore::open(path)?;

    match &args.command {
        CacheCommand::List => {
            let entries = cache_entries(&store)?;
            match format {
                OutputFormat::Table => print_cache_table(&entries),
                OutputFormat::Json => print_json(&entries),
                OutputFormat::Csv => print_cache_csv(&entries)?,
                OutputFormat::Markdown => print_cache_markdown(&entries),
            }
        }
        CacheCommand::Show { symbol } => {
            let symbol = validation::validate_symbol(symbol)?;
            let Some(series) = store.get(&symbol)? else {
                bail!("{} is not cached", symbol);
            };
            eprintln!(
                "{}: {} rows covering {} to {}",
                symbol,
                series.rows.len(),
                series.min_date,
                series.max_date
            );
            let json = records_by_date(&series.rows);
            let mut data = BTreeMap::new();
            data.insert(symbol, series.rows);
            match format {
                OutputFormat::Table => print_history_table(&data),
                OutputFormat::Json => print_json(&json),
                OutputFormat::Csv => print_history_csv(&data)?,
                OutputFormat::Markdown => print_history_markdown(&data),
            }
        }
        CacheCommand::Clear { symbol } => {
            let symbol = validation::validate_symbol(symbol)?;
            if store.remove(&symbol)? {
                eprintln!("Removed {} from {}", symbol, path.display());
            } else {
                eprintln!("{} was not cached", symbol);
            }
        }
    }

    Ok(())
}
