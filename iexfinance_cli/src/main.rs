mod commands;
mod output;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use iexfinance_lib::{Client, Config, CoverageStore, MemoryStore, SqliteStore};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "iexfinance")]
#[command(about = "Query market data from the IEX API with a local historical cache")]
struct Cli {
    /// Output format: table, json, csv, or markdown
    #[arg(long, default_value = "table", global = true)]
    output: String,

    /// API base URL (overrides IEX_API_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Extra attempts after a failed request (overrides IEX_RETRY_COUNT)
    #[arg(long, global = true)]
    retries: Option<u32>,

    /// Milliseconds to wait between attempts (overrides IEX_PAUSE_MS)
    #[arg(long, global = true)]
    pause_ms: Option<u64>,

    /// SQLite cache file (overrides IEX_CACHE_PATH)
    #[arg(long, global = true)]
    cache: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Daily OHLCV history for one or more symbols, served through the cache
    Historical(commands::historical::HistoricalArgs),
    /// Latest quote for a symbol
    Quote(commands::stock::QuoteArgs),
    /// Company profile for a symbol
    Company(commands::stock::SymbolArgs),
    /// Latest price for a symbol
    Price(commands::stock::SymbolArgs),
    /// Crypto book, price, or quote
    Crypto(commands::crypto::CryptoArgs),
    /// Market movers list (mostactive, gainers, losers, ...)
    Movers(commands::market::MoversArgs),
    /// Performance by sector
    SectorPerformance,
    /// Reference symbol lists
    Symbols(commands::refdata::SymbolsArgs),
    /// Reference sector list
    Sectors,
    /// Account message usage
    Usage(commands::account::UsageArgs),
    /// Account metadata
    Metadata,
    /// Inspect or clear the SQLite historical cache
    Cache(commands::cache::CacheArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("iexfinance=info".parse()?)
                .add_directive("iex_api=warn".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let format = match cli.output.as_str() {
        "json" => OutputFormat::Json,
        "csv" => OutputFormat::Csv,
        "md" | "markdown" => OutputFormat::Markdown,
        _ => OutputFormat::Table,
    };

    let mut config = Config::from_env();
    if let Some(url) = cli.base_url {
        config.base_url = url;
    }
    if let Some(retries) = cli.retries {
        config.retry_count = retries;
    }
    if let Some(pause_ms) = cli.pause_ms {
        config.pause_ms = pause_ms;
    }
    if let Some(path) = cli.cache {
        config.cache_path = Some(path);
    }

    let client = Arc::new(Client::from_config(config.client_config())?);

    match &cli.command {
        Commands::Historical(args) => {
            let store = open_store(&config)?;
            commands::historical::run(args, client, store, &format).await?
        }
        Commands::Quote(args) => commands::stock::run_quote(args, &client, &format).await?,
        Commands::Company(args) => commands::stock::run_company(args, &client, &format).await?,
        Commands::Price(args) => commands::stock::run_price(args, &client, &format).await?,
        Commands::Crypto(args) => commands::crypto::run(args, &client, &format).await?,
        Commands::Movers(args) => commands::market::run_movers(args, &client, &format).await?,
        Commands::SectorPerformance => {
            commands::market::run_sector_performance(&client, &format).await?
        }
        Commands::Symbols(args) => commands::refdata::run_symbols(args, &client, &format).await?,
        Commands::Sectors => commands::refdata::run_sectors(&client, &format).await?,
        Commands::Usage(args) => commands::account::run_usage(args, &client, &format).await?,
        Commands::Metadata => commands::account::run_metadata(&client, &format).await?,
        Commands::Cache(args) => commands::cache::run(args, config.cache_path.as_deref(), &format)?,
    }

    Ok(())
}

fn open_store(config: &Config) -> Result<Arc<dyn CoverageStore>> {
    match &config.cache_path {
        Some(path) => {
            tracing::info!("Using cache file {}", path.display());
            Ok(Arc::new(SqliteStore::open(path)?))
        }
        None => Ok(Arc::new(MemoryStore::new())),
    }
}
