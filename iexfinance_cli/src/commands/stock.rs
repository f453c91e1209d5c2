use anyhow::Result;
use clap::Args;
use iexfinance_lib::validation;
use iexfinance_lib::{Client, Resource};

use crate::output::{print_value, OutputFormat};

#[derive(Args)]
pub struct SymbolArgs {
    /// Ticker symbol (e.g. AAPL)
    pub symbol: String,
}

#[derive(Args)]
pub struct QuoteArgs {
    /// Ticker symbol (e.g. AAPL)
    pub symbol: String,

    /// Report percentage fields multiplied by 100
    #[arg(long)]
    pub display_percent: bool,
}

pub async fn run_quote(args: &QuoteArgs, client: &Client, format: &OutputFormat) -> Result<()> {
    let resource = Resource::Quote {
        symbol: validation::validate_symbol(&args.symbol)?,
        display_percent: args.display_percent,
    };
    let value = client.get_resource(&resource).await?;
    print_value(&value, format)
}

pub async fn run_company(args: &SymbolArgs, client: &Client, format: &OutputFormat) -> Result<()> {
    let resource = Resource::Company {
        symbol: validation::validate_symbol(&args.symbol)?,
    };
    let value = client.get_resource(&resource).await?;
    print_value(&value, format)
}

pub async fn run_price(args: &SymbolArgs, client: &Client, format: &OutputFormat) -> Result<()> {
    let symbol = validation::validate_symbol(&args.symbol)?;
    let value = client
        .get_resource(&Resource::Price {
            symbol: symbol.clone(),
        })
        .await?;
    // Bare number; wrap it so tabular formats have a row to show.
    let wrapped = serde_json::json!({ "symbol": symbol, "price": value });
    print_value(&wrapped, format)
}
