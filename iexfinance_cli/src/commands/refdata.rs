use anyhow::Result;
use clap::Args;
use iexfinance_lib::validation;
use iexfinance_lib::{Client, Resource};

use crate::output::{print_value, OutputFormat};

#[derive(Args)]
pub struct SymbolsArgs {
    /// Only symbols traded on IEX
    #[arg(long, conflicts_with_all = ["region", "exchange"])]
    pub iex: bool,

    /// Symbols for a 2-letter region code (e.g. ca)
    #[arg(long, conflicts_with = "exchange")]
    pub region: Option<String>,

    /// Symbols for an exchange code (e.g. tse)
    #[arg(long)]
    pub exchange: Option<String>,
}

fn symbols_resource(args: &SymbolsArgs) -> Result<Resource> {
    if args.iex {
        return Ok(Resource::IexSymbols);
    }
    if let Some(region) = &args.region {
        return Ok(Resource::RegionSymbols(validation::validate_region(region)?));
    }
    if let Some(exchange) = &args.exchange {
        return Ok(Resource::ExchangeSymbols(validation::validate_exchange(
            exchange,
        )?));
    }
    Ok(Resource::Symbols)
}

pub async fn run_symbols(args: &SymbolsArgs, client: &Client, format: &OutputFormat) -> Result<()> {
    let resource = symbols_resource(args)?;
    let value = client.get_resource(&resource).await?;
    print_value(&value, format)
}

pub async fn run_sectors(client: &Client, format: &OutputFormat) -> Result<()> {
    let value = client.get_resource(&Resource::Sectors).await?;
    print_value(&value, format)
}
