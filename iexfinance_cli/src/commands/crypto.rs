use anyhow::Result;
use clap::Args;
use iexfinance_lib::validation;
use iexfinance_lib::{Client, CryptoEndpoint, Resource};

use crate::output::{print_value, OutputFormat};

#[derive(Args)]
pub struct CryptoArgs {
    /// Crypto pair symbol (e.g. BTCUSD)
    pub symbol: String,

    /// Endpoint: book, price, quote
    #[arg(long, default_value = "quote")]
    pub endpoint: CryptoEndpoint,
}

pub async fn run(args: &CryptoArgs, client: &Client, format: &OutputFormat) -> Result<()> {
    let symbol = validation::validate_symbol(&args.symbol)?;
    let value = client
        .get_resource(&Resource::crypto(&symbol, args.endpoint))
        .await?;
    print_value(&value, format)
}
