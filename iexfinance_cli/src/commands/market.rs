use anyhow::Result;
use clap::Args;
use iexfinance_lib::{Client, MoverList, Resource};

use crate::output::{print_value, OutputFormat};

#[derive(Args)]
pub struct MoversArgs {
    /// List: mostactive, gainers, losers, iexvolume, iexpercent, infocus
    pub list: MoverList,
}

pub async fn run_movers(args: &MoversArgs, client: &Client, format: &OutputFormat) -> Result<()> {
    let value = client.get_resource(&Resource::Movers(args.list)).await?;
    print_value(&value, format)
}

pub async fn run_sector_performance(client: &Client, format: &OutputFormat) -> Result<()> {
    let value = client.get_resource(&Resource::SectorPerformance).await?;
    print_value(&value, format)
}
