use anyhow::Result;
use clap::Args;
use iexfinance_lib::{Client, QuotaType, Resource};

use crate::output::{print_value, OutputFormat};

#[derive(Args)]
pub struct UsageArgs {
    /// Quota type: messages, rules, rule-records, alerts, alert-records
    #[arg(long, default_value = "messages")]
    pub quota_type: QuotaType,
}

pub async fn run_usage(args: &UsageArgs, client: &Client, format: &OutputFormat) -> Result<()> {
    let value = client
        .get_resource(&Resource::AccountUsage(args.quota_type))
        .await?;
    print_value(&value, format)
}

pub async fn run_metadata(client: &Client, format: &OutputFormat) -> Result<()> {
    let value = client.get_resource(&Resource::AccountMetadata).await?;
    print_value(&value, format)
}
