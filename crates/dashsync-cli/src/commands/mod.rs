mod health;
mod watch;

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use dashsync_core::{AnalyticsClient, ApiError};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::output;

pub async fn run(cli: &Cli) -> Result<(), CliError> {
    let config = cli.api_config()?;
    let client = Arc::new(AnalyticsClient::new(config));
    info!(
        event = "cli.command_started",
        command = cli.command.name(),
        base_url = client.config().base_url()
    );

    let started = Instant::now();
    let data = match &cli.command {
        Command::Health => return health::run(&client, cli.pretty).await,
        Command::Watch(args) => return watch::run(client, args).await,
        Command::SalesByCategory(args) => fetch(client.sales_by_category(args.range()?)).await?,
        Command::TopProducts(args) => {
            fetch(client.top_products(args.range.range()?, Some(args.limit))).await?
        }
        Command::DailySales(args) => fetch(client.daily_sales(args.range()?)).await?,
        Command::TotalSales(args) => fetch(client.total_sales(args.range()?)).await?,
        Command::Inventory => fetch(client.inventory_status()).await?,
        Command::LowStock(args) => fetch(client.low_stock_products(Some(args.threshold))).await?,
        Command::ActivitySummary(args) => fetch(client.activity_summary(args.range()?)).await?,
        Command::MostViewed(args) => {
            fetch(client.most_viewed_products(args.range.range()?, Some(args.limit))).await?
        }
        Command::UniqueUsers(args) => fetch(client.unique_users_count(args.range()?)).await?,
    };

    info!(
        event = "cli.command_completed",
        command = cli.command.name(),
        latency_ms = started.elapsed().as_millis() as u64
    );
    output::render(&data, cli.pretty)
}

async fn fetch<T, F>(request: F) -> Result<Value, CliError>
where
    T: Serialize,
    F: Future<Output = Result<T, ApiError>>,
{
    let data = request.await?;
    Ok(serde_json::to_value(data)?)
}
