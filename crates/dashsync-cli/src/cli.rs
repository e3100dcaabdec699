//! CLI argument definitions for dashsync.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `sales-by-category` | Revenue per product category |
//! | `top-products` | Best sellers by quantity |
//! | `daily-sales` | Revenue and transactions per day |
//! | `total-sales` | Revenue over the range |
//! | `inventory` | Stock level of every product |
//! | `low-stock` | Products below a stock threshold |
//! | `activity-summary` | User activity by type |
//! | `most-viewed` | Most viewed products |
//! | `unique-users` | Distinct active users |
//! | `health` | Check whether the backend is reachable |
//! | `watch` | Live dashboard stats as NDJSON |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--base-url` | `$DASHSYNC_API_BASE_URL`, else `http://localhost:8080/api/analytics` | Analytics API base URL |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--quiet` | `false` | Only log errors |
//!
//! # Examples
//!
//! ```bash
//! # Sales per category over the last 30 days
//! dashsync sales-by-category --pretty
//!
//! # Top five products in January
//! dashsync top-products --start-date 2024-01-01 --end-date 2024-01-31 --limit 5
//!
//! # Stream dashboard snapshots against another backend
//! DASHSYNC_API_BASE_URL=http://analytics:8080/api/analytics dashsync watch
//! ```

use clap::{Args, Parser, Subcommand};
use dashsync_core::{
    ApiConfig, DateRange, ValidationError, DEFAULT_LOW_STOCK_THRESHOLD, DEFAULT_TOP_LIMIT,
};

/// Dashsync - analytics dashboard data from the command line
#[derive(Debug, Parser)]
#[command(
    name = "dashsync",
    author,
    version,
    about = "Analytics dashboard data client",
    long_about = "Dashsync queries the sales, inventory, and user-activity analytics API \
and can keep a live dashboard view in sync with it.\n\
\n\
Date-range commands default to the last 30 days.\n\
\n\
Use 'dashsync <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Base URL of the analytics API.
    ///
    /// Falls back to $DASHSYNC_API_BASE_URL, then to
    /// http://localhost:8080/api/analytics.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Only emit error-level log events.
    #[arg(long, short, global = true, default_value_t = false)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Explicit `--base-url` first, then the environment, then the default.
    pub fn api_config(&self) -> Result<ApiConfig, ValidationError> {
        match &self.base_url {
            Some(base_url) => ApiConfig::new(base_url.as_str()),
            None => ApiConfig::from_env(),
        }
    }
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Revenue and product count per category.
    SalesByCategory(RangeArgs),

    /// Best-selling products by quantity.
    ///
    /// # Examples
    ///
    ///   dashsync top-products --limit 5
    TopProducts(RankedArgs),

    /// Revenue and transaction count per day.
    DailySales(RangeArgs),

    /// Total revenue over the range.
    TotalSales(RangeArgs),

    /// Stock level and status of every product.
    Inventory,

    /// Products whose stock is below the threshold.
    LowStock(LowStockArgs),

    /// Share of each user activity type.
    ActivitySummary(RangeArgs),

    /// Most viewed products.
    MostViewed(RankedArgs),

    /// Number of distinct active users.
    UniqueUsers(RangeArgs),

    /// Check whether the analytics backend is reachable.
    ///
    /// Prints checking, online, or offline. Exits with code 3 when offline.
    Health,

    /// Keep the dashboard in sync and print a snapshot on every change.
    ///
    /// Total sales, unique users, and the sales charts refresh every 30
    /// seconds, low stock and inventory every 60 seconds, backend health every
    /// 10 seconds. Send SIGHUP to re-fetch the stats at once. Stops on Ctrl-C.
    ///
    /// # Examples
    ///
    ///   dashsync watch
    ///   dashsync watch --iterations 5
    Watch(WatchArgs),
}

impl Command {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SalesByCategory(_) => "sales-by-category",
            Self::TopProducts(_) => "top-products",
            Self::DailySales(_) => "daily-sales",
            Self::TotalSales(_) => "total-sales",
            Self::Inventory => "inventory",
            Self::LowStock(_) => "low-stock",
            Self::ActivitySummary(_) => "activity-summary",
            Self::MostViewed(_) => "most-viewed",
            Self::UniqueUsers(_) => "unique-users",
            Self::Health => "health",
            Self::Watch(_) => "watch",
        }
    }
}

/// Optional explicit date range.
#[derive(Debug, Clone, Default, Args)]
pub struct RangeArgs {
    /// First day of the range (YYYY-MM-DD). Requires --end-date.
    #[arg(long)]
    pub start_date: Option<String>,

    /// Last day of the range (YYYY-MM-DD). Requires --start-date.
    #[arg(long)]
    pub end_date: Option<String>,
}

impl RangeArgs {
    /// `None` means the client's default 30-day window.
    pub fn range(&self) -> Result<Option<DateRange>, ValidationError> {
        DateRange::from_parts(self.start_date.as_deref(), self.end_date.as_deref())
    }
}

/// Arguments for `top-products` and `most-viewed`.
#[derive(Debug, Clone, Args)]
pub struct RankedArgs {
    #[command(flatten)]
    pub range: RangeArgs,

    /// Maximum number of products to return.
    #[arg(long, default_value_t = DEFAULT_TOP_LIMIT)]
    pub limit: u32,
}

/// Arguments for `low-stock`.
#[derive(Debug, Clone, Args)]
pub struct LowStockArgs {
    /// Stock quantity below which a product is reported.
    #[arg(long, default_value_t = DEFAULT_LOW_STOCK_THRESHOLD)]
    pub threshold: u32,
}

/// Arguments for `watch`.
#[derive(Debug, Clone, Args)]
pub struct WatchArgs {
    #[command(flatten)]
    pub range: RangeArgs,

    /// Stop after printing this many snapshots.
    #[arg(long)]
    pub iterations: Option<usize>,
}
