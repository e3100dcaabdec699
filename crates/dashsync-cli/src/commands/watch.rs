//! Live dashboard view.
//!
//! Seven polling fetchers feed the headline stats and the charts, and a
//! health monitor tracks the backend; every state change produces one NDJSON
//! snapshot. A SIGHUP bumps the refresh key, which is part of every stat's
//! dependencies, so the stats re-fetch immediately and any of their cycles
//! still in flight are superseded.

use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use dashsync_core::{
    deps, AnalyticsClient, ApiError, BackendStatus, CategorySales, DailySales, DateRange,
    FetchState, Fetcher, HealthMonitor, InventoryItem, TopProduct, DEFAULT_LOW_STOCK_THRESHOLD,
};
use serde::Serialize;
use tokio::sync::watch;
use tracing::info;

use crate::cli::WatchArgs;
use crate::error::CliError;
use crate::output;

pub const SALES_REFRESH: Duration = Duration::from_secs(30);
pub const LOW_STOCK_REFRESH: Duration = Duration::from_secs(60);
pub const CHART_REFRESH: Duration = Duration::from_secs(30);
pub const INVENTORY_REFRESH: Duration = Duration::from_secs(60);

/// Bars shown in the top products chart.
pub const TOP_PRODUCTS_CHART_LIMIT: u32 = 5;

/// Average daily sales are always taken over a 30-day month, whatever the range.
const AVERAGE_WINDOW_DAYS: f64 = 30.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_sales: f64,
    pub low_stock_count: usize,
    pub unique_users: u64,
    pub avg_daily_sales: f64,
}

impl DashboardStats {
    /// Missing data counts as zero.
    pub fn from_states(
        total_sales: &FetchState<f64>,
        low_stock: &FetchState<Vec<InventoryItem>>,
        unique_users: &FetchState<u64>,
    ) -> Self {
        let total = total_sales.data.unwrap_or(0.0);
        Self {
            total_sales: total,
            low_stock_count: low_stock.data.as_ref().map_or(0, Vec::len),
            unique_users: unique_users.data.unwrap_or(0),
            avg_daily_sales: total / AVERAGE_WINDOW_DAYS,
        }
    }
}

/// Chart series; a chart with no data yet is empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Charts {
    pub daily_sales: Vec<DailySales>,
    pub sales_by_category: Vec<CategorySales>,
    pub top_products: Vec<TopProduct>,
    pub inventory: Vec<InventoryItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidgetStatus {
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> From<&FetchState<T>> for WidgetStatus {
    fn from(state: &FetchState<T>) -> Self {
        Self {
            loading: state.loading,
            error: state.error.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Widgets {
    pub total_sales: WidgetStatus,
    pub low_stock: WidgetStatus,
    pub unique_users: WidgetStatus,
    pub daily_sales: WidgetStatus,
    pub sales_by_category: WidgetStatus,
    pub top_products: WidgetStatus,
    pub inventory: WidgetStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub backend: BackendStatus,
    pub range: DateRange,
    pub refresh_key: u64,
    pub stats: DashboardStats,
    pub charts: Charts,
    pub widgets: Widgets,
}

/// Turns a client call into a producer that owns its own client handle.
fn bind<T, F, Fut>(
    client: &Arc<AnalyticsClient>,
    call: F,
) -> impl Fn() -> Fut + Send + Sync + 'static
where
    F: Fn(Arc<AnalyticsClient>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
{
    let client = Arc::clone(client);
    move || call(Arc::clone(&client))
}

pub struct Dashboard {
    client: Arc<AnalyticsClient>,
    range: DateRange,
    refresh_key: u64,
    total_sales: Fetcher<f64>,
    low_stock: Fetcher<Vec<InventoryItem>>,
    unique_users: Fetcher<u64>,
    daily_sales: Fetcher<Vec<DailySales>>,
    sales_by_category: Fetcher<Vec<CategorySales>>,
    top_products: Fetcher<Vec<TopProduct>>,
    inventory: Fetcher<Vec<InventoryItem>>,
    health: HealthMonitor,
}

impl Dashboard {
    pub fn start(client: Arc<AnalyticsClient>, range: DateRange) -> Self {
        let mut dashboard = Self {
            health: HealthMonitor::start(Arc::clone(&client)),
            client,
            range,
            refresh_key: 0,
            total_sales: Fetcher::polling(SALES_REFRESH).with_label("total_sales"),
            low_stock: Fetcher::polling(LOW_STOCK_REFRESH).with_label("low_stock"),
            unique_users: Fetcher::polling(SALES_REFRESH).with_label("unique_users"),
            daily_sales: Fetcher::polling(CHART_REFRESH).with_label("daily_sales"),
            sales_by_category: Fetcher::polling(CHART_REFRESH).with_label("sales_by_category"),
            top_products: Fetcher::polling(CHART_REFRESH).with_label("top_products"),
            inventory: Fetcher::polling(INVENTORY_REFRESH).with_label("inventory"),
        };
        dashboard.activate_stats();
        dashboard.activate_charts();
        dashboard
    }

    pub fn refresh_key(&self) -> u64 {
        self.refresh_key
    }

    /// Re-fetches the headline stats; the charts keep their own schedule.
    pub fn refresh(&mut self) {
        self.refresh_key += 1;
        info!(event = "cli.watch.refresh", refresh_key = self.refresh_key);
        self.activate_stats();
    }

    fn activate_stats(&mut self) {
        let range = self.range;
        let stats_deps = deps![range.start_param(), range.end_param(), self.refresh_key];

        self.total_sales.activate(
            stats_deps.clone(),
            bind(&self.client, move |client| async move {
                client.total_sales(Some(range)).await
            }),
        );
        self.low_stock.activate(
            deps![self.refresh_key],
            bind(&self.client, |client| async move {
                client
                    .low_stock_products(Some(DEFAULT_LOW_STOCK_THRESHOLD))
                    .await
            }),
        );
        self.unique_users.activate(
            stats_deps,
            bind(&self.client, move |client| async move {
                client.unique_users_count(Some(range)).await
            }),
        );
    }

    fn activate_charts(&mut self) {
        let range = self.range;
        let range_deps = deps![range.start_param(), range.end_param()];

        self.daily_sales.activate(
            range_deps.clone(),
            bind(&self.client, move |client| async move {
                client.daily_sales(Some(range)).await
            }),
        );
        self.sales_by_category.activate(
            range_deps,
            bind(&self.client, move |client| async move {
                client.sales_by_category(Some(range)).await
            }),
        );
        self.top_products.activate(
            deps![range.start_param(), range.end_param(), TOP_PRODUCTS_CHART_LIMIT],
            bind(&self.client, move |client| async move {
                client
                    .top_products(Some(range), Some(TOP_PRODUCTS_CHART_LIMIT))
                    .await
            }),
        );
        self.inventory.activate(
            deps![],
            bind(&self.client, |client| async move {
                client.inventory_status().await
            }),
        );
    }

    pub fn snapshot(&self) -> Snapshot {
        let total_sales = self.total_sales.state();
        let low_stock = self.low_stock.state();
        let unique_users = self.unique_users.state();
        let daily_sales = self.daily_sales.state();
        let sales_by_category = self.sales_by_category.state();
        let top_products = self.top_products.state();
        let inventory = self.inventory.state();

        Snapshot {
            backend: self.health.status(),
            range: self.range,
            refresh_key: self.refresh_key,
            stats: DashboardStats::from_states(&total_sales, &low_stock, &unique_users),
            widgets: Widgets {
                total_sales: WidgetStatus::from(&total_sales),
                low_stock: WidgetStatus::from(&low_stock),
                unique_users: WidgetStatus::from(&unique_users),
                daily_sales: WidgetStatus::from(&daily_sales),
                sales_by_category: WidgetStatus::from(&sales_by_category),
                top_products: WidgetStatus::from(&top_products),
                inventory: WidgetStatus::from(&inventory),
            },
            charts: Charts {
                daily_sales: daily_sales.data.unwrap_or_default(),
                sales_by_category: sales_by_category.data.unwrap_or_default(),
                top_products: top_products.data.unwrap_or_default(),
                inventory: inventory.data.unwrap_or_default(),
            },
        }
    }

    fn changes(&self) -> ChangeFeed {
        ChangeFeed {
            total_sales: self.total_sales.subscribe(),
            low_stock: self.low_stock.subscribe(),
            unique_users: self.unique_users.subscribe(),
            daily_sales: self.daily_sales.subscribe(),
            sales_by_category: self.sales_by_category.subscribe(),
            top_products: self.top_products.subscribe(),
            inventory: self.inventory.subscribe(),
            health: self.health.subscribe(),
        }
    }

    fn stop(&mut self) {
        self.total_sales.teardown();
        self.low_stock.teardown();
        self.unique_users.teardown();
        self.daily_sales.teardown();
        self.sales_by_category.teardown();
        self.top_products.teardown();
        self.inventory.teardown();
        self.health.stop();
    }
}

/// One receiver per widget; resolves when any of them changes.
struct ChangeFeed {
    total_sales: watch::Receiver<FetchState<f64>>,
    low_stock: watch::Receiver<FetchState<Vec<InventoryItem>>>,
    unique_users: watch::Receiver<FetchState<u64>>,
    daily_sales: watch::Receiver<FetchState<Vec<DailySales>>>,
    sales_by_category: watch::Receiver<FetchState<Vec<CategorySales>>>,
    top_products: watch::Receiver<FetchState<Vec<TopProduct>>>,
    inventory: watch::Receiver<FetchState<Vec<InventoryItem>>>,
    health: watch::Receiver<FetchState<()>>,
}

impl ChangeFeed {
    fn mark_seen(&mut self) {
        self.total_sales.mark_unchanged();
        self.low_stock.mark_unchanged();
        self.unique_users.mark_unchanged();
        self.daily_sales.mark_unchanged();
        self.sales_by_category.mark_unchanged();
        self.top_products.mark_unchanged();
        self.inventory.mark_unchanged();
        self.health.mark_unchanged();
    }

    async fn next(&mut self) {
        tokio::select! {
            _ = self.total_sales.changed() => {}
            _ = self.low_stock.changed() => {}
            _ = self.unique_users.changed() => {}
            _ = self.daily_sales.changed() => {}
            _ = self.sales_by_category.changed() => {}
            _ = self.top_products.changed() => {}
            _ = self.inventory.changed() => {}
            _ = self.health.changed() => {}
        }
    }
}

/// Manual refresh requests. On Unix each SIGHUP is one request; other
/// platforms never produce any.
struct RefreshRequests {
    #[cfg(unix)]
    hangup: tokio::signal::unix::Signal,
}

impl RefreshRequests {
    fn install() -> io::Result<Self> {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            Ok(Self {
                hangup: signal(SignalKind::hangup())?,
            })
        }
        #[cfg(not(unix))]
        {
            Ok(Self {})
        }
    }

    async fn next(&mut self) -> Option<()> {
        #[cfg(unix)]
        {
            self.hangup.recv().await
        }
        #[cfg(not(unix))]
        {
            std::future::pending().await
        }
    }
}

pub async fn run(client: Arc<AnalyticsClient>, args: &WatchArgs) -> Result<(), CliError> {
    let range = match args.range.range()? {
        Some(range) => range,
        None => client.resolve_range(None),
    };
    let mut refresh_requests = RefreshRequests::install()?;
    let mut dashboard = Dashboard::start(client, range);
    let mut changes = dashboard.changes();
    info!(event = "cli.watch.started", range = %range, iterations = ?args.iterations);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let stdout = io::stdout();
    let mut emitted = 0usize;
    let result = loop {
        changes.mark_seen();
        let snapshot = dashboard.snapshot();
        if let Err(failure) = output::write_line(&mut stdout.lock(), &snapshot) {
            break Err(failure);
        }
        emitted += 1;

        if args.iterations.is_some_and(|limit| emitted >= limit) {
            break Ok(());
        }

        tokio::select! {
            _ = changes.next() => {}
            Some(()) = refresh_requests.next() => dashboard.refresh(),
            _ = &mut shutdown => {
                info!(event = "cli.watch.interrupted", snapshots = emitted);
                break Ok(());
            }
        }
    };

    dashboard.stop();
    info!(
        event = "cli.watch.stopped",
        snapshots = emitted,
        refresh_key = dashboard.refresh_key()
    );
    result
}
