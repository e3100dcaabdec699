//! Analytics API client.
//!
//! [`AnalyticsClient`] turns dashboard queries into `GET` requests under a
//! single base URL and hands back the parsed JSON body. All requests share a
//! fixed 10 second timeout and JSON headers.
//!
//! Date-range operations take `Option<DateRange>`. `None` means "the last 30
//! days", evaluated against the client's [`Clock`] on every call.
//!
//! | Operation | Resource | Extra query |
//! |-----------|----------|-------------|
//! | [`sales_by_category`](AnalyticsClient::sales_by_category) | `sales/by-category` | |
//! | [`top_products`](AnalyticsClient::top_products) | `sales/top-products` | `limit` (10) |
//! | [`daily_sales`](AnalyticsClient::daily_sales) | `sales/daily` | |
//! | [`total_sales`](AnalyticsClient::total_sales) | `sales/total` | |
//! | [`inventory_status`](AnalyticsClient::inventory_status) | `inventory/status` | none, no dates |
//! | [`low_stock_products`](AnalyticsClient::low_stock_products) | `inventory/low-stock` | `threshold` (50), no dates |
//! | [`activity_summary`](AnalyticsClient::activity_summary) | `user-activity/summary` | |
//! | [`most_viewed_products`](AnalyticsClient::most_viewed_products) | `user-activity/most-viewed` | `limit` (10) |
//! | [`unique_users_count`](AnalyticsClient::unique_users_count) | `user-activity/unique-users` | |

use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Instant;

use serde::de::DeserializeOwned;
use time::{Date, OffsetDateTime};
use tracing::{debug, warn};

use crate::domain::{
    ActivitySummary, CategorySales, DailySales, DateRange, InventoryItem, TopProduct,
};
use crate::error::{ApiError, ValidationError};
use crate::http_client::{HttpClient, HttpRequest, HttpResponse, ReqwestHttpClient};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/analytics";
pub const BASE_URL_ENV: &str = "DASHSYNC_API_BASE_URL";
pub const DEFAULT_TOP_LIMIT: u32 = 10;
pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 50;

/// Analytics resources consumed by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    SalesByCategory,
    TopProducts,
    DailySales,
    TotalSales,
    InventoryStatus,
    LowStock,
    ActivitySummary,
    MostViewed,
    UniqueUsers,
}

impl Endpoint {
    pub const fn as_path(self) -> &'static str {
        match self {
            Self::SalesByCategory => "sales/by-category",
            Self::TopProducts => "sales/top-products",
            Self::DailySales => "sales/daily",
            Self::TotalSales => "sales/total",
            Self::InventoryStatus => "inventory/status",
            Self::LowStock => "inventory/low-stock",
            Self::ActivitySummary => "user-activity/summary",
            Self::MostViewed => "user-activity/most-viewed",
            Self::UniqueUsers => "user-activity/unique-users",
        }
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_path())
    }
}

/// Process-wide client configuration. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: String,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ValidationError> {
        let base_url = base_url.into();
        let trimmed = base_url.trim().trim_end_matches('/');
        let has_host = trimmed
            .strip_prefix("http://")
            .or_else(|| trimmed.strip_prefix("https://"))
            .is_some_and(|rest| !rest.is_empty());

        if !has_host {
            return Err(ValidationError::InvalidBaseUrl { value: base_url });
        }

        Ok(Self {
            base_url: trimmed.to_owned(),
        })
    }

    /// Reads `DASHSYNC_API_BASE_URL`, falling back to [`DEFAULT_BASE_URL`].
    pub fn from_env() -> Result<Self, ValidationError> {
        match std::env::var(BASE_URL_ENV) {
            Ok(value) if !value.trim().is_empty() => Self::new(value),
            _ => Ok(Self::default()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url_for(&self, endpoint: Endpoint) -> String {
        format!("{}/{}", self.base_url, endpoint.as_path())
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::from(DEFAULT_BASE_URL),
        }
    }
}

/// Source of "today" for default date windows.
pub trait Clock: Send + Sync {
    fn today(&self) -> Date;
}

/// Wall clock in the local timezone, or UTC when the offset is unknown.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> Date {
        OffsetDateTime::now_local()
            .unwrap_or_else(|_| OffsetDateTime::now_utc())
            .date()
    }
}

/// Clock pinned to one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub Date);

impl Clock for FixedClock {
    fn today(&self) -> Date {
        self.0
    }
}

/// Typed access to the analytics API.
#[derive(Clone)]
pub struct AnalyticsClient {
    config: ApiConfig,
    http_client: Arc<dyn HttpClient>,
    clock: Arc<dyn Clock>,
}

impl Default for AnalyticsClient {
    fn default() -> Self {
        Self::new(ApiConfig::default())
    }
}

impl AnalyticsClient {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            http_client: Arc::new(ReqwestHttpClient::new()),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_http_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.http_client = http_client;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// The range a date-range operation will send for `range`.
    pub fn resolve_range(&self, range: Option<DateRange>) -> DateRange {
        range.unwrap_or_else(|| DateRange::default_window(self.clock.today()))
    }

    pub async fn sales_by_category(
        &self,
        range: Option<DateRange>,
    ) -> Result<Vec<CategorySales>, ApiError> {
        let query = self.range_query(range);
        self.get_json(Endpoint::SalesByCategory, query).await
    }

    pub async fn top_products(
        &self,
        range: Option<DateRange>,
        limit: Option<u32>,
    ) -> Result<Vec<TopProduct>, ApiError> {
        let mut query = self.range_query(range);
        query.push(("limit", limit.unwrap_or(DEFAULT_TOP_LIMIT).to_string()));
        self.get_json(Endpoint::TopProducts, query).await
    }

    pub async fn daily_sales(&self, range: Option<DateRange>) -> Result<Vec<DailySales>, ApiError> {
        let query = self.range_query(range);
        self.get_json(Endpoint::DailySales, query).await
    }

    pub async fn total_sales(&self, range: Option<DateRange>) -> Result<f64, ApiError> {
        let query = self.range_query(range);
        self.get_json(Endpoint::TotalSales, query).await
    }

    pub async fn inventory_status(&self) -> Result<Vec<InventoryItem>, ApiError> {
        self.get_json(Endpoint::InventoryStatus, Vec::new()).await
    }

    pub async fn low_stock_products(
        &self,
        threshold: Option<u32>,
    ) -> Result<Vec<InventoryItem>, ApiError> {
        let threshold = threshold.unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD);
        self.get_json(Endpoint::LowStock, vec![("threshold", threshold.to_string())])
            .await
    }

    pub async fn activity_summary(
        &self,
        range: Option<DateRange>,
    ) -> Result<Vec<ActivitySummary>, ApiError> {
        let query = self.range_query(range);
        self.get_json(Endpoint::ActivitySummary, query).await
    }

    pub async fn most_viewed_products(
        &self,
        range: Option<DateRange>,
        limit: Option<u32>,
    ) -> Result<Vec<TopProduct>, ApiError> {
        let mut query = self.range_query(range);
        query.push(("limit", limit.unwrap_or(DEFAULT_TOP_LIMIT).to_string()));
        self.get_json(Endpoint::MostViewed, query).await
    }

    pub async fn unique_users_count(&self, range: Option<DateRange>) -> Result<u64, ApiError> {
        let query = self.range_query(range);
        self.get_json(Endpoint::UniqueUsers, query).await
    }

    /// Liveness check against `inventory/status`. Any 2xx counts as up; the
    /// body is not parsed.
    pub async fn ping(&self) -> Result<(), ApiError> {
        self.send(Endpoint::InventoryStatus, Vec::new())
            .await
            .map(|_| ())
    }

    /// Issues a GET and deserializes the body into `T`.
    ///
    /// Use `T = serde_json::Value` to receive the body untouched.
    pub async fn get_json<T>(
        &self,
        endpoint: Endpoint,
        query: Vec<(&'static str, String)>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let response = self.send(endpoint, query).await?;
        serde_json::from_str(&response.body).map_err(|error| {
            let error = ApiError::parse(error.to_string());
            warn!(
                event = "core.api.parse_failed",
                endpoint = endpoint.as_path(),
                status = response.status,
                error = %error
            );
            error
        })
    }

    async fn send(
        &self,
        endpoint: Endpoint,
        query: Vec<(&'static str, String)>,
    ) -> Result<HttpResponse, ApiError> {
        let request = query.into_iter().fold(
            HttpRequest::get(self.config.url_for(endpoint))
                .with_header("Content-Type", "application/json")
                .with_header("Accept", "application/json"),
            |request, (name, value)| request.with_query(name, value),
        );
        let url = request.full_url();
        let started = Instant::now();

        let response = match self.http_client.execute(request).await {
            Ok(response) => response,
            Err(error) => {
                warn!(
                    event = "core.api.request_failed",
                    endpoint = endpoint.as_path(),
                    url = %url,
                    timed_out = error.timed_out(),
                    latency_ms = started.elapsed().as_millis() as u64,
                    error = %error
                );
                return Err(ApiError::network(error.message()));
            }
        };

        let latency_ms = started.elapsed().as_millis() as u64;
        if !response.is_success() {
            warn!(
                event = "core.api.http_error",
                endpoint = endpoint.as_path(),
                url = %url,
                status = response.status,
                latency_ms
            );
            return Err(ApiError::http(response.status, response.body));
        }

        debug!(
            event = "core.api.response",
            endpoint = endpoint.as_path(),
            url = %url,
            status = response.status,
            bytes = response.body.len(),
            latency_ms
        );
        Ok(response)
    }

    fn range_query(&self, range: Option<DateRange>) -> Vec<(&'static str, String)> {
        let range = self.resolve_range(range);
        vec![
            ("startDate", range.start_param()),
            ("endDate", range.end_param()),
        ]
    }
}
