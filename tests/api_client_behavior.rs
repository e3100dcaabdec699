//! Behavior-driven tests for the analytics API client
//!
//! These tests verify WHAT the client sends to the analytics service and
//! HOW it hands the response back, using a recording transport instead of a
//! live backend.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use dashsync_core::{
    AnalyticsClient, ApiConfig, Clock, DateRange, FixedClock, HttpClient, HttpError, HttpRequest,
    HttpResponse, StockStatus, SystemClock,
};
use serde_json::{json, Value};
use time::macros::date;
use time::Duration;

/// Transport that records every request and replays canned responses.
#[derive(Default)]
struct RecordingHttpClient {
    responses: Mutex<VecDeque<HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl RecordingHttpClient {
    fn replying(bodies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(bodies.iter().map(|body| HttpResponse::ok_json(*body)).collect()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("lock is not poisoned").clone()
    }

    fn last_request(&self) -> HttpRequest {
        self.requests()
            .pop()
            .expect("at least one request should have been sent")
    }
}

impl HttpClient for RecordingHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        self.requests
            .lock()
            .expect("lock is not poisoned")
            .push(request);
        let response = self
            .responses
            .lock()
            .expect("lock is not poisoned")
            .pop_front()
            .unwrap_or_else(|| HttpResponse::ok_json("[]"));
        Box::pin(async move { Ok(response) })
    }
}

fn client_on(transport: Arc<RecordingHttpClient>, today: time::Date) -> AnalyticsClient {
    AnalyticsClient::new(
        ApiConfig::new("http://analytics.test/api/analytics").expect("valid base url"),
    )
    .with_http_client(transport)
    .with_clock(Arc::new(FixedClock(today)))
}

fn query_pairs(request: &HttpRequest) -> Vec<(&str, &str)> {
    request
        .query
        .iter()
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect()
}

// =============================================================================
// Default date range
// =============================================================================

#[tokio::test]
async fn when_no_range_is_given_the_last_thirty_days_are_requested() {
    // Given: Today is 2024-03-31
    let transport = RecordingHttpClient::replying(&["[]"]);
    let client = client_on(Arc::clone(&transport), date!(2024 - 03 - 31));

    // When: Sales by category are requested without dates
    client
        .sales_by_category(None)
        .await
        .expect("empty list is a valid response");

    // Then: The window ends today and starts exactly 30 days earlier
    let request = transport.last_request();
    assert_eq!(
        request.url,
        "http://analytics.test/api/analytics/sales/by-category"
    );
    assert_eq!(
        query_pairs(&request),
        vec![("startDate", "2024-03-01"), ("endDate", "2024-03-31")]
    );
}

#[tokio::test]
async fn default_range_follows_the_wall_clock_at_call_time() {
    // Given: A client on the real clock
    let transport = RecordingHttpClient::replying(&["0"]);
    let client = AnalyticsClient::default().with_http_client(Arc::clone(&transport) as Arc<dyn HttpClient>);

    // When: A date-range query runs without arguments
    let before = SystemClock.today();
    client.unique_users_count(None).await.expect("valid count");
    let after = SystemClock.today();

    // Then: endDate is today and startDate is 30 days before it
    let request = transport.last_request();
    let end = request.query_param("endDate").expect("endDate present");
    let start = request.query_param("startDate").expect("startDate present");

    let end_date = [before, after]
        .into_iter()
        .find(|candidate| DateRange::default_window(*candidate).end_param() == end)
        .expect("endDate should be today");
    assert_eq!(
        start,
        DateRange::new(end_date - Duration::days(30), end_date).start_param()
    );
    assert_eq!(start.len(), 10, "dates are YYYY-MM-DD");
}

#[tokio::test]
async fn default_range_is_recomputed_for_every_call() {
    // Given: A clock that moves forward between calls
    struct SteppingClock(Mutex<time::Date>);
    impl Clock for SteppingClock {
        fn today(&self) -> time::Date {
            let mut today = self.0.lock().expect("lock is not poisoned");
            let current = *today;
            *today = current + Duration::days(1);
            current
        }
    }

    let transport = RecordingHttpClient::replying(&["0", "0"]);
    let client = AnalyticsClient::default()
        .with_http_client(Arc::clone(&transport) as Arc<dyn HttpClient>)
        .with_clock(Arc::new(SteppingClock(Mutex::new(date!(2024 - 05 - 01)))));

    // When: The same query runs twice
    client.total_sales(None).await.expect("valid total");
    client.total_sales(None).await.expect("valid total");

    // Then: Each call used that moment's date
    let requests = transport.requests();
    assert_eq!(requests[0].query_param("endDate"), Some("2024-05-01"));
    assert_eq!(requests[1].query_param("endDate"), Some("2024-05-02"));
}

#[tokio::test]
async fn explicit_range_is_sent_unchanged() {
    let transport = RecordingHttpClient::replying(&["[]"]);
    let client = client_on(Arc::clone(&transport), date!(2024 - 03 - 31));
    let range = DateRange::parse("2023-01-01", "2023-12-31").expect("valid range");

    client.daily_sales(Some(range)).await.expect("valid list");

    assert_eq!(
        query_pairs(&transport.last_request()),
        vec![("startDate", "2023-01-01"), ("endDate", "2023-12-31")]
    );
}

// =============================================================================
// Limits and thresholds
// =============================================================================

#[tokio::test]
async fn top_products_with_limit_five_uses_default_range_and_limit() {
    // Given: Today is 2024-03-31
    let transport = RecordingHttpClient::replying(&["[]"]);
    let client = client_on(Arc::clone(&transport), date!(2024 - 03 - 31));

    // When: Top products are requested with only a limit
    client
        .top_products(None, Some(5))
        .await
        .expect("valid list");

    // Then: limit=5 follows the computed 30-day range
    let request = transport.last_request();
    assert!(request.url.ends_with("/sales/top-products"));
    assert_eq!(
        query_pairs(&request),
        vec![
            ("startDate", "2024-03-01"),
            ("endDate", "2024-03-31"),
            ("limit", "5"),
        ]
    );
}

#[tokio::test]
async fn ranked_queries_default_to_ten_results() {
    let transport = RecordingHttpClient::replying(&["[]", "[]"]);
    let client = client_on(Arc::clone(&transport), date!(2024 - 03 - 31));

    client.top_products(None, None).await.expect("valid list");
    client
        .most_viewed_products(None, None)
        .await
        .expect("valid list");

    let requests = transport.requests();
    assert_eq!(requests[0].query_param("limit"), Some("10"));
    assert!(requests[1].url.ends_with("/user-activity/most-viewed"));
    assert_eq!(requests[1].query_param("limit"), Some("10"));
}

#[tokio::test]
async fn low_stock_sends_only_the_threshold() {
    let transport = RecordingHttpClient::replying(&["[]", "[]"]);
    let client = client_on(Arc::clone(&transport), date!(2024 - 03 - 31));

    client.low_stock_products(None).await.expect("valid list");
    client.low_stock_products(Some(5)).await.expect("valid list");

    let requests = transport.requests();
    assert_eq!(query_pairs(&requests[0]), vec![("threshold", "50")]);
    assert_eq!(query_pairs(&requests[1]), vec![("threshold", "5")]);
}

#[tokio::test]
async fn inventory_status_has_no_query() {
    let transport = RecordingHttpClient::replying(&["[]"]);
    let client = client_on(Arc::clone(&transport), date!(2024 - 03 - 31));

    client.inventory_status().await.expect("valid list");

    let request = transport.last_request();
    assert!(request.url.ends_with("/inventory/status"));
    assert!(request.query.is_empty());
}

// =============================================================================
// Request shape
// =============================================================================

#[tokio::test]
async fn every_operation_targets_its_resource() {
    let transport = RecordingHttpClient::replying(&[
        "[]", "[]", "[]", "0", "[]", "[]", "[]", "[]", "0",
    ]);
    let client = client_on(Arc::clone(&transport), date!(2024 - 03 - 31));

    client.sales_by_category(None).await.expect("ok");
    client.top_products(None, None).await.expect("ok");
    client.daily_sales(None).await.expect("ok");
    client.total_sales(None).await.expect("ok");
    client.inventory_status().await.expect("ok");
    client.low_stock_products(None).await.expect("ok");
    client.activity_summary(None).await.expect("ok");
    client.most_viewed_products(None, None).await.expect("ok");
    client.unique_users_count(None).await.expect("ok");

    let paths = transport
        .requests()
        .into_iter()
        .map(|request| {
            request
                .url
                .trim_start_matches("http://analytics.test/api/analytics/")
                .to_owned()
        })
        .collect::<Vec<_>>();

    assert_eq!(
        paths,
        vec![
            "sales/by-category",
            "sales/top-products",
            "sales/daily",
            "sales/total",
            "inventory/status",
            "inventory/low-stock",
            "user-activity/summary",
            "user-activity/most-viewed",
            "user-activity/unique-users",
        ]
    );
}

#[tokio::test]
async fn requests_carry_json_headers_and_ten_second_timeout() {
    let transport = RecordingHttpClient::replying(&["0"]);
    let client = client_on(Arc::clone(&transport), date!(2024 - 03 - 31));

    client.total_sales(None).await.expect("valid total");

    let request = transport.last_request();
    assert_eq!(request.timeout_ms, 10_000);
    assert_eq!(
        request.headers.get("content-type").map(String::as_str),
        Some("application/json")
    );
}

// =============================================================================
// Response passthrough
// =============================================================================

#[tokio::test]
async fn typed_operations_return_the_body_as_sent() {
    // Given: The service answers with its usual payloads
    let transport = RecordingHttpClient::replying(&[
        r#"[{"productId":3,"productName":"USB Hub","category":"Electronics","stockQuantity":4,"status":"LOW"}]"#,
        "15234.75",
        "812",
        r#"[{"activityType":"VIEW","count":120,"percentage":60.0},{"activityType":"PURCHASE","count":80,"percentage":40.0}]"#,
    ]);
    let client = client_on(Arc::clone(&transport), date!(2024 - 03 - 31));

    // When: Each operation is called
    let low_stock = client.low_stock_products(None).await.expect("inventory list");
    let total = client.total_sales(None).await.expect("total");
    let users = client.unique_users_count(None).await.expect("count");
    let activity = client.activity_summary(None).await.expect("summary");

    // Then: Values match the JSON exactly, in the order given
    assert_eq!(low_stock.len(), 1);
    assert_eq!(low_stock[0].product_name, "USB Hub");
    assert_eq!(low_stock[0].status, StockStatus::Low);
    assert_eq!(total, 15234.75);
    assert_eq!(users, 812);
    assert_eq!(activity[0].activity_type, "VIEW");
    assert_eq!(activity[1].count, 80);
}

#[tokio::test]
async fn raw_json_can_be_requested_untouched() {
    let body = r#"[{"category":"Books","totalSales":99.5,"productCount":3,"extra":true}]"#;
    let transport = RecordingHttpClient::replying(&[body]);
    let client = client_on(Arc::clone(&transport), date!(2024 - 03 - 31));

    let value: Value = client
        .get_json(dashsync_core::Endpoint::SalesByCategory, Vec::new())
        .await
        .expect("valid json");

    assert_eq!(
        value,
        json!([{ "category": "Books", "totalSales": 99.5, "productCount": 3, "extra": true }])
    );
}
