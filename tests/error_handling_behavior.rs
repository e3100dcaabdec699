//! Behavior-driven tests for failure handling
//!
//! These tests verify WHAT a caller sees when the analytics service fails:
//! the client surfaces a typed [`ApiError`] and a fetcher turns the same
//! failure into the `error` field of its state.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use dashsync_core::{
    deps, AnalyticsClient, ApiConfig, ApiError, DateRange, Fetcher, HttpClient, HttpError,
    HttpRequest, HttpResponse, ValidationError,
};

/// Transport that answers every request with the same outcome.
struct FixedHttpClient(Result<HttpResponse, HttpError>);

impl HttpClient for FixedHttpClient {
    fn execute<'a>(
        &'a self,
        _request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let outcome = self.0.clone();
        Box::pin(async move { outcome })
    }
}

fn client_answering(outcome: Result<HttpResponse, HttpError>) -> Arc<AnalyticsClient> {
    Arc::new(
        AnalyticsClient::new(
            ApiConfig::new("http://analytics.test/api/analytics").expect("valid base url"),
        )
        .with_http_client(Arc::new(FixedHttpClient(outcome))),
    )
}

// =============================================================================
// Client errors
// =============================================================================

#[tokio::test]
async fn non_success_status_is_an_http_error() {
    // Given: The service answers 503
    let client = client_answering(Ok(HttpResponse::with_status(503, "maintenance")));

    // When: Any query runs
    let error = client
        .sales_by_category(None)
        .await
        .expect_err("503 must fail");

    // Then: The status and body are kept
    assert_eq!(error, ApiError::http(503, "maintenance"));
    assert_eq!(error.status(), Some(503));
    assert_eq!(error.to_string(), "request failed with status code 503");
}

#[tokio::test]
async fn client_errors_are_not_special_cased() {
    let client = client_answering(Ok(HttpResponse::with_status(400, "bad date")));

    let error = client.daily_sales(None).await.expect_err("400 must fail");

    assert_eq!(error.status(), Some(400));
    assert_eq!(error.code(), "api.http");
}

#[tokio::test]
async fn transport_failure_is_a_network_error() {
    let client = client_answering(Err(HttpError::new("connection refused")));

    let error = client.total_sales(None).await.expect_err("must fail");

    assert_eq!(error, ApiError::network("connection refused"));
    assert_eq!(error.status(), None);
}

#[tokio::test]
async fn timeout_is_a_network_error() {
    let client = client_answering(Err(HttpError::timeout("timeout of 10000ms exceeded")));

    let error = client.inventory_status().await.expect_err("must fail");

    assert!(matches!(error, ApiError::Network { .. }));
    assert!(error.to_string().contains("timeout"));
}

#[tokio::test]
async fn malformed_body_is_a_parse_error() {
    // Given: A 200 whose body is not JSON
    let client = client_answering(Ok(HttpResponse::ok_json("<html>oops</html>")));

    // When: A typed query runs
    let error = client
        .unique_users_count(None)
        .await
        .expect_err("html is not a count");

    // Then: The failure is classified as a parse error
    assert_eq!(error.code(), "api.parse");
}

#[tokio::test]
async fn wrong_shape_is_a_parse_error() {
    let client = client_answering(Ok(HttpResponse::ok_json(r#"{"total": 12}"#)));

    let error = client.top_products(None, None).await.expect_err("object is not a list");

    assert!(matches!(error, ApiError::Parse { .. }));
}

// =============================================================================
// Input validation
// =============================================================================

#[test]
fn malformed_dates_are_rejected_before_any_request() {
    assert_eq!(
        DateRange::parse("2024-13-01", "2024-12-31"),
        Err(ValidationError::InvalidDate {
            value: String::from("2024-13-01"),
        })
    );
}

#[test]
fn half_a_range_is_rejected() {
    assert_eq!(
        DateRange::from_parts(Some("2024-01-01"), None),
        Err(ValidationError::IncompleteDateRange)
    );
}

#[test]
fn relative_base_url_is_rejected() {
    assert!(matches!(
        ApiConfig::new("analytics/api"),
        Err(ValidationError::InvalidBaseUrl { .. })
    ));
}

// =============================================================================
// Errors inside a fetcher
// =============================================================================

#[tokio::test(start_paused = true)]
async fn fetcher_exposes_the_client_error_message() {
    // Given: A fetcher over a failing client
    let client = client_answering(Ok(HttpResponse::with_status(503, "")));
    let mut fetcher = Fetcher::new(None);

    // When: Its cycle settles
    fetcher.activate(deps!["total"], move || {
        let client = Arc::clone(&client);
        async move { client.total_sales(None).await }
    });
    tokio::time::sleep(Duration::from_millis(1)).await;

    // Then: The message is available as the state's error and nothing panicked
    let state = fetcher.state();
    assert_eq!(state.data, None);
    assert!(!state.loading);
    assert_eq!(
        state.error.as_deref(),
        Some("request failed with status code 503")
    );
}
