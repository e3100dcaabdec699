//! # Dashsync Core
//!
//! Data-synchronization layer for the analytics dashboard.
//!
//! ## Overview
//!
//! - **Analytics client** with typed sales, inventory, and user-activity queries
//! - **Fetch-with-polling primitive** that keeps `{data, loading, error}` in sync
//!   with an async producer, re-running on dependency change or on a timer
//! - **Health monitor** reporting backend reachability as checking/online/offline
//! - **HTTP transport seam** so tests can run without a network
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | `AnalyticsClient`, configuration, clock |
//! | [`domain`] | Date ranges and payload models |
//! | [`error`] | Error types |
//! | [`http_client`] | HTTP client abstraction |
//! | [`sync`] | `Fetcher`, `FetchState`, `HealthMonitor` |
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  Consumer (CLI) │
//! └────────┬────────┘
//!          │ activate(deps, producer) / state()
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │    Fetcher      │────▶│   Poll Timer     │
//! │ (cycle tokens)  │◀────│ (per activation) │
//! └────────┬────────┘     └──────────────────┘
//!          │ producer()
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ AnalyticsClient │────▶│ HTTP Client      │
//! │  (typed GETs)   │     │ (reqwest/mock)   │
//! └─────────────────┘     └──────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Client operations return [`ApiError`]; a [`Fetcher`] turns any producer
//! failure into the `error` string of its [`FetchState`] and never propagates
//! it further.
//!
//! ```rust
//! use dashsync_core::ApiError;
//!
//! fn describe(error: &ApiError) -> &'static str {
//!     match error {
//!         ApiError::Network { .. } => "backend unreachable",
//!         ApiError::Http { status, .. } if *status >= 500 => "backend failing",
//!         ApiError::Http { .. } => "request rejected",
//!         ApiError::Parse { .. } => "unexpected payload",
//!     }
//! }
//! ```

pub mod api;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod sync;

pub use api::{
    AnalyticsClient, ApiConfig, Clock, Endpoint, FixedClock, SystemClock, BASE_URL_ENV,
    DEFAULT_BASE_URL, DEFAULT_LOW_STOCK_THRESHOLD, DEFAULT_TOP_LIMIT,
};

pub use domain::{
    ActivitySummary, CategorySales, DailySales, DateRange, InventoryItem, StockStatus, TopProduct,
    DEFAULT_WINDOW_DAYS,
};

pub use error::{ApiError, ValidationError};

pub use http_client::{
    HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient, REQUEST_TIMEOUT_MS,
};

pub use sync::{
    error_message, BackendStatus, CycleToken, CycleTrigger, DepValue, DependencySet, FetchState,
    Fetcher, HealthMonitor, Producer, ProducerFuture, GENERIC_ERROR_MESSAGE, HEALTH_CHECK_INTERVAL,
};
