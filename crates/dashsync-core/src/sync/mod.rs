//! # Data Synchronization
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Fetcher`] | Fetch-with-polling primitive over any async producer |
//! | [`FetchState`] | `{data, loading, error}` snapshot exposed by a fetcher |
//! | [`DependencySet`] | Values whose change restarts a fetch cycle |
//! | [`CycleToken`] | Per-cycle ownership token checked at settlement |
//! | [`HealthMonitor`] | Fetcher specialised to backend reachability |
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use dashsync_core::{deps, AnalyticsClient, Fetcher};
//!
//! let client = Arc::new(AnalyticsClient::default());
//! let range = client.resolve_range(None);
//!
//! let mut total = Fetcher::polling(Duration::from_secs(30));
//! total.activate(deps![range.start_param(), range.end_param()], move || {
//!     let client = Arc::clone(&client);
//!     async move { client.total_sales(Some(range)).await }
//! });
//!
//! let state = total.state(); // loading until the first response lands
//! ```

mod deps;
mod fetcher;
mod health;
mod state;

pub use deps::{DepValue, DependencySet};
pub use fetcher::{CycleToken, CycleTrigger, Fetcher, Producer, ProducerFuture};
pub use health::{BackendStatus, HealthMonitor, HEALTH_CHECK_INTERVAL};
pub use state::{error_message, FetchState, GENERIC_ERROR_MESSAGE};
