use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use super::deps::DependencySet;
use super::fetcher::Fetcher;
use super::state::FetchState;
use crate::api::AnalyticsClient;

/// How often the backend is re-checked.
pub const HEALTH_CHECK_INTERVAL: Duration = Duration::from_secs(10);

/// Backend reachability as seen by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendStatus {
    Checking,
    Online,
    Offline,
}

impl BackendStatus {
    /// Collapses a health check state: any failure is offline, any success online,
    /// nothing settled yet is checking. A re-check in flight keeps the last
    /// verdict.
    pub fn from_state<T>(state: &FetchState<T>) -> Self {
        if state.error.is_some() {
            Self::Offline
        } else if state.data.is_some() {
            Self::Online
        } else {
            Self::Checking
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Checking => "checking",
            Self::Online => "online",
            Self::Offline => "offline",
        }
    }
}

impl Display for BackendStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Periodic liveness check against the analytics API.
///
/// A [`Fetcher`] with an empty dependency set whose producer is
/// [`AnalyticsClient::ping`]. It runs from construction until it is stopped
/// or dropped.
pub struct HealthMonitor {
    fetcher: Fetcher<()>,
}

impl HealthMonitor {
    /// Starts probing every [`HEALTH_CHECK_INTERVAL`].
    pub fn start(client: Arc<AnalyticsClient>) -> Self {
        Self::with_interval(client, HEALTH_CHECK_INTERVAL)
    }

    pub fn with_interval(client: Arc<AnalyticsClient>, interval: Duration) -> Self {
        let mut fetcher = Fetcher::polling(interval).with_label("health");
        fetcher.activate(DependencySet::new(), move || {
            let client = Arc::clone(&client);
            async move { client.ping().await }
        });
        Self { fetcher }
    }

    pub fn status(&self) -> BackendStatus {
        self.fetcher.inspect(BackendStatus::from_state)
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState<()>> {
        self.fetcher.subscribe()
    }

    /// Waits until the first check settles and returns its verdict.
    pub async fn wait_for_settled(&self) -> BackendStatus {
        let mut receiver = self.fetcher.subscribe();
        let status = match receiver.wait_for(FetchState::has_outcome).await {
            Ok(state) => BackendStatus::from_state(&*state),
            Err(_) => self.status(),
        };
        status
    }

    pub fn stop(&mut self) {
        self.fetcher.teardown();
    }

    pub fn is_running(&self) -> bool {
        self.fetcher.is_active()
    }
}
