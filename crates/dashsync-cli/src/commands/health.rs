use std::sync::Arc;

use dashsync_core::{AnalyticsClient, BackendStatus, HealthMonitor};
use serde::Serialize;
use tracing::info;

use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthReport<'a> {
    status: BackendStatus,
    base_url: &'a str,
}

/// Runs one health check and reports its verdict.
pub async fn run(client: &Arc<AnalyticsClient>, pretty: bool) -> Result<(), CliError> {
    let mut monitor = HealthMonitor::start(Arc::clone(client));
    let status = monitor.wait_for_settled().await;
    monitor.stop();

    let base_url = client.config().base_url();
    info!(event = "cli.health.checked", status = status.as_str(), base_url);
    output::render(&HealthReport { status, base_url }, pretty)?;

    if status == BackendStatus::Offline {
        return Err(CliError::BackendOffline {
            base_url: base_url.to_owned(),
        });
    }
    Ok(())
}
