//! One-shot maintenance passes, for running from an external scheduler.

use anyhow::Result;
use chrono::Utc;
use tracing::info;

use super::Runtime;

/// Run one abandoned-workout sweep.
pub async fn reap(config_path: &str) -> Result<()> {
    let runtime = Runtime::load(config_path).await?;
    let report = runtime.reaper.sweep(Utc::now()).await?;
    info!(
        candidates = report.candidates,
        removed = report.removed.len(),
        failed = report.failed,
        "Reap finished"
    );
    Ok(())
}

/// Run one renewal pass and one upgrade reminder pass.
pub async fn renew(config_path: &str) -> Result<()> {
    let runtime = Runtime::load(config_path).await?;
    let renewed = runtime
        .renewals
        .process_renewals(Utc::now().date_naive())
        .await?;
    let reminded = runtime.renewals.remind_basic_subscribers().await?;
    info!(renewed, reminded, "Renewal pass finished");
    Ok(())
}
