//! Scheduled deletion of unsaved content analyses.

use std::sync::Arc;
use std::time::Duration;

use rt_core::responses::CleanupResponse;
use rt_db::error::DatabaseError;
use rt_db::service::ResearchService;
use tokio::task::JoinHandle;

use crate::state::AppState;

/// Run one cleanup pass with the given retention window.
///
/// # Errors
///
/// Returns `DatabaseError` if the delete fails.
pub async fn run_cleanup(
    service: &ResearchService,
    retention_days: u32,
) -> Result<CleanupResponse, DatabaseError> {
    let deleted = service.cleanup_unsaved_content(retention_days).await?;
    tracing::info!(deleted, retention_days, "cleanup of unsaved content analyses");
    Ok(CleanupResponse {
        deleted,
        retention_days,
    })
}

/// Spawn the periodic cleanup. Returns `None` when cleanup is disabled.
///
/// The first pass runs immediately, then once per `cleanup.interval_hours`.
/// A failed pass is logged and the schedule continues.
#[must_use]
pub fn spawn_cleanup_task(state: Arc<AppState>) -> Option<JoinHandle<()>> {
    let cleanup = state.config.cleanup.clone();
    if !cleanup.enabled {
        tracing::info!("scheduled cleanup disabled");
        return None;
    }
    let period = Duration::from_secs(cleanup.interval_hours.saturating_mul(3600));
    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(err) = run_cleanup(&state.service, cleanup.retention_days).await {
                tracing::warn!(error = %err, "scheduled cleanup failed");
            }
        }
    }))
}
