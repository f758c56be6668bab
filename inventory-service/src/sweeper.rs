// ============================================================================
// ROCKET PARTS PLATFORM - RESERVATION SWEEPER
// ============================================================================
// Module: inventory-service/src/sweeper.rs
// Description: Background job releasing stale reservations (spec.md §4.8).
//              A single logical timer; `tokio::time::interval` already
//              guarantees ticks never overlap with a slow previous tick
//              because we await the sweep body before the next `tick()`.
// ============================================================================

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::repository::InventoryRepository;
use crate::service::InventoryService;

pub async fn run<R: InventoryRepository + 'static>(
    service: Arc<InventoryService<R>>,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    // first tick fires immediately; skip it so we don't sweep at boot
    // before any reservation could possibly have expired.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        match service.cleanup_expired_reservations().await {
            Ok(report) if report.released_count > 0 => {
                info!(
                    released = report.released_count,
                    skus = ?report.affected_skus,
                    "sweeper released expired reservations"
                );
            }
            Ok(_) => {}
            Err(err) => warn!(%err, "reservation sweep failed, will retry next tick"),
        }
    }
}
