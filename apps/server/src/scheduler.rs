//! Background retention sweep.
//!
//! Periodically drops delivered donations past their retention window and
//! anything older than the maximum age.

use std::sync::Arc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::main_lib::AppState;

/// Starts the cleanup loop. The first sweep runs one interval after startup.
pub fn start_cleanup_scheduler(state: Arc<AppState>, every: Duration) {
    tokio::spawn(async move {
        info!("Cleanup scheduler started ({}s interval)", every.as_secs());

        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            run_sweep(&state).await;
        }
    });
}

async fn run_sweep(state: &Arc<AppState>) {
    match state.donation_service.sweep().await {
        Ok(0) => debug!("Cleanup sweep: nothing to remove"),
        Ok(removed) => info!("Cleanup sweep removed {} donation(s)", removed),
        Err(e) => warn!("Cleanup sweep failed: {}", e),
    }
}
