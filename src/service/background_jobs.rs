use std::sync::Arc;

use chrono::Utc;
use tokio::time::{interval, Duration};

use crate::AppState;

/// Daily tick that materializes upcoming service visits for every active
/// contract. A tick failure only skips that run.
pub async fn start_visit_scheduler_job(app_state: Arc<AppState>) {
    let mut interval = interval(Duration::from_secs(86400)); // Run daily

    loop {
        interval.tick().await;

        tracing::info!("Running visit scheduler job at {}", Utc::now());

        match app_state.visit_scheduler.generate_upcoming_visits().await {
            Ok(_) => tracing::info!("Visit scheduler job completed"),
            Err(e) => tracing::error!("Visit scheduler job failed: {}", e),
        }
    }
}

/// Short-interval tick that raises upcoming/overdue payment obligations.
/// Overlapping ticks are tolerated: the active-payment unique index keeps
/// duplicate obligations out regardless of timing.
pub async fn start_payment_monitor_job(app_state: Arc<AppState>) {
    let minutes = app_state.env.schedule.payment_scan_interval_minutes;
    let mut interval = interval(Duration::from_secs(minutes * 60));

    loop {
        interval.tick().await;

        tracing::debug!("Running payment obligation scan at {}", Utc::now());

        match app_state.payment_monitor.scan().await {
            Ok(_) => tracing::debug!("Payment obligation scan completed"),
            Err(e) => tracing::error!("Payment obligation scan failed: {}", e),
        }
    }
}
