use chrono::Utc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::state::AppState;

/// Closes attendance sessions whose window has elapsed, every `every`.
///
/// Readers also expire stale sessions on sight, so this only bounds how long a
/// session can stay OPEN in storage when nobody is looking.
pub fn spawn_session_sweeper(app_state: AppState, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every.max(Duration::from_millis(10)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match app_state.attendance().sweep_expired(Utc::now()).await {
                Ok(closed) if !closed.is_empty() => {
                    tracing::info!(count = closed.len(), "Closed expired attendance sessions");
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "Attendance sweep failed"),
            }
        }
    })
}
