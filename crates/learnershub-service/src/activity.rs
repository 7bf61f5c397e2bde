//! Background activity monitor.
//!
//! Re-reads the login history on a fixed interval and publishes a summary
//! through a `watch` channel. The admin overview reads the latest value.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use learnershub_core::{LoginEvent, Role};
use learnershub_store::{LoginHistoryRepository, Repository};

/// How many recent logins the snapshot carries.
const RECENT_LOGINS: usize = 10;

/// Summary of recent login activity.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ActivitySnapshot {
    /// Events in the retained history.
    pub total_logins: usize,
    /// Distinct emails in the retained history.
    pub distinct_users: usize,
    /// Retained admin logins.
    pub admin_logins: usize,
    /// Retained instructor logins.
    pub instructor_logins: usize,
    /// Retained student logins.
    pub student_logins: usize,
    /// Most recent events, newest first.
    pub recent: Vec<LoginEvent>,
    /// When the history was read; `None` before the first poll.
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl ActivitySnapshot {
    /// Summarize a newest-first login history.
    #[must_use]
    pub fn from_history(history: &[LoginEvent]) -> Self {
        let mut emails: Vec<_> = history.iter().map(|e| &e.email).collect();
        emails.sort();
        emails.dedup();

        let count = |role: Role| history.iter().filter(|e| e.role == role).count();

        Self {
            total_logins: history.len(),
            distinct_users: emails.len(),
            admin_logins: count(Role::Admin),
            instructor_logins: count(Role::Instructor),
            student_logins: count(Role::Student),
            recent: history.iter().take(RECENT_LOGINS).cloned().collect(),
            refreshed_at: Some(Utc::now()),
        }
    }
}

/// Spawn the monitor. It stops once every receiver is dropped.
pub fn spawn_monitor(
    store: Arc<Repository>,
    every: Duration,
) -> (watch::Receiver<ActivitySnapshot>, JoinHandle<()>) {
    let (tx, rx) = watch::channel(ActivitySnapshot::default());

    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let snapshot = match store.login_history() {
                Ok(history) => ActivitySnapshot::from_history(&history),
                Err(e) => {
                    tracing::warn!(error = %e, "Activity poll failed");
                    continue;
                }
            };

            if tx.send(snapshot).is_err() {
                tracing::debug!("Activity monitor has no receivers, stopping");
                break;
            }
        }
    });

    (rx, handle)
}
