//! Application state.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch};

use learnershub_store::Repository;

use crate::activity::{spawn_monitor, ActivitySnapshot};
use crate::config::ServiceConfig;
use crate::events::{ChangeNotice, CHANNEL_CAPACITY};
use crate::session::SessionRegistry;

/// Application state shared across handlers.
pub struct AppState {
    /// Typed record storage.
    pub store: Arc<Repository>,

    /// Service configuration.
    pub config: ServiceConfig,

    /// Open login sessions.
    pub sessions: SessionRegistry,

    /// Change notices for `/v1/events` subscribers.
    pub changes: broadcast::Sender<ChangeNotice>,

    /// Latest activity snapshot.
    pub activity: watch::Receiver<ActivitySnapshot>,
}

impl AppState {
    /// Create the application state and start the activity monitor.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn new(store: Arc<Repository>, config: ServiceConfig) -> Self {
        let (changes, _) = broadcast::channel(CHANNEL_CAPACITY);

        let poll = Duration::from_secs(config.activity_poll_seconds.max(1));
        let (activity, _monitor) = spawn_monitor(store.clone(), poll);
        tracing::info!(poll_seconds = poll.as_secs(), "Activity monitor started");

        let sessions = SessionRegistry::new(config.session_ttl());

        Self {
            store,
            config,
            sessions,
            changes,
            activity,
        }
    }

    /// Tell subscribers that a collection changed.
    pub fn notify(&self, notice: ChangeNotice) {
        // No subscribers is the common case.
        let _ = self.changes.send(notice);
    }

    /// Whether an email is the configured administrator's.
    #[must_use]
    pub fn is_admin_email(&self, email: &str) -> bool {
        self.config
            .admin_email
            .trim()
            .eq_ignore_ascii_case(email.trim())
    }
}
