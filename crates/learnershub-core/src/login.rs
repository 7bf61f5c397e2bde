//! Login history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Email, LoginEventId, Role};

/// Number of login events kept.
pub const LOGIN_HISTORY_CAP: usize = 50;

/// One successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginEvent {
    /// Event id.
    pub id: LoginEventId,
    /// Who logged in.
    pub email: Email,
    /// Display name at login time.
    pub name: String,
    /// Role used for the session.
    pub role: Role,
    /// When.
    pub at: DateTime<Utc>,
}

impl LoginEvent {
    /// A login happening now.
    #[must_use]
    pub fn now(email: Email, name: String, role: Role) -> Self {
        Self {
            id: LoginEventId::generate(),
            email,
            name,
            role,
            at: Utc::now(),
        }
    }
}

/// Prepend `event` to a newest-first history and drop anything past the cap.
pub fn push_capped(history: &mut Vec<LoginEvent>, event: LoginEvent) {
    history.insert(0, event);
    history.truncate(LOGIN_HISTORY_CAP);
}
