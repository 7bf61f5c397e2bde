//! Change notice stream over WebSocket.
//!
//! Browsers cannot set headers on a WebSocket handshake, so the session token
//! travels in the query string.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use serde::Deserialize;
use tokio::sync::broadcast;

use learnershub_core::Role;

use crate::error::ApiError;
use crate::events::{ChangeNotice, Collection};
use crate::session::Session;
use crate::state::AppState;

/// Handshake query.
#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    /// Session token.
    pub token: String,
}

/// Upgrade to a WebSocket that streams change notices as JSON text frames.
pub async fn subscribe(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EventsQuery>,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    let session = state
        .sessions
        .resolve(&query.token)
        .await
        .ok_or(ApiError::Unauthorized)?;

    let rx = state.changes.subscribe();
    tracing::debug!(email = %session.email, "Change stream opened");

    Ok(ws.on_upgrade(move |socket| stream(socket, rx, session)))
}

/// Whether a notice concerns what this session can see.
fn visible(session: &Session, notice: &ChangeNotice) -> bool {
    if session.role == Role::Admin {
        return true;
    }
    match &notice.key {
        None => notice.collection != Collection::LoginHistory,
        Some(key) => notice.collection == Collection::Courses || key == session.email.as_str(),
    }
}

async fn stream(mut socket: WebSocket, mut rx: broadcast::Receiver<ChangeNotice>, session: Session) {
    loop {
        tokio::select! {
            received = rx.recv() => {
                let notice = match received {
                    Ok(notice) => notice,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "Change stream lagged");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                if !visible(&session, &notice) {
                    continue;
                }
                let Ok(text) = serde_json::to_string(&notice) else {
                    continue;
                };
                if socket.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    tracing::debug!(email = %session.email, "Change stream closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use learnershub_core::Email;

    fn session(role: Role) -> Session {
        Session {
            token: "t".into(),
            email: Email::parse("sam@example.com").unwrap(),
            name: "Sam".into(),
            role,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn students_only_see_their_own_keys() {
        let sam = session(Role::Student);
        assert!(visible(&sam, &ChangeNotice::keyed(Collection::Progress, "sam@example.com")));
        assert!(!visible(&sam, &ChangeNotice::keyed(Collection::Progress, "kim@example.com")));
        assert!(visible(&sam, &ChangeNotice::keyed(Collection::Courses, 4)));
        assert!(!visible(&sam, &ChangeNotice::collection(Collection::LoginHistory)));
    }

    #[test]
    fn admins_see_everything() {
        let admin = session(Role::Admin);
        assert!(visible(&admin, &ChangeNotice::keyed(Collection::Progress, "kim@example.com")));
        assert!(visible(&admin, &ChangeNotice::collection(Collection::LoginHistory)));
    }
}
