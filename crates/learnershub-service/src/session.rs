//! Login sessions.
//!
//! A session is created at login and destroyed at logout. Every request that
//! needs an identity resolves its bearer token through the [`SessionRegistry`];
//! nothing else holds "who is logged in" state.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

use learnershub_core::{Email, Role};

use crate::error::ApiError;
use crate::state::AppState;

/// An authenticated session.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    /// Opaque bearer token.
    pub token: String,
    /// Account email (or the configured admin email).
    pub email: Email,
    /// Display name.
    pub name: String,
    /// Role the session was opened with.
    pub role: Role,
    /// When the session was opened.
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Reject unless the session has one of `roles`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Forbidden` for any other role.
    pub fn require(&self, roles: &[Role]) -> Result<(), ApiError> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            tracing::debug!(email = %self.email, role = %self.role, "Role not permitted");
            Err(ApiError::Forbidden)
        }
    }
}

/// All open sessions, keyed by token.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Session>>,
    ttl: Duration,
}

impl SessionRegistry {
    /// An empty registry whose sessions expire after `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    fn is_expired(&self, session: &Session, now: DateTime<Utc>) -> bool {
        now - session.created_at > self.ttl
    }

    /// Open a session, dropping every expired one first.
    pub async fn open(&self, email: Email, name: String, role: Role) -> Session {
        let now = Utc::now();
        let session = Session {
            token: uuid::Uuid::new_v4().simple().to_string(),
            email,
            name,
            role,
            created_at: now,
        };

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !self.is_expired(s, now));
        let swept = before - sessions.len();
        if swept > 0 {
            tracing::debug!(swept, "Dropped expired sessions");
        }
        sessions.insert(session.token.clone(), session.clone());
        session
    }

    /// Look up a live session. Expired sessions are dropped on sight.
    pub async fn resolve(&self, token: &str) -> Option<Session> {
        let session = self.sessions.read().await.get(token).cloned()?;
        if self.is_expired(&session, Utc::now()) {
            self.sessions.write().await.remove(token);
            return None;
        }
        Some(session)
    }

    /// Destroy a session. Returns whether it existed.
    pub async fn close(&self, token: &str) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }

    /// Destroy every session of an account.
    pub async fn revoke_email(&self, email: &Email) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| &s.email != email);
        before - sessions.len()
    }

    /// Update the display name on every session of an account.
    pub async fn rename(&self, email: &Email, name: &str) {
        for session in self.sessions.write().await.values_mut() {
            if &session.email == email {
                session.name = name.to_string();
            }
        }
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        let now = Utc::now();
        self.sessions
            .read()
            .await
            .values()
            .filter(|s| !self.is_expired(s, now))
            .count()
    }
}

/// The session behind the request's `Authorization: Bearer` header.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Session);

#[async_trait::async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(ApiError::Unauthorized)?;

        let session = state
            .sessions
            .resolve(token.trim())
            .await
            .ok_or(ApiError::Unauthorized)?;

        Ok(Self(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(raw: &str) -> Email {
        Email::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn open_resolve_close() {
        let registry = SessionRegistry::new(Duration::hours(1));
        let session = registry
            .open(email("sam@example.com"), "Sam".into(), Role::Student)
            .await;

        let resolved = registry.resolve(&session.token).await.unwrap();
        assert_eq!(resolved.email, session.email);

        assert!(registry.close(&session.token).await);
        assert!(registry.resolve(&session.token).await.is_none());
        assert!(!registry.close(&session.token).await);
    }

    #[tokio::test]
    async fn expired_sessions_are_rejected() {
        let registry = SessionRegistry::new(Duration::zero());
        let session = registry
            .open(email("sam@example.com"), "Sam".into(), Role::Student)
            .await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        assert!(registry.resolve(&session.token).await.is_none());
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn abandoned_sessions_are_swept_on_open() {
        let registry = SessionRegistry::new(Duration::zero());
        for i in 0..5 {
            registry
                .open(email(&format!("user{i}@example.com")), "User".into(), Role::Student)
                .await;
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        let last = registry
            .open(email("last@example.com"), "Last".into(), Role::Student)
            .await;

        let stored = registry.sessions.read().await;
        assert_eq!(stored.len(), 1);
        assert!(stored.contains_key(&last.token));
    }

    #[tokio::test]
    async fn len_counts_live_sessions_only() {
        let registry = SessionRegistry::new(Duration::zero());
        registry
            .open(email("sam@example.com"), "Sam".into(), Role::Student)
            .await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn revoke_and_rename_by_email() {
        let registry = SessionRegistry::new(Duration::hours(1));
        let sam = email("sam@example.com");
        let a = registry.open(sam.clone(), "Sam".into(), Role::Student).await;
        registry.open(sam.clone(), "Sam".into(), Role::Student).await;
        let kim = registry
            .open(email("kim@example.com"), "Kim".into(), Role::Instructor)
            .await;

        registry.rename(&sam, "Samantha").await;
        assert_eq!(registry.resolve(&a.token).await.unwrap().name, "Samantha");

        assert_eq!(registry.revoke_email(&sam).await, 2);
        assert!(registry.resolve(&a.token).await.is_none());
        assert!(registry.resolve(&kim.token).await.is_some());
    }

    #[test]
    fn require_checks_role() {
        let session = Session {
            token: "t".into(),
            email: email("sam@example.com"),
            name: "Sam".into(),
            role: Role::Student,
            created_at: Utc::now(),
        };
        assert!(session.require(&[Role::Student]).is_ok());
        assert!(matches!(
            session.require(&[Role::Admin, Role::Instructor]),
            Err(ApiError::Forbidden)
        ));
    }
}
