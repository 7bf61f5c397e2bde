//! Registration, login and logout.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use learnershub_core::crypto::constant_time_eq;
use learnershub_core::{Account, Email, LmsError, LoginEvent, Role};
use learnershub_store::{AccountRepository, LoginHistoryRepository};

use crate::error::ApiError;
use crate::events::{ChangeNotice, Collection};
use crate::handlers::profile::AccountView;
use crate::session::{CurrentSession, Session};
use crate::state::AppState;

/// Registration request.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Plain-text password.
    pub password: String,
    /// Instructor or student.
    pub role: Role,
}

/// Register an instructor or student account.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<AccountView>, ApiError> {
    if !body.role.is_self_registrable() {
        return Err(LmsError::RoleNotAllowed(body.role).into());
    }
    if body.name.trim().is_empty() {
        return Err(ApiError::BadRequest("name is required".into()));
    }
    if body.password.is_empty() {
        return Err(ApiError::BadRequest("password is required".into()));
    }

    let email = Email::parse(&body.email).map_err(LmsError::from)?;
    if state.is_admin_email(email.as_str()) {
        return Err(LmsError::EmailTaken {
            email: email.to_string(),
        }
        .into());
    }

    let name = body.name.trim().to_string();
    let role = body.role;
    let password = body.password;
    let account = tokio::task::spawn_blocking(move || Account::new(name, email, role, &password))
        .await
        .map_err(|e| ApiError::Internal(format!("password hashing task failed: {e}")))??;
    state.store.create_account(&account)?;

    tracing::info!(email = %account.email, role = %account.role, "Account registered");
    state.notify(ChangeNotice::keyed(Collection::Accounts, &account.email));

    Ok(Json(AccountView::from(&account)))
}

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address.
    pub email: String,
    /// Plain-text password.
    pub password: String,
    /// Role the user is logging in as; defaults to the account's role.
    #[serde(default)]
    pub role: Option<Role>,
}

/// Open a session.
///
/// Failed attempts write nothing: no session and no login history entry.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Session>, ApiError> {
    let wants_admin = match body.role {
        Some(role) => role == Role::Admin,
        None => state.is_admin_email(&body.email),
    };

    let (email, name, role) = if wants_admin {
        admin_login(&state, &body)?
    } else {
        account_login(&state, &body).await?
    };

    state
        .store
        .record_login(LoginEvent::now(email.clone(), name.clone(), role))?;
    let session = state.sessions.open(email, name, role).await;

    tracing::info!(email = %session.email, role = %session.role, "Logged in");
    state.notify(ChangeNotice::collection(Collection::LoginHistory));

    Ok(Json(session))
}

fn admin_login(state: &AppState, body: &LoginRequest) -> Result<(Email, String, Role), ApiError> {
    let email_ok = state.is_admin_email(&body.email);
    let password_ok = constant_time_eq(&body.password, &state.config.admin_password);
    if !(email_ok && password_ok) {
        tracing::warn!(email = %body.email, "Rejected administrator login");
        return Err(LmsError::InvalidCredentials.into());
    }

    let email = Email::parse(&state.config.admin_email)
        .map_err(|e| ApiError::Internal(format!("configured admin email is invalid: {e}")))?;
    Ok((email, "Administrator".to_string(), Role::Admin))
}

async fn account_login(
    state: &AppState,
    body: &LoginRequest,
) -> Result<(Email, String, Role), ApiError> {
    let rejected = |email: &str| {
        tracing::debug!(email = %email, "Rejected login");
        ApiError::from(LmsError::InvalidCredentials)
    };

    let email = Email::parse(&body.email).map_err(|_| rejected(&body.email))?;
    let account = state
        .store
        .get_account(&email)?
        .filter(|a| body.role.map_or(true, |r| r == a.role))
        .ok_or_else(|| rejected(email.as_str()))?;

    // Argon2 verification is CPU-bound.
    let password = body.password.clone();
    let (account, verified) = tokio::task::spawn_blocking(move || {
        let verified = account.verify_password(&password);
        (account, verified)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("password check task failed: {e}")))?;

    if !verified {
        return Err(rejected(email.as_str()));
    }
    Ok((account.email, account.name, account.role))
}

/// Close the current session.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
) -> Json<serde_json::Value> {
    state.sessions.close(&session.token).await;
    tracing::info!(email = %session.email, "Logged out");
    Json(serde_json::json!({ "logged_out": true }))
}

/// The current session.
pub async fn current_session(CurrentSession(session): CurrentSession) -> Json<Session> {
    Json(session)
}
