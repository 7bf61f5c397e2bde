//! Profile handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use learnershub_core::{Account, AccountId, Email, LmsError, Profile, Role};
use learnershub_store::AccountRepository;

use crate::error::ApiError;
use crate::events::{ChangeNotice, Collection};
use crate::session::CurrentSession;
use crate::state::AppState;

/// Public view of an account (no password material).
#[derive(Debug, Clone, Serialize)]
pub struct AccountView {
    /// Account id.
    pub id: AccountId,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: Email,
    /// Role.
    pub role: Role,
    /// Profile picture reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            name: account.name.clone(),
            email: account.email.clone(),
            role: account.role,
            profile_picture: account.profile_picture.clone(),
            created_at: account.created_at,
        }
    }
}

/// Account plus its editable profile.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    /// The account.
    pub account: AccountView,
    /// The profile record.
    pub profile: Profile,
}

/// Profile edit. Absent fields are left unchanged; empty strings clear.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    /// New display name.
    pub name: Option<String>,
    /// Biography.
    pub bio: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// Picture reference.
    pub picture: Option<String>,
}

fn load_account(state: &AppState, email: &Email) -> Result<Account, ApiError> {
    Ok(state
        .store
        .get_account(email)?
        .ok_or_else(|| LmsError::AccountNotFound {
            email: email.to_string(),
        })?)
}

/// Get the caller's profile.
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<ProfileResponse>, ApiError> {
    session.require(&[Role::Instructor, Role::Student])?;

    let account = load_account(&state, &session.email)?;
    let profile = state.store.get_profile(&session.email)?;

    Ok(Json(ProfileResponse {
        account: AccountView::from(&account),
        profile,
    }))
}

/// Edit the caller's profile.
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    session.require(&[Role::Instructor, Role::Student])?;

    let name = match body.name.as_deref().map(str::trim) {
        Some("") => return Err(ApiError::BadRequest("name cannot be empty".into())),
        other => other.map(str::to_string),
    };

    let (account, profile) = state
        .store
        .update_account(&session.email, |account, profile| {
            let now = Utc::now();
            if let Some(name) = name {
                account.name = name;
            }
            if let Some(bio) = body.bio {
                profile.bio = non_empty(bio);
            }
            if let Some(phone) = body.phone {
                profile.phone = non_empty(phone);
            }
            if let Some(picture) = body.picture {
                profile.picture = non_empty(picture);
                account.profile_picture.clone_from(&profile.picture);
            }
            account.updated_at = now;
            profile.updated_at = Some(now);
            Ok(())
        })?;
    state.sessions.rename(&account.email, &account.name).await;

    tracing::info!(email = %account.email, "Profile updated");
    state.notify(ChangeNotice::keyed(Collection::Accounts, &account.email));

    Ok(Json(ProfileResponse {
        account: AccountView::from(&account),
        profile,
    }))
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
