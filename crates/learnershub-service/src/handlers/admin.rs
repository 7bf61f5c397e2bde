//! Administrator handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use learnershub_core::{Email, LoginEvent, Role};
use learnershub_store::{
    AccountRepository, AssignmentRepository, CourseRepository, LoginHistoryRepository,
    PurgeReport, StoreError,
};

use crate::activity::ActivitySnapshot;
use crate::error::ApiError;
use crate::events::{ChangeNotice, Collection};
use crate::handlers::profile::AccountView;
use crate::session::CurrentSession;
use crate::state::AppState;

/// Every account.
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<Vec<AccountView>>, ApiError> {
    session.require(&[Role::Admin])?;

    let users = state
        .store
        .list_accounts()?
        .iter()
        .map(AccountView::from)
        .collect();
    Ok(Json(users))
}

/// Bulk removal request.
#[derive(Debug, Deserialize)]
pub struct RemoveUsersRequest {
    /// Emails of the accounts to remove.
    pub emails: Vec<String>,
}

/// Bulk removal result.
#[derive(Debug, Serialize)]
pub struct RemoveUsersResponse {
    /// What was removed per account.
    pub removed: Vec<PurgeReport>,
    /// Emails that matched no account.
    pub not_found: Vec<String>,
}

/// Remove accounts and everything that references them.
///
/// Unknown emails are reported, not treated as errors.
pub async fn remove_users(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    Json(body): Json<RemoveUsersRequest>,
) -> Result<Json<RemoveUsersResponse>, ApiError> {
    session.require(&[Role::Admin])?;

    let mut response = RemoveUsersResponse {
        removed: Vec::new(),
        not_found: Vec::new(),
    };

    for raw in body.emails {
        let Ok(email) = Email::parse(&raw) else {
            response.not_found.push(raw);
            continue;
        };

        match state.store.purge_account(&email) {
            Ok(report) => {
                let sessions = state.sessions.revoke_email(&email).await;
                tracing::info!(
                    email = %email,
                    assignments = report.assignments_removed,
                    progress = report.progress_removed,
                    certificates = report.certificates_removed,
                    sessions,
                    "Account removed"
                );
                state.notify(ChangeNotice::keyed(Collection::Accounts, &email));
                response.removed.push(report);
            }
            Err(StoreError::NotFound { .. }) => response.not_found.push(raw),
            Err(e) => return Err(e.into()),
        }
    }

    Ok(Json(response))
}

/// Login history, newest first.
pub async fn login_history(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<Vec<LoginEvent>>, ApiError> {
    session.require(&[Role::Admin])?;
    Ok(Json(state.store.login_history()?))
}

/// Record counts.
#[derive(Debug, Serialize)]
pub struct Counts {
    /// All accounts.
    pub accounts: usize,
    /// Student accounts.
    pub students: usize,
    /// Instructor accounts.
    pub instructors: usize,
    /// All courses.
    pub courses: usize,
    /// Active courses.
    pub active_courses: usize,
    /// Assignments.
    pub assignments: usize,
    /// Open sessions.
    pub sessions: usize,
}

/// Dashboard overview.
#[derive(Debug, Serialize)]
pub struct Overview {
    /// Record counts, read now.
    pub counts: Counts,
    /// Latest activity monitor snapshot.
    pub activity: ActivitySnapshot,
}

/// Counts plus the latest activity snapshot.
pub async fn overview(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<Overview>, ApiError> {
    session.require(&[Role::Admin])?;

    let accounts = state.store.list_accounts()?;
    let courses = state.store.list_courses()?;
    let count_role = |role: Role| accounts.iter().filter(|a| a.role == role).count();

    let counts = Counts {
        accounts: accounts.len(),
        students: count_role(Role::Student),
        instructors: count_role(Role::Instructor),
        courses: courses.len(),
        active_courses: courses.iter().filter(|c| c.is_active()).count(),
        assignments: state.store.list_assignments()?.len(),
        sessions: state.sessions.len().await,
    };

    let activity = state.activity.borrow().clone();

    Ok(Json(Overview { counts, activity }))
}
