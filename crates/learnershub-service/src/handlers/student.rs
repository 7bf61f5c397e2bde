//! Student course and module handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;

use learnershub_core::{CourseId, Role, StudentIdentity};

use crate::error::ApiError;
use crate::events::{ChangeNotice, Collection};
use crate::learning::{self, ModuleBoard, ModuleUpdate, QuizSubmission, StudentCourse};
use crate::session::{CurrentSession, Session};
use crate::state::AppState;

fn student(state: &AppState, session: &Session) -> Result<StudentIdentity, ApiError> {
    session.require(&[Role::Student])?;
    Ok(learning::resolve_student(&state.store, &session.email)?)
}

/// The caller's courses, assigned and self-enrolled.
pub async fn my_courses(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<Vec<StudentCourse>>, ApiError> {
    let me = student(&state, &session)?;
    Ok(Json(learning::student_courses(&state.store, &me)?))
}

/// Module states for one of the caller's courses.
pub async fn modules(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<u64>,
) -> Result<Json<ModuleBoard>, ApiError> {
    let me = student(&state, &session)?;
    Ok(Json(learning::module_board(
        &state.store,
        &me,
        CourseId::new(id),
    )?))
}

/// Mark a module completed.
pub async fn complete_module(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    Path((id, module)): Path<(u64, u32)>,
) -> Result<Json<ModuleUpdate>, ApiError> {
    let me = student(&state, &session)?;
    let update = learning::complete_module(
        &state.store,
        &me,
        &session.name,
        CourseId::new(id),
        module,
    )?;
    publish(&state, &session, &update);
    Ok(Json(update))
}

/// Submit a quiz attempt.
pub async fn submit_quiz(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    Path((id, module)): Path<(u64, u32)>,
    Json(submission): Json<QuizSubmission>,
) -> Result<Json<ModuleUpdate>, ApiError> {
    let me = student(&state, &session)?;
    let update = learning::submit_quiz(
        &state.store,
        &me,
        &session.name,
        CourseId::new(id),
        module,
        &submission,
    )?;
    publish(&state, &session, &update);
    Ok(Json(update))
}

fn publish(state: &AppState, session: &Session, update: &ModuleUpdate) {
    state.notify(ChangeNotice::keyed(Collection::Progress, &session.email));
    if update.certificate.is_some() {
        state.notify(ChangeNotice::keyed(Collection::Certificates, &session.email));
    }
}
