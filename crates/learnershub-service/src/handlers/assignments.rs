//! Instructor assignments, student self-enrollment, and the student roster.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use learnershub_core::{Assignment, CourseId, Email, Enrollment, LmsError, Role};
use learnershub_store::{AccountRepository, AssignmentRepository, CourseRepository};

use crate::error::ApiError;
use crate::events::{ChangeNotice, Collection};
use crate::handlers::profile::AccountView;
use crate::learning::resolve_student;
use crate::session::CurrentSession;
use crate::state::AppState;

/// List student accounts.
pub async fn list_students(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<Vec<AccountView>>, ApiError> {
    session.require(&[Role::Admin, Role::Instructor])?;

    let students = state
        .store
        .list_accounts()?
        .iter()
        .filter(|a| a.role == Role::Student)
        .map(AccountView::from)
        .collect();
    Ok(Json(students))
}

/// Assignment request.
#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    /// Course to assign.
    pub course_id: CourseId,
    /// Student email.
    pub student_email: String,
}

/// Assign a course to a student.
pub async fn assign_course(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    Json(body): Json<AssignRequest>,
) -> Result<Json<Assignment>, ApiError> {
    session.require(&[Role::Admin, Role::Instructor])?;

    if state.store.get_course(body.course_id)?.is_none() {
        return Err(LmsError::CourseNotFound(body.course_id).into());
    }

    let email = Email::parse(&body.student_email).map_err(LmsError::from)?;
    let student = state
        .store
        .get_account(&email)?
        .ok_or_else(|| LmsError::AccountNotFound {
            email: email.to_string(),
        })?;
    if student.role != Role::Student {
        return Err(LmsError::WrongRole {
            email: email.to_string(),
            expected: Role::Student,
        }
        .into());
    }

    let assignment = Assignment::new(
        body.course_id,
        Some(student.id),
        student.email,
        session.email.clone(),
    );
    state.store.assign_course(&assignment)?;

    tracing::info!(
        course_id = %assignment.course_id,
        student = %assignment.student_email,
        assigned_by = %assignment.assigned_by,
        "Course assigned"
    );
    state.notify(ChangeNotice::keyed(
        Collection::Assignments,
        &assignment.student_email,
    ));

    Ok(Json(assignment))
}

/// List assignments: an instructor's own, or all for an admin.
pub async fn list_assignments(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<Vec<Assignment>>, ApiError> {
    session.require(&[Role::Admin, Role::Instructor])?;

    let mut assignments = state.store.list_assignments()?;
    if session.role == Role::Instructor {
        assignments.retain(|a| a.assigned_by == session.email);
    }
    Ok(Json(assignments))
}

/// Enrollment request.
#[derive(Debug, Deserialize)]
pub struct EnrollRequest {
    /// Course to enroll in.
    pub course_id: CourseId,
}

/// Self-enroll in an active course.
pub async fn enroll(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    Json(body): Json<EnrollRequest>,
) -> Result<Json<Enrollment>, ApiError> {
    session.require(&[Role::Student])?;

    let active = state
        .store
        .get_course(body.course_id)?
        .is_some_and(|c| c.is_active());
    if !active {
        return Err(LmsError::CourseNotFound(body.course_id).into());
    }

    let student = resolve_student(&state.store, &session.email)?;
    let enrollment = Enrollment::new(body.course_id);
    state.store.enroll(&student, &enrollment)?;

    tracing::info!(course_id = %body.course_id, email = %session.email, "Enrolled");
    state.notify(ChangeNotice::keyed(Collection::Enrollments, &session.email));

    Ok(Json(enrollment))
}
