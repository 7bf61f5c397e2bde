//! Course catalog handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;

use learnershub_core::{Course, CourseDraft, CourseId, LmsError, Role};
use learnershub_store::CourseRepository;

use crate::error::ApiError;
use crate::events::{ChangeNotice, Collection};
use crate::session::CurrentSession;
use crate::state::AppState;

/// List courses. Non-admins only see active ones.
pub async fn list_courses(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<Vec<Course>>, ApiError> {
    let mut courses = state.store.list_courses()?;
    if session.role != Role::Admin {
        courses.retain(Course::is_active);
    }
    Ok(Json(courses))
}

/// Get one course. Drafts read as missing for non-admins.
pub async fn get_course(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<u64>,
) -> Result<Json<Course>, ApiError> {
    let course_id = CourseId::new(id);
    let course = state
        .store
        .get_course(course_id)?
        .filter(|c| session.role == Role::Admin || c.is_active())
        .ok_or(LmsError::CourseNotFound(course_id))?;
    Ok(Json(course))
}

/// Create a course.
pub async fn create_course(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    Json(draft): Json<CourseDraft>,
) -> Result<Json<Course>, ApiError> {
    session.require(&[Role::Admin])?;

    let course_id = state.store.next_course_id()?;
    let course = Course::new(course_id, draft)?;
    state.store.put_course(&course)?;

    tracing::info!(course_id = %course.id, title = %course.title, "Course created");
    state.notify(ChangeNotice::keyed(Collection::Courses, course.id));

    Ok(Json(course))
}

/// Replace a course's editable fields.
pub async fn update_course(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<u64>,
    Json(draft): Json<CourseDraft>,
) -> Result<Json<Course>, ApiError> {
    session.require(&[Role::Admin])?;

    let course_id = CourseId::new(id);
    let mut course = state
        .store
        .get_course(course_id)?
        .ok_or(LmsError::CourseNotFound(course_id))?;
    course.apply(draft)?;
    state.store.put_course(&course)?;

    tracing::info!(course_id = %course.id, "Course updated");
    state.notify(ChangeNotice::keyed(Collection::Courses, course.id));

    Ok(Json(course))
}

/// Delete a course.
///
/// Assignments, enrollments and progress that reference it are left in place;
/// student views skip courses that no longer exist.
pub async fn delete_course(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<u64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    session.require(&[Role::Admin])?;

    let course_id = CourseId::new(id);
    state.store.delete_course(course_id)?;

    tracing::info!(course_id = %course_id, "Course deleted");
    state.notify(ChangeNotice::keyed(Collection::Courses, course_id));

    Ok(Json(serde_json::json!({ "deleted": true })))
}
