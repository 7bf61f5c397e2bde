//! Certificate handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use learnershub_core::{Certificate, CertificateId, CourseId, LmsError, Role};
use learnershub_store::CertificateRepository;

use crate::certificate_pdf::render_certificate;
use crate::error::ApiError;
use crate::events::{ChangeNotice, Collection};
use crate::learning;
use crate::session::CurrentSession;
use crate::state::AppState;

/// The caller's certificates, oldest first.
pub async fn list_certificates(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<Vec<Certificate>>, ApiError> {
    session.require(&[Role::Student])?;
    Ok(Json(state.store.list_certificates(&session.email)?))
}

/// Certificate request.
#[derive(Debug, Deserialize)]
pub struct IssueRequest {
    /// A course the caller has finished.
    pub course_id: CourseId,
}

/// Issue another certificate record for a finished course.
pub async fn issue_certificate(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    Json(body): Json<IssueRequest>,
) -> Result<Json<Certificate>, ApiError> {
    session.require(&[Role::Student])?;

    let me = learning::resolve_student(&state.store, &session.email)?;
    let certificate = learning::issue_certificate(&state.store, &me, &session.name, body.course_id)?;

    tracing::info!(
        email = %session.email,
        course_id = %body.course_id,
        certificate_id = %certificate.id,
        "Certificate issued"
    );
    state.notify(ChangeNotice::keyed(Collection::Certificates, &session.email));

    Ok(Json(certificate))
}

/// Download a certificate as PDF.
pub async fn download_pdf(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    session.require(&[Role::Student])?;

    let id: CertificateId = id.parse().map_err(LmsError::from)?;
    let certificate = state
        .store
        .get_certificate(&session.email, id)?
        .ok_or_else(|| ApiError::NotFound(format!("certificate not found: {id}")))?;

    let bytes = render_certificate(&certificate.data)?;
    let disposition = format!("attachment; filename=\"{}\"", certificate.data.file_name());

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
