//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    admin, assignments, auth, certificates, courses, events, health, profile, student,
};
use crate::state::AppState;

/// Maximum concurrent requests for API endpoints.
const API_MAX_CONCURRENT_REQUESTS: usize = 64;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
/// - `POST /v1/auth/register` - Register an instructor or student
/// - `POST /v1/auth/login` - Open a session
///
/// ## Any session
/// - `POST /v1/auth/logout`, `GET /v1/auth/session`
/// - `GET /v1/courses`, `GET /v1/courses/:id`
/// - `GET /v1/events?token=` - Change notices (WebSocket)
///
/// ## Instructor / student
/// - `GET|PUT /v1/profile`
///
/// ## Instructor / admin
/// - `GET /v1/students`
/// - `GET|POST /v1/assignments`
///
/// ## Student
/// - `POST /v1/enrollments`
/// - `GET /v1/me/courses`
/// - `GET /v1/me/courses/:id/modules`
/// - `POST /v1/me/courses/:id/modules/:n/complete`
/// - `POST /v1/me/courses/:id/modules/:n/quiz`
/// - `GET|POST /v1/me/certificates`
/// - `GET /v1/me/certificates/:id/pdf`
///
/// ## Admin
/// - `POST /v1/courses`, `PUT|DELETE /v1/courses/:id`
/// - `GET|DELETE /v1/admin/users`
/// - `GET /v1/admin/login-history`
/// - `GET /v1/admin/overview`
pub fn create_router(state: AppState) -> Router {
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    let api_routes = Router::new()
        // Auth
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/session", get(auth::current_session))
        // Profile
        .route(
            "/profile",
            get(profile::get_profile).put(profile::update_profile),
        )
        // Catalog
        .route(
            "/courses",
            get(courses::list_courses).post(courses::create_course),
        )
        .route(
            "/courses/:id",
            get(courses::get_course)
                .put(courses::update_course)
                .delete(courses::delete_course),
        )
        // Assignments and enrollment
        .route("/students", get(assignments::list_students))
        .route(
            "/assignments",
            get(assignments::list_assignments).post(assignments::assign_course),
        )
        .route("/enrollments", post(assignments::enroll))
        // Student
        .route("/me/courses", get(student::my_courses))
        .route("/me/courses/:id/modules", get(student::modules))
        .route(
            "/me/courses/:id/modules/:module/complete",
            post(student::complete_module),
        )
        .route(
            "/me/courses/:id/modules/:module/quiz",
            post(student::submit_quiz),
        )
        .route(
            "/me/certificates",
            get(certificates::list_certificates).post(certificates::issue_certificate),
        )
        .route("/me/certificates/:id/pdf", get(certificates::download_pdf))
        // Admin
        .route(
            "/admin/users",
            get(admin::list_users).delete(admin::remove_users),
        )
        .route("/admin/login-history", get(admin::login_history))
        .route("/admin/overview", get(admin::overview))
        .layer(ConcurrencyLimitLayer::new(API_MAX_CONCURRENT_REQUESTS));

    Router::new()
        // Health (public, no rate limit)
        .route("/health", get(health::health))
        // API v1 routes (rate limited)
        .nest("/v1", api_routes)
        // Long-lived; not counted against the concurrency limit
        .route("/v1/events", get(events::subscribe))
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
