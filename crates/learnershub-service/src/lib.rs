//! Learners Hub HTTP API Service.
//!
//! This crate provides the HTTP API behind the Learners Hub dashboards:
//!
//! - Registration, login and explicit sessions
//! - The course catalog and instructor assignments
//! - Student enrollment, module progress, quizzes and certificates
//! - Administrator account management, login history and activity overview
//! - A WebSocket stream of change notices
//!
//! # Authentication
//!
//! `POST /v1/auth/login` returns a session token; every other endpoint except
//! registration and `/health` expects `Authorization: Bearer <token>`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Handlers are async for the router even when the store is sync

pub mod activity;
pub mod certificate_pdf;
pub mod config;
pub mod error;
pub mod events;
pub mod handlers;
pub mod learning;
pub mod routes;
pub mod session;
pub mod state;

pub use config::{ServiceConfig, StorageBackend};
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
