//! Core types for Learners Hub.
//!
//! This crate provides the domain model shared by the store and the service:
//!
//! - **Identifiers**: `AccountId`, `CourseId`, `CertificateId`, `LoginEventId`, `Email`
//! - **Accounts**: `Account`, `Profile`, `Role`
//! - **Courses**: `Course`, `CourseDraft`, `ModuleOutline`, `Quiz`
//! - **Course links**: `Assignment`, `Enrollment`, `StudentIdentity`
//! - **Progress**: `ModuleProgress`, `ModuleState`, `Completion`
//! - **Certificates**: `Certificate`, `CertificateData`
//! - **Login history**: `LoginEvent`
//!
//! # Progress model
//!
//! Module 1 of every course starts unlocked. Completing module `n` (explicitly
//! or by scoring at least 70% on its quiz) unlocks module `n + 1`. Completing
//! the last module finishes the course, which issues a certificate.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod account;
pub mod assignment;
pub mod certificate;
pub mod course;
pub mod crypto;
pub mod error;
pub mod ids;
pub mod login;
pub mod progress;
pub mod quiz;

pub use account::{Account, Profile, Role};
pub use assignment::{merge_course_sources, Assignment, CourseSource, Enrollment, StudentIdentity};
pub use certificate::{Certificate, CertificateData};
pub use course::{Course, CourseDraft, CourseStatus, ModuleOutline, MAX_MODULES};
pub use crypto::PasswordHash;
pub use error::{LmsError, Result};
pub use ids::{AccountId, CertificateId, CourseId, Email, IdError, LoginEventId, MAX_EMAIL_LEN};
pub use login::{push_capped, LoginEvent, LOGIN_HISTORY_CAP};
pub use progress::{Completion, ModuleProgress, ModuleState};
pub use quiz::{Question, Quiz, QuizOutcome, PASS_THRESHOLD_PERCENT};
