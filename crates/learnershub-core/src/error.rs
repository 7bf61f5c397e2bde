//! Error types for Learners Hub.

use crate::ids::IdError;
use crate::{CourseId, Role};

/// Result type for domain operations.
pub type Result<T> = std::result::Result<T, LmsError>;

/// Business-rule violations and lookup failures.
#[derive(Debug, thiserror::Error)]
pub enum LmsError {
    /// An account with this email already exists.
    #[error("email already registered: {email}")]
    EmailTaken {
        /// The duplicate email.
        email: String,
    },

    /// Email/password/role combination did not match.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Role cannot be chosen at registration.
    #[error("role cannot self-register: {0}")]
    RoleNotAllowed(Role),

    /// Account not found.
    #[error("account not found: {email}")]
    AccountNotFound {
        /// The email that was looked up.
        email: String,
    },

    /// The account exists but has a different role than required.
    #[error("{email} is not a {expected}")]
    WrongRole {
        /// The account.
        email: String,
        /// Role that was required.
        expected: Role,
    },

    /// Course not found.
    #[error("course not found: {0}")]
    CourseNotFound(CourseId),

    /// Student is already assigned to the course.
    #[error("already assigned to course {0}")]
    AlreadyAssigned(CourseId),

    /// Student is already enrolled in (or assigned to) the course.
    #[error("already enrolled in course {0}")]
    AlreadyEnrolled(CourseId),

    /// The course is not on the student's list.
    #[error("not enrolled in course {0}")]
    NotEnrolled(CourseId),

    /// Module cannot be worked on before the previous one is completed.
    #[error("module {module} of course {course_id} is locked")]
    ModuleLocked {
        /// The course.
        course_id: CourseId,
        /// The locked module.
        module: u32,
    },

    /// Module number outside `1..=total`.
    #[error("module {module} out of range (course has {total})")]
    ModuleOutOfRange {
        /// Requested module.
        module: u32,
        /// Modules in the course.
        total: u32,
    },

    /// Certificate requested for an unfinished course.
    #[error("course {0} is not completed")]
    CourseNotCompleted(CourseId),

    /// A password could not be hashed.
    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    /// Input failed validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// Invalid identifier.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] IdError),
}
