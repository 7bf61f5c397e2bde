//! Key encoding utilities.

use learnershub_core::{CourseId, Email};

use crate::schema::collection;

/// Key of an account record.
#[must_use]
pub fn account_key(email: &Email) -> String {
    format!("{}{email}", collection::ACCOUNT)
}

/// Key of a profile record.
#[must_use]
pub fn profile_key(email: &Email) -> String {
    format!("{}{email}", collection::PROFILE)
}

/// Key of a course record.
///
/// The id is zero-padded so a prefix scan returns courses in id order.
#[must_use]
pub fn course_key(course_id: CourseId) -> String {
    format!("{}{:020}", collection::COURSE, course_id.get())
}

/// Key of a student's enrollment list.
#[must_use]
pub fn enrollments_key(email: &Email) -> String {
    format!("{}{email}", collection::ENROLLMENTS)
}

/// Key of a student's progress list.
#[must_use]
pub fn progress_key(email: &Email) -> String {
    format!("{}{email}", collection::PROGRESS)
}

/// Key of a student's certificate list.
#[must_use]
pub fn certificates_key(email: &Email) -> String {
    format!("{}{email}", collection::CERTIFICATES)
}

/// Every key owned by one user, deleted together when the account goes.
#[must_use]
pub fn user_scoped_keys(email: &Email) -> Vec<String> {
    vec![
        account_key(email),
        profile_key(email),
        enrollments_key(email),
        progress_key(email),
        certificates_key(email),
    ]
}
