//! Assignments, enrollments and identity resolution.
//!
//! An instructor *assigns* a course to a student; a student *enrolls* in a course
//! themselves. A student's course list is the union of both.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, CourseId, Email};

/// Instructor-initiated link between a student and a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// The assigned course.
    pub course_id: CourseId,

    /// Student account id, when the student was resolved at assignment time.
    #[serde(default)]
    pub student_id: Option<AccountId>,

    /// Student email.
    pub student_email: Email,

    /// Email of the instructor (or administrator) who made the assignment.
    pub assigned_by: Email,

    /// When the assignment was made.
    pub assigned_at: DateTime<Utc>,
}

impl Assignment {
    /// Create an assignment stamped with the current time.
    #[must_use]
    pub fn new(
        course_id: CourseId,
        student_id: Option<AccountId>,
        student_email: Email,
        assigned_by: Email,
    ) -> Self {
        Self {
            course_id,
            student_id,
            student_email,
            assigned_by,
            assigned_at: Utc::now(),
        }
    }
}

/// Student-initiated link to a course, kept in the student's own record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    /// The course.
    pub course_id: CourseId,

    /// When the student enrolled.
    pub enrolled_at: DateTime<Utc>,
}

impl Enrollment {
    /// Create an enrollment stamped with the current time.
    #[must_use]
    pub fn new(course_id: CourseId) -> Self {
        Self {
            course_id,
            enrolled_at: Utc::now(),
        }
    }
}

/// How a course ended up on a student's list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseSource {
    /// Assigned by an instructor.
    Assigned,
    /// Self-enrolled.
    Enrolled,
}

/// Who a student is, for matching assignment records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentIdentity {
    /// Account id, if the student has an account.
    pub id: Option<AccountId>,
    /// Email address.
    pub email: Email,
}

impl StudentIdentity {
    /// Whether an assignment belongs to this student.
    ///
    /// Matches on email *or* account id, so an assignment recorded before the
    /// student changed one of the two still surfaces.
    #[must_use]
    pub fn matches(&self, assignment: &Assignment) -> bool {
        if assignment.student_email == self.email {
            return true;
        }
        matches!((self.id, assignment.student_id), (Some(a), Some(b)) if a == b)
    }

    /// Filter an assignment list down to this student's records.
    pub fn select<'a>(
        &'a self,
        assignments: &'a [Assignment],
    ) -> impl Iterator<Item = &'a Assignment> + 'a {
        assignments.iter().filter(move |a| self.matches(a))
    }
}

/// Merge assigned and enrolled course ids, assigned first, without duplicates.
#[must_use]
pub fn merge_course_sources(
    assigned: impl IntoIterator<Item = CourseId>,
    enrolled: impl IntoIterator<Item = CourseId>,
) -> Vec<(CourseId, CourseSource)> {
    let mut merged: Vec<(CourseId, CourseSource)> = Vec::new();

    for id in assigned {
        if !merged.iter().any(|(c, _)| *c == id) {
            merged.push((id, CourseSource::Assigned));
        }
    }
    for id in enrolled {
        if !merged.iter().any(|(c, _)| *c == id) {
            merged.push((id, CourseSource::Enrolled));
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(raw: &str) -> Email {
        Email::parse(raw).unwrap()
    }

    fn assignment(course: u64, id: Option<AccountId>, student: &str) -> Assignment {
        Assignment::new(
            CourseId::new(course),
            id,
            email(student),
            email("lead@example.com"),
        )
    }

    #[test]
    fn matches_by_email_without_id() {
        let me = StudentIdentity {
            id: Some(AccountId::generate()),
            email: email("sam@example.com"),
        };
        assert!(me.matches(&assignment(1, None, "SAM@example.com")));
    }

    #[test]
    fn matches_by_id_when_email_differs() {
        let id = AccountId::generate();
        let me = StudentIdentity {
            id: Some(id),
            email: email("new-address@example.com"),
        };
        assert!(me.matches(&assignment(1, Some(id), "old-address@example.com")));
    }

    #[test]
    fn does_not_match_other_students() {
        let me = StudentIdentity {
            id: Some(AccountId::generate()),
            email: email("sam@example.com"),
        };
        assert!(!me.matches(&assignment(1, Some(AccountId::generate()), "kim@example.com")));
        assert!(!me.matches(&assignment(1, None, "kim@example.com")));
    }

    #[test]
    fn select_unions_both_kinds_of_match() {
        let id = AccountId::generate();
        let me = StudentIdentity {
            id: Some(id),
            email: email("sam@example.com"),
        };
        let all = vec![
            assignment(1, None, "sam@example.com"),
            assignment(2, Some(id), "sam.old@example.com"),
            assignment(3, None, "kim@example.com"),
        ];

        let courses: Vec<u64> = me.select(&all).map(|a| a.course_id.get()).collect();
        assert_eq!(courses, vec![1, 2]);
    }

    #[test]
    fn merge_prefers_assignment_and_dedups() {
        let merged = merge_course_sources(
            [CourseId::new(1), CourseId::new(2), CourseId::new(1)],
            [CourseId::new(2), CourseId::new(3)],
        );
        assert_eq!(
            merged,
            vec![
                (CourseId::new(1), CourseSource::Assigned),
                (CourseId::new(2), CourseSource::Assigned),
                (CourseId::new(3), CourseSource::Enrolled),
            ]
        );
    }
}
