//! Record storage for Learners Hub.
//!
//! Storage has two layers:
//!
//! - [`RecordStore`]: a flat key → JSON-bytes store with interchangeable
//!   backends ([`MemoryStore`], [`FileStore`], and `RocksStore` behind the
//!   `rocksdb-backend` feature).
//! - [`Repository`]: typed per-entity operations over any record store,
//!   exposed through the [`AccountRepository`], [`CourseRepository`],
//!   [`AssignmentRepository`], [`ProgressRepository`], [`CertificateRepository`]
//!   and [`LoginHistoryRepository`] traits.
//!
//! Reads are forgiving: a missing key and a key holding corrupt JSON both read
//! as the empty default (the corruption is logged). Writes overwrite.
//!
//! # Example
//!
//! ```
//! use learnershub_core::{Account, Email, Role};
//! use learnershub_store::{AccountRepository, Repository};
//!
//! let repo = Repository::in_memory();
//! let email = Email::parse("sam@example.com").unwrap();
//! let account = Account::new("Sam".into(), email.clone(), Role::Student, "secret").unwrap();
//! repo.create_account(&account).unwrap();
//!
//! assert!(repo.get_account(&email).unwrap().is_some());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod file;
pub mod keys;
pub mod memory;
pub mod repository;
#[cfg(feature = "rocksdb-backend")]
pub mod rocks;
pub mod schema;

pub use error::{Result, StoreError};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use repository::{PurgeReport, Repository};
#[cfg(feature = "rocksdb-backend")]
pub use rocks::RocksStore;

use learnershub_core::{
    Account, Assignment, Certificate, CertificateId, Course, CourseId, Email, Enrollment,
    LoginEvent, ModuleProgress, Profile, StudentIdentity,
};

/// A flat key-value store holding serialized records.
///
/// Implementations only need per-operation atomicity; there are no
/// multi-key transactions.
pub trait RecordStore: Send + Sync {
    /// Read the raw bytes stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Overwrite the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn put(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Remove `key`. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn delete(&self, key: &str) -> Result<()>;

    /// All keys starting with `prefix`, in ascending order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>>;
}

/// Account and profile records.
pub trait AccountRepository {
    /// Store a new account.
    ///
    /// # Errors
    ///
    /// Returns `LmsError::EmailTaken` if the email is registered; nothing is written.
    fn create_account(&self, account: &Account) -> Result<()>;


    /// Look up an account by email.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn get_account(&self, email: &Email) -> Result<Option<Account>>;

    /// Every account, ordered by email.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn list_accounts(&self) -> Result<Vec<Account>>;

    /// Profile of an account; empty if never edited.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn get_profile(&self, email: &Email) -> Result<Profile>;

    /// Edit an account and its profile together.
    ///
    /// The read, `change` and both writes happen under the repository lock, so an
    /// edit racing [`purge_account`](Self::purge_account) cannot bring the
    /// account back. Nothing is written if `change` fails.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if there is no such account, or the
    /// error returned by `change`.
    fn update_account<F>(&self, email: &Email, change: F) -> Result<(Account, Profile)>
    where
        F: FnOnce(&mut Account, &mut Profile) -> Result<()>;

    /// Remove an account and everything that references it.
    ///
    /// Deletes the account, its profile, every assignment naming its email or
    /// id, and its enrollment, progress and certificate records.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if there is no such account.
    fn purge_account(&self, email: &Email) -> Result<PurgeReport>;
}

/// Course records.
pub trait CourseRepository {
    /// Allocate the next course id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn next_course_id(&self) -> Result<CourseId>;

    /// Insert or update a course.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn put_course(&self, course: &Course) -> Result<()>;

    /// Look up a course.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn get_course(&self, course_id: CourseId) -> Result<Option<Course>>;

    /// Every course, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn list_courses(&self) -> Result<Vec<Course>>;

    /// Delete a course.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the course doesn't exist.
    fn delete_course(&self, course_id: CourseId) -> Result<()>;
}

/// Assignment and enrollment records.
pub trait AssignmentRepository {
    /// Every assignment, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn list_assignments(&self) -> Result<Vec<Assignment>>;

    /// Assignments belonging to a student (matched by email or id).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn assignments_for(&self, student: &StudentIdentity) -> Result<Vec<Assignment>>;

    /// Record an assignment.
    ///
    /// # Errors
    ///
    /// Returns `LmsError::AlreadyAssigned` if the student already has this course assigned.
    fn assign_course(&self, assignment: &Assignment) -> Result<()>;

    /// A student's own enrollments.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn list_enrollments(&self, email: &Email) -> Result<Vec<Enrollment>>;

    /// Self-enroll a student.
    ///
    /// # Errors
    ///
    /// Returns `LmsError::AlreadyEnrolled` if the course is already assigned to or
    /// enrolled by the student.
    fn enroll(&self, student: &StudentIdentity, enrollment: &Enrollment) -> Result<()>;
}

/// Per-student module progress.
pub trait ProgressRepository {
    /// Progress of one student in one course.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn get_progress(&self, email: &Email, course_id: CourseId) -> Result<Option<ModuleProgress>>;

    /// All of a student's progress records.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn list_progress(&self, email: &Email) -> Result<Vec<ModuleProgress>>;

    /// Apply `change` to a student's progress in one course and store the result.
    ///
    /// A missing record starts empty. The record is adjusted to `total_modules`
    /// before `change` sees it. The read, `change` and the write happen under
    /// the repository lock. Nothing is written if `change` fails.
    ///
    /// # Errors
    ///
    /// Returns the error from `change`, or an error if the backend fails.
    fn update_progress<T, F>(
        &self,
        email: &Email,
        course_id: CourseId,
        total_modules: u32,
        change: F,
    ) -> Result<(ModuleProgress, T)>
    where
        F: FnOnce(&mut ModuleProgress) -> Result<T>;
}

/// Issued certificates.
pub trait CertificateRepository {
    /// A student's certificates, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn list_certificates(&self, email: &Email) -> Result<Vec<Certificate>>;

    /// Look up one certificate.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn get_certificate(&self, email: &Email, id: CertificateId) -> Result<Option<Certificate>>;

    /// Append a certificate. Never deduplicates.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn append_certificate(&self, certificate: &Certificate) -> Result<()>;
}

/// The capped login history.
pub trait LoginHistoryRepository {
    /// Record a login at the head of the history.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn record_login(&self, event: LoginEvent) -> Result<()>;

    /// Login events, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn login_history(&self) -> Result<Vec<LoginEvent>>;
}
