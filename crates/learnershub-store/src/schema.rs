//! Record layout.
//!
//! Every record lives in one flat key space. Keys are namespaced by a
//! collection prefix; per-user collections append the owner's email.

/// Column family names for the `RocksDB` backend.
pub mod cf {
    /// All records, keyed by their record key.
    pub const RECORDS: &str = "records";
}

/// Collection key prefixes and fixed keys.
pub mod collection {
    /// `account:{email}` → `Account`.
    pub const ACCOUNT: &str = "account:";

    /// `profile:{email}` → `Profile`.
    pub const PROFILE: &str = "profile:";

    /// `course:{id:020}` → `Course`.
    pub const COURSE: &str = "course:";

    /// Next course id (`u64`).
    pub const COURSE_SEQ: &str = "meta:course_seq";

    /// Instructor-wide assignment list → `Vec<Assignment>`.
    pub const ASSIGNMENTS: &str = "assignments";

    /// `enrollments:{email}` → `Vec<Enrollment>`.
    pub const ENROLLMENTS: &str = "enrollments:";

    /// `progress:{email}` → `Vec<ModuleProgress>`.
    pub const PROGRESS: &str = "progress:";

    /// `certificates:{email}` → `Vec<Certificate>`.
    pub const CERTIFICATES: &str = "certificates:";

    /// Newest-first login history → `Vec<LoginEvent>`.
    pub const LOGIN_HISTORY: &str = "login_history";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![cf::RECORDS]
}
