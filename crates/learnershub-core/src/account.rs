//! Account and profile types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crypto::PasswordHash;
use crate::error::Result;
use crate::{AccountId, Email};

/// Role of an account. Fixed set; there is no custom role support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Manages courses and accounts.
    Admin,

    /// Assigns courses to students.
    Instructor,

    /// Takes courses.
    Student,
}

impl Role {
    /// Whether a user may pick this role when self-registering.
    #[must_use]
    pub const fn is_self_registrable(self) -> bool {
        matches!(self, Self::Instructor | Self::Student)
    }

    /// Lower-case name used in responses and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Instructor => "instructor",
            Self::Student => "student",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Stable account identifier.
    pub id: AccountId,

    /// Display name.
    pub name: String,

    /// Email address; the natural key for lookups.
    pub email: Email,

    /// Role chosen at registration.
    pub role: Role,

    /// Argon2id password hash (PHC string).
    pub password: PasswordHash,

    /// Optional profile picture reference (URL or data URI).
    #[serde(default)]
    pub profile_picture: Option<String>,

    /// When the account was created.
    pub created_at: DateTime<Utc>,

    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account, hashing the password.
    ///
    /// # Errors
    ///
    /// Returns `LmsError::PasswordHash` if the password cannot be hashed.
    pub fn new(name: String, email: Email, role: Role, password: &str) -> Result<Self> {
        let now = Utc::now();
        Ok(Self {
            id: AccountId::generate(),
            name,
            email,
            role,
            password: PasswordHash::new(password)?,
            profile_picture: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Check a login password against the stored hash.
    #[must_use]
    pub fn verify_password(&self, password: &str) -> bool {
        self.password.verify(password)
    }
}

/// Editable per-account profile details, stored next to the account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Free-form biography.
    #[serde(default)]
    pub bio: Option<String>,

    /// Contact phone number.
    #[serde(default)]
    pub phone: Option<String>,

    /// Profile picture reference.
    #[serde(default)]
    pub picture: Option<String>,

    /// When the profile was last edited.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}
