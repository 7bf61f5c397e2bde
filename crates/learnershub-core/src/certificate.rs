//! Certificate records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LmsError, Result};
use crate::{CertificateId, CourseId, Email};

/// Everything printed on a certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateData {
    /// Student display name.
    pub student_name: String,
    /// Course title.
    pub course_name: String,
    /// Course duration label.
    pub duration: String,
    /// Completion date.
    pub completion_date: NaiveDate,
    /// Grade label.
    pub grade: String,
}

impl CertificateData {
    /// Presence check on the fields that make up the file name.
    ///
    /// # Errors
    ///
    /// Returns `LmsError::Validation` if the student or course name is blank.
    pub fn validate(&self) -> Result<()> {
        if self.student_name.trim().is_empty() {
            return Err(LmsError::Validation("student name is required".into()));
        }
        if self.course_name.trim().is_empty() {
            return Err(LmsError::Validation("course name is required".into()));
        }
        Ok(())
    }

    /// Download file name: `Certificate_{course}_{student}.pdf`, non-alphanumerics stripped.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!(
            "Certificate_{}_{}.pdf",
            strip_non_alphanumeric(&self.course_name),
            strip_non_alphanumeric(&self.student_name)
        )
    }
}

/// A persisted certificate. Never modified after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    /// Certificate id.
    pub id: CertificateId,

    /// Owner.
    pub student_email: Email,

    /// Completed course.
    pub course_id: CourseId,

    /// Printed fields.
    #[serde(flatten)]
    pub data: CertificateData,

    /// When the record was created.
    pub issued_at: DateTime<Utc>,
}

impl Certificate {
    /// Issue a new certificate record.
    ///
    /// # Errors
    ///
    /// Returns `LmsError::Validation` if `data` fails its presence check.
    pub fn issue(student_email: Email, course_id: CourseId, data: CertificateData) -> Result<Self> {
        data.validate()?;
        Ok(Self {
            id: CertificateId::generate(),
            student_email,
            course_id,
            data,
            issued_at: Utc::now(),
        })
    }
}

fn strip_non_alphanumeric(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}
