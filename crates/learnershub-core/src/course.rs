//! Course types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LmsError, Result};
use crate::quiz::Quiz;
use crate::CourseId;

/// Upper bound on modules per course.
pub const MAX_MODULES: u32 = 100;

/// Publication status of a course.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseStatus {
    /// Visible to administrators only.
    #[default]
    Draft,

    /// Visible to everyone.
    Active,
}

/// Outline of one course module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleOutline {
    /// Module title.
    pub title: String,

    /// Quiz gating the module, if any.
    #[serde(default)]
    pub quiz: Option<Quiz>,
}

/// A course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    /// Sequential course id.
    pub id: CourseId,

    /// Course title.
    pub title: String,

    /// Long description.
    #[serde(default)]
    pub description: String,

    /// Number of modules a student has to complete.
    pub module_count: u32,

    /// Optional module outlines; when present their length equals `module_count`.
    #[serde(default)]
    pub modules: Vec<ModuleOutline>,

    /// Cover image reference.
    #[serde(default)]
    pub image: Option<String>,

    /// Instructor display name.
    #[serde(default)]
    pub instructor: Option<String>,

    /// Human-readable duration, printed on certificates.
    #[serde(default)]
    pub duration: Option<String>,

    /// Publication status.
    #[serde(default)]
    pub status: CourseStatus,

    /// When the course was created.
    pub created_at: DateTime<Utc>,

    /// When the course was last edited.
    pub updated_at: DateTime<Utc>,
}

impl Course {
    /// Build a course from validated input.
    ///
    /// # Errors
    ///
    /// Returns `LmsError::Validation` if the draft is invalid.
    pub fn new(id: CourseId, draft: CourseDraft) -> Result<Self> {
        draft.validate()?;
        let now = Utc::now();
        let module_count = draft.effective_module_count();
        Ok(Self {
            id,
            title: draft.title.trim().to_string(),
            description: draft.description,
            module_count,
            modules: draft.modules,
            image: draft.image,
            instructor: draft.instructor,
            duration: draft.duration,
            status: draft.status,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replace the editable fields, keeping id and creation time.
    ///
    /// # Errors
    ///
    /// Returns `LmsError::Validation` if the draft is invalid.
    pub fn apply(&mut self, draft: CourseDraft) -> Result<()> {
        let updated = Self::new(self.id, draft)?;
        *self = Self {
            created_at: self.created_at,
            ..updated
        };
        Ok(())
    }

    /// Whether non-administrators can see this course.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == CourseStatus::Active
    }

    /// Quiz attached to a 1-based module number, if any.
    #[must_use]
    pub fn quiz_for(&self, module: u32) -> Option<&Quiz> {
        let index = usize::try_from(module.checked_sub(1)?).ok()?;
        self.modules.get(index)?.quiz.as_ref()
    }

    /// Duration label for certificates.
    #[must_use]
    pub fn duration_label(&self) -> String {
        self.duration
            .clone()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| format!("{} modules", self.module_count))
    }
}

/// Editable course fields, as submitted by an administrator.
#[derive(Debug, Clone, Deserialize)]
pub struct CourseDraft {
    /// Course title.
    pub title: String,

    /// Long description.
    #[serde(default)]
    pub description: String,

    /// Module count; may be omitted when `modules` is given.
    #[serde(default)]
    pub module_count: Option<u32>,

    /// Module outlines.
    #[serde(default)]
    pub modules: Vec<ModuleOutline>,

    /// Cover image reference.
    #[serde(default)]
    pub image: Option<String>,

    /// Instructor display name.
    #[serde(default)]
    pub instructor: Option<String>,

    /// Duration label.
    #[serde(default)]
    pub duration: Option<String>,

    /// Publication status.
    #[serde(default)]
    pub status: CourseStatus,
}

impl CourseDraft {
    fn effective_module_count(&self) -> u32 {
        match self.module_count {
            Some(count) => count,
            None => u32::try_from(self.modules.len()).unwrap_or(u32::MAX),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(LmsError::Validation("course title is required".into()));
        }

        let count = self.effective_module_count();
        if count == 0 || count > MAX_MODULES {
            return Err(LmsError::Validation(format!(
                "module count must be between 1 and {MAX_MODULES}"
            )));
        }

        if !self.modules.is_empty() && self.modules.len() != count as usize {
            return Err(LmsError::Validation(format!(
                "{} module outlines given for {count} modules",
                self.modules.len()
            )));
        }

        for quiz in self.modules.iter().filter_map(|m| m.quiz.as_ref()) {
            quiz.validate()?;
        }

        Ok(())
    }
}
