//! Per-course module progress and the unlock state machine.
//!
//! Module states are never stored. They are derived from the completed set:
//! module 1 is always unlocked, and module `n + 1` unlocks once module `n` is
//! completed.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LmsError, Result};
use crate::quiz::QuizOutcome;
use crate::CourseId;

/// State of a single module for a student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleState {
    /// Previous module not completed yet.
    Locked,
    /// Open for work.
    Unlocked,
    /// Done.
    Completed,
}

/// A student's progress through one course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleProgress {
    /// The course.
    pub course_id: CourseId,

    /// Number of modules in the course when progress was last updated.
    pub total_modules: u32,

    /// Completed module numbers (1-based).
    #[serde(default)]
    pub completed: BTreeSet<u32>,

    /// Best quiz score per module, in percent.
    #[serde(default)]
    pub quiz_scores: BTreeMap<u32, u8>,

    /// `completed / total` in percent, rounded down.
    #[serde(default)]
    pub percent: u8,

    /// When the last module was completed.
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,

    /// Last mutation.
    pub updated_at: DateTime<Utc>,
}

/// What a completion attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The module was already completed; nothing changed.
    AlreadyCompleted,
    /// The module was completed now.
    Completed {
        /// Whether this completed the whole course.
        course_finished: bool,
    },
}

impl Completion {
    /// Whether this call finished the course (and should issue a certificate).
    #[must_use]
    pub const fn finished_course(self) -> bool {
        matches!(
            self,
            Self::Completed {
                course_finished: true
            }
        )
    }
}

impl ModuleProgress {
    /// Fresh progress with nothing completed.
    #[must_use]
    pub fn new(course_id: CourseId, total_modules: u32) -> Self {
        Self {
            course_id,
            total_modules,
            completed: BTreeSet::new(),
            quiz_scores: BTreeMap::new(),
            percent: 0,
            completed_at: None,
            updated_at: Utc::now(),
        }
    }

    /// Adopt a new module count after the course was edited.
    ///
    /// Completed modules beyond the new count are dropped.
    pub fn sync_total(&mut self, total_modules: u32) {
        if self.total_modules == total_modules {
            return;
        }
        self.total_modules = total_modules;
        self.completed.retain(|&m| m <= total_modules);
        self.quiz_scores.retain(|&m, _| m <= total_modules);
        self.recompute();
        if !self.is_finished() {
            self.completed_at = None;
        }
    }

    /// State of a 1-based module number.
    ///
    /// # Errors
    ///
    /// Returns `LmsError::ModuleOutOfRange` outside `1..=total_modules`.
    pub fn state(&self, module: u32) -> Result<ModuleState> {
        self.check_range(module)?;
        Ok(self.state_unchecked(module))
    }

    /// States of every module, in order.
    #[must_use]
    pub fn states(&self) -> Vec<ModuleState> {
        (1..=self.total_modules)
            .map(|m| self.state_unchecked(m))
            .collect()
    }

    /// Mark a module completed.
    ///
    /// Completing an already completed module is a no-op.
    ///
    /// # Errors
    ///
    /// - `LmsError::ModuleOutOfRange` for an unknown module number.
    /// - `LmsError::ModuleLocked` if the previous module is not completed.
    pub fn complete(&mut self, module: u32) -> Result<Completion> {
        match self.state(module)? {
            ModuleState::Completed => Ok(Completion::AlreadyCompleted),
            ModuleState::Locked => Err(LmsError::ModuleLocked {
                course_id: self.course_id,
                module,
            }),
            ModuleState::Unlocked => {
                self.completed.insert(module);
                self.recompute();
                let course_finished = self.is_finished();
                if course_finished {
                    self.completed_at = Some(self.updated_at);
                }
                Ok(Completion::Completed { course_finished })
            }
        }
    }

    /// Record a quiz attempt; a passing score completes the module.
    ///
    /// Returns `None` when the attempt failed (the best score is still kept).
    ///
    /// # Errors
    ///
    /// Same as [`ModuleProgress::complete`]. A locked module cannot take a quiz.
    pub fn record_quiz(&mut self, module: u32, outcome: QuizOutcome) -> Result<Option<Completion>> {
        if self.state(module)? == ModuleState::Locked {
            return Err(LmsError::ModuleLocked {
                course_id: self.course_id,
                module,
            });
        }

        let best = self.quiz_scores.entry(module).or_insert(0);
        *best = (*best).max(outcome.score_percent);
        self.updated_at = Utc::now();

        if outcome.passed {
            self.complete(module).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Whether every module is completed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.total_modules > 0 && self.completed.len() >= self.total_modules as usize
    }

    /// Mean of the best quiz scores, if any quiz was taken.
    #[must_use]
    pub fn average_quiz_score(&self) -> Option<u8> {
        if self.quiz_scores.is_empty() {
            return None;
        }
        let sum: u64 = self.quiz_scores.values().map(|&s| u64::from(s)).sum();
        let count = self.quiz_scores.len() as u64;
        u8::try_from(sum / count).ok()
    }

    /// Letter grade printed on the certificate.
    #[must_use]
    pub fn grade(&self) -> String {
        match self.average_quiz_score() {
            None => "Pass".to_string(),
            Some(s) if s >= 90 => "A".to_string(),
            Some(s) if s >= 80 => "B".to_string(),
            Some(_) => "C".to_string(),
        }
    }

    fn state_unchecked(&self, module: u32) -> ModuleState {
        if self.completed.contains(&module) {
            ModuleState::Completed
        } else if module == 1 || self.completed.contains(&(module - 1)) {
            ModuleState::Unlocked
        } else {
            ModuleState::Locked
        }
    }

    fn check_range(&self, module: u32) -> Result<()> {
        if module == 0 || module > self.total_modules {
            return Err(LmsError::ModuleOutOfRange {
                module,
                total: self.total_modules,
            });
        }
        Ok(())
    }

    fn recompute(&mut self) {
        self.percent = if self.total_modules == 0 {
            0
        } else {
            let done = u64::try_from(self.completed.len()).unwrap_or(u64::MAX);
            u8::try_from(done * 100 / u64::from(self.total_modules)).unwrap_or(100)
        };
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(total: u32) -> ModuleProgress {
        ModuleProgress::new(CourseId::new(1), total)
    }

    #[test]
    fn only_first_module_starts_unlocked() {
        let p = progress(3);
        assert_eq!(
            p.states(),
            vec![ModuleState::Unlocked, ModuleState::Locked, ModuleState::Locked]
        );
    }

    #[test]
    fn next_module_stays_locked_until_previous_completes() {
        let total = 5;
        let mut p = progress(total);
        for k in 1..total {
            assert_eq!(p.state(k + 1).unwrap(), ModuleState::Locked);
            assert!(matches!(
                p.complete(k + 1),
                Err(LmsError::ModuleLocked { module, .. }) if module == k + 1
            ));
            p.complete(k).unwrap();
            assert_eq!(p.state(k).unwrap(), ModuleState::Completed);
            assert_eq!(p.state(k + 1).unwrap(), ModuleState::Unlocked);
        }
    }

    #[test]
    fn percent_tracks_completed_over_total() {
        let mut p = progress(3);
        p.complete(1).unwrap();
        assert_eq!(p.percent, 33);
        p.complete(2).unwrap();
        assert_eq!(p.percent, 66);
        let last = p.complete(3).unwrap();
        assert_eq!(p.percent, 100);
        assert!(last.finished_course());
        assert!(p.completed_at.is_some());
    }

    #[test]
    fn completion_is_idempotent() {
        let mut p = progress(1);
        assert_eq!(
            p.complete(1).unwrap(),
            Completion::Completed {
                course_finished: true
            }
        );
        assert_eq!(p.complete(1).unwrap(), Completion::AlreadyCompleted);
        assert_eq!(p.completed.len(), 1);
    }

    #[test]
    fn passing_quiz_twice_completes_once() {
        let mut p = progress(2);
        let pass = QuizOutcome::from_counts(8, 10).unwrap();
        let better = QuizOutcome::from_counts(10, 10).unwrap();

        let first = p.record_quiz(1, pass).unwrap();
        let second = p.record_quiz(1, better).unwrap();

        assert_eq!(
            first,
            Some(Completion::Completed {
                course_finished: false
            })
        );
        assert_eq!(second, Some(Completion::AlreadyCompleted));
        assert_eq!(p.completed.len(), 1);
        assert_eq!(p.quiz_scores[&1], 100);
    }

    #[test]
    fn failing_quiz_keeps_module_open() {
        let mut p = progress(2);
        let fail = QuizOutcome::from_counts(6, 10).unwrap();
        assert_eq!(p.record_quiz(1, fail).unwrap(), None);
        assert_eq!(p.state(1).unwrap(), ModuleState::Unlocked);
        assert_eq!(p.quiz_scores[&1], 60);
    }

    #[test]
    fn locked_module_cannot_take_quiz() {
        let mut p = progress(2);
        let pass = QuizOutcome::from_counts(10, 10).unwrap();
        assert!(matches!(p.record_quiz(2, pass), Err(LmsError::ModuleLocked { .. })));
        assert!(p.quiz_scores.is_empty());
    }

    #[test]
    fn out_of_range_modules_rejected() {
        let mut p = progress(2);
        assert!(matches!(p.complete(0), Err(LmsError::ModuleOutOfRange { .. })));
        assert!(matches!(p.complete(3), Err(LmsError::ModuleOutOfRange { .. })));
    }

    #[test]
    fn grade_from_average_quiz_score() {
        let mut p = progress(3);
        assert_eq!(p.grade(), "Pass");
        p.record_quiz(1, QuizOutcome::from_counts(10, 10).unwrap()).unwrap();
        p.record_quiz(2, QuizOutcome::from_counts(8, 10).unwrap()).unwrap();
        assert_eq!(p.average_quiz_score(), Some(90));
        assert_eq!(p.grade(), "A");
        p.record_quiz(3, QuizOutcome::from_counts(7, 10).unwrap()).unwrap();
        assert_eq!(p.grade(), "B");
    }

    #[test]
    fn shrinking_course_drops_extra_modules() {
        let mut p = progress(4);
        p.complete(1).unwrap();
        p.complete(2).unwrap();
        p.complete(3).unwrap();
        p.sync_total(2);
        assert_eq!(p.completed.len(), 2);
        assert_eq!(p.percent, 100);
        assert!(p.is_finished());

        p.sync_total(4);
        assert_eq!(p.percent, 50);
        assert!(p.completed_at.is_none());
    }
}
