//! Module quizzes and grading.

use serde::{Deserialize, Serialize};

use crate::error::{LmsError, Result};

/// Minimum score (percent correct) that completes a module.
pub const PASS_THRESHOLD_PERCENT: u8 = 70;

/// A multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Question text.
    pub prompt: String,
    /// Answer options.
    pub options: Vec<String>,
    /// Index of the correct option.
    pub answer: usize,
}

/// The quiz closing a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    /// Questions in display order.
    pub questions: Vec<Question>,
}

impl Quiz {
    /// Check the quiz is gradeable.
    ///
    /// # Errors
    ///
    /// Returns `LmsError::Validation` for empty quizzes and out-of-range answer keys.
    pub fn validate(&self) -> Result<()> {
        if self.questions.is_empty() {
            return Err(LmsError::Validation("quiz has no questions".into()));
        }
        for (i, q) in self.questions.iter().enumerate() {
            if q.answer >= q.options.len() {
                return Err(LmsError::Validation(format!(
                    "question {} has no option {}",
                    i + 1,
                    q.answer
                )));
            }
        }
        Ok(())
    }

    /// Grade a list of chosen option indices, one per question.
    ///
    /// Missing answers count as wrong.
    ///
    /// # Errors
    ///
    /// Returns `LmsError::Validation` if more answers than questions are given.
    pub fn grade(&self, answers: &[usize]) -> Result<QuizOutcome> {
        if answers.len() > self.questions.len() {
            return Err(LmsError::Validation(format!(
                "{} answers given for {} questions",
                answers.len(),
                self.questions.len()
            )));
        }

        let correct = self
            .questions
            .iter()
            .zip(answers)
            .filter(|(q, a)| q.answer == **a)
            .count();

        QuizOutcome::from_counts(
            u32::try_from(correct).unwrap_or(u32::MAX),
            u32::try_from(self.questions.len()).unwrap_or(u32::MAX),
        )
    }
}

/// Result of one quiz attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuizOutcome {
    /// Correct answers.
    pub correct: u32,
    /// Total questions.
    pub total: u32,
    /// Percent correct, rounded down.
    pub score_percent: u8,
    /// Whether the score reaches [`PASS_THRESHOLD_PERCENT`].
    pub passed: bool,
}

impl QuizOutcome {
    /// Build an outcome from raw counts.
    ///
    /// # Errors
    ///
    /// Returns `LmsError::Validation` if `total` is zero or `correct > total`.
    pub fn from_counts(correct: u32, total: u32) -> Result<Self> {
        if total == 0 || correct > total {
            return Err(LmsError::Validation(format!(
                "invalid quiz score {correct}/{total}"
            )));
        }

        let percent = u64::from(correct) * 100 / u64::from(total);
        let score_percent = u8::try_from(percent).unwrap_or(100);

        Ok(Self {
            correct,
            total,
            score_percent,
            passed: score_percent >= PASS_THRESHOLD_PERCENT,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiz(answers: &[usize]) -> Quiz {
        Quiz {
            questions: answers
                .iter()
                .map(|&a| Question {
                    prompt: "?".into(),
                    options: vec!["a".into(), "b".into(), "c".into()],
                    answer: a,
                })
                .collect(),
        }
    }

    #[test]
    fn threshold_is_inclusive() {
        assert!(QuizOutcome::from_counts(7, 10).unwrap().passed);
        assert!(!QuizOutcome::from_counts(69, 100).unwrap().passed);
        assert!(QuizOutcome::from_counts(70, 100).unwrap().passed);
    }

    #[test]
    fn percent_rounds_down() {
        // 2/3 = 66.6%
        let outcome = QuizOutcome::from_counts(2, 3).unwrap();
        assert_eq!(outcome.score_percent, 66);
        assert!(!outcome.passed);
    }

    #[test]
    fn invalid_counts_rejected() {
        assert!(QuizOutcome::from_counts(0, 0).is_err());
        assert!(QuizOutcome::from_counts(5, 4).is_err());
    }

    #[test]
    fn grade_counts_matching_answers() {
        let q = quiz(&[0, 1, 2, 0]);
        let outcome = q.grade(&[0, 1, 2, 2]).unwrap();
        assert_eq!(outcome.correct, 3);
        assert_eq!(outcome.total, 4);
        assert_eq!(outcome.score_percent, 75);
        assert!(outcome.passed);
    }

    #[test]
    fn missing_answers_count_as_wrong() {
        let q = quiz(&[0, 0, 0, 0]);
        let outcome = q.grade(&[0, 0]).unwrap();
        assert_eq!(outcome.correct, 2);
        assert!(!outcome.passed);
    }

    #[test]
    fn too_many_answers_rejected() {
        assert!(quiz(&[0]).grade(&[0, 1]).is_err());
    }

    #[test]
    fn validate_checks_answer_keys() {
        assert!(quiz(&[0, 2]).validate().is_ok());
        assert!(quiz(&[3]).validate().is_err());
        assert!(Quiz { questions: vec![] }.validate().is_err());
    }
}
