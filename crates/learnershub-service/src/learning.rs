//! Student-side course logic: the joined course list, module boards, module
//! completion, quiz submission and certificate issuance.
//!
//! Everything here works on a [`Repository`] directly so it can be tested
//! without the HTTP layer.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use learnershub_core::{
    merge_course_sources, Certificate, CertificateData, Completion, Course, CourseId,
    CourseSource, Email, LmsError, ModuleProgress, ModuleState, QuizOutcome, StudentIdentity,
};
use learnershub_store::{
    AccountRepository, AssignmentRepository, CertificateRepository, CourseRepository,
    ProgressRepository, Repository, Result,
};

/// Resolve the identity a student's assignments are matched against.
///
/// A student without an account record (deleted mid-session) still matches by email.
pub fn resolve_student(store: &Repository, email: &Email) -> Result<StudentIdentity> {
    let id = store.get_account(email)?.map(|a| a.id);
    Ok(StudentIdentity {
        id,
        email: email.clone(),
    })
}

/// One row of a student's course list.
#[derive(Debug, Clone, Serialize)]
pub struct StudentCourse {
    /// The course.
    #[serde(flatten)]
    pub course: Course,
    /// Assigned or self-enrolled.
    pub source: CourseSource,
    /// Completed modules, in percent.
    pub percent: u8,
    /// Completed module count.
    pub completed_modules: usize,
    /// Whether every module is completed.
    pub finished: bool,
}

/// Course ids on a student's list with their source, assigned first.
fn course_sources(
    store: &Repository,
    student: &StudentIdentity,
) -> Result<Vec<(CourseId, CourseSource)>> {
    let assigned = store.assignments_for(student)?;
    let enrolled = store.list_enrollments(&student.email)?;
    Ok(merge_course_sources(
        assigned.iter().map(|a| a.course_id),
        enrolled.iter().map(|e| e.course_id),
    ))
}

/// A student's courses joined with the catalog and their progress.
///
/// Ids whose course no longer exists are skipped.
pub fn student_courses(store: &Repository, student: &StudentIdentity) -> Result<Vec<StudentCourse>> {
    let progress = store.list_progress(&student.email)?;
    let mut courses = Vec::new();

    for (course_id, source) in course_sources(store, student)? {
        let Some(course) = store.get_course(course_id)? else {
            tracing::debug!(course_id = %course_id, email = %student.email, "Skipping deleted course");
            continue;
        };

        let mut record = progress
            .iter()
            .find(|p| p.course_id == course_id)
            .cloned()
            .unwrap_or_else(|| ModuleProgress::new(course_id, course.module_count));
        record.sync_total(course.module_count);

        courses.push(StudentCourse {
            source,
            percent: record.percent,
            completed_modules: record.completed.len(),
            finished: record.is_finished(),
            course,
        });
    }

    Ok(courses)
}

/// One module on a student's board.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleView {
    /// 1-based module number.
    pub number: u32,
    /// Module title, if the course has outlines.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Derived state.
    pub state: ModuleState,
    /// Whether the module has a gradeable quiz.
    pub has_quiz: bool,
    /// Best quiz score so far.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_score: Option<u8>,
}

/// A student's module states in one course.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleBoard {
    /// The course.
    pub course_id: CourseId,
    /// Course title.
    pub title: String,
    /// Completed modules, in percent.
    pub percent: u8,
    /// Whether every module is completed.
    pub finished: bool,
    /// Modules in order.
    pub modules: Vec<ModuleView>,
}

impl ModuleBoard {
    fn build(course: &Course, progress: &ModuleProgress) -> Self {
        let modules = progress
            .states()
            .into_iter()
            .zip(1..)
            .map(|(state, number): (ModuleState, u32)| {
                let outline = usize::try_from(number - 1)
                    .ok()
                    .and_then(|i| course.modules.get(i));
                ModuleView {
                    number,
                    title: outline.map(|o| o.title.clone()),
                    state,
                    has_quiz: course.quiz_for(number).is_some(),
                    best_score: progress.quiz_scores.get(&number).copied(),
                }
            })
            .collect();

        Self {
            course_id: course.id,
            title: course.title.clone(),
            percent: progress.percent,
            finished: progress.is_finished(),
            modules,
        }
    }
}

/// A course on the student's list.
fn enrolled_course(
    store: &Repository,
    student: &StudentIdentity,
    course_id: CourseId,
) -> Result<Course> {
    if !course_sources(store, student)?
        .iter()
        .any(|(id, _)| *id == course_id)
    {
        return Err(LmsError::NotEnrolled(course_id).into());
    }

    Ok(store
        .get_course(course_id)?
        .ok_or(LmsError::CourseNotFound(course_id))?)
}

/// Load a course on the student's list and their progress in it.
fn load_enrolled(
    store: &Repository,
    student: &StudentIdentity,
    course_id: CourseId,
) -> Result<(Course, ModuleProgress)> {
    let course = enrolled_course(store, student, course_id)?;

    let mut progress = store
        .get_progress(&student.email, course_id)?
        .unwrap_or_else(|| ModuleProgress::new(course_id, course.module_count));
    progress.sync_total(course.module_count);

    Ok((course, progress))
}

/// Module states for one course.
pub fn module_board(
    store: &Repository,
    student: &StudentIdentity,
    course_id: CourseId,
) -> Result<ModuleBoard> {
    let (course, progress) = load_enrolled(store, student, course_id)?;
    Ok(ModuleBoard::build(&course, &progress))
}

/// Result of completing a module or taking its quiz.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleUpdate {
    /// Whether the module is now completed.
    pub module_completed: bool,
    /// Whether this request completed it (false when it already was).
    pub newly_completed: bool,
    /// The quiz result, for quiz submissions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz: Option<QuizOutcome>,
    /// Updated board.
    pub board: ModuleBoard,
    /// Certificate issued because this request finished the course.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<Certificate>,
}

/// A quiz attempt.
///
/// Modules with a defined quiz take the chosen option per question; modules
/// without one take the correct/total counts reported by the client.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum QuizSubmission {
    /// Chosen option index per question.
    Answers {
        /// Option indices, in question order.
        answers: Vec<usize>,
    },
    /// Self-reported counts.
    Score {
        /// Correct answers.
        correct: u32,
        /// Total questions.
        total: u32,
    },
}

/// Mark a module completed.
pub fn complete_module(
    store: &Repository,
    student: &StudentIdentity,
    student_name: &str,
    course_id: CourseId,
    module: u32,
) -> Result<ModuleUpdate> {
    let course = enrolled_course(store, student, course_id)?;
    let (progress, completion) =
        store.update_progress(&student.email, course_id, course.module_count, |p| {
            Ok(p.complete(module)?)
        })?;
    finish_update(store, student, student_name, &course, &progress, Some(completion), None)
}

/// Grade a quiz attempt; a passing score completes the module.
pub fn submit_quiz(
    store: &Repository,
    student: &StudentIdentity,
    student_name: &str,
    course_id: CourseId,
    module: u32,
    submission: &QuizSubmission,
) -> Result<ModuleUpdate> {
    let course = enrolled_course(store, student, course_id)?;

    let outcome = match (course.quiz_for(module), submission) {
        (Some(quiz), QuizSubmission::Answers { answers }) => quiz.grade(answers)?,
        (None, QuizSubmission::Score { correct, total }) => {
            QuizOutcome::from_counts(*correct, *total)?
        }
        (Some(_), QuizSubmission::Score { .. }) => {
            return Err(LmsError::Validation(format!(
                "module {module} has a quiz; submit answers"
            ))
            .into());
        }
        (None, QuizSubmission::Answers { .. }) => {
            return Err(LmsError::Validation(format!(
                "module {module} has no quiz; submit correct and total"
            ))
            .into());
        }
    };

    let (progress, completion) =
        store.update_progress(&student.email, course_id, course.module_count, |p| {
            Ok(p.record_quiz(module, outcome)?)
        })?;
    tracing::debug!(
        email = %student.email,
        course_id = %course_id,
        module,
        score = outcome.score_percent,
        passed = outcome.passed,
        "Quiz graded"
    );

    finish_update(
        store,
        student,
        student_name,
        &course,
        &progress,
        completion,
        Some(outcome),
    )
}

/// Build the response for a stored progress change.
///
/// Only the request whose change finished the course gets a certificate.
fn finish_update(
    store: &Repository,
    student: &StudentIdentity,
    student_name: &str,
    course: &Course,
    progress: &ModuleProgress,
    completion: Option<Completion>,
    quiz: Option<QuizOutcome>,
) -> Result<ModuleUpdate> {
    let newly_completed = matches!(completion, Some(Completion::Completed { .. }));
    let module_completed = completion.is_some();

    let certificate = if completion.is_some_and(Completion::finished_course) {
        tracing::info!(email = %student.email, course_id = %course.id, "Course completed");
        match append_certificate(store, &student.email, student_name, course, progress) {
            Ok(certificate) => Some(certificate),
            Err(e) => {
                tracing::warn!(
                    email = %student.email,
                    course_id = %course.id,
                    error = %e,
                    "Automatic certificate issuance failed"
                );
                None
            }
        }
    } else {
        None
    };

    Ok(ModuleUpdate {
        module_completed,
        newly_completed,
        quiz,
        board: ModuleBoard::build(course, progress),
        certificate,
    })
}

/// Printed certificate fields for a finished course.
#[must_use]
pub fn certificate_data(student_name: &str, course: &Course, progress: &ModuleProgress) -> CertificateData {
    CertificateData {
        student_name: student_name.to_string(),
        course_name: course.title.clone(),
        duration: course.duration_label(),
        completion_date: progress.completed_at.unwrap_or_else(Utc::now).date_naive(),
        grade: progress.grade(),
    }
}

fn append_certificate(
    store: &Repository,
    email: &Email,
    student_name: &str,
    course: &Course,
    progress: &ModuleProgress,
) -> Result<Certificate> {
    let data = certificate_data(student_name, course, progress);
    let certificate = Certificate::issue(email.clone(), course.id, data)?;
    store.append_certificate(&certificate)?;
    Ok(certificate)
}

/// Issue a fresh certificate record for a finished course.
///
/// Every call appends a new record.
pub fn issue_certificate(
    store: &Repository,
    student: &StudentIdentity,
    student_name: &str,
    course_id: CourseId,
) -> Result<Certificate> {
    let (course, progress) = load_enrolled(store, student, course_id)?;
    if !progress.is_finished() {
        return Err(LmsError::CourseNotCompleted(course_id).into());
    }
    append_certificate(store, &student.email, student_name, &course, &progress)
}
