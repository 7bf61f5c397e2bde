//! Typed repositories over a [`RecordStore`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::de::DeserializeOwned;
use serde::Serialize;

use learnershub_core::{
    push_capped, Account, Assignment, Certificate, CertificateId, Course, CourseId, Email,
    Enrollment, LmsError, LoginEvent, ModuleProgress, Profile, StudentIdentity,
};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::memory::MemoryStore;
use crate::schema::collection;
use crate::{
    AccountRepository, AssignmentRepository, CertificateRepository, CourseRepository,
    LoginHistoryRepository, ProgressRepository, RecordStore,
};

/// What [`AccountRepository::purge_account`] removed.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PurgeReport {
    /// The removed account.
    pub email: Email,
    /// Assignments that referenced the account.
    pub assignments_removed: usize,
    /// Self-enrollments.
    pub enrollments_removed: usize,
    /// Course progress records.
    pub progress_removed: usize,
    /// Certificates.
    pub certificates_removed: usize,
}

/// Typed access to every collection, backed by any [`RecordStore`].
///
/// Read-modify-write sequences on shared lists are serialized inside one
/// `Repository`. Separate processes sharing a backend still race, last write wins.
pub struct Repository {
    backend: Arc<dyn RecordStore>,
    write_lock: Mutex<()>,
}

impl Repository {
    /// Wrap a backend.
    #[must_use]
    pub fn new(backend: Arc<dyn RecordStore>) -> Self {
        Self {
            backend,
            write_lock: Mutex::new(()),
        }
    }

    /// A repository over a fresh [`MemoryStore`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// The underlying record store.
    #[must_use]
    pub fn backend(&self) -> &Arc<dyn RecordStore> {
        &self.backend
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read and parse a record.
    ///
    /// Absent keys and corrupt JSON both yield `None`; corruption is logged.
    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(bytes) = self.backend.get(key)? else {
            return Ok(None);
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Discarding corrupt record");
                Ok(None)
            }
        }
    }

    fn read_list<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        Ok(self.read(key)?.unwrap_or_default())
    }

    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes =
            serde_json::to_vec(value).map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.backend.put(key, &bytes)
    }

    fn read_prefix<T: DeserializeOwned>(&self, prefix: &str) -> Result<Vec<T>> {
        let mut records = Vec::new();
        for key in self.backend.keys_with_prefix(prefix)? {
            if let Some(record) = self.read(&key)? {
                records.push(record);
            }
        }
        Ok(records)
    }
}

impl AccountRepository for Repository {
    fn create_account(&self, account: &Account) -> Result<()> {
        let _guard = self.lock();

        if self.get_account(&account.email)?.is_some() {
            return Err(LmsError::EmailTaken {
                email: account.email.to_string(),
            }
            .into());
        }

        self.write(&keys::account_key(&account.email), account)
    }

    fn get_account(&self, email: &Email) -> Result<Option<Account>> {
        self.read(&keys::account_key(email))
    }

    fn list_accounts(&self) -> Result<Vec<Account>> {
        self.read_prefix(collection::ACCOUNT)
    }

    fn get_profile(&self, email: &Email) -> Result<Profile> {
        Ok(self.read(&keys::profile_key(email))?.unwrap_or_default())
    }

    fn update_account<F>(&self, email: &Email, change: F) -> Result<(Account, Profile)>
    where
        F: FnOnce(&mut Account, &mut Profile) -> Result<()>,
    {
        let _guard = self.lock();

        let mut account = self.get_account(email)?.ok_or_else(|| StoreError::NotFound {
            entity: "account",
            id: email.to_string(),
        })?;
        let mut profile = self.get_profile(email)?;

        change(&mut account, &mut profile)?;

        self.write(&keys::account_key(email), &account)?;
        self.write(&keys::profile_key(email), &profile)?;
        Ok((account, profile))
    }

    fn purge_account(&self, email: &Email) -> Result<PurgeReport> {
        let _guard = self.lock();

        let account = self.get_account(email)?.ok_or_else(|| StoreError::NotFound {
            entity: "account",
            id: email.to_string(),
        })?;
        let identity = StudentIdentity {
            id: Some(account.id),
            email: email.clone(),
        };

        let mut assignments: Vec<Assignment> = self.read_list(collection::ASSIGNMENTS)?;
        let before = assignments.len();
        assignments.retain(|a| !identity.matches(a));
        let assignments_removed = before - assignments.len();
        if assignments_removed > 0 {
            self.write(collection::ASSIGNMENTS, &assignments)?;
        }

        let report = PurgeReport {
            email: email.clone(),
            assignments_removed,
            enrollments_removed: self.list_enrollments(email)?.len(),
            progress_removed: self.list_progress(email)?.len(),
            certificates_removed: self.list_certificates(email)?.len(),
        };

        for key in keys::user_scoped_keys(email) {
            self.backend.delete(&key)?;
        }

        tracing::info!(
            email = %email,
            assignments = report.assignments_removed,
            certificates = report.certificates_removed,
            "Account purged"
        );

        Ok(report)
    }
}

impl CourseRepository for Repository {
    fn next_course_id(&self) -> Result<CourseId> {
        let _guard = self.lock();

        let last = match self.read::<u64>(collection::COURSE_SEQ)? {
            Some(seq) => seq,
            // First allocation (or a lost counter): continue after the highest stored id.
            None => self
                .list_courses()?
                .iter()
                .map(|c| c.id.get())
                .max()
                .unwrap_or(0),
        };

        let next = last + 1;
        self.write(collection::COURSE_SEQ, &next)?;
        Ok(CourseId::new(next))
    }

    fn put_course(&self, course: &Course) -> Result<()> {
        self.write(&keys::course_key(course.id), course)
    }

    fn get_course(&self, course_id: CourseId) -> Result<Option<Course>> {
        self.read(&keys::course_key(course_id))
    }

    fn list_courses(&self) -> Result<Vec<Course>> {
        self.read_prefix(collection::COURSE)
    }

    fn delete_course(&self, course_id: CourseId) -> Result<()> {
        let key = keys::course_key(course_id);
        if self.backend.get(&key)?.is_none() {
            return Err(StoreError::NotFound {
                entity: "course",
                id: course_id.to_string(),
            });
        }
        self.backend.delete(&key)
    }
}

impl AssignmentRepository for Repository {
    fn list_assignments(&self) -> Result<Vec<Assignment>> {
        self.read_list(collection::ASSIGNMENTS)
    }

    fn assignments_for(&self, student: &StudentIdentity) -> Result<Vec<Assignment>> {
        let all = self.list_assignments()?;
        Ok(student.select(&all).cloned().collect())
    }

    fn assign_course(&self, assignment: &Assignment) -> Result<()> {
        let _guard = self.lock();

        let mut all = self.list_assignments()?;
        let student = StudentIdentity {
            id: assignment.student_id,
            email: assignment.student_email.clone(),
        };
        if student
            .select(&all)
            .any(|a| a.course_id == assignment.course_id)
        {
            return Err(LmsError::AlreadyAssigned(assignment.course_id).into());
        }

        all.push(assignment.clone());
        self.write(collection::ASSIGNMENTS, &all)
    }

    fn list_enrollments(&self, email: &Email) -> Result<Vec<Enrollment>> {
        self.read_list(&keys::enrollments_key(email))
    }

    fn enroll(&self, student: &StudentIdentity, enrollment: &Enrollment) -> Result<()> {
        let _guard = self.lock();

        let course_id = enrollment.course_id;
        if self
            .assignments_for(student)?
            .iter()
            .any(|a| a.course_id == course_id)
        {
            return Err(LmsError::AlreadyEnrolled(course_id).into());
        }

        let key = keys::enrollments_key(&student.email);
        let mut enrollments: Vec<Enrollment> = self.read_list(&key)?;
        if enrollments.iter().any(|e| e.course_id == course_id) {
            return Err(LmsError::AlreadyEnrolled(course_id).into());
        }

        enrollments.push(enrollment.clone());
        self.write(&key, &enrollments)
    }
}

impl ProgressRepository for Repository {
    fn get_progress(&self, email: &Email, course_id: CourseId) -> Result<Option<ModuleProgress>> {
        Ok(self
            .list_progress(email)?
            .into_iter()
            .find(|p| p.course_id == course_id))
    }

    fn list_progress(&self, email: &Email) -> Result<Vec<ModuleProgress>> {
        self.read_list(&keys::progress_key(email))
    }

    fn update_progress<T, F>(
        &self,
        email: &Email,
        course_id: CourseId,
        total_modules: u32,
        change: F,
    ) -> Result<(ModuleProgress, T)>
    where
        F: FnOnce(&mut ModuleProgress) -> Result<T>,
    {
        let _guard = self.lock();

        let key = keys::progress_key(email);
        let mut all: Vec<ModuleProgress> = self.read_list(&key)?;
        let index = match all.iter().position(|p| p.course_id == course_id) {
            Some(index) => index,
            None => {
                all.push(ModuleProgress::new(course_id, total_modules));
                all.len() - 1
            }
        };

        let record = &mut all[index];
        record.sync_total(total_modules);
        let outcome = change(record)?;
        let updated = record.clone();

        self.write(&key, &all)?;
        Ok((updated, outcome))
    }
}

impl CertificateRepository for Repository {
    fn list_certificates(&self, email: &Email) -> Result<Vec<Certificate>> {
        self.read_list(&keys::certificates_key(email))
    }

    fn get_certificate(&self, email: &Email, id: CertificateId) -> Result<Option<Certificate>> {
        Ok(self
            .list_certificates(email)?
            .into_iter()
            .find(|c| c.id == id))
    }

    fn append_certificate(&self, certificate: &Certificate) -> Result<()> {
        let _guard = self.lock();

        let key = keys::certificates_key(&certificate.student_email);
        let mut all: Vec<Certificate> = self.read_list(&key)?;
        all.push(certificate.clone());
        self.write(&key, &all)
    }
}

impl LoginHistoryRepository for Repository {
    fn record_login(&self, event: LoginEvent) -> Result<()> {
        let _guard = self.lock();

        let mut history = self.login_history()?;
        push_capped(&mut history, event);
        self.write(collection::LOGIN_HISTORY, &history)
    }

    fn login_history(&self) -> Result<Vec<LoginEvent>> {
        self.read_list(collection::LOGIN_HISTORY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::thread;

    use chrono::NaiveDate;
    use learnershub_core::{
        CertificateData, Completion, CourseDraft, CourseStatus, Role, LOGIN_HISTORY_CAP,
    };

    fn email(raw: &str) -> Email {
        Email::parse(raw).unwrap()
    }

    fn student(repo: &Repository, raw: &str) -> Account {
        let account = Account::new("Student".into(), email(raw), Role::Student, "pw").unwrap();
        repo.create_account(&account).unwrap();
        account
    }

    fn identity(account: &Account) -> StudentIdentity {
        StudentIdentity {
            id: Some(account.id),
            email: account.email.clone(),
        }
    }

    fn course(repo: &Repository, modules: u32) -> Course {
        let id = repo.next_course_id().unwrap();
        let course = Course::new(
            id,
            CourseDraft {
                title: format!("Course {id}"),
                description: String::new(),
                module_count: Some(modules),
                modules: Vec::new(),
                image: None,
                instructor: None,
                duration: None,
                status: CourseStatus::Active,
            },
        )
        .unwrap();
        repo.put_course(&course).unwrap();
        course
    }

    fn certificate_for(account: &Account, course_id: CourseId) -> Certificate {
        Certificate::issue(
            account.email.clone(),
            course_id,
            CertificateData {
                student_name: account.name.clone(),
                course_name: "Rust".into(),
                duration: "2 modules".into(),
                completion_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                grade: "Pass".into(),
            },
        )
        .unwrap()
    }

    #[test]
    fn duplicate_registration_is_rejected_without_writing() {
        let repo = Repository::in_memory();
        let first = student(&repo, "sam@example.com");

        let duplicate = Account::new("Other".into(), email("SAM@example.com"), Role::Instructor, "x").unwrap();
        let result = repo.create_account(&duplicate);

        assert!(matches!(result, Err(StoreError::Rule(LmsError::EmailTaken { .. }))));
        let accounts = repo.list_accounts().unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].id, first.id);
        assert_eq!(accounts[0].name, "Student");
    }

    #[test]
    fn corrupt_records_read_as_empty() {
        let backend = Arc::new(MemoryStore::new());
        let repo = Repository::new(backend.clone());
        let sam = email("sam@example.com");

        backend.put(&keys::account_key(&sam), b"{not json").unwrap();
        backend.put(collection::ASSIGNMENTS, b"[{\"broken\":").unwrap();
        backend.put(&keys::certificates_key(&sam), b"42").unwrap();

        assert!(repo.get_account(&sam).unwrap().is_none());
        assert!(repo.list_assignments().unwrap().is_empty());
        assert!(repo.list_certificates(&sam).unwrap().is_empty());
        assert!(repo.list_accounts().unwrap().is_empty());
    }

    #[test]
    fn course_ids_are_sequential() {
        let repo = Repository::in_memory();
        let a = course(&repo, 1);
        let b = course(&repo, 1);
        assert_eq!(a.id, CourseId::new(1));
        assert_eq!(b.id, CourseId::new(2));

        let listed: Vec<_> = repo.list_courses().unwrap().iter().map(|c| c.id).collect();
        assert_eq!(listed, vec![a.id, b.id]);
    }

    #[test]
    fn course_sequence_continues_after_existing_courses() {
        let backend = Arc::new(MemoryStore::new());
        let repo = Repository::new(backend.clone());
        course(&repo, 1);
        course(&repo, 1);
        backend.delete(collection::COURSE_SEQ).unwrap();

        assert_eq!(repo.next_course_id().unwrap(), CourseId::new(3));
    }

    #[test]
    fn delete_missing_course_is_not_found() {
        let repo = Repository::in_memory();
        let c = course(&repo, 1);
        repo.delete_course(c.id).unwrap();
        assert!(repo.get_course(c.id).unwrap().is_none());
        assert!(matches!(
            repo.delete_course(c.id),
            Err(StoreError::NotFound { entity: "course", .. })
        ));
    }

    #[test]
    fn assignment_matching_by_email_or_id() {
        let repo = Repository::in_memory();
        let sam = student(&repo, "sam@example.com");
        let instructor_email = email("lead@example.com");

        // By email only.
        repo.assign_course(&Assignment::new(CourseId::new(1), None, sam.email.clone(), instructor_email.clone()))
            .unwrap();
        // By id only (recorded under an older address).
        repo.assign_course(&Assignment::new(
            CourseId::new(2),
            Some(sam.id),
            email("sam.old@example.com"),
            instructor_email.clone(),
        ))
        .unwrap();
        // Someone else.
        repo.assign_course(&Assignment::new(CourseId::new(3), None, email("kim@example.com"), instructor_email))
            .unwrap();

        let mine: Vec<u64> = repo
            .assignments_for(&identity(&sam))
            .unwrap()
            .iter()
            .map(|a| a.course_id.get())
            .collect();
        assert_eq!(mine, vec![1, 2]);
    }

    #[test]
    fn assigning_twice_is_rejected() {
        let repo = Repository::in_memory();
        let sam = student(&repo, "sam@example.com");
        let a = Assignment::new(CourseId::new(1), Some(sam.id), sam.email.clone(), email("t@example.com"));

        repo.assign_course(&a).unwrap();
        assert!(matches!(
            repo.assign_course(&a),
            Err(StoreError::Rule(LmsError::AlreadyAssigned(_)))
        ));
        assert_eq!(repo.list_assignments().unwrap().len(), 1);
    }

    #[test]
    fn enrollment_conflicts_with_assignment_and_itself() {
        let repo = Repository::in_memory();
        let sam = student(&repo, "sam@example.com");
        let me = identity(&sam);
        repo.assign_course(&Assignment::new(CourseId::new(1), None, sam.email.clone(), email("t@example.com")))
            .unwrap();

        assert!(matches!(
            repo.enroll(&me, &Enrollment::new(CourseId::new(1))),
            Err(StoreError::Rule(LmsError::AlreadyEnrolled(_)))
        ));

        repo.enroll(&me, &Enrollment::new(CourseId::new(2))).unwrap();
        assert!(matches!(
            repo.enroll(&me, &Enrollment::new(CourseId::new(2))),
            Err(StoreError::Rule(LmsError::AlreadyEnrolled(_)))
        ));
        assert_eq!(repo.list_enrollments(&sam.email).unwrap().len(), 1);
    }

    fn complete(p: &mut ModuleProgress, module: u32) -> Result<Completion> {
        Ok(p.complete(module)?)
    }

    #[test]
    fn progress_is_upserted_per_course() {
        let repo = Repository::in_memory();
        let sam = email("sam@example.com");

        repo.update_progress(&sam, CourseId::new(1), 2, |_| Ok(())).unwrap();
        repo.update_progress(&sam, CourseId::new(2), 3, |_| Ok(())).unwrap();
        let (p1, completion) = repo
            .update_progress(&sam, CourseId::new(1), 2, |p| complete(p, 1))
            .unwrap();

        assert_eq!(completion, Completion::Completed { course_finished: false });
        assert_eq!(p1.percent, 50);
        assert_eq!(repo.list_progress(&sam).unwrap().len(), 2);
        let stored = repo.get_progress(&sam, CourseId::new(1)).unwrap().unwrap();
        assert_eq!(stored, p1);
        assert!(repo.get_progress(&sam, CourseId::new(9)).unwrap().is_none());
    }

    #[test]
    fn failed_progress_change_writes_nothing() {
        let repo = Repository::in_memory();
        let sam = email("sam@example.com");

        let result = repo.update_progress(&sam, CourseId::new(1), 2, |p| complete(p, 2));

        assert!(matches!(result, Err(StoreError::Rule(LmsError::ModuleLocked { .. }))));
        assert!(repo.list_progress(&sam).unwrap().is_empty());
    }

    #[test]
    fn concurrent_completions_finish_the_course_once() {
        let repo = Arc::new(Repository::in_memory());
        let sam = email("sam@example.com");
        let barrier = Arc::new(Barrier::new(4));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let repo = Arc::clone(&repo);
                let sam = sam.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    repo.update_progress(&sam, CourseId::new(1), 1, |p| complete(p, 1))
                        .unwrap()
                        .1
                })
            })
            .collect();

        let finished = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|c| c.finished_course())
            .count();
        assert_eq!(finished, 1);
    }

    #[test]
    fn concurrent_updates_to_different_courses_are_all_kept() {
        let repo = Arc::new(Repository::in_memory());
        let sam = email("sam@example.com");
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (1..=8)
            .map(|course| {
                let repo = Arc::clone(&repo);
                let sam = sam.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    repo.update_progress(&sam, CourseId::new(course), 2, |p| complete(p, 1))
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let all = repo.list_progress(&sam).unwrap();
        assert_eq!(all.len(), 8);
        assert!(all.iter().all(|p| p.percent == 50));
    }

    #[test]
    fn account_update_edits_account_and_profile() {
        let repo = Repository::in_memory();
        let sam = student(&repo, "sam@example.com");

        let (account, profile) = repo
            .update_account(&sam.email, |account, profile| {
                account.name = "Samantha".into();
                profile.bio = Some("hello".into());
                Ok(())
            })
            .unwrap();

        assert_eq!(account.name, "Samantha");
        assert_eq!(repo.get_account(&sam.email).unwrap().unwrap().name, "Samantha");
        assert_eq!(repo.get_profile(&sam.email).unwrap(), profile);
    }

    #[test]
    fn account_update_after_purge_is_not_found() {
        let repo = Repository::in_memory();
        let sam = student(&repo, "sam@example.com");
        repo.purge_account(&sam.email).unwrap();

        let result = repo.update_account(&sam.email, |account, _| {
            account.name = "Back".into();
            Ok(())
        });

        assert!(matches!(result, Err(StoreError::NotFound { entity: "account", .. })));
        assert!(repo.get_account(&sam.email).unwrap().is_none());
        assert!(repo.backend().get(&keys::profile_key(&sam.email)).unwrap().is_none());
    }

    #[test]
    fn certificates_are_never_deduplicated() {
        let repo = Repository::in_memory();
        let sam = student(&repo, "sam@example.com");

        let first = certificate_for(&sam, CourseId::new(1));
        let second = certificate_for(&sam, CourseId::new(1));
        repo.append_certificate(&first).unwrap();
        repo.append_certificate(&second).unwrap();

        let all = repo.list_certificates(&sam.email).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].data, all[1].data);
        assert_ne!(all[0].id, all[1].id);
        assert_eq!(
            repo.get_certificate(&sam.email, second.id).unwrap(),
            Some(second)
        );
    }

    #[test]
    fn login_history_is_capped() {
        let repo = Repository::in_memory();
        for i in 0..(LOGIN_HISTORY_CAP + 5) {
            repo.record_login(LoginEvent::now(
                email("sam@example.com"),
                format!("login {i}"),
                Role::Student,
            ))
            .unwrap();
        }

        let history = repo.login_history().unwrap();
        assert_eq!(history.len(), LOGIN_HISTORY_CAP);
        assert_eq!(history[0].name, format!("login {}", LOGIN_HISTORY_CAP + 4));
    }

    #[test]
    fn purge_cascades_to_every_dependent_record() {
        let repo = Repository::in_memory();
        let sam = student(&repo, "sam@example.com");
        let kim = student(&repo, "kim@example.com");
        let instructor_email = email("lead@example.com");
        let c = course(&repo, 2);

        repo.update_account(&sam.email, |_, profile| {
            profile.bio = Some("hi".into());
            Ok(())
        })
        .unwrap();
        repo.assign_course(&Assignment::new(c.id, None, sam.email.clone(), instructor_email.clone()))
            .unwrap();
        repo.assign_course(&Assignment::new(
            CourseId::new(77),
            Some(sam.id),
            email("sam.old@example.com"),
            instructor_email.clone(),
        ))
        .unwrap();
        repo.assign_course(&Assignment::new(c.id, Some(kim.id), kim.email.clone(), instructor_email))
            .unwrap();
        repo.enroll(&identity(&sam), &Enrollment::new(CourseId::new(5))).unwrap();
        repo.update_progress(&sam.email, c.id, 2, |_| Ok(())).unwrap();
        repo.append_certificate(&certificate_for(&sam, c.id)).unwrap();

        let report = repo.purge_account(&sam.email).unwrap();

        assert_eq!(report.assignments_removed, 2);
        assert_eq!(report.enrollments_removed, 1);
        assert_eq!(report.progress_removed, 1);
        assert_eq!(report.certificates_removed, 1);

        assert!(repo.get_account(&sam.email).unwrap().is_none());
        assert!(repo.get_profile(&sam.email).unwrap().bio.is_none());
        assert!(repo.list_enrollments(&sam.email).unwrap().is_empty());
        assert!(repo.list_progress(&sam.email).unwrap().is_empty());
        assert!(repo.list_certificates(&sam.email).unwrap().is_empty());
        for key in keys::user_scoped_keys(&sam.email) {
            assert!(repo.backend().get(&key).unwrap().is_none(), "{key} survived");
        }

        let remaining = repo.list_assignments().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].student_email, kim.email);
        assert!(repo.get_account(&kim.email).unwrap().is_some());
    }

    #[test]
    fn purge_unknown_account_is_not_found() {
        let repo = Repository::in_memory();
        assert!(matches!(
            repo.purge_account(&email("ghost@example.com")),
            Err(StoreError::NotFound { entity: "account", .. })
        ));
    }

    #[test]
    fn works_over_file_backend() {
        let dir = tempfile::TempDir::new().unwrap();
        let backend = Arc::new(crate::FileStore::open(dir.path()).unwrap());
        let repo = Repository::new(backend);
        let sam = student(&repo, "sam@example.com");

        let reopened = Repository::new(Arc::new(crate::FileStore::open(dir.path()).unwrap()));
        assert_eq!(reopened.get_account(&sam.email).unwrap().unwrap().id, sam.id);
    }

    #[test]
    fn long_email_registers_over_file_backend() {
        let dir = tempfile::TempDir::new().unwrap();
        let repo = Repository::new(Arc::new(crate::FileStore::open(dir.path()).unwrap()));
        let address = format!("{}@example.com", "a".repeat(115));
        assert_eq!(address.len(), 127);

        let account = student(&repo, &address);

        assert_eq!(repo.get_account(&account.email).unwrap().unwrap().id, account.id);
        assert_eq!(repo.list_accounts().unwrap().len(), 1);
    }
}
