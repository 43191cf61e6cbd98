use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use enroll_chain::{Block, HashChain};
use enroll_ledger::{ContractAction, Credentials, LedgerClient, LedgerError};
use enroll_types::{
    Address, Course, CourseSummary, EnrollmentRecord, LedgerCourseView, Receipt, Student,
};

use crate::config::CoordinatorConfig;
use crate::error::CoreResult;
use crate::outcome::Outcome;
use crate::prerequisites::PrerequisiteEngine;

/// Owns the local cache and audit chain, and runs every workflow that
/// touches them.
///
/// One coarse lock covers students, courses, and the chain. Mutating
/// workflows hold it across the whole ledger round trip, so enrollments and
/// course additions are serialized process-wide and chain order equals
/// completion order. Reads take the same lock.
pub struct EnrollmentCoordinator {
    ledger: Arc<dyn LedgerClient>,
    admin: Credentials,
    config: CoordinatorConfig,
    state: Mutex<CacheState>,
}

struct CacheState {
    students: HashMap<String, Student>,
    courses: BTreeMap<String, Course>,
    chain: HashChain,
}

impl EnrollmentCoordinator {
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        admin: Credentials,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            ledger,
            admin,
            config,
            state: Mutex::new(CacheState {
                students: HashMap::new(),
                courses: BTreeMap::new(),
                chain: HashChain::new(),
            }),
        }
    }

    pub fn admin_address(&self) -> Address {
        self.admin.address()
    }

    // ---- Workflows ----

    /// Enroll a student in a course.
    ///
    /// Order: local prerequisite gate, live availability read, signed
    /// submission. The chain and cache change only after a success receipt.
    pub async fn enroll(
        &self,
        student_id: &str,
        course_code: &str,
        student_address: Address,
        signer_key: &str,
    ) -> Outcome {
        let mut state = self.state.lock().await;

        let missing = {
            let student = state.students.get(student_id);
            let course = state.courses.get(course_code);
            if PrerequisiteEngine::met(student, course) {
                None
            } else {
                Some(PrerequisiteEngine::missing(student, course))
            }
        };
        if let Some(missing) = missing {
            info!(student_id, course_code, ?missing, "prerequisites not met");
            return Outcome::PrerequisitesNotMet { missing };
        }

        match self.read_bounded(course_code).await {
            Ok(Some(view)) if view.is_active => {}
            Ok(_) => {
                info!(student_id, course_code, "course not available on ledger");
                return Outcome::CourseUnavailable {
                    course_code: course_code.to_string(),
                };
            }
            Err(e) => {
                warn!(course_code, error = %e, "course read failed");
                return Outcome::enrollment_error(e);
            }
        }

        let credentials = match Credentials::new(student_address, signer_key) {
            Ok(credentials) => credentials,
            Err(e) => return Outcome::enrollment_error(e),
        };

        let action = ContractAction::enroll(course_code);
        let receipt = match self.submit_bounded(&action, &credentials).await {
            Ok(receipt) => receipt,
            Err(e) => {
                warn!(student_id, course_code, error = %e, "enrollment submission failed");
                return Outcome::enrollment_error(e);
            }
        };
        if !receipt.is_success() {
            warn!(student_id, course_code, tx = %receipt.tx_hash, "enrollment reverted");
            return Outcome::EnrollmentFailed {
                reason: format!("transaction {} reverted", receipt.tx_hash),
            };
        }

        let record = EnrollmentRecord {
            student_id: student_id.to_string(),
            course_code: course_code.to_string(),
            transaction_hash: receipt.tx_hash.to_string(),
        };
        let block = state.chain.append(record.to_value());
        if let Some(student) = state.students.get_mut(student_id) {
            student.address.get_or_insert(student_address);
        }

        info!(
            student_id,
            course_code,
            tx = %receipt.tx_hash,
            block = block.index(),
            "student enrolled"
        );
        Outcome::Enrolled {
            course_code: course_code.to_string(),
            tx_hash: receipt.tx_hash,
        }
    }

    /// Register a course on the ledger, then cache it.
    ///
    /// The local duplicate check does not stop two processes from racing on
    /// the same name; the ledger's answer decides that case.
    pub async fn add_course(
        &self,
        name: &str,
        available_seats: u32,
        prerequisites: Vec<String>,
    ) -> Outcome {
        let mut state = self.state.lock().await;

        if state.courses.contains_key(name) {
            info!(name, "course already cached");
            return Outcome::CourseAlreadyExists {
                name: name.to_string(),
            };
        }

        debug!(
            name,
            available_seats,
            ?prerequisites,
            admin = %self.admin.address().short_hex(),
            "adding course"
        );
        let action = ContractAction::add_course(name, available_seats, prerequisites.clone());
        let receipt = match self.submit_bounded(&action, &self.admin).await {
            Ok(receipt) => receipt,
            Err(e) => {
                warn!(name, error = %e, "course submission failed");
                return Outcome::course_addition_error(e);
            }
        };
        if !receipt.is_success() {
            warn!(name, tx = %receipt.tx_hash, "course addition reverted");
            return Outcome::CourseAdditionFailed {
                reason: format!("transaction {} reverted", receipt.tx_hash),
            };
        }

        state.courses.insert(
            name.to_string(),
            Course::new(name, prerequisites, available_seats),
        );
        info!(name, tx = %receipt.tx_hash, "course added");
        Outcome::CourseAdded {
            name: name.to_string(),
            tx_hash: receipt.tx_hash,
        }
    }

    /// Start tracking a student. Returns `false` if the id is taken.
    pub async fn register_student(&self, student_id: &str, address: Option<Address>) -> bool {
        let mut state = self.state.lock().await;
        if state.students.contains_key(student_id) {
            return false;
        }
        state.students.insert(
            student_id.to_string(),
            Student::new(student_id).with_address(address),
        );
        debug!(student_id, "student registered");
        true
    }

    /// Mark a course completed for a known student. Local only.
    pub async fn complete_course(&self, student_id: &str, course_code: &str) -> bool {
        let mut state = self.state.lock().await;
        match state.students.get_mut(student_id) {
            Some(student) => {
                student.completed_courses.insert(course_code.to_string());
                debug!(student_id, course_code, "course completed");
                true
            }
            None => false,
        }
    }

    /// Live ledger view of every cached course.
    ///
    /// A course whose read fails or comes back empty is skipped; the rest are
    /// still returned.
    pub async fn get_all_courses(&self) -> Vec<CourseSummary> {
        let state = self.state.lock().await;
        let mut summaries = Vec::with_capacity(state.courses.len());

        for code in state.courses.keys() {
            match self.read_bounded(code).await {
                Ok(Some(view)) => summaries.push(CourseSummary {
                    name: code.clone(),
                    ..CourseSummary::from(view)
                }),
                Ok(None) => warn!(course_code = %code, "cached course missing on ledger; skipping"),
                Err(e) => warn!(course_code = %code, error = %e, "course read failed; skipping"),
            }
        }

        summaries
    }

    // ---- Cache reads ----

    pub async fn get_prerequisites(&self, course_code: &str) -> Option<Vec<String>> {
        let state = self.state.lock().await;
        state
            .courses
            .get(course_code)
            .map(|course| course.prerequisites.clone())
    }

    pub async fn check_prerequisites(&self, student_id: &str, course_code: &str) -> bool {
        let state = self.state.lock().await;
        PrerequisiteEngine::met(
            state.students.get(student_id),
            state.courses.get(course_code),
        )
    }

    pub async fn student(&self, student_id: &str) -> Option<Student> {
        self.state.lock().await.students.get(student_id).cloned()
    }

    pub async fn course(&self, course_code: &str) -> Option<Course> {
        self.state.lock().await.courses.get(course_code).cloned()
    }

    // ---- Audit chain ----

    pub async fn chain_blocks(&self) -> Vec<Block> {
        self.state.lock().await.chain.blocks().to_vec()
    }

    pub async fn chain_len(&self) -> usize {
        self.state.lock().await.chain.len()
    }

    pub async fn verify_chain(&self) -> CoreResult<()> {
        let state = self.state.lock().await;
        state.chain.verify_detailed()?;
        Ok(())
    }

    // ---- Ledger calls ----

    async fn read_bounded(&self, code: &str) -> Result<Option<LedgerCourseView>, LedgerError> {
        bounded(self.config.read_timeout(), self.ledger.read_course(code)).await
    }

    async fn submit_bounded(
        &self,
        action: &ContractAction,
        credentials: &Credentials,
    ) -> Result<Receipt, LedgerError> {
        bounded(self.config.submit_timeout(), self.ledger.submit(action, credentials)).await
    }
}

async fn bounded<T>(
    limit: Duration,
    call: impl std::future::Future<Output = Result<T, LedgerError>>,
) -> Result<T, LedgerError> {
    tokio::time::timeout(limit, call)
        .await
        .unwrap_or(Err(LedgerError::Timeout(limit)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use enroll_ledger::{ContractClient, InMemoryContract, LedgerConfig};
    use enroll_types::TxHash;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// How the fake ledger answers `submit`.
    #[derive(Clone)]
    enum SubmitMode {
        Succeed(&'static str),
        Revert,
        Fail(LedgerError),
        Hang,
    }

    /// Per-course fault injected into `read_course`.
    #[derive(Clone, Copy)]
    enum ReadFault {
        Fail,
        Hang,
    }

    struct FakeLedger {
        views: std::sync::Mutex<HashMap<String, LedgerCourseView>>,
        read_faults: std::sync::Mutex<HashMap<String, ReadFault>>,
        mode: std::sync::Mutex<SubmitMode>,
        reads: AtomicUsize,
        submits: AtomicUsize,
        delay: Duration,
        in_critical: AtomicUsize,
        overlaps: AtomicUsize,
        events: std::sync::Mutex<Vec<String>>,
    }

    impl FakeLedger {
        fn new(mode: SubmitMode) -> Self {
            Self {
                views: std::sync::Mutex::new(HashMap::new()),
                read_faults: std::sync::Mutex::new(HashMap::new()),
                mode: std::sync::Mutex::new(mode),
                reads: AtomicUsize::new(0),
                submits: AtomicUsize::new(0),
                delay: Duration::ZERO,
                in_critical: AtomicUsize::new(0),
                overlaps: AtomicUsize::new(0),
                events: std::sync::Mutex::new(Vec::new()),
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        fn set_view(&self, name: &str, prerequisites: &[&str], is_active: bool) {
            self.views.lock().unwrap().insert(
                name.to_string(),
                LedgerCourseView {
                    name: name.to_string(),
                    available_seats: 30,
                    prerequisites: prerequisites.iter().map(|p| p.to_string()).collect(),
                    is_active,
                },
            );
        }

        fn set_read_fault(&self, code: &str, fault: ReadFault) {
            self.read_faults.lock().unwrap().insert(code.to_string(), fault);
        }

        fn set_mode(&self, mode: SubmitMode) {
            *self.mode.lock().unwrap() = mode;
        }

        fn calls(&self) -> usize {
            self.reads.load(Ordering::SeqCst) + self.submits.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LedgerClient for FakeLedger {
        async fn read_course(&self, code: &str) -> Result<Option<LedgerCourseView>, LedgerError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            let fault = self.read_faults.lock().unwrap().get(code).copied();
            match fault {
                Some(ReadFault::Fail) => Err(LedgerError::Transport(format!("{code} read failed"))),
                Some(ReadFault::Hang) => std::future::pending().await,
                None => Ok(self.views.lock().unwrap().get(code).cloned()),
            }
        }

        async fn submit(
            &self,
            action: &ContractAction,
            _credentials: &Credentials,
        ) -> Result<Receipt, LedgerError> {
            let ticket = self.submits.fetch_add(1, Ordering::SeqCst);
            if self.in_critical.fetch_add(1, Ordering::SeqCst) != 0 {
                self.overlaps.fetch_add(1, Ordering::SeqCst);
            }
            self.events.lock().unwrap().push(format!("start:{ticket}"));
            tokio::time::sleep(self.delay).await;
            self.events.lock().unwrap().push(format!("end:{ticket}"));
            self.in_critical.fetch_sub(1, Ordering::SeqCst);

            let mode = self.mode.lock().unwrap().clone();
            match mode {
                SubmitMode::Succeed(tx) => Ok(Receipt::success(tx)),
                SubmitMode::Revert => Ok(Receipt::failure("0xdead")),
                SubmitMode::Fail(e) => Err(e),
                SubmitMode::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Err(LedgerError::Transport(format!("{action} never answered")))
                }
            }
        }
    }

    fn student_key() -> (Address, String) {
        let creds = Credentials::generate();
        (creds.address(), creds.secret_hex())
    }

    fn coordinator(ledger: Arc<FakeLedger>, config: CoordinatorConfig) -> EnrollmentCoordinator {
        EnrollmentCoordinator::new(ledger, Credentials::generate(), config)
    }

    /// Coordinator with S1 (completed CS101) and course CS201 requiring CS101.
    async fn scenario(completed: &[&str]) -> (Arc<FakeLedger>, EnrollmentCoordinator) {
        let ledger = Arc::new(FakeLedger::new(SubmitMode::Succeed("0xabc")));
        let coord = coordinator(ledger.clone(), CoordinatorConfig::default());

        assert!(coord.add_course("CS201", 30, vec!["CS101".into()]).await.is_success());
        ledger.set_view("CS201", &["CS101"], true);
        assert!(coord.register_student("S1", None).await);
        for code in completed {
            assert!(coord.complete_course("S1", code).await);
        }
        (ledger, coord)
    }

    #[tokio::test]
    async fn enrolled_scenario_appends_block() {
        let (_ledger, coord) = scenario(&["CS101"]).await;
        let before = coord.chain_len().await;
        let (address, key) = student_key();

        let outcome = coord.enroll("S1", "CS201", address, &key).await;

        assert_eq!(
            outcome,
            Outcome::Enrolled {
                course_code: "CS201".into(),
                tx_hash: TxHash::from("0xabc"),
            }
        );
        assert_eq!(coord.chain_len().await, before + 1);

        let blocks = coord.chain_blocks().await;
        let data = blocks.last().unwrap().data();
        assert_eq!(data["student_id"], "S1");
        assert_eq!(data["course_code"], "CS201");
        assert_eq!(data["transaction_hash"], "0xabc");
        coord.verify_chain().await.unwrap();

        assert_eq!(coord.student("S1").await.unwrap().address, Some(address));
    }

    #[tokio::test]
    async fn missing_prerequisite_makes_no_ledger_calls() {
        let (ledger, coord) = scenario(&[]).await;
        let calls_before = ledger.calls();
        let chain_before = coord.chain_len().await;
        let (address, key) = student_key();

        let outcome = coord.enroll("S1", "CS201", address, &key).await;

        assert_eq!(outcome, Outcome::PrerequisitesNotMet { missing: vec!["CS101".into()] });
        assert_eq!(ledger.calls(), calls_before);
        assert_eq!(coord.chain_len().await, chain_before);
    }

    #[tokio::test]
    async fn unknown_student_and_course_rejected_locally() {
        let (ledger, coord) = scenario(&["CS101"]).await;
        let calls_before = ledger.calls();
        let (address, key) = student_key();

        assert!(matches!(
            coord.enroll("S9", "CS201", address, &key).await,
            Outcome::PrerequisitesNotMet { .. }
        ));
        assert!(matches!(
            coord.enroll("S1", "CS999", address, &key).await,
            Outcome::PrerequisitesNotMet { .. }
        ));
        assert_eq!(ledger.calls(), calls_before);
    }

    #[tokio::test]
    async fn inactive_or_missing_course_is_unavailable() {
        let (ledger, coord) = scenario(&["CS101"]).await;
        let (address, key) = student_key();
        let submits_before = ledger.submits.load(Ordering::SeqCst);

        ledger.set_view("CS201", &["CS101"], false);
        assert_eq!(
            coord.enroll("S1", "CS201", address, &key).await,
            Outcome::CourseUnavailable { course_code: "CS201".into() }
        );

        ledger.views.lock().unwrap().clear();
        assert_eq!(coord.enroll("S1", "CS201", address, &key).await.name(), "course_unavailable");
        assert_eq!(ledger.submits.load(Ordering::SeqCst), submits_before);
    }

    #[tokio::test]
    async fn failure_receipt_leaves_state_untouched() {
        let (ledger, coord) = scenario(&["CS101"]).await;
        let (address, key) = student_key();
        let student_before = coord.student("S1").await;
        let chain_before = coord.chain_len().await;

        ledger.set_mode(SubmitMode::Revert);
        let outcome = coord.enroll("S1", "CS201", address, &key).await;
        assert!(matches!(outcome, Outcome::EnrollmentFailed { .. }));

        ledger.set_mode(SubmitMode::Fail(LedgerError::Transport("connection reset".into())));
        let outcome = coord.enroll("S1", "CS201", address, &key).await;
        assert_eq!(
            outcome,
            Outcome::EnrollmentFailed { reason: "transport error: connection reset".into() }
        );

        assert_eq!(coord.student("S1").await, student_before);
        assert_eq!(coord.chain_len().await, chain_before);
    }

    #[tokio::test]
    async fn malformed_signer_key_fails_without_submission() {
        let (ledger, coord) = scenario(&["CS101"]).await;
        let submits_before = ledger.submits.load(Ordering::SeqCst);
        let (address, _) = student_key();

        let outcome = coord.enroll("S1", "CS201", address, "zz").await;
        assert!(matches!(outcome, Outcome::EnrollmentFailed { .. }));
        assert_eq!(ledger.submits.load(Ordering::SeqCst), submits_before);
    }

    #[tokio::test]
    async fn hung_submission_times_out_and_releases_lock() {
        let ledger = Arc::new(FakeLedger::new(SubmitMode::Hang));
        let config = CoordinatorConfig {
            submit_timeout_ms: 30,
            ..Default::default()
        };
        let coord = coordinator(ledger.clone(), config);

        let outcome = coord.add_course("CS101", 10, vec![]).await;
        assert_eq!(outcome, Outcome::LedgerTimeout { after: Duration::from_millis(30) });
        assert!(coord.course("CS101").await.is_none());

        ledger.set_mode(SubmitMode::Succeed("0x01"));
        assert!(coord.add_course("CS101", 10, vec![]).await.is_success());
    }

    #[tokio::test]
    async fn duplicate_course_rejected_before_submission() {
        let ledger = Arc::new(FakeLedger::new(SubmitMode::Succeed("0x01")));
        let coord = coordinator(ledger.clone(), CoordinatorConfig::default());

        assert!(coord.add_course("CS101", 10, vec![]).await.is_success());
        assert_eq!(
            coord.add_course("CS101", 99, vec![]).await,
            Outcome::CourseAlreadyExists { name: "CS101".into() }
        );
        assert_eq!(ledger.submits.load(Ordering::SeqCst), 1);
        assert_eq!(coord.course("CS101").await.unwrap().available_slots, 10);
    }

    #[tokio::test]
    async fn failed_course_addition_is_not_cached() {
        let ledger = Arc::new(FakeLedger::new(SubmitMode::Revert));
        let coord = coordinator(ledger.clone(), CoordinatorConfig::default());

        assert!(matches!(
            coord.add_course("CS101", 10, vec![]).await,
            Outcome::CourseAdditionFailed { .. }
        ));
        assert!(coord.get_prerequisites("CS101").await.is_none());
    }

    #[tokio::test]
    async fn listing_skips_courses_missing_on_ledger() {
        let ledger = Arc::new(FakeLedger::new(SubmitMode::Succeed("0x01")));
        let coord = coordinator(ledger.clone(), CoordinatorConfig::default());
        for code in ["CS101", "CS102", "CS103"] {
            coord.add_course(code, 5, vec![]).await;
        }
        ledger.set_view("CS101", &[], true);
        ledger.set_view("CS103", &[], false);

        let listed = coord.get_all_courses().await;
        let names: Vec<_> = listed.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["CS101", "CS103"]);
        assert!(!listed[1].is_active);
    }

    #[tokio::test]
    async fn student_registry_and_completion() {
        let ledger = Arc::new(FakeLedger::new(SubmitMode::Succeed("0x01")));
        let coord = coordinator(ledger, CoordinatorConfig::default());

        assert!(!coord.complete_course("S1", "CS101").await);
        assert!(coord.register_student("S1", None).await);
        assert!(!coord.register_student("S1", None).await);
        assert!(coord.complete_course("S1", "CS101").await);
        assert!(coord.student("S1").await.unwrap().has_completed("CS101"));

        coord.add_course("CS201", 5, vec!["CS101".into()]).await;
        assert!(coord.check_prerequisites("S1", "CS201").await);
        assert_eq!(coord.get_prerequisites("CS201").await, Some(vec!["CS101".to_string()]));
    }

    #[tokio::test]
    async fn listing_survives_failed_and_hung_reads() {
        let ledger = Arc::new(FakeLedger::new(SubmitMode::Succeed("0x01")));
        let config = CoordinatorConfig {
            read_timeout_ms: 30,
            ..Default::default()
        };
        let coord = coordinator(ledger.clone(), config);
        for code in ["CS101", "CS102", "CS103"] {
            coord.add_course(code, 5, vec![]).await;
            ledger.set_view(code, &[], true);
        }
        ledger.set_read_fault("CS101", ReadFault::Fail);
        ledger.set_read_fault("CS102", ReadFault::Hang);

        let listed = coord.get_all_courses().await;
        let names: Vec<_> = listed.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["CS103"]);
    }

    #[tokio::test]
    async fn failed_availability_read_stops_enrollment() {
        let (ledger, coord) = scenario(&["CS101"]).await;
        let (address, key) = student_key();
        let submits_before = ledger.submits.load(Ordering::SeqCst);
        let chain_before = coord.chain_len().await;

        ledger.set_read_fault("CS201", ReadFault::Fail);
        assert_eq!(
            coord.enroll("S1", "CS201", address, &key).await,
            Outcome::EnrollmentFailed { reason: "transport error: CS201 read failed".into() }
        );
        assert_eq!(ledger.submits.load(Ordering::SeqCst), submits_before);
        assert_eq!(coord.chain_len().await, chain_before);
    }

    #[tokio::test]
    async fn hung_availability_read_times_out() {
        let ledger = Arc::new(FakeLedger::new(SubmitMode::Succeed("0x01")));
        let config = CoordinatorConfig {
            read_timeout_ms: 25,
            ..Default::default()
        };
        let coord = coordinator(ledger.clone(), config);
        coord.add_course("CS101", 5, vec![]).await;
        coord.register_student("S1", None).await;
        ledger.set_read_fault("CS101", ReadFault::Hang);
        let submits_before = ledger.submits.load(Ordering::SeqCst);
        let (address, key) = student_key();

        assert_eq!(
            coord.enroll("S1", "CS101", address, &key).await,
            Outcome::LedgerTimeout { after: Duration::from_millis(25) }
        );
        assert_eq!(ledger.submits.load(Ordering::SeqCst), submits_before);
        assert_eq!(coord.chain_len().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_enrollments_are_serialized() {
        let ledger = Arc::new(
            FakeLedger::new(SubmitMode::Succeed("0x01")).with_delay(Duration::from_millis(40)),
        );
        let coord = Arc::new(coordinator(ledger.clone(), CoordinatorConfig::default()));

        for i in 0..4 {
            let code = format!("CS{i}");
            coord.add_course(&code, 5, vec![]).await;
            ledger.set_view(&code, &[], true);
            coord.register_student(&format!("S{i}"), None).await;
        }
        ledger.events.lock().unwrap().clear();
        let submits_before = ledger.submits.load(Ordering::SeqCst);

        let mut handles = Vec::new();
        for i in 0..4 {
            let coord = coord.clone();
            handles.push(tokio::spawn(async move {
                let (address, key) = student_key();
                coord.enroll(&format!("S{i}"), &format!("CS{i}"), address, &key).await
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().is_success());
        }

        assert_eq!(ledger.overlaps.load(Ordering::SeqCst), 0);
        let events = ledger.events.lock().unwrap().clone();
        assert_eq!(events.len(), 8);
        for pair in events.chunks(2) {
            let start = pair[0].strip_prefix("start:").unwrap();
            let end = pair[1].strip_prefix("end:").unwrap();
            assert_eq!(start, end, "interleaved critical sections: {events:?}");
        }
        assert_eq!(ledger.submits.load(Ordering::SeqCst), submits_before + 4);
        assert_eq!(coord.chain_len().await, 5);
        coord.verify_chain().await.unwrap();
    }

    #[tokio::test]
    async fn end_to_end_against_in_memory_contract() {
        let admin = Credentials::generate();
        let contract = InMemoryContract::new(admin.address());
        let client = Arc::new(ContractClient::new(contract, LedgerConfig::default()));
        let coord = EnrollmentCoordinator::new(client.clone(), admin, CoordinatorConfig::default());

        assert!(coord.add_course("CS101", 2, vec![]).await.is_success());
        assert!(coord.add_course("CS201", 1, vec!["CS101".into()]).await.is_success());

        let alice = Credentials::generate();
        let bob = Credentials::generate();
        coord.register_student("alice", Some(alice.address())).await;
        coord.register_student("bob", None).await;

        let first = coord.enroll("alice", "CS101", alice.address(), &alice.secret_hex()).await;
        assert!(first.is_success());
        coord.complete_course("alice", "CS101").await;
        coord.complete_course("bob", "CS101").await;

        let second = coord.enroll("alice", "CS201", alice.address(), &alice.secret_hex()).await;
        assert!(second.is_success());
        // The single seat is gone, so the contract has closed the course.
        assert_eq!(
            coord.enroll("bob", "CS201", bob.address(), &bob.secret_hex()).await.name(),
            "course_unavailable"
        );

        // A key that does not own the claimed address is refused by the ledger.
        let forged = coord.enroll("bob", "CS101", alice.address(), &bob.secret_hex()).await;
        assert!(matches!(forged, Outcome::EnrollmentFailed { .. }));

        assert_eq!(coord.chain_len().await, 3);
        coord.verify_chain().await.unwrap();
        assert!(client.transport().is_enrolled("CS201", &alice.address()).unwrap());

        let listed = coord.get_all_courses().await;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[1].available_seats, 0);

        // Closing a course on the ledger is seen on the next enrollment even
        // though the cache still lists it.
        assert!(client.transport().set_course_active("CS101", false).unwrap());
        let outcome = coord.enroll("bob", "CS101", bob.address(), &bob.secret_hex()).await;
        assert_eq!(outcome, Outcome::CourseUnavailable { course_code: "CS101".into() });
        assert!(coord.course("CS101").await.is_some());
        assert_eq!(coord.chain_len().await, 3);
    }
}
