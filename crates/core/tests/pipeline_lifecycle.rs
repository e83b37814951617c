//! Pipeline lifecycle integration tests.
//!
//! These tests drive the scanner, dispatcher and batch runner together
//! against an on-disk SQLite database with mock services:
//! - Auto-enqueue idempotency
//! - Job state transitions (pending -> processing -> complete | error)
//! - Content status and final audio bookkeeping
//! - Batch cap and idle behaviour

use std::sync::Arc;

use tempfile::TempDir;

use meditone_core::{
    testing::{fixtures, MockGenerator, MockMixer},
    AutoEnqueueScanner, BatchRunner, ContentStatus, ContentStore, DispatchOutcome,
    DispatcherConfig, GenerationError, JobDispatcher, JobFilter, JobStatus, JobStore,
    SqliteContentStore, SqliteJobStore, StopReason,
};

/// Test helper wiring the pipeline to on-disk stores and mocks.
struct TestHarness {
    scanner: AutoEnqueueScanner,
    dispatcher: Arc<JobDispatcher>,
    generator: MockGenerator,
    mixer: MockMixer,
    jobs: Arc<SqliteJobStore>,
    content: Arc<SqliteContentStore>,
    _temp_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let jobs = Arc::new(SqliteJobStore::new(&db_path).expect("Failed to create job store"));
        let content =
            Arc::new(SqliteContentStore::new(&db_path).expect("Failed to create content store"));
        let generator = MockGenerator::new();
        let mixer = MockMixer::new();

        let dispatcher = Arc::new(JobDispatcher::new(
            DispatcherConfig::default(),
            Arc::clone(&jobs) as Arc<dyn JobStore>,
            Arc::clone(&content) as Arc<dyn ContentStore>,
            Arc::new(generator.clone()),
            Arc::new(mixer.clone()),
        ));
        let scanner = AutoEnqueueScanner::new(jobs.clone(), content.clone(), 100);

        Self {
            scanner,
            dispatcher,
            generator,
            mixer,
            jobs,
            content,
            _temp_dir: temp_dir,
        }
    }

    fn batch_runner(&self, cap: usize) -> BatchRunner {
        BatchRunner::new(
            Arc::clone(&self.dispatcher),
            Some(self.scanner.clone()),
            cap,
        )
    }

    fn jobs_for(&self, content_id: &str) -> Vec<meditone_core::Job> {
        self.jobs
            .list(&JobFilter::new().with_content_id(content_id))
            .unwrap()
    }

    fn count(&self, status: JobStatus) -> i64 {
        self.jobs
            .count(&JobFilter::new().with_status(status))
            .unwrap()
    }
}

#[tokio::test]
async fn test_scan_creates_exactly_one_job() {
    let h = TestHarness::new();
    fixtures::pending_content(h.content.as_ref(), "c1");

    h.scanner.scan().unwrap();
    let jobs = h.jobs_for("c1");
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].status, JobStatus::Pending);

    h.scanner.scan().unwrap();
    assert_eq!(h.jobs_for("c1").len(), 1);
}

#[tokio::test]
async fn test_scan_is_idempotent_over_many_items() {
    let h = TestHarness::new();
    let items = fixtures::pending_content_batch(h.content.as_ref(), "c", 8);

    for _ in 0..3 {
        h.scanner.scan().unwrap();
    }

    for item in &items {
        assert_eq!(h.jobs_for(&item.id).len(), 1, "content {}", item.id);
    }
}

#[tokio::test]
async fn test_successful_job_marks_content_ready() {
    let h = TestHarness::new();
    fixtures::pending_content(h.content.as_ref(), "c1");
    h.scanner.scan().unwrap();

    let outcome = h.dispatcher.process_next().await.unwrap();
    assert!(matches!(outcome, DispatchOutcome::Completed { .. }));

    let job = &h.jobs_for("c1")[0];
    assert_eq!(job.status, JobStatus::Complete);
    assert!(job.error.is_none());

    let item = h.content.get("c1").unwrap().unwrap();
    assert_eq!(item.status, ContentStatus::Ready);
    let final_audio = item.final_audio.expect("final audio set");
    assert!(!final_audio.as_str().is_empty());

    assert_eq!(h.generator.recorded_scripts().await, vec![item.script]);
    assert_eq!(h.mixer.call_count().await, 1);
}

#[tokio::test]
async fn test_generation_failure_marks_both_error() {
    let h = TestHarness::new();
    fixtures::pending_content(h.content.as_ref(), "c1");
    h.scanner.scan().unwrap();
    h.generator
        .set_next_error(GenerationError::Api {
            status: 400,
            message: "unsupported voice".to_string(),
        })
        .await;

    let outcome = h.dispatcher.process_next().await.unwrap();
    assert!(matches!(outcome, DispatchOutcome::Failed { .. }));

    let job = &h.jobs_for("c1")[0];
    assert_eq!(job.status, JobStatus::Error);
    assert!(job.error.as_deref().unwrap().contains("unsupported voice"));

    let item = h.content.get("c1").unwrap().unwrap();
    assert_eq!(item.status, ContentStatus::Error);
    assert!(item.final_audio.is_none());
}

#[tokio::test]
async fn test_batch_cap_leaves_remainder_pending() {
    let h = TestHarness::new();
    fixtures::pending_content_batch(h.content.as_ref(), "c", 15);
    // A failed job still counts toward the cap.
    h.generator.set_next_error(GenerationError::EmptyAudio).await;

    let report = h.batch_runner(10).run_once().await;

    assert_eq!(report.processed, 10);
    assert_eq!(report.stop, StopReason::CapReached);
    assert_eq!(h.count(JobStatus::Complete) + h.count(JobStatus::Error), 10);
    assert_eq!(h.count(JobStatus::Error), 1);
    assert_eq!(h.count(JobStatus::Pending), 5);
    assert_eq!(h.count(JobStatus::Processing), 0);
}

#[tokio::test]
async fn test_second_batch_drains_queue() {
    let h = TestHarness::new();
    fixtures::pending_content_batch(h.content.as_ref(), "c", 15);
    let runner = h.batch_runner(10);

    runner.run_once().await;
    let report = runner.run_once().await;

    assert_eq!(report.processed, 5);
    assert_eq!(report.stop, StopReason::Idle);
    assert_eq!(report.scan.unwrap().enqueued, 0);
    assert_eq!(h.count(JobStatus::Complete), 15);
}

#[tokio::test]
async fn test_idle_touches_nothing() {
    let h = TestHarness::new();
    let before = fixtures::pending_content(h.content.as_ref(), "c1");

    let outcome = h.dispatcher.process_next().await.unwrap();

    assert_eq!(outcome, DispatchOutcome::Idle);
    assert_eq!(h.content.get("c1").unwrap().unwrap(), before);
    assert_eq!(h.jobs.count(&JobFilter::new()).unwrap(), 0);
    assert_eq!(h.generator.call_count().await, 0);
}

#[tokio::test]
async fn test_ready_content_always_has_audio() {
    let h = TestHarness::new();
    fixtures::pending_content_batch(h.content.as_ref(), "c", 6);
    h.mixer.set_always_fail(Some("corrupt input")).await;
    let runner = h.batch_runner(3);
    runner.run_once().await;
    h.mixer.set_always_fail(None).await;
    runner.run_once().await;

    let items = h
        .content
        .list(&meditone_core::ContentFilter::new())
        .unwrap();
    assert_eq!(items.len(), 6);
    for item in items {
        match item.status {
            ContentStatus::Ready => assert!(item.final_audio.is_some()),
            ContentStatus::Error => assert!(item.final_audio.is_none()),
            other => panic!("content {} left in {}", item.id, other),
        }
    }
}

#[tokio::test]
async fn test_failed_content_is_not_rescanned() {
    let h = TestHarness::new();
    fixtures::pending_content(h.content.as_ref(), "c1");
    h.generator.set_always_fail(Some("offline")).await;

    h.batch_runner(10).run_once().await;
    let report = h.batch_runner(10).run_once().await;

    assert_eq!(report.scan.unwrap().examined, 0);
    assert_eq!(h.jobs_for("c1").len(), 1);
}
