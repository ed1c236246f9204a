mod common;

use common::{item, items, normal_response, MockBackend};
use neuroscan_client::{AppError, BatchOrchestrator, Config, ErrorKind, Session};
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

fn session(backend: MockBackend) -> Session<MockBackend> {
    Session::with_orchestrator(
        backend,
        BatchOrchestrator::with_timing(Duration::from_secs(120), Duration::from_millis(500)),
    )
}

#[tokio::test(start_paused = true)]
async fn second_submission_is_rejected_while_busy() {
    let session = session(MockBackend::new().respond("a.nii", 1_000, normal_response()));
    let batch = items(&["a.nii", "b.nii"]);

    let (report, rejected) = futures::join!(session.run_batch(&batch), async {
        assert!(session.is_busy());
        session.run_single(item("c.nii", 0)).await
    });

    assert_eq!(assert_ok!(report).processed(), 2);
    assert!(matches!(rejected, Err(AppError::SubmissionInProgress)));
    assert!(!session.is_busy());

    // 释放后可以再次提交
    let result = assert_ok!(session.run_single(item("c.nii", 0)).await);
    assert_eq!(result.predicted_class, "Normal");
}

#[tokio::test]
async fn gate_is_released_after_failure() {
    let session = session(MockBackend::new().refuse_connect());

    let err = assert_err!(session.run_batch(&items(&["a.nii"])).await);
    match err {
        AppError::Inference(e) => assert_eq!(e.kind(), ErrorKind::Connectivity),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!session.is_busy());
    assert!(session.batch().progress().is_idle());
}

#[tokio::test]
async fn compare_through_session() {
    let session = Session::new(
        MockBackend::new().fail("b.nii", ErrorKind::RouteNotFound),
        &Config::default(),
    );

    let outcome = assert_ok!(session.run_compare(item("a.nii", 0), item("b.nii", 1)).await);

    assert!(outcome.scan_a.is_ok());
    assert_eq!(
        outcome.scan_b.as_ref().unwrap_err().kind,
        ErrorKind::RouteNotFound
    );
}
