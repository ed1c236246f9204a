mod common;

use common::{aneurysm_response, item, normal_response, MockBackend};
use neuroscan_client::workflow::SingleState;
use neuroscan_client::{CompareFlow, ErrorKind, FlowError, Side, SingleFlow};
use serde_json::json;
use std::time::Duration;
use tokio::time::Instant;
use tokio_test::{assert_err, assert_ok};

#[tokio::test]
async fn single_flow_renders_percentages() {
    let backend = MockBackend::new().respond(
        "scan.nii.gz",
        0,
        json!({
            "predictions": [["Aneurysm", 0.8], ["Normal", 0.2]],
            "predicted_class": "Aneurysm",
            "confidence": 0.8
        }),
    );
    let mut flow = SingleFlow::new();
    flow.select(item("scan.nii.gz", 0));

    let result = assert_ok!(flow.submit(&backend).await).clone();

    assert_eq!(result.percent_of("Aneurysm"), 80);
    assert_eq!(result.percent_of("Normal"), 20);
    assert_eq!(flow.state(), SingleState::Succeeded);
    assert!(!flow.is_loading());
    assert_eq!(flow.result(), Some(&result));
}

#[tokio::test]
async fn single_flow_failure_returns_to_idle() {
    let cases = [
        (ErrorKind::Connectivity, "Connection Failed."),
        (ErrorKind::RouteNotFound, "Model endpoint not found."),
        (ErrorKind::MalformedResponse, "Processing Error:"),
        (ErrorKind::Unknown, "Model Error: scanner exploded"),
    ];

    for (kind, prefix) in cases {
        let backend = MockBackend::new().fail("scan.nii", kind);
        let mut flow = SingleFlow::new();
        flow.select(item("scan.nii", 0));

        match assert_err!(flow.submit(&backend).await) {
            FlowError::Failed(failure) => {
                assert_eq!(failure.kind, kind);
                assert!(failure.message.starts_with(prefix), "{}", failure.message);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(flow.state(), SingleState::Idle);
        assert!(flow.result().is_none());
        assert_eq!(flow.last_failure().map(|f| f.kind), Some(kind));
    }
}

#[tokio::test]
async fn resubmit_clears_previous_result() {
    let mut flow = SingleFlow::new();
    flow.select(item("scan.nii", 0));
    assert_ok!(flow.submit(&MockBackend::new()).await);
    assert!(flow.result().is_some());

    let failing = MockBackend::new().fail("scan.nii", ErrorKind::Unknown);
    assert_err!(flow.submit(&failing).await);
    assert!(flow.result().is_none());
}

#[tokio::test]
async fn nothing_selected_is_rejected_without_calls() {
    let backend = MockBackend::new();

    let mut single = SingleFlow::new();
    assert_eq!(
        assert_err!(single.submit(&backend).await),
        FlowError::NothingSelected
    );

    let mut compare = CompareFlow::new();
    compare.select(Side::A, item("a.nii", 0));
    assert_eq!(
        assert_err!(compare.submit(&backend).await),
        FlowError::NothingSelected
    );
    assert!(backend.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn compare_sides_run_concurrently() {
    let backend = MockBackend::new()
        .respond("a.nii", 200, normal_response())
        .respond("b.nii", 200, aneurysm_response());
    let mut flow = CompareFlow::new();
    flow.select(Side::A, item("a.nii", 0));
    flow.select(Side::B, item("b.nii", 1));

    let started = Instant::now();
    let outcome = assert_ok!(flow.submit(&backend).await).clone();

    assert_eq!(Instant::now() - started, Duration::from_millis(200));
    let calls = backend.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].started, calls[1].started);

    assert!(outcome.both_succeeded());
    assert_eq!(outcome.result(Side::A).unwrap().predicted_class, "Normal");
    assert_eq!(outcome.result(Side::B).unwrap().predicted_class, "Aneurysm");
    assert!(!flow.is_loading());
}

#[tokio::test(start_paused = true)]
async fn compare_failure_on_one_side_leaves_other_intact() {
    let backend = MockBackend::new()
        .fail("a.nii", ErrorKind::Connectivity)
        .respond("b.nii", 300, aneurysm_response());
    let mut flow = CompareFlow::new();
    flow.select(Side::A, item("a.nii", 0));
    flow.select(Side::B, item("b.nii", 1));

    let outcome = assert_ok!(flow.submit(&backend).await).clone();

    let failure = outcome.side(Side::A).as_ref().unwrap_err();
    assert_eq!(failure.kind, ErrorKind::Connectivity);
    assert!(outcome.result(Side::A).is_none());

    let b = outcome.result(Side::B).unwrap();
    assert_eq!(b.percent_of("Aneurysm"), 80);
    assert!(!outcome.both_succeeded());
    assert_eq!(flow.outcome(), Some(&outcome));

    // B 的调用确实完成了
    assert!(backend.calls().iter().all(|c| c.settled.is_some()));
}
