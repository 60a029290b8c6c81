use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use jobgate_cli::api::{ApiState, router};
use jobgate_core::app::{App, AppBuilder, AutoTriggerFilter};
use jobgate_core::client::RetryPolicy;
use jobgate_core::domain::{
    Binding, OutboundMessage, ProcessFile, RunId, Task, TaskParameter, TaskStatus, Timestamp,
};
use jobgate_core::impls::{InMemoryInterruption, InMemoryTaskState, RecordingPublisher};
use jobgate_core::ports::SystemClock;
use rstest::rstest;
use tokio::sync::mpsc;
use tower::ServiceExt;

struct Fixture {
    app: App,
    state: Arc<InMemoryTaskState>,
    publisher: RecordingPublisher,
}

fn fixture() -> Fixture {
    let state = Arc::new(InMemoryTaskState::new());
    let publisher = RecordingPublisher::new();
    let app = AppBuilder::new()
        .task_state(state.clone())
        .interruption(Arc::new(InMemoryInterruption::acknowledging()))
        .publisher(Arc::new(publisher.clone()))
        .clock(Arc::new(SystemClock))
        .retry(RetryPolicy::immediate(1))
        .auto_filter(AutoTriggerFilter::new(["CRAC"]))
        .build()
        .unwrap();
    Fixture {
        app,
        state,
        publisher,
    }
}

fn ts() -> Timestamp {
    "2024-09-13T09:30Z".parse().unwrap()
}

fn post(uri: &str, body: Body) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .unwrap()
}

#[tokio::test]
async fn start_launches_existing_task() {
    let f = fixture();
    f.state.insert(Task::new(ts(), TaskStatus::Ready));

    let response = router(ApiState::new(&f.app, None))
        .oneshot(post("/start/2024-09-13T09:30Z", Body::empty()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(f.publisher.on(Binding::RunTask).len(), 1);
}

#[tokio::test]
async fn start_applies_parameter_overrides() {
    let f = fixture();
    f.state.insert(Task::new(ts(), TaskStatus::Success));
    let body = serde_json::to_vec(&vec![TaskParameter::new("loopflow", "false")]).unwrap();

    let response = router(ApiState::new(&f.app, None))
        .oneshot(post("/start/2024-09-13T09:30Z", Body::from(body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let sent = f.publisher.on(Binding::RunTask);
    let OutboundMessage::RunRequest(task) = &sent[0] else {
        panic!("expected a run request, got {sent:?}");
    };
    assert_eq!(task.parameters[0].id, "loopflow");
    assert_eq!(task.parameters[0].value.as_deref(), Some("false"));
}

#[tokio::test]
async fn start_on_ineligible_task_is_still_ok() {
    let f = fixture();
    f.state.insert(Task::new(ts(), TaskStatus::Running));

    let response = router(ApiState::new(&f.app, None))
        .oneshot(post("/start/2024-09-13T09:30Z", Body::empty()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(f.publisher.count(), 0);
}

#[tokio::test]
async fn start_unknown_timestamp_is_404() {
    let f = fixture();

    let response = router(ApiState::new(&f.app, None))
        .oneshot(post("/start/2024-09-13T09:30Z", Body::empty()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(f.publisher.count(), 0);
}

#[rstest]
#[case("/start/yesterday", "")]
#[case("/start/2024-09-13T09:30Z", "{not json")]
#[case("/start/2024-09-13T09:30Z", "{\"id\": \"single object\"}")]
#[case("/stop/yesterday/1fdda469-53e9-4d63-a533-b935cffdd2f6", "")]
#[case("/stop/2024-09-13T09:30Z/not-a-run-id", "")]
#[tokio::test]
async fn malformed_requests_are_400(#[case] uri: &str, #[case] body: &'static str) {
    let f = fixture();
    f.state.insert(Task::new(ts(), TaskStatus::Ready));

    let response = router(ApiState::new(&f.app, None))
        .oneshot(post(uri, Body::from(body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(f.publisher.count(), 0);
}

#[tokio::test]
async fn malformed_timestamp_explains_expected_format() {
    let f = fixture();

    let response = router(ApiState::new(&f.app, None))
        .oneshot(post("/start/yesterday", Body::empty()))
        .await
        .unwrap();

    let body = to_bytes(response.into_body(), 4096).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("RFC 3339"), "{text}");
}

#[tokio::test]
async fn stop_interrupts_running_task() {
    let f = fixture();
    let task = Task::new(ts(), TaskStatus::Running);
    f.state.insert(task.clone());
    let run_id = RunId::random();

    let response = router(ApiState::new(&f.app, None))
        .oneshot(post(
            &format!("/stop/2024-09-13T09:30Z/{run_id}"),
            Body::empty(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        f.publisher.on(Binding::StopTask),
        vec![OutboundMessage::Stop(task.id)]
    );
    assert_eq!(f.state.status_of(&ts()), Some(TaskStatus::Stopping));
}

#[tokio::test]
async fn stop_unknown_timestamp_is_404() {
    let f = fixture();

    let response = router(ApiState::new(&f.app, None))
        .oneshot(post(
            &format!("/stop/2024-09-13T09:30Z/{}", RunId::random()),
            Body::empty(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn task_updates_are_queued_when_auto_is_enabled() {
    let f = fixture();
    let (tx, mut rx) = mpsc::channel(4);
    let task = Task::new(ts(), TaskStatus::Ready)
        .with_inputs(vec![ProcessFile::new("CRAC", "crac.json")]);

    let response = router(ApiState::new(&f.app, Some(tx)))
        .oneshot(post(
            "/events/task-updated",
            Body::from(serde_json::to_vec(&task).unwrap()),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(rx.recv().await.unwrap(), task);
}

#[tokio::test]
async fn task_update_route_is_absent_when_auto_is_disabled() {
    let f = fixture();
    let task = Task::new(ts(), TaskStatus::Ready);

    let response = router(ApiState::new(&f.app, None))
        .oneshot(post(
            "/events/task-updated",
            Body::from(serde_json::to_vec(&task).unwrap()),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
