use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use jobgate_core::domain::{
    Binding, OutboundMessage, ProcessFile, ProcessRun, RunId, Task, TaskId, TaskStatus, Timestamp,
    UpstreamError,
};
use jobgate_core::ports::{InterruptionApi, Publisher, TaskStateApi};
use jobgate_http::{HttpInterruptionApi, HttpPublisher, HttpTaskStateApi};
use serde_json::Value;

#[derive(Clone, Default)]
struct Upstream {
    task: Arc<Mutex<Option<Task>>>,
    interrupts: Arc<Mutex<Vec<(String, String)>>>,
    bus: Arc<Mutex<Vec<(String, Value)>>>,
}

async fn get_task(State(up): State<Upstream>, Path(ts): Path<String>) -> Result<Json<Task>, StatusCode> {
    let task = up.task.lock().unwrap().clone();
    match task {
        Some(task) if task.timestamp.to_string() == ts => Ok(Json(task)),
        _ => Err(StatusCode::NOT_FOUND),
    }
}

async fn by_date(State(up): State<Upstream>, Path(date): Path<String>) -> Json<Vec<Task>> {
    let task = up.task.lock().unwrap().clone();
    Json(
        task.into_iter()
            .filter(|t| t.timestamp.as_datetime().date_naive().to_string() == date)
            .collect(),
    )
}

async fn run_history(
    State(up): State<Upstream>,
    Path(_ts): Path<String>,
    Json(inputs): Json<Vec<ProcessFile>>,
) -> Json<Task> {
    let mut guard = up.task.lock().unwrap();
    let task = guard.as_mut().unwrap();
    task.run_history.push(ProcessRun::new(inputs));
    Json(task.clone())
}

async fn status(
    State(up): State<Upstream>,
    Path(_ts): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Task>, StatusCode> {
    let status: TaskStatus = serde_json::from_value(Value::String(query["status"].clone()))
        .map_err(|_| StatusCode::BAD_REQUEST)?;
    let mut guard = up.task.lock().unwrap();
    let task = guard.as_mut().unwrap();
    task.status = status;
    Ok(Json(task.clone()))
}

async fn interrupt(
    State(up): State<Upstream>,
    Path(task_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<bool> {
    up.interrupts
        .lock()
        .unwrap()
        .push((task_id, query["runId"].clone()));
    Json(true)
}

async fn publish(State(up): State<Upstream>, Path(binding): Path<String>, Json(body): Json<Value>) {
    up.bus.lock().unwrap().push((binding, body));
}

async fn empty() -> StatusCode {
    StatusCode::OK
}

async fn serve(upstream: Upstream) -> SocketAddr {
    let app = Router::new()
        .route("/tasks/{ts}", get(get_task))
        .route("/tasks/businessdate/{date}", get(by_date))
        .route("/tasks/{ts}/runHistory", put(run_history))
        .route("/tasks/{ts}/status", put(status))
        .route("/interrupt/{task_id}", put(interrupt))
        .route("/bus/{binding}", post(publish))
        .route("/empty/{ts}", get(empty))
        .with_state(upstream);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    addr
}

fn ts() -> Timestamp {
    "2024-09-13T09:30Z".parse().unwrap()
}

fn client() -> reqwest::Client {
    jobgate_http::client(Duration::from_secs(5)).unwrap()
}

async fn task_api() -> (Upstream, HttpTaskStateApi) {
    let upstream = Upstream::default();
    *upstream.task.lock().unwrap() = Some(
        Task::new(ts(), TaskStatus::Ready).with_inputs(vec![ProcessFile::new("CGM", "cgm.uct")]),
    );
    let addr = serve(upstream.clone()).await;
    let api = HttpTaskStateApi::new(
        client(),
        &format!("http://{addr}/tasks/"),
        &format!("http://{addr}/tasks/businessdate/"),
    )
    .unwrap();
    (upstream, api)
}

#[tokio::test]
async fn fetches_task_by_timestamp() {
    let (_up, api) = task_api().await;

    let task = api.fetch_task(&ts()).await.unwrap();

    assert_eq!(task.timestamp, ts());
    assert_eq!(task.status, TaskStatus::Ready);
}

#[tokio::test]
async fn unknown_timestamp_is_a_404() {
    let (_up, api) = task_api().await;
    let other: Timestamp = "2030-01-01T00:00Z".parse().unwrap();

    let err = api.fetch_task(&other).await.unwrap_err();

    assert_eq!(err, UpstreamError::UnexpectedStatus(404));
}

#[tokio::test]
async fn fetches_tasks_for_business_date() {
    let (_up, api) = task_api().await;
    let date = chrono::NaiveDate::from_ymd_opt(2024, 9, 13).unwrap();

    let tasks = api.fetch_tasks_for_business_date(date).await.unwrap();

    assert_eq!(tasks.len(), 1);
}

#[tokio::test]
async fn append_run_sends_inputs() {
    let (_up, api) = task_api().await;
    let inputs = vec![ProcessFile::new("CGM", "cgm.uct")];

    let task = api.append_run(&ts(), &inputs).await.unwrap();

    assert_eq!(task.run_history.len(), 1);
    assert_eq!(task.run_history[0].inputs, inputs);
}

#[tokio::test]
async fn update_status_passes_status_as_query() {
    let (up, api) = task_api().await;

    let task = api.update_status(&ts(), TaskStatus::Pending).await.unwrap();

    assert_eq!(task.status, TaskStatus::Pending);
    assert_eq!(
        up.task.lock().unwrap().as_ref().unwrap().status,
        TaskStatus::Pending
    );
}

#[tokio::test]
async fn empty_body_is_an_error() {
    let addr = serve(Upstream::default()).await;
    let api = HttpTaskStateApi::new(
        client(),
        &format!("http://{addr}/empty/"),
        &format!("http://{addr}/empty/"),
    )
    .unwrap();

    let err = api.fetch_task(&ts()).await.unwrap_err();

    assert_eq!(err, UpstreamError::EmptyBody);
}

#[tokio::test]
async fn connection_refused_is_a_transport_error() {
    let api = HttpTaskStateApi::new(
        client(),
        "http://127.0.0.1:9/tasks/",
        "http://127.0.0.1:9/tasks/businessdate/",
    )
    .unwrap();

    let err = api.fetch_task(&ts()).await.unwrap_err();

    assert!(matches!(err, UpstreamError::Transport(_)), "{err:?}");
}

#[tokio::test]
async fn interrupt_sends_task_and_run_ids() {
    let up = Upstream::default();
    let addr = serve(up.clone()).await;
    let api = HttpInterruptionApi::new(client(), &format!("http://{addr}/interrupt/")).unwrap();
    let (run_id, task_id) = (RunId::random(), TaskId::random());

    let ack = api.interrupt_run(run_id, task_id).await.unwrap();

    assert!(ack);
    assert_eq!(
        *up.interrupts.lock().unwrap(),
        vec![(task_id.to_string(), run_id.to_string())]
    );
}

#[tokio::test]
async fn publisher_posts_to_binding() {
    let up = Upstream::default();
    let addr = serve(up.clone()).await;
    let publisher = HttpPublisher::new(client(), &format!("http://{addr}/bus/")).unwrap();
    let task_id = TaskId::random();

    publisher.publish(Binding::StopTask, OutboundMessage::Stop(task_id));

    let mut received = Vec::new();
    for _ in 0..100 {
        received = up.bus.lock().unwrap().clone();
        if !received.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(
        received,
        vec![("stop-task".to_string(), Value::String(task_id.to_string()))]
    );
}
