// src/api.rs

//! HTTP surface.
//!
//! - `POST /start/{timestamp}`: body is an optional JSON list of parameter
//!   overrides. 200 when the task exists, 404 when it does not, 400 when the
//!   timestamp or body is malformed.
//! - `POST /stop/{timestamp}/{run_id}`: same contract.
//! - `POST /events/task-updated`: a task as published by the task-manager;
//!   queued for the auto-trigger consumer (mounted only when `[auto]` is enabled).

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use jobgate_core::app::{App, LaunchCoordinator, StopCoordinator};
use jobgate_core::domain::{Binding, RequestOutcome, RunId, Task, TaskParameter, Timestamp};

use crate::logging::sanitize;

#[derive(Clone)]
pub struct ApiState {
    launcher: LaunchCoordinator,
    stopper: StopCoordinator,
    task_updates: Option<mpsc::Sender<Task>>,
}

impl ApiState {
    /// `task_updates` is the inbound side of the auto-trigger consumer, if enabled.
    pub fn new(app: &App, task_updates: Option<mpsc::Sender<Task>>) -> Self {
        Self {
            launcher: app.launcher.clone(),
            stopper: app.stopper.clone(),
            task_updates,
        }
    }
}

pub fn router(state: ApiState) -> Router {
    let mut router = Router::new()
        .route("/start/{timestamp}", post(start))
        .route("/stop/{timestamp}/{run_id}", post(stop));
    if state.task_updates.is_some() {
        router = router.route("/events/task-updated", post(task_updated));
    }
    router.layer(TraceLayer::new_for_http()).with_state(state)
}

fn bad_request(message: String) -> Response {
    (StatusCode::BAD_REQUEST, message).into_response()
}

fn to_response(outcome: RequestOutcome) -> Response {
    match outcome {
        RequestOutcome::Accepted => StatusCode::OK.into_response(),
        RequestOutcome::NotFound => StatusCode::NOT_FOUND.into_response(),
    }
}

fn parse_timestamp(raw: &str) -> Result<Timestamp, Response> {
    raw.parse().map_err(|e| {
        warn!(timestamp = %sanitize(raw), "rejected request: malformed timestamp");
        bad_request(format!("{e}"))
    })
}

fn parse_overrides(body: &[u8]) -> Result<Vec<TaskParameter>, Response> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    serde_json::from_slice(body).map_err(|e| {
        warn!(error = %e, "rejected request: malformed parameter list");
        bad_request(format!("invalid parameter list: {e}"))
    })
}

async fn start(
    State(state): State<ApiState>,
    Path(raw_timestamp): Path<String>,
    body: Bytes,
) -> Response {
    info!(timestamp = %sanitize(&raw_timestamp), "received request to launch task");
    let timestamp = match parse_timestamp(&raw_timestamp) {
        Ok(ts) => ts,
        Err(resp) => return resp,
    };
    let overrides = match parse_overrides(&body) {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    let outcome = state
        .launcher
        .launch(&timestamp, &overrides, Binding::RunTask)
        .await;
    to_response(outcome)
}

async fn stop(
    State(state): State<ApiState>,
    Path((raw_timestamp, raw_run_id)): Path<(String, String)>,
) -> Response {
    info!(
        timestamp = %sanitize(&raw_timestamp),
        run_id = %sanitize(&raw_run_id),
        "received request to stop task"
    );
    let timestamp = match parse_timestamp(&raw_timestamp) {
        Ok(ts) => ts,
        Err(resp) => return resp,
    };
    let run_id: RunId = match raw_run_id.parse() {
        Ok(id) => id,
        Err(e) => return bad_request(format!("{e}")),
    };

    to_response(state.stopper.stop(&timestamp, run_id).await)
}

async fn task_updated(State(state): State<ApiState>, Json(task): Json<Task>) -> StatusCode {
    let Some(sender) = state.task_updates else {
        return StatusCode::NOT_FOUND;
    };
    match sender.send(task).await {
        Ok(()) => StatusCode::ACCEPTED,
        Err(_) => {
            warn!("task update dropped: auto-trigger consumer is not running");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
