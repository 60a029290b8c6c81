//! Task model as served by the task-manager.
//!
//! These are transient copies: the launcher fetches a fresh `Task` for every
//! operation and never persists it. Field names follow the task-manager's JSON
//! (camelCase); unknown fields are ignored and list fields default to empty so
//! that partially populated payloads still decode.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{RunId, TaskId};
use super::timestamp::Timestamp;

/// Task lifecycle as seen by the task-manager.
///
/// The launcher only ever requests two transitions: launchable statuses to
/// `PENDING`, and stoppable statuses to `STOPPING`. Everything else is driven
/// by the compute worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    NotCreated,
    Created,
    Ready,
    Pending,
    Running,
    Success,
    Error,
    Stopping,
    Interrupted,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 9] = [
        TaskStatus::NotCreated,
        TaskStatus::Created,
        TaskStatus::Ready,
        TaskStatus::Pending,
        TaskStatus::Running,
        TaskStatus::Success,
        TaskStatus::Error,
        TaskStatus::Stopping,
        TaskStatus::Interrupted,
    ];

    /// Statuses from which a new run may be started.
    pub fn is_launchable(self) -> bool {
        matches!(
            self,
            TaskStatus::Ready | TaskStatus::Success | TaskStatus::Error | TaskStatus::Interrupted
        )
    }

    /// Statuses in which a run can be interrupted.
    pub fn is_stoppable(self) -> bool {
        matches!(self, TaskStatus::Running | TaskStatus::Pending)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::NotCreated => "NOT_CREATED",
            TaskStatus::Created => "CREATED",
            TaskStatus::Ready => "READY",
            TaskStatus::Pending => "PENDING",
            TaskStatus::Running => "RUNNING",
            TaskStatus::Success => "SUCCESS",
            TaskStatus::Error => "ERROR",
            TaskStatus::Stopping => "STOPPING",
            TaskStatus::Interrupted => "INTERRUPTED",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation state of an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessFileStatus {
    Validated,
    Invalid,
    NotPresent,
    Deleted,
    #[serde(other)]
    Unknown,
}

/// One input (or output) file attached to a task.
///
/// Two files are the same file only if every field matches; run-history
/// provenance relies on this.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    pub file_type: String,
    pub process_file_status: ProcessFileStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modification_date: Option<DateTime<FixedOffset>>,
}

impl ProcessFile {
    pub fn new(file_type: impl Into<String>, filename: impl Into<String>) -> Self {
        let filename = filename.into();
        Self {
            file_path: Some(format!("inputs/{filename}")),
            file_type: file_type.into(),
            process_file_status: ProcessFileStatus::Validated,
            filename: Some(filename),
            document_id: None,
            last_modification_date: None,
        }
    }

    pub fn with_document_id(mut self, document_id: impl Into<String>) -> Self {
        self.document_id = Some(document_id.into());
        self
    }
}

/// One execution attempt recorded in a task's run history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRun {
    pub id: RunId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_date: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub inputs: Vec<ProcessFile>,
}

impl ProcessRun {
    pub fn new(inputs: Vec<ProcessFile>) -> Self {
        Self {
            id: RunId::random(),
            execution_date: None,
            inputs,
        }
    }
}

/// A parameter override sent with a manual launch request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskParameter {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

impl TaskParameter {
    pub fn new(id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parameter_type: None,
            value: Some(value.into()),
            default_value: None,
        }
    }
}

/// A task as returned by the task-manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub timestamp: Timestamp,
    pub status: TaskStatus,
    #[serde(default)]
    pub inputs: Vec<ProcessFile>,
    #[serde(default)]
    pub available_inputs: Vec<ProcessFile>,
    #[serde(default)]
    pub outputs: Vec<ProcessFile>,
    #[serde(default)]
    pub process_events: Vec<serde_json::Value>,
    #[serde(default)]
    pub run_history: Vec<ProcessRun>,
    #[serde(default)]
    pub parameters: Vec<TaskParameter>,
}

impl Task {
    pub fn new(timestamp: Timestamp, status: TaskStatus) -> Self {
        Self {
            id: TaskId::random(),
            timestamp,
            status,
            inputs: Vec::new(),
            available_inputs: Vec::new(),
            outputs: Vec::new(),
            process_events: Vec::new(),
            run_history: Vec::new(),
            parameters: Vec::new(),
        }
    }

    pub fn with_inputs(mut self, inputs: Vec<ProcessFile>) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn with_run(mut self, run: ProcessRun) -> Self {
        self.run_history.push(run);
        self
    }

    /// Replace the task's parameters with launch overrides.
    ///
    /// An empty override list leaves the stored parameters untouched.
    pub fn apply_overrides(&mut self, overrides: &[TaskParameter]) {
        if !overrides.is_empty() {
            self.parameters = overrides.to_vec();
        }
    }
}

/// Asynchronous status notification published on `task-status-update`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusUpdate {
    pub id: TaskId,
    pub task_status: TaskStatus,
}

impl TaskStatusUpdate {
    pub fn new(id: TaskId, task_status: TaskStatus) -> Self {
        Self { id, task_status }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_serializes_as_screaming_snake_case() {
        let s = serde_json::to_string(&TaskStatus::NotCreated).unwrap();
        assert_eq!(s, "\"NOT_CREATED\"");
        for status in TaskStatus::ALL {
            let s = serde_json::to_string(&status).unwrap();
            assert_eq!(s, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn launchable_and_stoppable_sets_are_disjoint() {
        for status in TaskStatus::ALL {
            assert!(!(status.is_launchable() && status.is_stoppable()), "{status}");
        }
    }

    #[test]
    fn task_decodes_task_manager_payload() {
        let payload = json!({
            "id": "1fdda469-53e9-4d63-a533-b935cffdd2f6",
            "timestamp": "2022-04-27T10:10Z",
            "status": "READY",
            "inputs": [{
                "filePath": "path/to/crac.xml",
                "fileType": "CRAC",
                "processFileStatus": "VALIDATED",
                "filename": "crac.xml",
                "documentId": "docId2",
                "lastModificationDate": "2022-04-27T08:00:00Z"
            }],
            "runHistory": [],
            "somethingNew": true
        });

        let task: Task = serde_json::from_value(payload).unwrap();
        assert_eq!(task.status, TaskStatus::Ready);
        assert_eq!(task.inputs.len(), 1);
        assert_eq!(task.inputs[0].file_type, "CRAC");
        assert!(task.parameters.is_empty());
    }

    #[test]
    fn unknown_file_status_is_tolerated() {
        let file: ProcessFile = serde_json::from_value(json!({
            "fileType": "CGM",
            "processFileStatus": "ARCHIVED"
        }))
        .unwrap();
        assert_eq!(file.process_file_status, ProcessFileStatus::Unknown);
    }

    #[test]
    fn empty_overrides_keep_existing_parameters() {
        let ts: Timestamp = "2024-09-13T09:30Z".parse().unwrap();
        let mut task = Task::new(ts, TaskStatus::Ready);
        task.parameters = vec![TaskParameter::new("loopflow", "true")];

        task.apply_overrides(&[]);
        assert_eq!(task.parameters.len(), 1);

        task.apply_overrides(&[TaskParameter::new("a", "1"), TaskParameter::new("b", "2")]);
        assert_eq!(task.parameters.len(), 2);
        assert_eq!(task.parameters[0].id, "a");
    }

    #[test]
    fn status_update_uses_task_manager_field_names() {
        let update = TaskStatusUpdate::new(TaskId::random(), TaskStatus::Error);
        let v = serde_json::to_value(&update).unwrap();
        assert_eq!(v["taskStatus"], "ERROR");
        assert!(v["id"].is_string());
    }
}
