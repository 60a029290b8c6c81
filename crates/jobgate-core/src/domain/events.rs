//! Events - バスに流すメッセージ
//!
//! 送信先は論理名（binding）で指定します。manual / auto / scheduled の
//! 起動経路は同じロジックを通り、binding 名だけが異なります。

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::TaskId;
use super::task::{Task, TaskStatusUpdate};

/// Logical outbound destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Binding {
    /// Manual launch via the HTTP API.
    RunTask,
    /// Launch by the auto-trigger consumer or the scheduler.
    RunTaskAuto,
    StopTask,
    TaskStatusUpdate,
}

impl Binding {
    pub fn as_str(self) -> &'static str {
        match self {
            Binding::RunTask => "run-task",
            Binding::RunTaskAuto => "run-task-auto",
            Binding::StopTask => "stop-task",
            Binding::TaskStatusUpdate => "task-status-update",
        }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload published on a binding.
///
/// Serialized untagged: consumers see the bare task, the bare task id string,
/// or the bare status update, exactly as the downstream services expect.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutboundMessage {
    RunRequest(Box<Task>),
    Stop(TaskId),
    StatusUpdate(TaskStatusUpdate),
}

impl OutboundMessage {
    pub fn task_id(&self) -> TaskId {
        match self {
            OutboundMessage::RunRequest(task) => task.id,
            OutboundMessage::Stop(id) => *id,
            OutboundMessage::StatusUpdate(update) => update.id,
        }
    }
}
