//! AutoTrigger - task 更新イベントからの自動起動
//!
//! # 判定（AutoTriggerFilter）
//! - READY 以外 → 起動しない
//! - トリガー対象のファイル種別が空 → 起動する
//! - それ以外: トリガー対象の入力ファイルが、すべて過去の run で使われた
//!   ファイルなら起動しない（同じファイルで二度起動しない）。1 つでも新しければ起動する
//!
//! # 消費ループ
//! 判定を通ったイベントは上書きなし・`run-task-auto` で LaunchCoordinator に渡します。
//! 1 件の失敗（panic を含む）でループは止まりません。

use std::collections::HashSet;

use tokio::sync::{mpsc, watch};
use tracing::{Instrument, debug, info, info_span};

use super::launch::LaunchCoordinator;
use crate::domain::{Binding, ProcessFile, RequestOutcome, Task, TaskStatus};

/// Pure decision: should this task-update event cause an automatic launch?
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutoTriggerFilter {
    trigger_file_types: HashSet<String>,
}

impl AutoTriggerFilter {
    pub fn new<I, S>(trigger_file_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            trigger_file_types: trigger_file_types.into_iter().map(Into::into).collect(),
        }
    }

    pub fn should_launch(&self, task: &Task) -> bool {
        if task.status != TaskStatus::Ready {
            return false;
        }
        if self.trigger_file_types.is_empty() {
            return true;
        }

        let used: HashSet<&ProcessFile> = task
            .run_history
            .iter()
            .flat_map(|run| run.inputs.iter())
            .collect();

        task.inputs
            .iter()
            .filter(|file| self.trigger_file_types.contains(&file.file_type))
            .any(|file| !used.contains(file))
    }
}

/// Consumer of the inbound task-update stream.
#[derive(Clone)]
pub struct AutoTrigger {
    filter: AutoTriggerFilter,
    launcher: LaunchCoordinator,
}

impl AutoTrigger {
    pub fn new(filter: AutoTriggerFilter, launcher: LaunchCoordinator) -> Self {
        Self { filter, launcher }
    }

    pub fn filter(&self) -> &AutoTriggerFilter {
        &self.filter
    }

    /// Handle one event. `None` when the filter rejected it or the launch aborted.
    pub async fn handle(&self, task: Task) -> Option<RequestOutcome> {
        let span = info_span!("task", task_id = %task.id);
        async {
            if !self.filter.should_launch(&task) {
                debug!(timestamp = %task.timestamp, status = %task.status, "task update ignored");
                return None;
            }
            info!(timestamp = %task.timestamp, "automatic launch");
            self.launcher
                .launch_supervised(task.timestamp, Binding::RunTaskAuto)
                .await
        }
        .instrument(span)
        .await
    }

    /// Consume events until the channel closes or shutdown is requested.
    pub async fn run(self, mut events: mpsc::Receiver<Task>, mut shutdown: watch::Receiver<bool>) {
        loop {
            if *shutdown.borrow() {
                break;
            }
            let task = tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
                task = events.recv() => task,
            };
            let Some(task) = task else {
                debug!("task update stream closed");
                break;
            };
            self.handle(task).await;
        }
    }
}
