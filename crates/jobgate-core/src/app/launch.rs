//! LaunchCoordinator - 状態で門番をする single-flight 起動
//!
//! # フロー
//! 1. タイムスタンプ単位のロックを取得（空くまで待つ）
//! 2. task-manager からタスクを取得（なければ NotFound）
//! 3. 起動可能な状態（READY / SUCCESS / ERROR / INTERRUPTED）か確認
//! 4. run を追加し、上書きパラメータを適用
//! 5. 状態を PENDING に更新
//! 6. run request を binding に publish
//!
//! 手動・自動・スケジューラのどの経路もこの 1 つの実装を通ります。2 番目の
//! 呼び出し元はロックで待たされ、入った時点で状態を読み直すので、同じタイムスタンプが
//! 二重に起動されることはありません。

use std::sync::Arc;

use tracing::{Instrument, error, info, info_span, warn};

use super::lock_table::KeyedLocks;
use crate::EVENTS_TARGET;
use crate::client::StateClient;
use crate::domain::{
    Binding, OutboundMessage, RequestOutcome, Task, TaskParameter, TaskStatus, TaskStatusUpdate,
    Timestamp,
};
use crate::ports::Publisher;

#[derive(Clone)]
pub struct LaunchCoordinator {
    state: StateClient,
    publisher: Arc<dyn Publisher>,
    locks: KeyedLocks,
}

impl LaunchCoordinator {
    pub fn new(state: StateClient, publisher: Arc<dyn Publisher>) -> Self {
        Self {
            state,
            publisher,
            locks: KeyedLocks::new(),
        }
    }

    /// The lock table shared by every launch path.
    pub fn locks(&self) -> &KeyedLocks {
        &self.locks
    }

    /// Launch the task at `timestamp`, publishing the run request on `binding`
    /// (`run-task` or `run-task-auto`).
    ///
    /// Only an unknown timestamp yields `NotFound`. Ineligible statuses and
    /// upstream failures are logged and still answered with `Accepted`.
    pub async fn launch(
        &self,
        timestamp: &Timestamp,
        parameters: &[TaskParameter],
        binding: Binding,
    ) -> RequestOutcome {
        let _guard = self.locks.acquire(timestamp.lock_key()).await;

        let Some(task) = self.state.get_task(timestamp).await else {
            return RequestOutcome::NotFound;
        };

        let span = info_span!("task", task_id = %task.id);
        self.launch_task(task, timestamp, parameters, binding)
            .instrument(span)
            .await;
        RequestOutcome::Accepted
    }

    /// Same as [`launch`](Self::launch) without overrides, on its own tokio task.
    ///
    /// A panic inside the launch is logged and reported as `None`, so that loops
    /// feeding many launches keep going.
    pub async fn launch_supervised(
        &self,
        timestamp: Timestamp,
        binding: Binding,
    ) -> Option<RequestOutcome> {
        let this = self.clone();
        let handle = tokio::spawn(async move { this.launch(&timestamp, &[], binding).await });
        match handle.await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                error!(%timestamp, %binding, error = %e, "launch aborted");
                None
            }
        }
    }

    async fn launch_task(
        &self,
        task: Task,
        timestamp: &Timestamp,
        parameters: &[TaskParameter],
        binding: Binding,
    ) {
        if !task.status.is_launchable() {
            warn!(
                target: EVENTS_TARGET,
                %timestamp,
                status = %task.status,
                "failed to launch task: status is not READY, SUCCESS, ERROR or INTERRUPTED"
            );
            return;
        }

        let Some(mut updated) = self.state.append_run(timestamp, &task.inputs).await else {
            self.publish_error(&task);
            warn!(target: EVENTS_TARGET, %timestamp, "failed to launch task: could not add a new run");
            return;
        };
        updated.apply_overrides(parameters);

        if !self.state.update_status(timestamp, TaskStatus::Pending).await {
            self.publish_error(&task);
            warn!(target: EVENTS_TARGET, %timestamp, "failed to launch task: could not set status to PENDING");
            return;
        }

        self.publisher
            .publish(binding, OutboundMessage::RunRequest(Box::new(updated)));
        info!(target: EVENTS_TARGET, %timestamp, %binding, "task launched");
    }

    fn publish_error(&self, task: &Task) {
        self.publisher.publish(
            Binding::TaskStatusUpdate,
            OutboundMessage::StatusUpdate(TaskStatusUpdate::new(task.id, TaskStatus::Error)),
        );
    }
}
