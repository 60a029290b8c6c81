//! StopCoordinator - 実行中の run の中断
//!
//! RUNNING / PENDING のタスクだけを対象に、interruption-server へ中断を依頼します。
//! 応答が得られたら `stop-task` に publish し、状態を STOPPING にします。
//! STOPPING への更新は best-effort で、失敗しても publish は取り消しません。

use std::sync::Arc;

use tracing::{Instrument, info, info_span, warn};

use crate::EVENTS_TARGET;
use crate::client::{InterruptionClient, StateClient};
use crate::domain::{
    Binding, OutboundMessage, RequestOutcome, RunId, Task, TaskStatus, Timestamp,
};
use crate::ports::Publisher;

#[derive(Clone)]
pub struct StopCoordinator {
    state: StateClient,
    interruption: InterruptionClient,
    publisher: Arc<dyn Publisher>,
}

impl StopCoordinator {
    pub fn new(
        state: StateClient,
        interruption: InterruptionClient,
        publisher: Arc<dyn Publisher>,
    ) -> Self {
        Self {
            state,
            interruption,
            publisher,
        }
    }

    pub async fn stop(&self, timestamp: &Timestamp, run_id: RunId) -> RequestOutcome {
        let Some(task) = self.state.get_task(timestamp).await else {
            return RequestOutcome::NotFound;
        };

        let span = info_span!("task", task_id = %task.id);
        self.stop_task(task, timestamp, run_id).instrument(span).await;
        RequestOutcome::Accepted
    }

    async fn stop_task(&self, task: Task, timestamp: &Timestamp, run_id: RunId) {
        if !task.status.is_stoppable() {
            warn!(
                target: EVENTS_TARGET,
                %timestamp,
                status = %task.status,
                "failed to stop task: status is not RUNNING or PENDING"
            );
            return;
        }

        let Some(acknowledged) = self.interruption.interrupt(run_id, task.id).await else {
            warn!(
                target: EVENTS_TARGET,
                %timestamp,
                %run_id,
                "failed to stop task: interruption server did not answer"
            );
            return;
        };

        info!(target: EVENTS_TARGET, %timestamp, %run_id, acknowledged, "stopping task");
        self.publisher
            .publish(Binding::StopTask, OutboundMessage::Stop(task.id));

        if !self.state.update_status(timestamp, TaskStatus::Stopping).await {
            warn!(target: EVENTS_TARGET, %timestamp, "stop requested but status could not be set to STOPPING");
        }
    }
}
