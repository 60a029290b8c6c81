//! InterruptionClient - interruption-server への再試行付きクライアント

use std::sync::Arc;

use tracing::error;

use super::retry::RetryPolicy;
use crate::domain::{RunId, TaskId};
use crate::ports::InterruptionApi;

#[derive(Clone)]
pub struct InterruptionClient {
    api: Arc<dyn InterruptionApi>,
    policy: RetryPolicy,
}

impl InterruptionClient {
    pub fn new(api: Arc<dyn InterruptionApi>, policy: RetryPolicy) -> Self {
        Self { api, policy }
    }

    /// Ask the interruption server to stop `run_id` of `task_id`.
    ///
    /// `None` means the server never gave an answer within the retry budget;
    /// `Some(flag)` carries its acknowledgment.
    pub async fn interrupt(&self, run_id: RunId, task_id: TaskId) -> Option<bool> {
        match self
            .policy
            .run("interrupt", || self.api.interrupt_run(run_id, task_id))
            .await
        {
            Ok(ack) => Some(ack),
            Err(e) => {
                error!(%task_id, %run_id, error = %e, "problem occurred while requesting interruption");
                None
            }
        }
    }
}
