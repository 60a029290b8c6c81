//! InterruptionApi port - interruption-server への生の呼び出し

use async_trait::async_trait;

use crate::domain::{RunId, TaskId, UpstreamError};

/// Raw, single-attempt request to interrupt one run of a task.
#[async_trait]
pub trait InterruptionApi: Send + Sync {
    /// Returns the server's acknowledgment flag.
    async fn interrupt_run(&self, run_id: RunId, task_id: TaskId) -> Result<bool, UpstreamError>;
}
