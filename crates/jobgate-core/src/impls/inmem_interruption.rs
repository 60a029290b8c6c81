//! InMemoryInterruption - 開発用の interruption-server

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::{RunId, TaskId, UpstreamError};
use crate::ports::InterruptionApi;

#[derive(Debug, Clone)]
pub struct InMemoryInterruption {
    answer: Result<bool, UpstreamError>,
    requests: Arc<Mutex<Vec<(RunId, TaskId)>>>,
}

impl InMemoryInterruption {
    pub fn acknowledging() -> Self {
        Self::answering(Ok(true))
    }

    /// Answers, but declines every interruption.
    pub fn refusing() -> Self {
        Self::answering(Ok(false))
    }

    pub fn failing(error: UpstreamError) -> Self {
        Self::answering(Err(error))
    }

    fn answering(answer: Result<bool, UpstreamError>) -> Self {
        Self {
            answer,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every raw request received, in order.
    pub fn requests(&self) -> Vec<(RunId, TaskId)> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl InterruptionApi for InMemoryInterruption {
    async fn interrupt_run(&self, run_id: RunId, task_id: TaskId) -> Result<bool, UpstreamError> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((run_id, task_id));
        self.answer.clone()
    }
}
