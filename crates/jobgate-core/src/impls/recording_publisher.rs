//! RecordingPublisher - 送信内容を記録するだけの Publisher
//!
//! 開発時にバスなしで起動するときと、テストで「何が・どの binding に・何回
//! 送られたか」を検証するときに使います。

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use crate::domain::{Binding, OutboundMessage};
use crate::ports::Publisher;

#[derive(Debug, Clone, Default)]
pub struct RecordingPublisher {
    sent: Arc<Mutex<Vec<(Binding, OutboundMessage)>>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> Vec<(Binding, OutboundMessage)> {
        self.sent().clone()
    }

    /// Messages sent on `binding`, oldest first.
    pub fn on(&self, binding: Binding) -> Vec<OutboundMessage> {
        self.sent()
            .iter()
            .filter(|(b, _)| *b == binding)
            .map(|(_, message)| message.clone())
            .collect()
    }

    pub fn count(&self) -> usize {
        self.sent().len()
    }

    fn sent(&self) -> MutexGuard<'_, Vec<(Binding, OutboundMessage)>> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Publisher for RecordingPublisher {
    fn publish(&self, binding: Binding, message: OutboundMessage) {
        debug!(%binding, task_id = %message.task_id(), "recorded outbound message");
        self.sent().push((binding, message));
    }
}
