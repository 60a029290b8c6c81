//! HttpInterruptionApi - `PUT {interrupt_url}{taskId}?runId={runId}` → boolean

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use jobgate_core::domain::{RunId, TaskId, UpstreamError};
use jobgate_core::ports::InterruptionApi;

use crate::endpoint::{Endpoint, SetupError, decode};

#[derive(Debug, Clone)]
pub struct HttpInterruptionApi {
    client: Client,
    endpoint: Endpoint,
}

impl HttpInterruptionApi {
    pub fn new(client: Client, interrupt_url: &str) -> Result<Self, SetupError> {
        Ok(Self {
            client,
            endpoint: Endpoint::parse("interrupt run", interrupt_url)?,
        })
    }
}

#[async_trait]
impl InterruptionApi for HttpInterruptionApi {
    async fn interrupt_run(&self, run_id: RunId, task_id: TaskId) -> Result<bool, UpstreamError> {
        let mut url = self.endpoint.join(&task_id.to_string())?;
        url.query_pairs_mut()
            .append_pair("runId", &run_id.to_string());
        decode(self.client.put(url).json(&json!({})).send().await).await
    }
}
