//! HttpTaskStateApi - task-manager の REST API
//!
//! | 操作 | リクエスト |
//! |---|---|
//! | fetch_task | `GET {timestamp_url}{ts}` |
//! | fetch_tasks_for_business_date | `GET {business_date_url}{yyyy-MM-dd}` |
//! | append_run | `PUT {timestamp_url}{ts}/runHistory`（body: 入力ファイルの配列） |
//! | update_status | `PUT {timestamp_url}{ts}/status?status=STATUS`（body: `{}`） |

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde_json::json;

use jobgate_core::domain::{ProcessFile, Task, TaskStatus, Timestamp, UpstreamError};
use jobgate_core::ports::TaskStateApi;

use crate::endpoint::{Endpoint, SetupError, decode};

#[derive(Debug, Clone)]
pub struct HttpTaskStateApi {
    client: Client,
    by_timestamp: Endpoint,
    by_business_date: Endpoint,
}

impl HttpTaskStateApi {
    pub fn new(
        client: Client,
        timestamp_url: &str,
        business_date_url: &str,
    ) -> Result<Self, SetupError> {
        Ok(Self {
            client,
            by_timestamp: Endpoint::parse("task timestamp", timestamp_url)?,
            by_business_date: Endpoint::parse("task business date", business_date_url)?,
        })
    }
}

#[async_trait]
impl TaskStateApi for HttpTaskStateApi {
    async fn fetch_task(&self, timestamp: &Timestamp) -> Result<Task, UpstreamError> {
        let url = self.by_timestamp.join(&timestamp.to_string())?;
        decode(self.client.get(url).send().await).await
    }

    async fn fetch_tasks_for_business_date(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<Task>, UpstreamError> {
        let url = self
            .by_business_date
            .join(&date.format("%Y-%m-%d").to_string())?;
        decode(self.client.get(url).send().await).await
    }

    async fn append_run(
        &self,
        timestamp: &Timestamp,
        inputs: &[ProcessFile],
    ) -> Result<Task, UpstreamError> {
        let url = self.by_timestamp.join(&format!("{timestamp}/runHistory"))?;
        decode(self.client.put(url).json(inputs).send().await).await
    }

    async fn update_status(
        &self,
        timestamp: &Timestamp,
        status: TaskStatus,
    ) -> Result<Task, UpstreamError> {
        let mut url = self.by_timestamp.join(&format!("{timestamp}/status"))?;
        url.query_pairs_mut().append_pair("status", status.as_str());
        decode(self.client.put(url).json(&json!({})).send().await).await
    }
}
