//! StateClient - task-manager への再試行付きクライアント
//!
//! 生の `TaskStateApi` 呼び出しを `RetryPolicy` で包み、予算を使い切ったら
//! エラーをログに残して `None` / `false` を返します。呼び出し側（コーディネータ）に
//! 上流のエラーが伝わることはありません。

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::error;

use super::retry::RetryPolicy;
use crate::domain::{ProcessFile, Task, TaskStatus, Timestamp};
use crate::ports::TaskStateApi;

#[derive(Clone)]
pub struct StateClient {
    api: Arc<dyn TaskStateApi>,
    policy: RetryPolicy,
}

impl StateClient {
    pub fn new(api: Arc<dyn TaskStateApi>, policy: RetryPolicy) -> Self {
        Self { api, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub async fn get_task(&self, timestamp: &Timestamp) -> Option<Task> {
        match self
            .policy
            .run("get_task", || self.api.fetch_task(timestamp))
            .await
        {
            Ok(task) => Some(task),
            Err(e) => {
                error!(%timestamp, error = %e, "problem occurred while querying task-manager for timestamp");
                None
            }
        }
    }

    pub async fn get_tasks_for_business_date(&self, date: NaiveDate) -> Option<Vec<Task>> {
        match self
            .policy
            .run("get_tasks_for_business_date", || {
                self.api.fetch_tasks_for_business_date(date)
            })
            .await
        {
            Ok(tasks) => Some(tasks),
            Err(e) => {
                error!(%date, error = %e, "problem occurred while querying task-manager for business date");
                None
            }
        }
    }

    /// Append a run consuming `inputs`; `None` when the task-manager never answered.
    pub async fn append_run(&self, timestamp: &Timestamp, inputs: &[ProcessFile]) -> Option<Task> {
        match self
            .policy
            .run("append_run", || self.api.append_run(timestamp, inputs))
            .await
        {
            Ok(task) => Some(task),
            Err(e) => {
                error!(%timestamp, error = %e, "problem occurred while adding a new run to task-manager");
                None
            }
        }
    }

    /// `true` once the task-manager acknowledged the new status.
    pub async fn update_status(&self, timestamp: &Timestamp, status: TaskStatus) -> bool {
        match self
            .policy
            .run("update_status", || self.api.update_status(timestamp, status))
            .await
        {
            Ok(_) => true,
            Err(e) => {
                error!(%timestamp, %status, error = %e, "problem occurred while updating task status in task-manager");
                false
            }
        }
    }
}
