//! TaskStateApi port - task-manager（タスク状態の正本）への生の呼び出し
//!
//! 1 メソッド = 1 回の HTTP 呼び出しです。リトライはここでは行わず、
//! `client::StateClient` が RetryPolicy で包みます。
//!
//! # 実装
//! - `impls::InMemoryTaskState`（開発・テスト用）
//! - `jobgate-http::HttpTaskStateApi`（本番用、reqwest）

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{ProcessFile, Task, TaskStatus, Timestamp, UpstreamError};

/// Raw, single-attempt access to the task-manager.
///
/// Any `Err` is treated as a failed attempt by the retrying client; a missing
/// task is reported as `UpstreamError::UnexpectedStatus(404)`.
#[async_trait]
pub trait TaskStateApi: Send + Sync {
    async fn fetch_task(&self, timestamp: &Timestamp) -> Result<Task, UpstreamError>;

    async fn fetch_tasks_for_business_date(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<Task>, UpstreamError>;

    /// Record a new run consuming `inputs`; returns the task with its updated run history.
    async fn append_run(
        &self,
        timestamp: &Timestamp,
        inputs: &[ProcessFile],
    ) -> Result<Task, UpstreamError>;

    async fn update_status(
        &self,
        timestamp: &Timestamp,
        status: TaskStatus,
    ) -> Result<Task, UpstreamError>;
}
