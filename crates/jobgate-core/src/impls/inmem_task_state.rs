//! InMemoryTaskState - 開発用の task-manager
//!
//! # 学習ポイント
//! - Mutex<HashMap> によるシンプルな状態管理
//! - テストのための失敗注入（n 回失敗・常に失敗・panic）
//! - 呼び出し回数の記録（リトライ回数の検証に使う）
//!
//! std の Mutex を await をまたいで保持しないよう、遅延（`set_latency`）は
//! ロックを取る前に入れています。

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{ProcessFile, ProcessRun, Task, TaskStatus, Timestamp, UpstreamError};
use crate::ports::TaskStateApi;

/// One raw operation of the task-state API, used to target injected failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStateOp {
    FetchTask,
    FetchTasksForBusinessDate,
    AppendRun,
    UpdateStatus,
}

/// Number of raw calls received, per operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub fetch_task: usize,
    pub fetch_tasks_for_business_date: usize,
    pub append_run: usize,
    pub update_status: usize,
}

#[derive(Debug, Clone)]
enum Fault {
    Error(UpstreamError),
    Panic,
}

#[derive(Debug, Clone)]
struct InjectedFault {
    /// `None` matches every operation.
    op: Option<TaskStateOp>,
    /// `None` never runs out.
    remaining: Option<usize>,
    fault: Fault,
}

#[derive(Debug, Default)]
struct Inner {
    /// UTC lock key → task
    tasks: HashMap<String, Task>,
    calls: CallCounts,
    faults: Vec<InjectedFault>,
    latency: Duration,
}

/// InMemoryTaskState は開発・テスト用の TaskStateApi 実装
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskState {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryTaskState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, task: Task) {
        self.lock().tasks.insert(task.timestamp.lock_key(), task);
    }

    pub fn task(&self, timestamp: &Timestamp) -> Option<Task> {
        self.lock().tasks.get(&timestamp.lock_key()).cloned()
    }

    pub fn status_of(&self, timestamp: &Timestamp) -> Option<TaskStatus> {
        self.task(timestamp).map(|task| task.status)
    }

    pub fn calls(&self) -> CallCounts {
        self.lock().calls
    }

    /// Delay every call, so that concurrent callers overlap.
    pub fn set_latency(&self, latency: Duration) {
        self.lock().latency = latency;
    }

    /// The next `n` calls (any operation) fail with `error`.
    pub fn fail_next_calls(&self, n: usize, error: UpstreamError) {
        self.push_fault(None, Some(n), Fault::Error(error));
    }

    /// Every call fails with `error`.
    pub fn fail_always(&self, error: UpstreamError) {
        self.push_fault(None, None, Fault::Error(error));
    }

    /// Every call to `op` fails with `error`.
    pub fn fail_operation(&self, op: TaskStateOp, error: UpstreamError) {
        self.push_fault(Some(op), None, Fault::Error(error));
    }

    /// The next call to `op` panics, as a misbehaving adapter would.
    pub fn panic_next(&self, op: TaskStateOp) {
        self.push_fault(Some(op), Some(1), Fault::Panic);
    }

    pub fn clear_faults(&self) {
        self.lock().faults.clear();
    }

    fn push_fault(&self, op: Option<TaskStateOp>, remaining: Option<usize>, fault: Fault) {
        self.lock().faults.push(InjectedFault {
            op,
            remaining,
            fault,
        });
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn begin(&self, op: TaskStateOp) -> Result<MutexGuard<'_, Inner>, UpstreamError> {
        let latency = self.lock().latency;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let mut inner = self.lock();
        match op {
            TaskStateOp::FetchTask => inner.calls.fetch_task += 1,
            TaskStateOp::FetchTasksForBusinessDate => inner.calls.fetch_tasks_for_business_date += 1,
            TaskStateOp::AppendRun => inner.calls.append_run += 1,
            TaskStateOp::UpdateStatus => inner.calls.update_status += 1,
        }

        let fault = inner
            .faults
            .iter_mut()
            .find(|f| f.op.is_none_or(|o| o == op) && f.remaining != Some(0))
            .map(|f| {
                if let Some(n) = f.remaining.as_mut() {
                    *n -= 1;
                }
                f.fault.clone()
            });

        match fault {
            None => Ok(inner),
            Some(Fault::Error(e)) => Err(e),
            Some(Fault::Panic) => {
                drop(inner);
                panic!("injected panic in {op:?}");
            }
        }
    }
}

fn not_found() -> UpstreamError {
    UpstreamError::UnexpectedStatus(404)
}

#[async_trait]
impl TaskStateApi for InMemoryTaskState {
    async fn fetch_task(&self, timestamp: &Timestamp) -> Result<Task, UpstreamError> {
        let inner = self.begin(TaskStateOp::FetchTask).await?;
        inner
            .tasks
            .get(&timestamp.lock_key())
            .cloned()
            .ok_or_else(not_found)
    }

    async fn fetch_tasks_for_business_date(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<Task>, UpstreamError> {
        let inner = self.begin(TaskStateOp::FetchTasksForBusinessDate).await?;
        let mut tasks: Vec<Task> = inner
            .tasks
            .values()
            .filter(|task| task.timestamp.as_datetime().date_naive() == date)
            .cloned()
            .collect();
        tasks.sort_by_key(|task| task.timestamp.as_datetime());
        Ok(tasks)
    }

    async fn append_run(
        &self,
        timestamp: &Timestamp,
        inputs: &[ProcessFile],
    ) -> Result<Task, UpstreamError> {
        let mut inner = self.begin(TaskStateOp::AppendRun).await?;
        let task = inner
            .tasks
            .get_mut(&timestamp.lock_key())
            .ok_or_else(not_found)?;
        task.run_history.push(ProcessRun::new(inputs.to_vec()));
        Ok(task.clone())
    }

    async fn update_status(
        &self,
        timestamp: &Timestamp,
        status: TaskStatus,
    ) -> Result<Task, UpstreamError> {
        let mut inner = self.begin(TaskStateOp::UpdateStatus).await?;
        let task = inner
            .tasks
            .get_mut(&timestamp.lock_key())
            .ok_or_else(not_found)?;
        task.status = status;
        Ok(task.clone())
    }
}
