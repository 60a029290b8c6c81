//! AppBuilder - アプリケーションの構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）
//! - ports を 1 か所で束ね、コーディネータ同士で StateClient とロック表を共有する

use std::sync::Arc;

use super::auto_trigger::{AutoTrigger, AutoTriggerFilter};
use super::launch::LaunchCoordinator;
use super::scheduler::{ScheduleSettings, SchedulerDriver};
use super::stop::StopCoordinator;
use crate::client::{InterruptionClient, RetryPolicy, StateClient};
use crate::ports::{Clock, InterruptionApi, Publisher, TaskStateApi};

/// AppBuilder はアプリケーションを構築
///
/// # 使用例
/// ```ignore
/// let app = AppBuilder::new()
///     .task_state(Arc::new(HttpTaskStateApi::new(...)?))
///     .interruption(Arc::new(HttpInterruptionApi::new(...)?))
///     .publisher(Arc::new(HttpPublisher::new(...)?))
///     .clock(Arc::new(SystemClock))
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - ports はすべて必須。足りなければ build() が BuildError を返す
/// - retry / auto / schedule は省略時にデフォルト
#[derive(Default)]
pub struct AppBuilder {
    task_state: Option<Arc<dyn TaskStateApi>>,
    interruption: Option<Arc<dyn InterruptionApi>>,
    publisher: Option<Arc<dyn Publisher>>,
    clock: Option<Arc<dyn Clock>>,
    retry: RetryPolicy,
    auto_filter: AutoTriggerFilter,
    schedule: ScheduleSettings,
}

/// BuildError はアプリケーション構築時のエラー
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("Missing port: {0}. Supply it to the AppBuilder before calling build().")]
    MissingPort(&'static str),
}

impl AppBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn task_state(mut self, api: Arc<dyn TaskStateApi>) -> Self {
        self.task_state = Some(api);
        self
    }

    pub fn interruption(mut self, api: Arc<dyn InterruptionApi>) -> Self {
        self.interruption = Some(api);
        self
    }

    pub fn publisher(mut self, publisher: Arc<dyn Publisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    pub fn auto_filter(mut self, filter: AutoTriggerFilter) -> Self {
        self.auto_filter = filter;
        self
    }

    pub fn schedule(mut self, settings: ScheduleSettings) -> Self {
        self.schedule = settings;
        self
    }

    /// AppBuilder を構築して App を生成
    ///
    /// ports は task_state → interruption → publisher → clock の順に検査し、
    /// 最初に見つかった不足を返します。
    pub fn build(self) -> Result<App, BuildError> {
        let task_state = self.task_state.ok_or(BuildError::MissingPort("task_state"))?;
        let interruption = self
            .interruption
            .ok_or(BuildError::MissingPort("interruption"))?;
        let publisher = self.publisher.ok_or(BuildError::MissingPort("publisher"))?;
        let clock = self.clock.ok_or(BuildError::MissingPort("clock"))?;

        let state = StateClient::new(task_state, self.retry.clone());
        let interruption = InterruptionClient::new(interruption, self.retry);

        let launcher = LaunchCoordinator::new(state.clone(), publisher.clone());
        let stopper = StopCoordinator::new(state.clone(), interruption, publisher);
        let auto_trigger = AutoTrigger::new(self.auto_filter, launcher.clone());
        let scheduler = SchedulerDriver::new(self.schedule, clock, state, launcher.clone());

        Ok(App {
            launcher,
            stopper,
            auto_trigger,
            scheduler,
        })
    }
}

/// App はアプリケーションのランタイム
///
/// 3 つの起動経路（HTTP / 自動 / スケジューラ）は同じ LaunchCoordinator を共有します。
#[derive(Clone)]
pub struct App {
    pub launcher: LaunchCoordinator,
    pub stopper: StopCoordinator,
    pub auto_trigger: AutoTrigger,
    pub scheduler: SchedulerDriver,
}
