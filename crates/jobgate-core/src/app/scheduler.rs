//! SchedulerDriver - 業務日付ごとの定期起動
//!
//! 毎 tick で「今日 + days_to_add」の業務日付を求め、その日の READY なタスクを
//! すべて `run-task-auto` で起動します。
//!
//! 発火時刻は `frequency_in_minutes` の倍数の分（秒 0）で、時（timezone 上の現地時刻）が
//! `[start_hour, end_hour]` に入っているときだけです。
//!
//! timezone は IANA 名（`Europe/Paris` など）で、夏時間の切り替えも現地時刻で
//! 判定します。候補は UTC の 1 分刻みで進めるので、存在しない現地時刻を
//! 組み立てることはありません。

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, TimeDelta, Timelike, Utc};
use chrono_tz::Tz;
use tokio::sync::watch;
use tracing::{debug, error, info};

use super::launch::LaunchCoordinator;
use crate::client::StateClient;
use crate::domain::{Binding, TaskStatus};
use crate::ports::Clock;

/// When and for which business date the scheduler fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleSettings {
    pub frequency_in_minutes: u32,
    pub start_hour: u32,
    pub end_hour: u32,
    pub timezone: Tz,
    pub days_to_add: i64,
}

impl ScheduleSettings {
    /// Business date for the instant `now`.
    pub fn business_date(&self, now: DateTime<Utc>) -> Option<NaiveDate> {
        now.with_timezone(&self.timezone)
            .date_naive()
            .checked_add_signed(TimeDelta::days(self.days_to_add))
    }

    /// First firing instant strictly after `now`.
    pub fn next_fire_after(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let frequency = self.frequency_in_minutes.max(1);
        let mut candidate = now
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))?
            + TimeDelta::minutes(1);

        // a local day is at most 25 hours long around a DST change
        for _ in 0..=26 * 60 {
            let local = candidate.with_timezone(&self.timezone);
            if local.minute() % frequency == 0
                && (self.start_hour..=self.end_hour).contains(&local.hour())
            {
                return Some(candidate);
            }
            candidate += TimeDelta::minutes(1);
        }
        None
    }
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            frequency_in_minutes: 5,
            start_hour: 0,
            end_hour: 23,
            timezone: Tz::UTC,
            days_to_add: 0,
        }
    }
}

#[derive(Clone)]
pub struct SchedulerDriver {
    settings: ScheduleSettings,
    clock: Arc<dyn Clock>,
    state: StateClient,
    launcher: LaunchCoordinator,
}

impl SchedulerDriver {
    pub fn new(
        settings: ScheduleSettings,
        clock: Arc<dyn Clock>,
        state: StateClient,
        launcher: LaunchCoordinator,
    ) -> Self {
        Self {
            settings,
            clock,
            state,
            launcher,
        }
    }

    pub fn settings(&self) -> &ScheduleSettings {
        &self.settings
    }

    /// Launch every READY task of the current business date.
    ///
    /// Returns how many launches ran to completion; aborted ones are not counted.
    pub async fn tick(&self) -> usize {
        let now = self.clock.now();
        let Some(date) = self.settings.business_date(now) else {
            error!(%now, days_to_add = self.settings.days_to_add, "business date out of range");
            return 0;
        };

        let Some(tasks) = self.state.get_tasks_for_business_date(date).await else {
            error!(%date, "failed to launch tasks: could not retrieve tasks from the task-manager");
            return 0;
        };

        let mut launched = 0;
        let mut aborted = 0;
        for task in tasks.into_iter().filter(|t| t.status == TaskStatus::Ready) {
            match self
                .launcher
                .launch_supervised(task.timestamp, Binding::RunTaskAuto)
                .await
            {
                Some(_) => launched += 1,
                None => aborted += 1,
            }
        }
        info!(%date, launched, aborted, "scheduled launch done");
        launched
    }

    /// Fire on schedule until shutdown is requested.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        loop {
            if *shutdown.borrow() {
                break;
            }
            let now = self.clock.now();
            let Some(next) = self.settings.next_fire_after(now) else {
                error!("scheduler has no firing time; stopping");
                break;
            };
            let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
            debug!(%next, "next scheduled launch");

            tokio::select! {
                changed = shutdown.changed() => {
                    // sender dropped
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
                _ = tokio::time::sleep(wait) => {}
            }
            self.tick().await;
        }
    }
}
