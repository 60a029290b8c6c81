//! App - アプリケーション層
//!
//! このモジュールは、ports と clients を組み合わせて起動・停止のロジックを実装します。
//!
//! # 主要コンポーネント
//! - **AppBuilder**: アプリケーションの構築とワイヤリング
//! - **LaunchCoordinator**: 状態で門番をする single-flight 起動
//! - **StopCoordinator**: 実行中 run の中断
//! - **AutoTrigger**: task 更新イベントからの自動起動
//! - **SchedulerDriver**: 業務日付ごとの定期起動
//! - **KeyedLocks**: タイムスタンプ単位のロック表

pub mod auto_trigger;
pub mod builder;
pub mod launch;
pub mod lock_table;
pub mod scheduler;
pub mod stop;

// 主要な型を再エクスポート
pub use self::auto_trigger::{AutoTrigger, AutoTriggerFilter};
pub use self::builder::{App, AppBuilder, BuildError};
pub use self::launch::LaunchCoordinator;
pub use self::lock_table::{KeyGuard, KeyedLocks};
pub use self::scheduler::{ScheduleSettings, SchedulerDriver};
pub use self::stop::StopCoordinator;
