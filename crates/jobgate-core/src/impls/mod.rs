//! Impls - 実装（開発用・テスト用）
//!
//! このモジュールには ports のインメモリ実装を含めます。
//!
//! # 含まれる実装
//! - **InMemoryTaskState**: task-manager の代役（失敗注入つき）
//! - **InMemoryInterruption**: interruption-server の代役
//! - **RecordingPublisher**: 送信内容を記録する Publisher
//!
//! # 本番用実装
//! 本番用の実装は別クレートに配置します：
//! - `jobgate-http`: HttpTaskStateApi, HttpInterruptionApi, HttpPublisher

pub mod inmem_interruption;
pub mod inmem_task_state;
pub mod recording_publisher;

pub use self::inmem_interruption::InMemoryInterruption;
pub use self::inmem_task_state::{CallCounts, InMemoryTaskState, TaskStateOp};
pub use self::recording_publisher::RecordingPublisher;
