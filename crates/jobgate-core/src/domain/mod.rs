//! Domain model (IDs, timestamps, tasks, outcomes, outbound messages).
//!
//! task-manager が正本として持つデータの、ランチャー側の一時的な写しです。
//! ここにある型は I/O を一切持ちません。

pub mod errors;
pub mod events;
pub mod ids;
pub mod outcome;
pub mod task;
pub mod timestamp;

pub use self::errors::UpstreamError;
pub use self::events::{Binding, OutboundMessage};
pub use self::ids::{IdParseError, RunId, TaskId};
pub use self::outcome::RequestOutcome;
pub use self::task::{
    ProcessFile, ProcessFileStatus, ProcessRun, Task, TaskParameter, TaskStatus, TaskStatusUpdate,
};
pub use self::timestamp::{Timestamp, TimestampParseError};
