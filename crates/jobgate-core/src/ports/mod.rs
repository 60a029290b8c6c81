//! Ports - 抽象化レイヤー
//!
//! 外部システム（task-manager, interruption-server, メッセージバス, 時計）への
//! インターフェースです。コーディネータはこれらの trait だけに依存します。

pub mod clock;
pub mod interruption;
pub mod publisher;
pub mod task_state;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::interruption::InterruptionApi;
pub use self::publisher::Publisher;
pub use self::task_state::TaskStateApi;
