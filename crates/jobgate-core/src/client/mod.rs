//! Client - 上流サービスへの再試行付きクライアント
//!
//! ports の生の呼び出しに RetryPolicy を適用し、失敗を「結果なし」に畳み込みます。

pub mod interruption_client;
pub mod retry;
pub mod state_client;

pub use self::interruption_client::InterruptionClient;
pub use self::retry::RetryPolicy;
pub use self::state_client::StateClient;
