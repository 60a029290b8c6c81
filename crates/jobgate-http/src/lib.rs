//! jobgate-http
//!
//! HTTP implementations of the jobgate-core ports, built on `reqwest`:
//!
//! - [`HttpTaskStateApi`]: task-manager (task lookup, run history, status)
//! - [`HttpInterruptionApi`]: interruption-server
//! - [`HttpPublisher`]: message bus, one POST per outbound message
//!
//! 各アダプタは 1 回の呼び出しだけを行います。再試行は jobgate-core の
//! `StateClient` / `InterruptionClient` 側の責務です。

mod endpoint;
pub mod interruption;
pub mod publisher;
pub mod task_state;

use std::time::Duration;

pub use self::endpoint::{Endpoint, SetupError};
pub use self::interruption::HttpInterruptionApi;
pub use self::publisher::HttpPublisher;
pub use self::task_state::HttpTaskStateApi;

/// Shared `reqwest` client with a per-request timeout.
pub fn client(request_timeout: Duration) -> Result<reqwest::Client, SetupError> {
    reqwest::Client::builder()
        .timeout(request_timeout)
        .build()
        .map_err(SetupError::Client)
}
