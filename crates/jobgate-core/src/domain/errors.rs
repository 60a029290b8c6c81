//! Errors - エラー型と分類
//!
//! 上流（task-manager / interruption-server）への 1 回の呼び出しが失敗した
//! 理由を表します。URL の組み立て失敗を除き、どの失敗もリトライ対象で、
//! 予算を使い切った時点でクライアント側がログに残して `None` / `false` に落とします。
//! この型がコーディネータの外に出ることはありません。

use thiserror::Error;

/// One failed upstream attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    /// 接続失敗・タイムアウトなど
    #[error("transport failure: {0}")]
    Transport(String),

    /// 2xx 以外のステータス（404 も含む）
    #[error("unexpected status {0}")]
    UnexpectedStatus(u16),

    /// 2xx だが body が空
    #[error("empty response body")]
    EmptyBody,

    /// body が期待する JSON でない
    #[error("undecodable response body: {0}")]
    Decode(String),

    /// URL を組み立てられない
    #[error("invalid request url: {0}")]
    InvalidUrl(String),
}

impl UpstreamError {
    /// 404 を含め、ネットワーク越しの失敗はすべてリトライ対象
    pub fn is_retryable(&self) -> bool {
        !matches!(self, UpstreamError::InvalidUrl(_))
    }
}
