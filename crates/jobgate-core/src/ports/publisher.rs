//! Publisher port - メッセージバスへの送信
//!
//! fire-and-forget: ブローカーの ack は待たず、送信失敗のリトライもしません。
//! 失敗したら実装側でログに残すだけです。
//!
//! # 実装
//! - `impls::RecordingPublisher`（開発・テスト用、送信内容を記録）
//! - `jobgate-http::HttpPublisher`（本番用）

use crate::domain::{Binding, OutboundMessage};

pub trait Publisher: Send + Sync {
    fn publish(&self, binding: Binding, message: OutboundMessage);
}
