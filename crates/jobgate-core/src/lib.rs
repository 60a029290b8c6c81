//! jobgate-core
//!
//! Core building blocks for the jobgate launcher: deciding, per business
//! timestamp, whether a computation may be started or interrupted.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, timestamp, task, outcome, events, errors）
//! - **ports**: 抽象化レイヤー（TaskStateApi, InterruptionApi, Publisher, Clock）
//! - **client**: 再試行付きクライアント（RetryPolicy, StateClient, InterruptionClient）
//! - **app**: アプリケーションロジック（builder, launch, stop, auto_trigger, scheduler）
//! - **impls**: インメモリ実装（開発・テスト用）
//!
//! HTTP での ports 実装は `jobgate-http` クレートにあります。

pub mod app;
pub mod client;
pub mod domain;
pub mod impls;
pub mod ports;

/// `tracing` target for business events (launched, refused, stopping).
pub const EVENTS_TARGET: &str = "jobgate::events";
