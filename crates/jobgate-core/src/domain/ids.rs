//! Domain identifiers (strongly-typed IDs).
//!
//! # UUID ベースの ID + Phantom type
//! task-manager が発行する task id と、run history に記録される run id は
//! どちらも UUID です。`Id<T>` で共通実装を持ちつつ、マーカー型 `T` によって
//! コンパイル時に区別します。
//!
//! `interrupt(run_id, task_id)` のように同じ形の引数が並ぶ API で、
//! 引数の取り違えをコンパイルエラーにできるのが狙いです。
//!
//! ## ワイヤ形式
//! シリアライズ時はマーカーを含まない素の UUID 文字列になります
//! （`#[serde(transparent)]`）。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use uuid::Uuid;

/// IdMarker は各 ID 型のマーカー trait
///
/// パースエラーなどのメッセージで使う種別名（"task", "run"）を提供します。
pub trait IdMarker: Send + Sync + 'static {
    fn kind() -> &'static str;
}

/// ジェネリック ID 型
///
/// # 例
/// ```ignore
/// let task_id: TaskId = Id::from(Uuid::new_v4());
/// let run_id: RunId = Id::from(Uuid::new_v4());
/// // task_id と run_id は異なる型なので、混同できない
/// ```
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id<T: IdMarker> {
    uuid: Uuid,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self {
            uuid,
            _marker: PhantomData,
        }
    }

    /// ランダムな ID を生成（v4）
    pub fn random() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.uuid
    }
}

impl<T: IdMarker> From<Uuid> for Id<T> {
    fn from(uuid: Uuid) -> Self {
        Self::from_uuid(uuid)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.uuid.fmt(f)
    }
}

/// ID 文字列のパース失敗
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} id '{input}'")]
pub struct IdParseError {
    pub kind: &'static str,
    pub input: String,
}

impl<T: IdMarker> FromStr for Id<T> {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self::from_uuid)
            .map_err(|_| IdParseError {
                kind: T::kind(),
                input: s.to_string(),
            })
    }
}

// ========================================
// マーカー型の定義
// ========================================

/// Task のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Task {}

impl IdMarker for Task {
    fn kind() -> &'static str {
        "task"
    }
}

/// Run のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Run {}

impl IdMarker for Run {
    fn kind() -> &'static str {
        "run"
    }
}

/// Identifier of a Task (one business timestamp in the task-manager).
pub type TaskId = Id<Task>;

/// Identifier of a Run (one execution attempt recorded in a task's run history).
pub type RunId = Id<Run>;
