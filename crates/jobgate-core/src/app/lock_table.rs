//! KeyedLocks - タイムスタンプ単位の排他（single-flight）
//!
//! # 仕組み
//! - キーごとに `Arc<tokio::sync::Mutex<()>>` を 1 つ持つ
//! - `acquire` は表のロック中に Arc を複製し、表のロックを離してから待つ
//! - `KeyGuard` の drop で解放。保持者も待機者もいなければエントリを削除する
//!
//! 削除の判定は表のロック中に `Arc::strong_count` で行います
//! （自分の分を手放した後に表の 1 本だけなら、他に誰もいない）。新しい待機者は
//! 表のロックを取らないと Arc を増やせないので、判定と削除の間に割り込まれません。
//!
//! guard は panic による巻き戻しでも drop されるため、上流アダプタが panic しても
//! ロックは残りません。

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::OwnedMutexGuard;

type Slot = Arc<tokio::sync::Mutex<()>>;

/// Registry of per-key async mutexes with eviction of unused entries.
#[derive(Debug, Clone, Default)]
pub struct KeyedLocks {
    slots: Arc<Mutex<HashMap<String, Slot>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until `key` is free and hold it until the guard is dropped.
    pub async fn acquire(&self, key: impl Into<String>) -> KeyGuard {
        let key = key.into();
        let slot = {
            let mut slots = self.slots();
            slots.entry(key.clone()).or_default().clone()
        };
        let held = slot.lock_owned().await;
        KeyGuard {
            table: self.slots.clone(),
            key,
            held: Some(held),
        }
    }

    /// Number of keys currently held or awaited.
    pub fn len(&self) -> usize {
        self.slots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Exclusive hold on one key of a [`KeyedLocks`] table.
#[derive(Debug)]
pub struct KeyGuard {
    table: Arc<Mutex<HashMap<String, Slot>>>,
    key: String,
    held: Option<OwnedMutexGuard<()>>,
}

impl KeyGuard {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for KeyGuard {
    fn drop(&mut self) {
        let mut slots = self.table.lock().unwrap_or_else(|e| e.into_inner());
        // 先に async mutex を解放して、待機者を起こせるようにする
        drop(self.held.take());
        if let Some(slot) = slots.get(&self.key)
            && Arc::strong_count(slot) == 1
        {
            slots.remove(&self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn entry_is_evicted_after_release() {
        let locks = KeyedLocks::new();
        {
            let guard = locks.acquire("a").await;
            assert_eq!(guard.key(), "a");
            assert_eq!(locks.len(), 1);
        }
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn different_keys_do_not_block_each_other() {
        let locks = KeyedLocks::new();
        let _a = locks.acquire("a").await;
        let b = tokio::time::timeout(Duration::from_millis(100), locks.acquire("b")).await;
        assert!(b.is_ok());
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn same_key_is_exclusive() {
        let locks = KeyedLocks::new();
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let locks = locks.clone();
            let inside = inside.clone();
            let max_inside = max_inside.clone();
            handles.push(tokio::spawn(async move {
                let _guard = locks.acquire("ts").await;
                let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                max_inside.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                inside.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn waiter_keeps_entry_alive() {
        let locks = KeyedLocks::new();
        let first = locks.acquire("ts").await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _g = locks.acquire("ts").await;
            })
        };
        // let the waiter register
        tokio::time::sleep(Duration::from_millis(20)).await;

        drop(first);
        assert!(locks.len() <= 1);
        waiter.await.unwrap();
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn panic_while_holding_releases_the_key() {
        let locks = KeyedLocks::new();
        let task = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _g = locks.acquire("ts").await;
                panic!("adapter blew up");
            })
        };
        assert!(task.await.unwrap_err().is_panic());

        let again = tokio::time::timeout(Duration::from_millis(100), locks.acquire("ts")).await;
        assert!(again.is_ok());
    }
}
