//! Keyed write serialization
//!
//! A uniqueness check and the write that follows it are two separate store
//! calls. Holding the key's lock across both keeps two concurrent writers
//! from passing the check together. The booking core locks per staff
//! member; the directories lock per normalized email.

use salon_common::StaffId;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::trace;

pub struct KeyedLocks<K> {
    by_key: Mutex<HashMap<K, Arc<Mutex<()>>>>,
}

/// Per-staff schedule locks
pub type SlotLocks = KeyedLocks<StaffId>;

impl<K> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self {
            by_key: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Clone + Ord + Hash + Debug> KeyedLocks<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`.
    pub async fn acquire(&self, key: K) -> OwnedMutexGuard<()> {
        let lock = {
            let mut by_key = self.by_key.lock().await;
            by_key.entry(key.clone()).or_default().clone()
        };
        trace!("Waiting for lock on {:?}", key);
        lock.lock_owned().await
    }

    /// Lock several keys at once. Keys are taken in sorted order so two
    /// callers locking overlapping sets cannot deadlock.
    pub async fn acquire_all(&self, keys: &[K]) -> Vec<OwnedMutexGuard<()>> {
        let mut keys = keys.to_vec();
        keys.sort();
        keys.dedup();

        let mut guards = Vec::with_capacity(keys.len());
        for key in keys {
            guards.push(self.acquire(key).await);
        }
        guards
    }
}
