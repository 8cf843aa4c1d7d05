use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockTable = Arc<DashMap<String, Arc<Mutex<()>>>>;

/// Per-key async mutexes, one per account number with an update in flight.
///
/// Serializes read-modify-write cycles on a single account inside this
/// process. Separate processes sharing a database are not coordinated.
#[derive(Debug, Clone, Default)]
pub struct AccountLocks {
    locks: LockTable,
}

/// Holds the lock for one key. Dropping it unlocks the key and prunes the
/// table entry once nobody else holds or waits on it, including when the
/// owning future is cancelled.
#[derive(Debug)]
pub struct AccountLockGuard {
    key: String,
    locks: LockTable,
    guard: Option<OwnedMutexGuard<()>>,
}

impl AccountLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other holder owns `key`.
    pub async fn acquire(&self, key: &str) -> AccountLockGuard {
        let lock = Arc::clone(self.locks.entry(key.to_string()).or_default().value());
        let mut held = AccountLockGuard {
            key: key.to_string(),
            locks: Arc::clone(&self.locks),
            guard: None,
        };
        held.guard = Some(lock.lock_owned().await);
        held
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

impl Drop for AccountLockGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.locks
            .remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}
