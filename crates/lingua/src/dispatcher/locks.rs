use lingua_core::UserId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type LockTable = HashMap<UserId, Arc<AsyncMutex<()>>>;

/// Per-user async locks; one logical session per user id.
///
/// An entry lives only while some caller holds or waits for it, so the
/// table stays bounded by the number of in-flight users.
#[derive(Clone, Default)]
pub struct UserLocks {
    locks: Arc<Mutex<LockTable>>,
}

/// Exclusive access to one user; releases and prunes its entry on drop
pub struct UserGuard {
    guard: Option<OwnedMutexGuard<()>>,
    user_id: UserId,
    locks: Arc<Mutex<LockTable>>,
}

fn table(locks: &Mutex<LockTable>) -> MutexGuard<'_, LockTable> {
    // Poisoning leaves the map intact.
    locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `user_id`
    pub async fn acquire(&self, user_id: &UserId) -> UserGuard {
        let lock = Arc::clone(table(&self.locks).entry(user_id.clone()).or_default());
        UserGuard {
            guard: Some(lock.lock_owned().await),
            user_id: user_id.clone(),
            locks: Arc::clone(&self.locks),
        }
    }

    /// Users currently holding or waiting for a lock
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        table(&self.locks).len()
    }
}

impl Drop for UserGuard {
    fn drop(&mut self) {
        // New waiters clone the entry under the table lock, so a count of one
        // means the table holds the only reference.
        let mut locks = table(&self.locks);
        drop(self.guard.take());
        if locks
            .get(&self.user_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.user_id);
        }
    }
}
