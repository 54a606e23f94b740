//! Per-session turn serialization.
//!
//! A turn is load → model call → save. Two turns for the same session run
//! in this process one after the other, so neither overwrites the other's
//! appended turns. Turns for different sessions do not wait on each other.
//! Writers in other processes are not covered.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use twinchat_types::chat::SessionId;

/// DashMap-backed registry of per-session async mutexes.
#[derive(Debug, Default)]
pub struct SessionLocks {
    locks: Arc<DashMap<SessionId, Arc<Mutex<()>>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `session_id`.
    ///
    /// The returned guard releases the session on drop and removes the map
    /// entry once nobody else holds or waits for it.
    pub async fn acquire(&self, session_id: &SessionId) -> SessionGuard {
        let mutex = self
            .locks
            .entry(session_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let guard = mutex.lock_owned().await;

        SessionGuard {
            guard: Some(guard),
            session_id: session_id.clone(),
            locks: Arc::clone(&self.locks),
        }
    }

    /// Number of sessions currently held or awaited.
    pub fn active(&self) -> usize {
        self.locks.len()
    }
}

/// Exclusive hold on one session, released on drop.
pub struct SessionGuard {
    guard: Option<OwnedMutexGuard<()>>,
    session_id: SessionId,
    locks: Arc<DashMap<SessionId, Arc<Mutex<()>>>>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        // Release first so the strong count below reflects only the map and waiters.
        drop(self.guard.take());
        self.locks
            .remove_if(&self.session_id, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
