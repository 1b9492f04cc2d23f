//! Per-user write serialisation.
//!
//! Entitlement updates are read-modify-write cycles against the user store.
//! Holding the user's guard across the whole cycle keeps concurrent requests
//! for the same user from overwriting each other. Different users never
//! contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use super::UserId;

/// Guard held for the duration of one user's update.
pub type UserWriteGuard = OwnedMutexGuard<()>;

/// Registry of per-user async mutexes.
///
/// # Examples
/// ```
/// use dragonfire::domain::{UserId, UserWriteLocks};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let locks = UserWriteLocks::default();
/// let user = UserId::random();
/// let guard = locks.acquire(&user).await;
/// drop(guard);
/// # });
/// ```
#[derive(Debug, Default)]
pub struct UserWriteLocks {
    slots: Mutex<HashMap<UserId, Arc<AsyncMutex<()>>>>,
}

impl UserWriteLocks {
    /// Wait for exclusive access to `user`'s record. Waiters are served in
    /// arrival order.
    pub async fn acquire(&self, user: &UserId) -> UserWriteGuard {
        let slot = self.slot(user);
        slot.lock_owned().await
    }

    fn slot(&self, user: &UserId) -> Arc<AsyncMutex<()>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        // Drop idle slots so the map tracks active users only.
        slots.retain(|_, slot| Arc::strong_count(slot) > 1);
        slots
            .entry(user.clone())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Number of users with a held or awaited guard.
    pub fn active(&self) -> usize {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots
            .values()
            .filter(|slot| Arc::strong_count(slot) > 1)
            .count()
    }
}
