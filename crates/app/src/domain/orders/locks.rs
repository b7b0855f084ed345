//! Per-cart locks
//!
//! Serialises read-modify-write sequences against one customer's cart while
//! letting different customers proceed in parallel.

use std::sync::{Arc, Mutex, PoisonError};

use rustc_hash::FxHashMap;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Slots = Arc<Mutex<FxHashMap<String, Entry>>>;

/// One cart's mutex and the number of callers holding or awaiting it.
#[derive(Debug, Default)]
struct Entry {
    mutex: Arc<AsyncMutex<()>>,
    users: usize,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct CartLocks {
    slots: Slots,
}

impl CartLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to the cart keyed by `email`.
    ///
    /// Cancelling the returned future before it resolves releases the
    /// caller's claim on the entry.
    pub(crate) async fn lock(&self, email: &str) -> CartGuard {
        let (mutex, registration) = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);

            let entry = slots.entry(email.to_string()).or_default();
            entry.users += 1;

            (
                Arc::clone(&entry.mutex),
                Registration {
                    email: email.to_string(),
                    slots: Arc::clone(&self.slots),
                },
            )
        };

        let guard = mutex.lock_owned().await;

        CartGuard {
            _guard: guard,
            _registration: registration,
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// A caller's claim on a cart entry, from the first wait until release.
#[derive(Debug)]
struct Registration {
    email: String,
    slots: Slots,
}

impl Drop for Registration {
    fn drop(&mut self) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(entry) = slots.get_mut(&self.email) {
            entry.users = entry.users.saturating_sub(1);

            if entry.users == 0 {
                slots.remove(&self.email);
            }
        }
    }
}

/// Held for the duration of one cart mutation.
///
/// Fields drop in order: the mutex is released before the claim.
#[derive(Debug)]
pub(crate) struct CartGuard {
    _guard: OwnedMutexGuard<()>,
    _registration: Registration,
}
