//! Per-key async locks.
//!
//! Mutations that read-then-write the "currently active" pointer of a class
//! type or theme hold the lock for that key, so at most one such transition
//! per key is in flight inside this process.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

#[derive(Default)]
pub struct KeyedLocks {
    slots: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`. Released when the guard drops.
    pub async fn lock(&self, key: impl Into<String>) -> OwnedMutexGuard<()> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
            // Drop idle slots so the map tracks only keys in use
            slots.retain(|_, slot| Arc::strong_count(slot) > 1);
            slots
                .entry(key.into())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        slot.lock_owned().await
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.slots.lock().map(|s| s.len()).unwrap_or(0)
    }
}

/// Lock key for rotor lifecycle changes of a class type.
pub fn class_type_key(class_type_id: &str) -> String {
    format!("class:{class_type_id}")
}

/// Lock key for scheduler and catalog changes of a theme.
pub fn theme_key(theme_id: &str) -> String {
    format!("theme:{theme_id}")
}
