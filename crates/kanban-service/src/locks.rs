use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// One async mutex per task id, so mutations of a single task run one at a
/// time while different tasks proceed in parallel.
#[derive(Default)]
pub(crate) struct TaskLocks {
    slots: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl TaskLocks {
    pub(crate) async fn lock(&self, task_id: &str) -> OwnedMutexGuard<()> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            // Entries only the map still references are idle.
            slots.retain(|_, slot| Arc::strong_count(slot) > 1);
            slots.entry(task_id.to_string()).or_default().clone()
        };
        slot.lock_owned().await
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
