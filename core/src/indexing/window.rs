use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Bounds how many documents may be in flight at once.
///
/// A permit is held for the whole read → dispatch → reply cycle of one
/// document and released when dropped.
#[derive(Debug, Clone)]
pub struct DispatchWindow {
    slots: Arc<Semaphore>,
    size: usize,
}

impl DispatchWindow {
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            slots: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// A slot if one is free right now.
    pub fn try_admit(&self) -> Option<OwnedSemaphorePermit> {
        self.slots.clone().try_acquire_owned().ok()
    }

    pub fn in_use(&self) -> usize {
        self.size - self.slots.available_permits()
    }
}
