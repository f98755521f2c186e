use std::sync::{Mutex, MutexGuard, PoisonError};

/// Shared pts counter for one source.
///
/// The lock is held only while a pts is read, incremented and logged, never
/// across a fetch.
#[derive(Debug, Default)]
pub struct FrameClock {
    next_pts: Mutex<u64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(pts: u64) -> Self {
        Self {
            next_pts: Mutex::new(pts),
        }
    }

    /// The pts the next frame will receive.
    pub fn current(&self) -> u64 {
        *self.lock()
    }

    /// Take the next pts, calling `on_assign` while the lock is still held
    /// so log lines come out in pts order.
    pub fn advance(&self, on_assign: impl FnOnce(u64)) -> u64 {
        let mut next = self.lock();
        let pts = *next;
        *next += 1;
        on_assign(pts);
        pts
    }

    // A poisoned counter is still a valid counter.
    fn lock(&self) -> MutexGuard<'_, u64> {
        self.next_pts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
