//! Handing state from the control context to the audio callback.
//!
//! The control side builds a complete new value off to the side and marks it
//! pending. The audio side picks it up at the start of a block by swapping it
//! with its live copy, which is wait-free: if the control side is still
//! writing, the audio side keeps the old state and tries again next block.
//! The swapped-out value goes back into the slot and is reused by the next
//! publish, so neither side allocates.

use core::sync::atomic::{AtomicBool, Ordering};

use spin::Mutex;

#[derive(Debug)]
pub struct Exchange<T> {
    slot: Mutex<T>,
    pending: AtomicBool,
}

impl<T> Exchange<T> {
    pub fn new(initial: T) -> Self {
        Self {
            slot: Mutex::new(initial),
            pending: AtomicBool::new(false),
        }
    }

    /// Control side. `build` must leave the slot holding a complete value; it
    /// receives whatever was there before (a stale live value or an unconsumed
    /// earlier publish). Latest publish wins.
    pub fn publish<R>(&self, build: impl FnOnce(&mut T) -> R) -> R {
        let mut slot = self.slot.lock();
        let result = build(&mut slot);
        self.pending.store(true, Ordering::Release);

        result
    }

    /// Audio side. Swaps a pending value into `live` and returns `true`, or
    /// leaves `live` untouched and returns `false`. Never blocks.
    #[inline]
    pub fn try_take(&self, live: &mut T) -> bool {
        if !self.pending.load(Ordering::Acquire) {
            return false;
        }

        let Some(mut slot) = self.slot.try_lock() else {
            return false;
        };

        core::mem::swap(&mut *slot, live);
        self.pending.store(false, Ordering::Release);

        true
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }
}
