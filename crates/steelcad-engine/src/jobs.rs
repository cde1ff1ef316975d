//! A minimal counting semaphore bounding how many imports/exports run at
//! once, implementing the engine's cooperative-concurrent job model
//! without pulling in an async runtime the teacher's CLI-facing crates
//! don't use.

use std::sync::{Condvar, Mutex};

pub struct JobSlots {
    state: Mutex<usize>,
    available: Condvar,
    capacity: usize,
}

impl JobSlots {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { state: Mutex::new(capacity), available: Condvar::new(), capacity }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Blocks until a slot is free, then returns a guard that frees it on
    /// drop.
    pub fn acquire(&self) -> JobSlotGuard<'_> {
        let mut slots = self.state.lock().unwrap();
        while *slots == 0 {
            slots = self.available.wait(slots).unwrap();
        }
        *slots -= 1;
        JobSlotGuard { slots: &self.state, available: &self.available }
    }
}

pub struct JobSlotGuard<'a> {
    slots: &'a Mutex<usize>,
    available: &'a Condvar,
}

impl Drop for JobSlotGuard<'_> {
    fn drop(&mut self) {
        let mut slots = self.slots.lock().unwrap();
        *slots += 1;
        self.available.notify_one();
    }
}
