use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

/// Unbounded FIFO shared between any number of producers and one consumer.
///
/// Each call takes the internal lock only for its own duration. There is no
/// capacity limit and no blocking: `pop` on an empty queue yields
/// `T::default()`.
pub struct Queue<T> {
    items: Mutex<VecDeque<T>>,
}

impl<T: Default> Queue<T> {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
        }
    }

    pub fn push(&self, value: T) {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(value);
    }

    /// Removes the oldest item, or returns `T::default()` if there is none.
    pub fn pop(&self) -> T {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_default()
    }

    pub fn empty(&self) -> bool {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

impl<T: Default> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}
