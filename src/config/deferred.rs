//! Deferred configuration blocks.
//!
//! # States
//! - Uninitialized: blocks are queued
//! - Initialized: blocks are handed straight back to run immediately
//!
//! # State Transitions
//! ```text
//! Uninitialized → Initialized: queue drained (mark_initialized)
//! Initialized → Uninitialized: rewind (only as part of a reload)
//! ```
//!
//! The gate does not own the value blocks run against, so it cannot run
//! them itself; callers pop blocks and apply them to their own `&mut T`.

use std::collections::VecDeque;
use std::fmt;

use parking_lot::Mutex;

pub type DeferredBlock<T> = Box<dyn FnOnce(&mut T) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitState {
    #[default]
    Uninitialized,
    Initialized,
}

pub struct DeferredInitializer<T> {
    state: InitState,
    queue: Mutex<VecDeque<DeferredBlock<T>>>,
}

impl<T> Default for DeferredInitializer<T> {
    fn default() -> Self {
        Self {
            state: InitState::Uninitialized,
            queue: Mutex::new(VecDeque::new()),
        }
    }
}

impl<T> DeferredInitializer<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> InitState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.state == InitState::Initialized
    }

    /// Queue `block` while uninitialized; once initialized, return it so the
    /// caller runs it right away.
    pub fn defer(&self, block: DeferredBlock<T>) -> Option<DeferredBlock<T>> {
        match self.state {
            InitState::Uninitialized => {
                self.queue.lock().push_back(block);
                None
            }
            InitState::Initialized => Some(block),
        }
    }

    /// Next queued block, oldest first.
    pub fn pop(&self) -> Option<DeferredBlock<T>> {
        self.queue.lock().pop_front()
    }

    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn mark_initialized(&mut self) {
        self.state = InitState::Initialized;
    }

    pub fn rewind(&mut self) {
        self.state = InitState::Uninitialized;
    }
}

impl<T> fmt::Debug for DeferredInitializer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredInitializer")
            .field("state", &self.state)
            .field("pending", &self.pending())
            .finish()
    }
}
