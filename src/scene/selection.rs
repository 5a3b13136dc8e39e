//! The selection index shared between the UI and the render thread.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

/// A cloneable handle to the selected body index.
///
/// The UI writes, the renderer reads once per frame. Only the latest value
/// matters, so relaxed ordering is enough.
#[derive(Debug, Clone, Default)]
pub struct SelectionHandle(Arc<AtomicI32>);

impl SelectionHandle {
    /// Create a handle selecting `index`.
    pub fn new(index: i32) -> Self {
        Self(Arc::new(AtomicI32::new(index)))
    }

    /// Current index.
    #[inline]
    pub fn get(&self) -> i32 {
        self.0.load(Ordering::Relaxed)
    }

    /// Replace the index.
    #[inline]
    pub fn set(&self, index: i32) {
        self.0.store(index, Ordering::Relaxed);
    }

    /// Step to the next body, wrapping over `body_count` bodies.
    pub fn select_next(&self, body_count: i32) -> i32 {
        let index = next_selection(self.get(), body_count);
        self.set(index);
        index
    }

    /// Step to the previous body, wrapping over `body_count` bodies.
    pub fn select_previous(&self, body_count: i32) -> i32 {
        let index = previous_selection(self.get(), body_count);
        self.set(index);
        index
    }
}

/// `(current + 1) mod body_count`. A non-positive count yields 0.
pub fn next_selection(current: i32, body_count: i32) -> i32 {
    if body_count <= 0 {
        return 0;
    }
    (current.rem_euclid(body_count) + 1) % body_count
}

/// `(current - 1) mod body_count`. A non-positive count yields 0.
pub fn previous_selection(current: i32, body_count: i32) -> i32 {
    if body_count <= 0 {
        return 0;
    }
    (current.rem_euclid(body_count) + body_count - 1) % body_count
}
