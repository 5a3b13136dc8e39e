//! Opaque handles for GPU-side objects.
//!
//! Handles are plain integers handed out by a [`GraphicsDevice`](super::GraphicsDevice).
//! Zero is reserved as the invalid handle, so a failed upload or compile can
//! be stored like any other value and checked with `is_valid`.

use std::fmt;

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            /// The invalid handle.
            pub const NONE: Self = Self(0);

            /// Wrap a raw handle value.
            #[inline]
            pub const fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            /// Get the raw handle value.
            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }

            /// Whether this handle is nonzero.
            #[inline]
            pub const fn is_valid(self) -> bool {
                self.0 != 0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_handle!(
    /// A linked shader program.
    ProgramHandle
);
define_handle!(
    /// A vertex or index buffer.
    BufferHandle
);
define_handle!(
    /// A 2D texture.
    TextureHandle
);

/// Sequential generator for nonzero handle values.
///
/// Each device owns one allocator, so handles are never reused within the
/// lifetime of a device, even across a lost context.
#[derive(Debug, Clone)]
pub struct HandleAllocator {
    next: u32,
}

impl Default for HandleAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl HandleAllocator {
    /// Create an allocator starting at 1.
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    /// Get the next raw handle value. Never returns zero.
    pub fn next(&mut self) -> u32 {
        let value = self.next;
        self.next = self.next.wrapping_add(1).max(1);
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_is_invalid() {
        assert!(!ProgramHandle::NONE.is_valid());
        assert!(!BufferHandle::default().is_valid());
        assert!(TextureHandle::from_raw(7).is_valid());
        assert_eq!(TextureHandle::from_raw(7).raw(), 7);
    }

    #[test]
    fn test_allocator_is_sequential() {
        let mut handles = HandleAllocator::new();
        assert_eq!(handles.next(), 1);
        assert_eq!(handles.next(), 2);
        assert_eq!(handles.next(), 3);
    }

    #[test]
    fn test_allocator_skips_zero_on_wrap() {
        let mut handles = HandleAllocator { next: u32::MAX };
        assert_eq!(handles.next(), u32::MAX);
        assert_eq!(handles.next(), 1);
    }
}
