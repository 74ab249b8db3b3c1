//! Opaque native handle newtypes
//!
//! Native objects (devices, queues, swapchains...) are referenced by the
//! host application's driver handles. Prism never dereferences them, it only
//! stores and forwards them, so each one is an opaque `u64` wrapped in its
//! own type to keep call sites honest. `0` is the null handle everywhere.

macro_rules! native_handle {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name(pub u64);

        impl $name {
            /// The null handle
            pub const NULL: Self = Self(0);

            /// Raw handle value as supplied by the application
            pub fn raw(self) -> u64 {
                self.0
            }

            pub fn is_null(self) -> bool {
                self.0 == 0
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }
    };
}

native_handle! {
    /// Logical device owned by the application
    DeviceHandle
}

native_handle! {
    /// Submission queue (graphics or present)
    QueueHandle
}

native_handle! {
    /// Swapchain created through the intercepted create call
    SwapchainHandle
}

native_handle! {
    /// Window surface backing a swapchain
    SurfaceHandle
}

native_handle! {
    /// Swapchain or feature-owned image
    ImageHandle
}

native_handle! {
    /// Binary semaphore used by acquire/present
    SemaphoreHandle
}

native_handle! {
    /// CPU-waitable fence
    FenceHandle
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_handles() {
        assert!(SwapchainHandle::NULL.is_null());
        assert!(!SwapchainHandle(7).is_null());
        assert_eq!(DeviceHandle::from(42).raw(), 42);
    }

    #[test]
    fn handle_types_are_distinct() {
        // Must not compile-compare across types; equality within a type only.
        assert_eq!(ImageHandle(3), ImageHandle(3));
        assert_ne!(ImageHandle(3), ImageHandle(4));
    }
}
