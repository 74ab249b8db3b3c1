//! Intercepted entry point identifiers and call argument bundles
//!
//! Each hook-enabled native entry point has a stable [`FunctionHookId`], an
//! argument bundle variant in [`HookArgs`] and a result payload variant in
//! [`CallOutput`]. Hooks receive the bundle mutably so they can rewrite
//! arguments before the real call executes.

use crate::error::ApiError;
use crate::handles::{
    DeviceHandle, FenceHandle, ImageHandle, QueueHandle, SemaphoreHandle, SurfaceHandle,
    SwapchainHandle,
};
use crate::resource::FrameToken;

/// Identifier of a hook-enabled native entry point.
///
/// Everything else on the native API surface is pure passthrough and never
/// reaches the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionHookId {
    CreateSwapchain,
    DestroySwapchain,
    GetSwapchainImages,
    AcquireNextImage,
    QueuePresent,
    DeviceWaitIdle,
    CreateSurface,
    DestroySurface,
}

/// Which side of the real call a handler runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPhase {
    Before,
    After,
}

/// Swapchain creation parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapchainDesc {
    pub device: DeviceHandle,
    pub surface: SurfaceHandle,
    pub width: u32,
    pub height: u32,
    pub image_count: u32,
    pub vsync: bool,
}

/// Image acquisition parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquireDesc {
    pub device: DeviceHandle,
    pub swapchain: SwapchainHandle,
    pub timeout_ns: u64,
    pub semaphore: SemaphoreHandle,
    pub fence: FenceHandle,
}

/// Present parameters. Carries the application frame token so present-side
/// features and the recycler know which frame just completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentInfo {
    pub queue: QueueHandle,
    pub swapchain: SwapchainHandle,
    pub image_index: u32,
    pub wait_semaphores: Vec<SemaphoreHandle>,
    pub frame: FrameToken,
}

/// Window surface creation parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceDesc {
    pub device: DeviceHandle,
    /// Opaque native window handle (HWND, wl_surface, ...)
    pub window: u64,
}

/// Mutable argument bundle passed through a hook chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookArgs {
    CreateSwapchain(SwapchainDesc),
    DestroySwapchain {
        device: DeviceHandle,
        swapchain: SwapchainHandle,
    },
    GetSwapchainImages {
        device: DeviceHandle,
        swapchain: SwapchainHandle,
    },
    AcquireNextImage(AcquireDesc),
    QueuePresent(PresentInfo),
    DeviceWaitIdle {
        device: DeviceHandle,
    },
    CreateSurface(SurfaceDesc),
    DestroySurface {
        device: DeviceHandle,
        surface: SurfaceHandle,
    },
}

impl HookArgs {
    pub fn hook_id(&self) -> FunctionHookId {
        match self {
            Self::CreateSwapchain(_) => FunctionHookId::CreateSwapchain,
            Self::DestroySwapchain { .. } => FunctionHookId::DestroySwapchain,
            Self::GetSwapchainImages { .. } => FunctionHookId::GetSwapchainImages,
            Self::AcquireNextImage(_) => FunctionHookId::AcquireNextImage,
            Self::QueuePresent(_) => FunctionHookId::QueuePresent,
            Self::DeviceWaitIdle { .. } => FunctionHookId::DeviceWaitIdle,
            Self::CreateSurface(_) => FunctionHookId::CreateSurface,
            Self::DestroySurface { .. } => FunctionHookId::DestroySurface,
        }
    }
}

/// Result payload of a real (or skipped) native call.
///
/// `None` is what a skipped call yields; after-hooks may replace it with a
/// concrete payload when they performed the work themselves.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CallOutput {
    #[default]
    None,
    Swapchain(SwapchainHandle),
    Images(Vec<ImageHandle>),
    ImageIndex(u32),
    Surface(SurfaceHandle),
}

/// Outcome of one dispatched entry point
pub type CallResult = Result<CallOutput, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_map_to_hook_ids() {
        let args = HookArgs::DeviceWaitIdle {
            device: DeviceHandle(1),
        };
        assert_eq!(args.hook_id(), FunctionHookId::DeviceWaitIdle);

        let args = HookArgs::QueuePresent(PresentInfo {
            queue: QueueHandle(1),
            swapchain: SwapchainHandle(2),
            image_index: 0,
            wait_semaphores: vec![],
            frame: FrameToken(9),
        });
        assert_eq!(args.hook_id(), FunctionHookId::QueuePresent);
    }
}
