//! Real-call capability trait
//!
//! One implementation per native graphics backend. The synchronization core
//! and the hook dispatcher are backend-agnostic and only reach the driver
//! through this trait, so the interposer can be exercised against a mock in
//! tests and against Vulkan-like or D3D-like dispatch tables in production.

use crate::error::ApiError;
use crate::handles::{DeviceHandle, ImageHandle, SurfaceHandle, SwapchainHandle};
use crate::hooks::{AcquireDesc, PresentInfo, SurfaceDesc, SwapchainDesc};
use crate::resource::RenderApi;

/// The fixed set of native entry points prism intercepts.
///
/// Methods mirror the intercepted call sites one-to-one; the dispatcher
/// invokes them only when no before-hook skipped the real call. Destruction
/// calls return nothing, matching the void-returning natives they wrap.
pub trait DeviceBackend: Send + Sync {
    /// Native API this backend drives
    fn render_api(&self) -> RenderApi;

    fn create_swapchain(&self, desc: &SwapchainDesc) -> Result<SwapchainHandle, ApiError>;

    fn destroy_swapchain(&self, device: DeviceHandle, swapchain: SwapchainHandle);

    fn swapchain_images(
        &self,
        device: DeviceHandle,
        swapchain: SwapchainHandle,
    ) -> Result<Vec<ImageHandle>, ApiError>;

    /// Returns the index of the acquired swapchain image
    fn acquire_next_image(&self, desc: &AcquireDesc) -> Result<u32, ApiError>;

    fn queue_present(&self, info: &PresentInfo) -> Result<(), ApiError>;

    /// Blocks until the device finished all submitted work
    fn device_wait_idle(&self, device: DeviceHandle) -> Result<(), ApiError>;

    fn create_surface(&self, desc: &SurfaceDesc) -> Result<SurfaceHandle, ApiError>;

    fn destroy_surface(&self, device: DeviceHandle, surface: SurfaceHandle);
}
