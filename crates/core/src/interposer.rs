//! Hook-enabled native entry points
//!
//! One method per intercepted call site. Each builds the argument bundle,
//! runs the dispatch contract against the registry and hands the real call
//! to the backend. Everything else on the native surface is passthrough and
//! never comes through here.

use std::sync::Arc;

use prism_sdk::{
    AcquireDesc, ApiError, CallOutput, DeviceBackend, DeviceHandle, HookArgs, ImageHandle,
    PresentInfo, SurfaceDesc, SurfaceHandle, SwapchainDesc, SwapchainHandle,
};

use crate::context::PrismContext;
use crate::hooks::HookDispatcher;

/// The interposition surface between the application and its driver.
///
/// Concurrent calls from different threads are independent dispatch
/// instances; ordering guarantees apply within one call only.
pub struct Interposer<B: DeviceBackend> {
    ctx: Arc<PrismContext>,
    backend: B,
}

impl<B: DeviceBackend> Interposer<B> {
    pub fn new(backend: B, ctx: Arc<PrismContext>) -> Self {
        Self { ctx, backend }
    }

    pub fn context(&self) -> &Arc<PrismContext> {
        &self.ctx
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn dispatcher(&self) -> HookDispatcher<'_> {
        HookDispatcher::new(&self.ctx.hooks)
    }

    pub fn create_swapchain(&self, desc: SwapchainDesc) -> Result<SwapchainHandle, ApiError> {
        let mut args = HookArgs::CreateSwapchain(desc);
        let out = self.dispatcher().dispatch(&mut args, |args| match args {
            HookArgs::CreateSwapchain(desc) => {
                self.backend.create_swapchain(desc).map(CallOutput::Swapchain)
            }
            _ => Err(ApiError::InvalidState("argument bundle mismatch".into())),
        })?;
        match out {
            CallOutput::Swapchain(handle) => Ok(handle),
            // Skipped with no after-hook replacement: nothing was created.
            CallOutput::None => Ok(SwapchainHandle::NULL),
            other => Err(ApiError::InvalidState(format!(
                "unexpected create-swapchain output {other:?}"
            ))),
        }
    }

    pub fn destroy_swapchain(&self, device: DeviceHandle, swapchain: SwapchainHandle) {
        let mut args = HookArgs::DestroySwapchain { device, swapchain };
        self.dispatcher().dispatch_void(&mut args, |args| {
            if let HookArgs::DestroySwapchain { device, swapchain } = args {
                self.backend.destroy_swapchain(*device, *swapchain);
            }
        });
    }

    pub fn swapchain_images(
        &self,
        device: DeviceHandle,
        swapchain: SwapchainHandle,
    ) -> Result<Vec<ImageHandle>, ApiError> {
        let mut args = HookArgs::GetSwapchainImages { device, swapchain };
        let out = self.dispatcher().dispatch(&mut args, |args| match args {
            HookArgs::GetSwapchainImages { device, swapchain } => self
                .backend
                .swapchain_images(*device, *swapchain)
                .map(CallOutput::Images),
            _ => Err(ApiError::InvalidState("argument bundle mismatch".into())),
        })?;
        match out {
            CallOutput::Images(images) => Ok(images),
            CallOutput::None => Ok(Vec::new()),
            other => Err(ApiError::InvalidState(format!(
                "unexpected get-swapchain-images output {other:?}"
            ))),
        }
    }

    pub fn acquire_next_image(&self, desc: AcquireDesc) -> Result<u32, ApiError> {
        let mut args = HookArgs::AcquireNextImage(desc);
        let out = self.dispatcher().dispatch(&mut args, |args| match args {
            HookArgs::AcquireNextImage(desc) => self
                .backend
                .acquire_next_image(desc)
                .map(CallOutput::ImageIndex),
            _ => Err(ApiError::InvalidState("argument bundle mismatch".into())),
        })?;
        match out {
            CallOutput::ImageIndex(index) => Ok(index),
            CallOutput::None => Ok(0),
            other => Err(ApiError::InvalidState(format!(
                "unexpected acquire output {other:?}"
            ))),
        }
    }

    /// Present a frame. On success the presented frame is marked on the
    /// clock and stale resource tags are recycled.
    pub fn queue_present(&self, info: PresentInfo) -> Result<(), ApiError> {
        let frame = info.frame;
        let mut args = HookArgs::QueuePresent(info);
        let result = self.dispatcher().dispatch(&mut args, |args| match args {
            HookArgs::QueuePresent(info) => {
                self.backend.queue_present(info).map(|()| CallOutput::None)
            }
            _ => Err(ApiError::InvalidState("argument bundle mismatch".into())),
        });

        match result {
            Ok(_) => {
                self.ctx.clock.mark_present(frame);
                self.ctx.tags.recycle_tags();
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    pub fn device_wait_idle(&self, device: DeviceHandle) -> Result<(), ApiError> {
        let mut args = HookArgs::DeviceWaitIdle { device };
        self.dispatcher()
            .dispatch(&mut args, |args| match args {
                HookArgs::DeviceWaitIdle { device } => {
                    self.backend.device_wait_idle(*device).map(|()| CallOutput::None)
                }
                _ => Err(ApiError::InvalidState("argument bundle mismatch".into())),
            })
            .map(|_| ())
    }

    pub fn create_surface(&self, desc: SurfaceDesc) -> Result<SurfaceHandle, ApiError> {
        let mut args = HookArgs::CreateSurface(desc);
        let out = self.dispatcher().dispatch(&mut args, |args| match args {
            HookArgs::CreateSurface(desc) => {
                self.backend.create_surface(desc).map(CallOutput::Surface)
            }
            _ => Err(ApiError::InvalidState("argument bundle mismatch".into())),
        })?;
        match out {
            CallOutput::Surface(handle) => Ok(handle),
            CallOutput::None => Ok(SurfaceHandle::NULL),
            other => Err(ApiError::InvalidState(format!(
                "unexpected create-surface output {other:?}"
            ))),
        }
    }

    pub fn destroy_surface(&self, device: DeviceHandle, surface: SurfaceHandle) {
        let mut args = HookArgs::DestroySurface { device, surface };
        self.dispatcher().dispatch_void(&mut args, |args| {
            if let HookArgs::DestroySurface { device, surface } = args {
                self.backend.destroy_surface(*device, *surface);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use prism_sdk::{
        FeatureId, FrameToken, FunctionHookId, NativeResource, QueueHandle, RenderApi,
        ResourceKind, ResourceLifecycle, SemaphoreHandle, ViewportId,
    };

    use crate::config::CoreConfig;
    use crate::tags::TAG_FRAME_WINDOW;

    /// Records real calls; counters observable from hooks.
    #[derive(Default)]
    struct MockBackend {
        calls: Mutex<Vec<&'static str>>,
        presents: AtomicU32,
    }

    impl MockBackend {
        fn record(&self, call: &'static str) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl DeviceBackend for &MockBackend {
        fn render_api(&self) -> RenderApi {
            RenderApi::Vulkan
        }

        fn create_swapchain(&self, desc: &SwapchainDesc) -> Result<SwapchainHandle, ApiError> {
            self.record("create_swapchain");
            Ok(SwapchainHandle(desc.surface.raw() + 1000))
        }

        fn destroy_swapchain(&self, _device: DeviceHandle, _swapchain: SwapchainHandle) {
            self.record("destroy_swapchain");
        }

        fn swapchain_images(
            &self,
            _device: DeviceHandle,
            _swapchain: SwapchainHandle,
        ) -> Result<Vec<ImageHandle>, ApiError> {
            self.record("swapchain_images");
            Ok(vec![ImageHandle(1), ImageHandle(2), ImageHandle(3)])
        }

        fn acquire_next_image(&self, _desc: &AcquireDesc) -> Result<u32, ApiError> {
            self.record("acquire_next_image");
            Ok(1)
        }

        fn queue_present(&self, _info: &PresentInfo) -> Result<(), ApiError> {
            self.record("queue_present");
            self.presents.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn device_wait_idle(&self, _device: DeviceHandle) -> Result<(), ApiError> {
            self.record("device_wait_idle");
            Ok(())
        }

        fn create_surface(&self, _desc: &SurfaceDesc) -> Result<SurfaceHandle, ApiError> {
            self.record("create_surface");
            Ok(SurfaceHandle(55))
        }

        fn destroy_surface(&self, _device: DeviceHandle, _surface: SurfaceHandle) {
            self.record("destroy_surface");
        }
    }

    fn interposer(backend: &MockBackend) -> Interposer<&MockBackend> {
        let ctx = PrismContext::new(CoreConfig::default(), RenderApi::Vulkan);
        Interposer::new(backend, ctx)
    }

    fn present_info(frame: u64) -> PresentInfo {
        PresentInfo {
            queue: QueueHandle(1),
            swapchain: SwapchainHandle(1),
            image_index: 0,
            wait_semaphores: vec![SemaphoreHandle(4)],
            frame: FrameToken(frame),
        }
    }

    #[test]
    fn passthrough_without_hooks() {
        let backend = MockBackend::default();
        let ip = interposer(&backend);

        let surface = ip
            .create_surface(SurfaceDesc {
                device: DeviceHandle(1),
                window: 0xabc,
            })
            .unwrap();
        assert_eq!(surface, SurfaceHandle(55));

        let swapchain = ip
            .create_swapchain(SwapchainDesc {
                device: DeviceHandle(1),
                surface,
                width: 1920,
                height: 1080,
                image_count: 3,
                vsync: true,
            })
            .unwrap();
        assert_eq!(swapchain, SwapchainHandle(1055));

        assert_eq!(ip.swapchain_images(DeviceHandle(1), swapchain).unwrap().len(), 3);
        assert_eq!(
            backend.calls(),
            vec!["create_surface", "create_swapchain", "swapchain_images"]
        );
    }

    #[test]
    fn skipping_before_hook_suppresses_real_present() {
        let backend = MockBackend::default();
        let ip = interposer(&backend);

        ip.context()
            .hooks
            .register_before(FunctionHookId::QueuePresent, FeatureId::LATENCY, |_, control| {
                // Feature presents through its own path.
                control.skip = true;
                Ok(())
            });

        ip.queue_present(present_info(1)).unwrap();
        assert_eq!(backend.presents.load(Ordering::SeqCst), 0);
        // The frame still counts as presented for the clock.
        assert_eq!(ip.context().clock.present_frame(), Some(FrameToken(1)));
    }

    #[test]
    fn failing_before_hook_propagates_to_caller() {
        let backend = MockBackend::default();
        let ip = interposer(&backend);

        ip.context().hooks.register_before(
            FunctionHookId::AcquireNextImage,
            FeatureId::COMMON,
            |_, _| Err(ApiError::Native(-2)),
        );

        let err = ip
            .acquire_next_image(AcquireDesc {
                device: DeviceHandle(1),
                swapchain: SwapchainHandle(1),
                timeout_ns: u64::MAX,
                semaphore: SemaphoreHandle(1),
                fence: prism_sdk::FenceHandle::NULL,
            })
            .unwrap_err();
        assert_eq!(err, ApiError::Native(-2));
        assert!(backend.calls().is_empty(), "real call must not run");
    }

    #[test]
    fn present_drives_tag_recycling() {
        let backend = MockBackend::default();
        let ip = interposer(&backend);
        let ctx = ip.context();

        ctx.tags
            .set_tag(
                FrameToken(1),
                ResourceKind::DepthBuffer,
                ViewportId(0),
                Some(NativeResource::new(0xd, 2)),
                None,
                ResourceLifecycle::ValidUntilPresent,
                None,
            )
            .unwrap();

        ip.queue_present(present_info(1 + TAG_FRAME_WINDOW as u64)).unwrap();

        let got = ctx
            .tags
            .get_tag(ResourceKind::DepthBuffer, FrameToken(1), ViewportId(0), true)
            .unwrap();
        assert_eq!(got, None, "tags older than the window are recycled at present");
    }

    #[test]
    fn destroy_calls_are_forwarded() {
        let backend = MockBackend::default();
        let ip = interposer(&backend);
        ip.destroy_swapchain(DeviceHandle(1), SwapchainHandle(2));
        ip.destroy_surface(DeviceHandle(1), SurfaceHandle(3));
        ip.device_wait_idle(DeviceHandle(1)).unwrap();
        assert_eq!(
            backend.calls(),
            vec!["destroy_swapchain", "destroy_surface", "device_wait_idle"]
        );
    }

    #[test]
    fn after_hook_observes_present_and_tags_backbuffer() {
        let backend = MockBackend::default();
        let ip = interposer(&backend);
        let ctx = Arc::clone(ip.context());

        let hook_ctx = Arc::clone(&ctx);
        ctx.hooks.register_after(
            FunctionHookId::QueuePresent,
            FeatureId::SCALING,
            move |args, result| {
                if result.is_err() {
                    return Ok(());
                }
                if let HookArgs::QueuePresent(info) = args {
                    hook_ctx
                        .tags
                        .set_tag(
                            info.frame,
                            ResourceKind::Backbuffer,
                            ViewportId::GLOBAL,
                            Some(NativeResource::new(0xbb, 0)),
                            None,
                            ResourceLifecycle::ValidUntilPresent,
                            None,
                        )?;
                }
                Ok(())
            },
        );

        ip.queue_present(present_info(3)).unwrap();

        let tag = ctx
            .tags
            .get_tag(ResourceKind::Backbuffer, FrameToken(3), ViewportId(7), true)
            .unwrap()
            .unwrap();
        assert_eq!(tag.resource.handle, 0xbb, "global backbuffer visible via fallback");
    }
}
