//! Process-wide interposition context
//!
//! One explicitly constructed and explicitly owned object holding every
//! shared subsystem. Built once at load, shared as `Arc` with the
//! interposer and feature modules, torn down at unload. No hidden statics.

use std::sync::Arc;

use prism_sdk::RenderApi;

use crate::camera::CameraStream;
use crate::config::CoreConfig;
use crate::frame::FrameClock;
use crate::hooks::HookRegistry;
use crate::tags::ResourceTagStore;

/// Shared state of the interposition layer
pub struct PrismContext {
    pub config: CoreConfig,
    /// Most recently presented application frame
    pub clock: Arc<FrameClock>,
    pub tags: ResourceTagStore,
    pub camera: CameraStream,
    pub hooks: HookRegistry,
}

impl PrismContext {
    pub fn new(config: CoreConfig, api: RenderApi) -> Arc<Self> {
        let clock = Arc::new(FrameClock::new());
        let tags = ResourceTagStore::new(api, Arc::clone(&clock));
        let camera = CameraStream::new(&config.camera);

        tracing::info!("prism context created ({api:?})");
        Arc::new(Self {
            config,
            clock,
            tags,
            camera,
            hooks: HookRegistry::new(),
        })
    }

    /// Release everything the context retains on behalf of features.
    ///
    /// Hook entries only ever go away here; tag tables are cleared so no
    /// native handle stays reachable past unload.
    pub fn shutdown(&self) {
        self.hooks.clear();
        self.tags.clear();
        tracing::info!("prism context shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_sdk::{
        FeatureId, FrameToken, FunctionHookId, NativeResource, ResourceKind, ResourceLifecycle,
        ViewportId,
    };

    #[test]
    fn shutdown_clears_hooks_and_tags() {
        let ctx = PrismContext::new(CoreConfig::default(), RenderApi::Vulkan);

        ctx.hooks
            .register_before(FunctionHookId::QueuePresent, FeatureId(1), |_, _| Ok(()));
        ctx.tags
            .set_tag(
                FrameToken(1),
                ResourceKind::DepthBuffer,
                ViewportId(0),
                Some(NativeResource::new(0x1, 0)),
                None,
                ResourceLifecycle::ValidUntilPresent,
                None,
            )
            .unwrap();

        ctx.shutdown();

        assert!(ctx.hooks.before_hooks(FunctionHookId::QueuePresent).is_empty());
        let got = ctx
            .tags
            .get_tag(ResourceKind::DepthBuffer, FrameToken(1), ViewportId(0), true)
            .unwrap();
        assert_eq!(got, None);
    }
}
