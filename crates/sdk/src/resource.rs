//! Resource tagging vocabulary
//!
//! Feature modules tag native GPU resources with a semantic role per frame
//! and viewport. The types here describe those tags; the tables that store
//! them live in `prism-core`.

use bitflags::bitflags;

/// Native graphics API the backend talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderApi {
    #[default]
    Vulkan,
    D3D11,
    D3D12,
}

/// Monotonically increasing identifier for one simulated/rendered frame.
///
/// Supplied by the host application; frame 0 is reserved (first-frame camera
/// data is never consumed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FrameToken(pub u64);

impl FrameToken {
    pub fn index(self) -> u64 {
        self.0
    }
}

impl From<u64> for FrameToken {
    fn from(index: u64) -> Self {
        Self(index)
    }
}

impl std::fmt::Display for FrameToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Independently rendered sub-view within one frame (e.g. split-screen).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ViewportId(pub u32);

impl ViewportId {
    /// Sentinel viewport for tags shared by all viewports. Lookups for a
    /// specific viewport fall back to this slot when the kind allows it.
    pub const GLOBAL: Self = Self(u32::MAX);

    pub fn is_global(self) -> bool {
        self == Self::GLOBAL
    }
}

/// Identifier of a loaded feature module, assigned at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeatureId(pub u32);

impl FeatureId {
    /// The common/core feature, always loaded first
    pub const COMMON: Self = Self(0);
    /// Latency reduction / camera prediction feature
    pub const LATENCY: Self = Self(1);
    /// Image scaling feature
    pub const SCALING: Self = Self(2);
}

/// Sub-rectangle of a tagged resource that holds meaningful data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Extent {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl Extent {
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            left: 0,
            top: 0,
            width,
            height,
        }
    }
}

/// Optional precision metadata chained to a tag (packed-buffer decode info)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PrecisionInfo {
    pub bias: f32,
    pub scale: f32,
}

/// How long a tagged resource stays valid from the tagging call onward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceLifecycle {
    /// Valid only at the tagging call site; consumers must not cache it
    OnlyValidNow,
    /// Valid until the frame is presented
    ValidUntilPresent,
    /// Valid until the feature evaluate call for this frame completes
    ValidUntilEvaluate,
}

bitflags! {
    /// Per-kind tagging behavior
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TagFlags: u8 {
        /// Features write into this resource; it belongs to the engine and
        /// is never snapshotted.
        const RENDER_TARGET_WRITE = 1 << 0;
        /// A per-viewport lookup miss may fall back to the global viewport.
        const VIEWPORT_FALLBACK = 1 << 1;
    }
}

/// Semantic role of a tagged resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    DepthBuffer,
    MotionVectors,
    ExposureTexture,
    ScalingInputColor,
    ScalingOutputColor,
    UiColorAndAlpha,
    AmbientOcclusionDenoised,
    ShadowDenoised,
    Backbuffer,
}

impl ResourceKind {
    pub fn flags(self) -> TagFlags {
        match self {
            Self::DepthBuffer | Self::MotionVectors => TagFlags::VIEWPORT_FALLBACK,
            Self::ExposureTexture => TagFlags::VIEWPORT_FALLBACK,
            Self::ScalingInputColor | Self::UiColorAndAlpha => TagFlags::empty(),
            Self::ScalingOutputColor | Self::AmbientOcclusionDenoised | Self::ShadowDenoised => {
                TagFlags::RENDER_TARGET_WRITE
            }
            Self::Backbuffer => TagFlags::RENDER_TARGET_WRITE | TagFlags::VIEWPORT_FALLBACK,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::DepthBuffer => "depth-buffer",
            Self::MotionVectors => "motion-vectors",
            Self::ExposureTexture => "exposure-texture",
            Self::ScalingInputColor => "scaling-input-color",
            Self::ScalingOutputColor => "scaling-output-color",
            Self::UiColorAndAlpha => "ui-color-and-alpha",
            Self::AmbientOcclusionDenoised => "ambient-occlusion-denoised",
            Self::ShadowDenoised => "shadow-denoised",
            Self::Backbuffer => "backbuffer",
        }
    }
}

/// Reference to a native GPU resource as supplied by the application.
///
/// Prism stores the handle and its declared state; it never owns the
/// underlying object. The application keeps it alive for the tag's declared
/// lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeResource {
    pub handle: u64,
    /// Native resource state (layout/barrier state). [`Self::STATE_UNKNOWN`]
    /// means the application did not provide one.
    pub state: u32,
}

impl NativeResource {
    pub const STATE_UNKNOWN: u32 = u32::MAX;

    pub fn new(handle: u64, state: u32) -> Self {
        Self { handle, state }
    }

    /// Resource handle with no declared state
    pub fn untracked(handle: u64) -> Self {
        Self {
            handle,
            state: Self::STATE_UNKNOWN,
        }
    }

    pub fn has_state(&self) -> bool {
        self.state != Self::STATE_UNKNOWN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_kinds_are_write_tags() {
        assert!(ResourceKind::ScalingOutputColor
            .flags()
            .contains(TagFlags::RENDER_TARGET_WRITE));
        assert!(!ResourceKind::DepthBuffer
            .flags()
            .contains(TagFlags::RENDER_TARGET_WRITE));
    }

    #[test]
    fn depth_falls_back_to_global_viewport() {
        assert!(ResourceKind::DepthBuffer
            .flags()
            .contains(TagFlags::VIEWPORT_FALLBACK));
        assert!(!ResourceKind::ScalingInputColor
            .flags()
            .contains(TagFlags::VIEWPORT_FALLBACK));
    }

    #[test]
    fn resource_state_sentinel() {
        assert!(!NativeResource::untracked(0xdead).has_state());
        assert!(NativeResource::new(0xdead, 3).has_state());
    }
}
