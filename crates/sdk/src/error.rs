//! Error taxonomy for the interposition layer

use crate::resource::{FrameToken, ResourceKind, ViewportId};

/// Errors surfaced by prism core operations and hook chains.
///
/// Missing data (`MissingTag`, `MissingCameraData`) is a protocol condition,
/// not a crash: producers and consumers run on independent schedules and
/// callers are expected to fall back. `InvalidState` marks writes the store
/// has already recycled past and is never retried by the core.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// A required resource tag was requested but never set
    #[error("tag {kind:?} not set for frame {frame}, viewport {viewport:?}")]
    MissingTag {
        kind: ResourceKind,
        frame: FrameToken,
        viewport: ViewportId,
    },

    /// Camera data for the requested frame never arrived within the wait budget
    #[error("camera data for frame {0} not available")]
    MissingCameraData(FrameToken),

    /// Tagged resource carries no native state on a backend that needs one
    #[error("resource state must be provided")]
    MissingResourceState,

    /// Operation targets state the core has already moved past
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The underlying native call failed; carries the raw driver code
    #[error("native call failed with code {0}")]
    Native(i32),
}
