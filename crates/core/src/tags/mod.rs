//! Per-frame resource tagging
//!
//! Feature modules tag native GPU resources with a semantic role for a
//! specific `(frame, kind, viewport)` and consumers fetch them back on the
//! render or present thread, typically a few frames later. Tags live in a
//! rolling 32-frame window; once a frame falls out of the window its whole
//! tag table is recycled so handles never outlive their native lifetime.

mod store;

pub use store::{RequiredTag, ResourceTagStore, TAG_FRAME_WINDOW};

use prism_sdk::{Extent, NativeResource, PrecisionInfo, ResourceLifecycle};

/// One tagged resource record as stored per `(frame, kind, viewport)`.
///
/// Holds a reference to the application's resource, never ownership; the
/// declared lifecycle tells consumers how long the handle stays valid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaggedResource {
    pub resource: NativeResource,
    pub extent: Option<Extent>,
    pub lifecycle: ResourceLifecycle,
    pub precision: Option<PrecisionInfo>,
}
