//! Frame-aware resource tag store

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashSet;
use parking_lot::{Mutex, RwLock};

use prism_sdk::{
    ApiError, Extent, FrameToken, NativeResource, PrecisionInfo, RenderApi, ResourceKind,
    ResourceLifecycle, TagFlags, ViewportId,
};

use super::TaggedResource;
use crate::frame::{FrameClock, FrameSlotRing};

/// Number of frames of tag history retained by the store
pub const TAG_FRAME_WINDOW: usize = 32;

/// A tag some consumer asked for, remembered so producers can tell which
/// resources must stay alive (and features can validate their inputs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequiredTag {
    pub viewport: ViewportId,
    pub kind: ResourceKind,
    pub lifecycle: ResourceLifecycle,
}

/// One frame's tag table. The stamped frame index lives under the same lock
/// as the table so readers always see a consistent (frame, tags) pair.
#[derive(Default)]
struct TagFrame {
    frame: Option<u64>,
    tags: HashMap<(ResourceKind, ViewportId), TaggedResource>,
}

impl TagFrame {
    fn clear(&mut self) {
        self.tags.clear();
        self.frame = None;
    }
}

/// Per-frame table of resource tags with a rolling history window.
///
/// Each frame slot is guarded by its own read/write lock: many concurrent
/// readers or one writer per slot, different slots fully independent.
/// Recycling takes the write side, so it is sequenced after all in-flight
/// reads of that slot.
pub struct ResourceTagStore {
    frames: FrameSlotRing<RwLock<TagFrame>>,
    clock: Arc<FrameClock>,
    api: RenderApi,
    /// Serializes recyclers; contended attempts just skip
    recycle_gate: Mutex<()>,
    /// Present frame the last recycle pass ran for
    prev_seen_present: AtomicU64,
    /// Highest frame index any writer has touched
    newest_frame: AtomicU64,
    required: DashSet<RequiredTag>,
}

impl ResourceTagStore {
    pub fn new(api: RenderApi, clock: Arc<FrameClock>) -> Self {
        Self {
            frames: FrameSlotRing::new(TAG_FRAME_WINDOW),
            clock,
            api,
            recycle_gate: Mutex::new(()),
            prev_seen_present: AtomicU64::new(u64::MAX),
            newest_frame: AtomicU64::new(0),
            required: DashSet::new(),
        }
    }

    /// Tag a resource for `(frame, kind, viewport)`.
    ///
    /// Passing `resource = None` clears the tag for that key. Writing into a
    /// frame the store has already recycled past is rejected with
    /// [`ApiError::InvalidState`]; tagging the same key twice in one frame
    /// overwrites (most recent write wins).
    #[allow(clippy::too_many_arguments)]
    pub fn set_tag(
        &self,
        frame: FrameToken,
        kind: ResourceKind,
        viewport: ViewportId,
        resource: Option<NativeResource>,
        extent: Option<Extent>,
        lifecycle: ResourceLifecycle,
        precision: Option<PrecisionInfo>,
    ) -> Result<(), ApiError> {
        self.recycle_tags();

        let f = frame.index();
        let horizon = self
            .newest_frame
            .load(Ordering::Acquire)
            .max(self.clock.present_frame().map_or(0, |p| p.index()));
        if horizon >= TAG_FRAME_WINDOW as u64 && f <= horizon - TAG_FRAME_WINDOW as u64 {
            return Err(ApiError::InvalidState(format!(
                "frame {f} already recycled past (newest seen {horizon})"
            )));
        }
        self.newest_frame.fetch_max(f, Ordering::AcqRel);

        let resource = match resource {
            Some(mut res) => {
                if self.api == RenderApi::D3D11 {
                    // Engine-provided states are unusable on the compute
                    // queue there; force the common state.
                    res.state = 0;
                } else if !res.has_state() {
                    tracing::error!(
                        "resource state not provided for {} tag, frame {f}",
                        kind.as_str()
                    );
                    return Err(ApiError::MissingResourceState);
                }
                Some(res)
            }
            None => None,
        };

        let mut slot = self.frames.slot(f).write();
        if slot.frame != Some(f) {
            // The slot still holds an older frame congruent mod the window;
            // recycle it before stamping the new index.
            if let Some(old) = slot.frame {
                tracing::debug!("recycling {} tags of frame {old} for frame {f}", slot.tags.len());
            }
            slot.clear();
            slot.frame = Some(f);
        }

        match resource {
            Some(res) => {
                if slot.tags.contains_key(&(kind, viewport)) {
                    tracing::debug!(
                        "{} tag for frame {f}, viewport {} overwritten",
                        kind.as_str(),
                        viewport.0
                    );
                }
                slot.tags.insert(
                    (kind, viewport),
                    TaggedResource {
                        resource: res,
                        extent,
                        lifecycle,
                        precision,
                    },
                );
                if self.is_required(kind, viewport) {
                    tracing::trace!(
                        "required {} tag set for frame {f}, viewport {}",
                        kind.as_str(),
                        viewport.0
                    );
                }
            }
            None => {
                slot.tags.remove(&(kind, viewport));
            }
        }
        Ok(())
    }

    /// Fetch the tag for `(kind, frame, viewport)`.
    ///
    /// A per-viewport miss falls back to [`ViewportId::GLOBAL`] when the kind
    /// allows it. A miss is `Ok(None)` for optional tags ("feature has no
    /// resource of this kind this frame") and [`ApiError::MissingTag`] when
    /// the caller marked the tag required.
    pub fn get_tag(
        &self,
        kind: ResourceKind,
        frame: FrameToken,
        viewport: ViewportId,
        optional: bool,
    ) -> Result<Option<TaggedResource>, ApiError> {
        // Remember what consumers ask for; queries at hook time imply the
        // resource must survive until present.
        self.required.insert(RequiredTag {
            viewport,
            kind,
            lifecycle: ResourceLifecycle::ValidUntilPresent,
        });

        let f = frame.index();
        let found = {
            let slot = self.frames.slot(f).read();
            if slot.frame == Some(f) {
                let mut tag = slot.tags.get(&(kind, viewport));
                if tag.is_none()
                    && !viewport.is_global()
                    && kind.flags().contains(TagFlags::VIEWPORT_FALLBACK)
                {
                    tag = slot.tags.get(&(kind, ViewportId::GLOBAL));
                }
                tag.copied()
            } else {
                tracing::info!("resource tags for frame {f} not set yet");
                None
            }
        };

        match found {
            Some(tag) => Ok(Some(tag)),
            None if optional => Ok(None),
            None => {
                tracing::error!(
                    "tag {} not set for frame {f}, viewport {}",
                    kind.as_str(),
                    viewport.0
                );
                Err(ApiError::MissingTag {
                    kind,
                    frame,
                    viewport,
                })
            }
        }
    }

    /// Proactively clear tag tables for frames that have fallen out of the
    /// retained window, even if no new write has touched their slot.
    ///
    /// Runs at most once per observed present frame; concurrent callers skip
    /// instead of queueing. Clearing a slot waits for its in-flight readers.
    pub fn recycle_tags(&self) {
        let Some(_gate) = self.recycle_gate.try_lock() else {
            return;
        };
        let Some(present) = self.clock.present_frame() else {
            return;
        };
        let cur = present.index();
        if self.prev_seen_present.swap(cur, Ordering::AcqRel) == cur {
            return;
        }
        if cur < TAG_FRAME_WINDOW as u64 {
            return;
        }

        let oldest_live = cur - TAG_FRAME_WINDOW as u64;
        for i in 0..self.frames.capacity() {
            let mut slot = self.frames.slot(i as u64).write();
            if let Some(stamped) = slot.frame {
                if stamped <= oldest_live {
                    tracing::debug!(
                        "recycling {} stale tags of frame {stamped} (present {cur})",
                        slot.tags.len()
                    );
                    slot.clear();
                }
            }
        }
    }

    /// Snapshot of every tag consumers have requested so far
    pub fn required_tags(&self) -> Vec<RequiredTag> {
        self.required.iter().map(|t| *t).collect()
    }

    pub fn is_required(&self, kind: ResourceKind, viewport: ViewportId) -> bool {
        self.required
            .iter()
            .any(|t| t.kind == kind && t.viewport == viewport)
    }

    /// Drop every stored tag and the required-tag history. Shutdown path.
    pub fn clear(&self) {
        for i in 0..self.frames.capacity() {
            self.frames.slot(i as u64).write().clear();
        }
        self.required.clear();
    }
}

impl Drop for ResourceTagStore {
    fn drop(&mut self) {
        self.clear();
    }
}
