//! Ordered hook registration per intercepted entry point

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use slotmap::{new_key_type, SlotMap};

use prism_sdk::{ApiError, CallResult, FeatureId, FunctionHookId, HookArgs, HookPhase};

new_key_type! {
    /// Handle for a registered hook
    pub struct HookKey;
}

/// Call-local dispatch state a before-hook may flip to suppress the real call
#[derive(Debug, Default)]
pub struct HookControl {
    pub skip: bool,
}

/// Handler running before the real call. Receives the argument bundle
/// mutably (it may rewrite arguments) and the skip flag; an `Err` aborts the
/// whole dispatch.
pub type BeforeHookFn =
    Arc<dyn Fn(&mut HookArgs, &mut HookControl) -> Result<(), ApiError> + Send + Sync>;

/// Handler running after the real (or skipped) call. Observes the call
/// result mutably and may replace it; an `Err` becomes the dispatch result.
pub type AfterHookFn =
    Arc<dyn Fn(&mut HookArgs, &mut CallResult) -> Result<(), ApiError> + Send + Sync>;

enum HookFn {
    Before(BeforeHookFn),
    After(AfterHookFn),
}

struct HookEntry {
    feature: FeatureId,
    func: HookFn,
}

#[derive(Default)]
struct RegistryInner {
    entries: SlotMap<HookKey, HookEntry>,
    /// Registration order per (function, phase); dispatch order follows it
    order: HashMap<(FunctionHookId, HookPhase), Vec<HookKey>>,
}

/// Registration table of before/after handlers per intercepted function.
///
/// Registration happens during single-threaded feature startup; afterwards
/// the table is effectively read-only and dispatch-time lookups clone the
/// handler list out under a short read lock. Entries are only removed at
/// full shutdown. No de-duplication: registering the same handler twice
/// runs it twice.
pub struct HookRegistry {
    inner: RwLock<RegistryInner>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(RegistryInner::default()),
        }
    }

    /// Append a before-hook for `id`. Later registrations run later.
    pub fn register_before<F>(&self, id: FunctionHookId, feature: FeatureId, hook: F) -> HookKey
    where
        F: Fn(&mut HookArgs, &mut HookControl) -> Result<(), ApiError> + Send + Sync + 'static,
    {
        self.register(id, HookPhase::Before, feature, HookFn::Before(Arc::new(hook)))
    }

    /// Append an after-hook for `id`. Later registrations run later.
    pub fn register_after<F>(&self, id: FunctionHookId, feature: FeatureId, hook: F) -> HookKey
    where
        F: Fn(&mut HookArgs, &mut CallResult) -> Result<(), ApiError> + Send + Sync + 'static,
    {
        self.register(id, HookPhase::After, feature, HookFn::After(Arc::new(hook)))
    }

    fn register(
        &self,
        id: FunctionHookId,
        phase: HookPhase,
        feature: FeatureId,
        func: HookFn,
    ) -> HookKey {
        let mut inner = self.inner.write();
        let key = inner.entries.insert(HookEntry { feature, func });
        inner.order.entry((id, phase)).or_default().push(key);
        tracing::debug!(
            "registered {phase:?}-hook for {id:?} (feature {}, total {})",
            feature.0,
            inner.order[&(id, phase)].len()
        );
        key
    }

    /// Before-hooks for `id` in registration order. Handlers are cloned out
    /// so no registry lock is held while they run.
    pub fn before_hooks(&self, id: FunctionHookId) -> Vec<(BeforeHookFn, FeatureId)> {
        let inner = self.inner.read();
        let Some(keys) = inner.order.get(&(id, HookPhase::Before)) else {
            return Vec::new();
        };
        keys.iter()
            .filter_map(|key| match inner.entries.get(*key) {
                Some(HookEntry {
                    feature,
                    func: HookFn::Before(f),
                }) => Some((Arc::clone(f), *feature)),
                _ => None,
            })
            .collect()
    }

    /// After-hooks for `id` in registration order
    pub fn after_hooks(&self, id: FunctionHookId) -> Vec<(AfterHookFn, FeatureId)> {
        let inner = self.inner.read();
        let Some(keys) = inner.order.get(&(id, HookPhase::After)) else {
            return Vec::new();
        };
        keys.iter()
            .filter_map(|key| match inner.entries.get(*key) {
                Some(HookEntry {
                    feature,
                    func: HookFn::After(f),
                }) => Some((Arc::clone(f), *feature)),
                _ => None,
            })
            .collect()
    }

    pub fn hook_count(&self, id: FunctionHookId, phase: HookPhase) -> usize {
        self.inner
            .read()
            .order
            .get(&(id, phase))
            .map_or(0, Vec::len)
    }

    /// Remove every hook. Shutdown path only.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.entries.clear();
        inner.order.clear();
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}
