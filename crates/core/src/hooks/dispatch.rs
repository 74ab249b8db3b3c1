//! The intercepted-call contract
//!
//! Every hook-enabled entry point runs the same state machine:
//! before-hooks -> real call (unless skipped) -> after-hooks -> result.
//! First failure wins at every stage; the real call is never retried.

use prism_sdk::{CallOutput, CallResult, HookArgs};

use super::registry::{HookControl, HookRegistry};

/// Executes hook chains against a registry.
///
/// Stateless with respect to the registry: the skip flag and result are
/// call-local, so concurrent dispatches of the same function are fully
/// independent.
pub struct HookDispatcher<'r> {
    registry: &'r HookRegistry,
}

impl<'r> HookDispatcher<'r> {
    pub fn new(registry: &'r HookRegistry) -> Self {
        Self { registry }
    }

    /// Run the full chain for `args`, with `real` performing the underlying
    /// native call.
    ///
    /// Before-hooks run in registration order and may rewrite `args` or set
    /// the skip flag; the first failing hook aborts the dispatch and its
    /// error is returned, without rolling back earlier hooks' effects. If
    /// nothing skipped, `real` runs once. After-hooks then observe the
    /// result (or [`CallOutput::None`] if skipped) and may replace it;
    /// failures again win immediately.
    pub fn dispatch(
        &self,
        args: &mut HookArgs,
        real: impl FnOnce(&HookArgs) -> CallResult,
    ) -> CallResult {
        let id = args.hook_id();

        let mut control = HookControl::default();
        for (hook, feature) in self.registry.before_hooks(id) {
            if let Err(err) = hook(args, &mut control) {
                tracing::debug!("before-hook of feature {} failed {id:?}: {err}", feature.0);
                return Err(err);
            }
        }

        let mut result = if control.skip {
            tracing::trace!("real call for {id:?} skipped by before-hook");
            Ok(CallOutput::None)
        } else {
            real(args)
        };

        for (hook, feature) in self.registry.after_hooks(id) {
            if let Err(err) = hook(args, &mut result) {
                tracing::debug!("after-hook of feature {} failed {id:?}: {err}", feature.0);
                return Err(err);
            }
        }

        result
    }

    /// Chain for void-returning natives (the destroy entry points): every
    /// before-hook runs (a failure is logged, not propagated - there is no
    /// result to return), then the real call unless skipped. No after-hooks.
    pub fn dispatch_void(&self, args: &mut HookArgs, real: impl FnOnce(&HookArgs)) {
        let id = args.hook_id();

        let mut control = HookControl::default();
        for (hook, feature) in self.registry.before_hooks(id) {
            if let Err(err) = hook(args, &mut control) {
                tracing::warn!(
                    "before-hook of feature {} failed void entry point {id:?}: {err}",
                    feature.0
                );
            }
        }

        if !control.skip {
            real(args);
        }
    }
}
