//! Hook system
//!
//! Feature modules register before/after handlers against the small fixed
//! set of intercepted native entry points; the dispatcher runs them in
//! registration order around the real call with skip and first-failure-wins
//! semantics. Registration happens during single-threaded startup, dispatch
//! from whatever thread the application calls the native API on.

mod dispatch;
mod registry;

pub use dispatch::HookDispatcher;
pub use registry::{AfterHookFn, BeforeHookFn, HookControl, HookKey, HookRegistry};
