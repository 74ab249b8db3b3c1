//! Prism core - frame-synchronized interposition runtime
//!
//! Sits between an application and its graphics driver. Feature modules hook
//! the handful of swapchain-related entry points, tag GPU resources per
//! frame, and feed camera matrices into a frame-indexed channel that late
//! consumers can wait on. Everything is keyed by the application's own frame
//! index, so producers and consumers running frames apart still meet on the
//! exact frame they mean.

pub mod camera;
pub mod config;
pub mod context;
pub mod frame;
pub mod hooks;
pub mod interposer;
pub mod logging;
pub mod tags;

pub use camera::{CameraData, CameraStream, PredictedCameraData};
pub use config::{CameraConfig, ConfigError, ConfigResult, CoreConfig};
pub use context::PrismContext;
pub use frame::{FrameClock, FrameSlotRing, WriteOutcome};
pub use hooks::{HookDispatcher, HookKey, HookRegistry};
pub use interposer::Interposer;
pub use tags::{ResourceTagStore, TaggedResource, TAG_FRAME_WINDOW};
