//! Prism SDK - native graphics API type definitions
//!
//! This crate contains the backend-agnostic vocabulary shared by the prism
//! core and by feature modules: opaque native handles, resource tag types,
//! hook identifiers and call descriptors, plus the [`DeviceBackend`]
//! capability trait implemented once per native API (Vulkan-like, D3D-like).
//!
//! # Modules
//!
//! - [`handles`] - Opaque native handle newtypes
//! - [`resource`] - Resource tagging vocabulary (kinds, lifecycle, extents)
//! - [`hooks`] - Intercepted entry point identifiers and argument bundles
//! - [`backend`] - The real-call capability trait
//! - [`error`] - Error taxonomy for the interposition layer

pub mod backend;
pub mod error;
pub mod handles;
pub mod hooks;
pub mod resource;

pub use backend::DeviceBackend;
pub use error::ApiError;
pub use handles::*;
pub use hooks::*;
pub use resource::*;
