//! Document-lifecycle middleware for multi-root C/C++ language sessions.
//!
//! The host editor hands every open, will-save, and close event to a
//! [`DocumentLifecycleInterceptor`]. It finds the owning [`Session`] through
//! a [`ClientRegistry`], keeps that session's tracked-document set
//! consistent, and forwards each event at most once. Documents opened as C
//! that look like C++ are pinned to C++ and reopened by the [`Host`] instead
//! of being forwarded.

pub mod classify;
mod host;
mod interceptor;
pub mod logging;
pub mod protocol;
mod registry;
mod session;

pub use host::cpp_content_present;
pub use host::mark_cpp_content_present;
pub use host::Host;
pub use interceptor::CloseOutcome;
pub use interceptor::DocumentLifecycleInterceptor;
pub use interceptor::OpenOutcome;
pub use registry::ClientRegistry;
pub use registry::WorkspaceRegistry;
pub use session::ForwardError;
pub use session::Readiness;
pub use session::Session;
