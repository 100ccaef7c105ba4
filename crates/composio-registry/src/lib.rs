//! Local action registry and dispatcher
//!
//! Handlers registered here run in-process behind the same
//! [`ExecutionBackend`](composio_core::ExecutionBackend) contract the hosted
//! platform exposes, which makes tool-calling loops testable offline.

pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod registry;

pub use dispatcher::{DispatcherConfig, LocalDispatcher};
pub use error::{HandlerError, RegistryError, RegistryResult};
pub use handler::{ActionHandler, FnHandler, HandlerContext};
pub use registry::HandlerRegistry;
