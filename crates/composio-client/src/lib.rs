//! HTTP binding to the hosted action-execution platform
//!
//! [`ComposioClient`] implements the core
//! [`ExecutionBackend`](composio_core::ExecutionBackend),
//! [`ConnectionSource`](composio_core::ConnectionSource) and
//! [`ActionCatalog`](composio_core::ActionCatalog) traits, so tool sets and
//! the CLI can treat it like any other backend.

pub mod client;
pub mod config;
pub mod error;
mod wire;

pub use client::ComposioClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use error::{ClientError, ClientResult};
