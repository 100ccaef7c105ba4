pub mod backend;
pub mod error;
pub mod memory;
pub mod resolve;
pub mod sanitization;
pub mod types;

// Re-export commonly used types
pub use backend::{ActionCatalog, ConnectionSource, ExecutionBackend};
pub use error::{CoreError, CoreResult};
pub use memory::MemoryConnectionSource;
pub use resolve::{resolve_account, resolve_connected_account, select_latest_active};
pub use sanitization::{is_sensitive_field, mask_secret, sanitize_json_value};
pub use types::{
    ActionName, ActionSchema, AppName, ConnectedAccount, ConnectedAccountId, ConnectionStatus,
    EntityId, ExecuteRequest, ExecuteResponse, DEFAULT_ENTITY_ID,
};
