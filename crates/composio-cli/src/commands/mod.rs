pub mod accounts;
pub mod actions;
pub mod execute;
pub mod tools;

// Re-export command handlers
pub use accounts::AccountsCmd;
pub use actions::ActionsCmd;
pub use execute::{ExecuteArgs, ExecuteCommand};
pub use tools::ToolsCommand;
