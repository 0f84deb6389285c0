// Public API
pub mod cli;
pub mod commands;
pub mod ui;

// Core domain types
mod archive;
mod backup;
mod error;
mod hosts;
mod hostsblock;
mod merge;
mod resolve;
mod settings;
mod store;

// Re-export main types
pub use error::Error;
pub use hosts::{Host, HostTable};
pub use merge::{SettingsPatch, TablePatch};
pub use resolve::{resolve_category, resolve_host};
pub use settings::{Category, LogSettings, Settings};
pub use store::Store;
