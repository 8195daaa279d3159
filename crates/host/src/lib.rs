//! Host adapter for local history.
//!
//! Editors translate their save events and history UI actions into
//! [`HostCommand`]s and pass them to [`LocalHistory::handle`]. The adapter owns
//! the [`ChainStore`](localhist_chain::ChainStore), persists it through a
//! [`HistoryStorage`](localhist_chain::HistoryStorage) backend after every
//! mutation, and turns errors into short user-facing messages.

/// Host commands and responses.
pub mod command;
/// Host error types.
pub mod error;
/// TOML settings.
pub mod settings;
/// JSON file storage backend.
pub mod storage;

mod service;

pub use command::{HistoryView, HostCommand, HostResponse, RestoreMode};
pub use error::{HostError, Result, SettingsError};
pub use service::{LocalHistory, unified_diff};
pub use settings::{Settings, default_settings_path};
pub use storage::JsonFileStorage;
