//! Error types for the host adapter.

use std::path::PathBuf;

use localhist_chain::{ChainError, StorageError};
use thiserror::Error;

/// Errors raised while loading [`Settings`](crate::Settings).
#[derive(Debug, Error)]
pub enum SettingsError {
	/// The settings file exists but could not be read.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the settings file.
		path: PathBuf,
		/// The underlying I/O error.
		#[source]
		error: std::io::Error,
	},

	/// The settings file is not valid TOML for [`Settings`](crate::Settings).
	#[error("invalid settings in {path}: {error}")]
	Toml {
		/// Path to the settings file.
		path: PathBuf,
		/// The underlying parse error.
		#[source]
		error: toml::de::Error,
	},

	/// No platform data directory is available and no `storePath` was set.
	#[error("no data directory available; set storePath explicitly")]
	NoDataDir,
}

/// Everything a host command can fail with.
#[derive(Debug, Error)]
pub enum HostError {
	/// A chain operation failed.
	#[error(transparent)]
	Chain(#[from] ChainError),

	/// Loading or persisting the history store failed.
	#[error(transparent)]
	Storage(#[from] StorageError),

	/// Settings could not be loaded.
	#[error(transparent)]
	Settings(#[from] SettingsError),
}

impl HostError {
	/// Returns a short message suitable for a notification or status line.
	pub fn user_message(&self) -> String {
		match self {
			Self::Chain(ChainError::ContentTooLarge { size, limit }) => {
				format!("File is too large for local history ({size} bytes, limit {limit}).")
			}
			Self::Chain(ChainError::CorruptChain { index, .. }) => {
				format!("Local history for this file is damaged at revision #{index}.")
			}
			Self::Chain(ChainError::IndexOutOfRange { index, .. }) => {
				format!("Revision #{index} no longer exists.")
			}
			Self::Chain(ChainError::NoChainForFile { .. }) => {
				"No local history for this file yet.".to_string()
			}
			Self::Chain(ChainError::Patch(err)) => format!("Could not record this version: {err}"),
			Self::Storage(err) => format!("Could not save local history: {err}"),
			Self::Settings(err) => format!("Could not load local history settings: {err}"),
		}
	}
}

/// Result type for host operations.
pub type Result<T> = std::result::Result<T, HostError>;
