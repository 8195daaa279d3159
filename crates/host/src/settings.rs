//! User settings, read from a TOML file.
//!
//! Keys use the camelCase names editors expose in their settings UIs:
//!
//! ```toml
//! maxRevisionsPerFile = 50
//! maxContentBytes = 5242880
//! storePath = "/home/me/.local/share/localhist/history.json"
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use localhist_chain::RetentionLimits;
use localhist_chain::retention::{
	DEFAULT_MAX_CONTENT_BYTES, DEFAULT_MAX_REVISIONS, MAX_MAX_REVISIONS, MIN_MAX_REVISIONS,
	clamp_max_revisions,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::SettingsError;

const APP_DIR: &str = "localhist";

/// Local history settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
	/// Revisions kept per file, in `[1, 1000]`.
	pub max_revisions_per_file: usize,
	/// Snapshots larger than this many bytes are skipped.
	pub max_content_bytes: usize,
	/// Location of the JSON history file.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub store_path: Option<PathBuf>,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			max_revisions_per_file: DEFAULT_MAX_REVISIONS,
			max_content_bytes: DEFAULT_MAX_CONTENT_BYTES,
			store_path: None,
		}
	}
}

impl Settings {
	/// Reads settings from `path`. A missing file yields the defaults.
	///
	/// Out-of-range values are clamped with a warning.
	///
	/// # Errors
	///
	/// Returns [`SettingsError`] if the file exists but cannot be read or parsed.
	pub fn load(path: &Path) -> Result<Self, SettingsError> {
		let text = match std::fs::read_to_string(path) {
			Ok(text) => text,
			Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Self::default()),
			Err(error) => {
				return Err(SettingsError::Io {
					path: path.to_path_buf(),
					error,
				});
			}
		};
		Self::from_toml(&text).map_err(|error| SettingsError::Toml {
			path: path.to_path_buf(),
			error,
		})
	}

	/// Parses settings from TOML text and clamps them.
	///
	/// # Errors
	///
	/// Returns the parse error if `text` is not valid settings TOML.
	pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
		toml::from_str::<Self>(text).map(Self::normalized)
	}

	/// Returns these settings with the revision cap clamped into range.
	pub fn normalized(mut self) -> Self {
		let clamped = clamp_max_revisions(self.max_revisions_per_file);
		if clamped != self.max_revisions_per_file {
			warn!(
				requested = self.max_revisions_per_file,
				clamped,
				min = MIN_MAX_REVISIONS,
				max = MAX_MAX_REVISIONS,
				"maxRevisionsPerFile out of range"
			);
			self.max_revisions_per_file = clamped;
		}
		self
	}

	/// Returns the limits the chain store enforces.
	pub fn limits(&self) -> RetentionLimits {
		RetentionLimits {
			max_revisions: self.max_revisions_per_file,
			max_content_bytes: self.max_content_bytes,
		}
		.clamped()
	}

	/// Returns the history file location: `storePath` if set, otherwise
	/// `<data dir>/localhist/history.json`.
	///
	/// # Errors
	///
	/// Returns [`SettingsError::NoDataDir`] if neither is available.
	pub fn resolved_store_path(&self) -> Result<PathBuf, SettingsError> {
		if let Some(path) = &self.store_path {
			return Ok(path.clone());
		}
		dirs::data_dir()
			.map(|dir| dir.join(APP_DIR).join("history.json"))
			.ok_or(SettingsError::NoDataDir)
	}
}

/// Returns the default settings file, `<config dir>/localhist/config.toml`.
#[must_use]
pub fn default_settings_path() -> Option<PathBuf> {
	dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn missing_file_yields_defaults() {
		let dir = tempfile::tempdir().unwrap();
		let settings = Settings::load(&dir.path().join("absent.toml")).unwrap();
		assert_eq!(settings, Settings::default());
		assert_eq!(settings.limits(), RetentionLimits::default());
	}

	#[test]
	fn camel_case_keys_parse() {
		let settings = Settings::from_toml(
			"maxRevisionsPerFile = 12\nmaxContentBytes = 4096\nstorePath = \"/tmp/h.json\"\n",
		)
		.unwrap();
		assert_eq!(settings.max_revisions_per_file, 12);
		assert_eq!(settings.max_content_bytes, 4096);
		assert_eq!(
			settings.resolved_store_path().unwrap(),
			PathBuf::from("/tmp/h.json")
		);
	}

	#[test]
	fn partial_file_keeps_other_defaults() {
		let settings = Settings::from_toml("maxRevisionsPerFile = 7").unwrap();
		assert_eq!(settings.max_revisions_per_file, 7);
		assert_eq!(settings.max_content_bytes, DEFAULT_MAX_CONTENT_BYTES);
		assert_eq!(settings.store_path, None);
	}

	#[test]
	fn out_of_range_cap_is_clamped() {
		assert_eq!(
			Settings::from_toml("maxRevisionsPerFile = 0")
				.unwrap()
				.max_revisions_per_file,
			1
		);
		assert_eq!(
			Settings::from_toml("maxRevisionsPerFile = 99999")
				.unwrap()
				.max_revisions_per_file,
			1000
		);
	}

	#[test]
	fn malformed_file_reports_path() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("config.toml");
		std::fs::write(&path, "maxRevisionsPerFile = \"many\"").unwrap();
		let err = Settings::load(&path).unwrap_err();
		assert!(matches!(err, SettingsError::Toml { path: p, .. } if p == path));
	}
}
