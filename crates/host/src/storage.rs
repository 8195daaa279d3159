//! JSON file backend for the chain map.

use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use localhist_chain::{HistoryStorage, StorageError, StoredChains};
use tracing::debug;

/// Stores the whole chain map in one JSON file.
///
/// Writes go to a temporary file in the same directory which is then renamed
/// over the target, so a crash mid-write leaves the previous file intact.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
	path: PathBuf,
}

impl JsonFileStorage {
	/// Creates a backend for `path`. Nothing is touched until the first load or save.
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	/// Returns the backing file path.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn io_error(&self, error: std::io::Error) -> StorageError {
		StorageError::Io {
			path: self.path.clone(),
			error,
		}
	}
}

impl HistoryStorage for JsonFileStorage {
	fn load(&self) -> Result<StoredChains, StorageError> {
		let text = match std::fs::read_to_string(&self.path) {
			Ok(text) => text,
			Err(error) if error.kind() == ErrorKind::NotFound => {
				debug!(path = %self.path.display(), "no history file yet");
				return Ok(StoredChains::new());
			}
			Err(error) => return Err(self.io_error(error)),
		};
		if text.trim().is_empty() {
			return Ok(StoredChains::new());
		}
		Ok(serde_json::from_str(&text)?)
	}

	fn save(&self, chains: &StoredChains) -> Result<(), StorageError> {
		let dir = match self.path.parent() {
			Some(parent) if !parent.as_os_str().is_empty() => parent,
			_ => Path::new("."),
		};
		std::fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;

		let tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| self.io_error(e))?;
		{
			let mut writer = BufWriter::new(tmp.as_file());
			serde_json::to_writer(&mut writer, chains)?;
			writer.flush().map_err(|e| self.io_error(e))?;
		}
		tmp.as_file().sync_all().map_err(|e| self.io_error(e))?;
		tmp.persist(&self.path)
			.map_err(|e| self.io_error(e.error))?;
		debug!(path = %self.path.display(), files = chains.len(), "wrote history file");
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use localhist_chain::RevisionChain;
	use pretty_assertions::assert_eq;

	use super::*;

	fn sample() -> StoredChains {
		let mut chain = RevisionChain::new("hello");
		chain.append("hello world", Some("v1"), 1_700_000_000_000, 1024).unwrap();
		chain.append("hello world!", None, 1_700_000_001_000, 1024).unwrap();
		let mut chains = StoredChains::new();
		chains.insert("/abs/path/file.txt".into(), chain);
		chains
	}

	#[test]
	fn missing_or_empty_file_loads_empty() {
		let dir = tempfile::tempdir().unwrap();
		let storage = JsonFileStorage::new(dir.path().join("history.json"));
		assert!(storage.load().unwrap().is_empty());

		std::fs::write(storage.path(), "  \n").unwrap();
		assert!(storage.load().unwrap().is_empty());
	}

	#[test]
	fn save_then_load_round_trips() {
		let dir = tempfile::tempdir().unwrap();
		let storage = JsonFileStorage::new(dir.path().join("nested/dir/history.json"));
		let chains = sample();
		storage.save(&chains).unwrap();
		assert_eq!(storage.load().unwrap(), chains);

		let leftovers: Vec<_> = std::fs::read_dir(storage.path().parent().unwrap())
			.unwrap()
			.collect();
		assert_eq!(leftovers.len(), 1);
	}

	#[test]
	fn file_uses_stable_field_names() {
		let dir = tempfile::tempdir().unwrap();
		let storage = JsonFileStorage::new(dir.path().join("history.json"));
		storage.save(&sample()).unwrap();

		let text = std::fs::read_to_string(storage.path()).unwrap();
		let value: serde_json::Value = serde_json::from_str(&text).unwrap();
		let entry = &value["/abs/path/file.txt"];
		assert_eq!(entry["base"], "hello");
		assert_eq!(entry["revisions"][0]["label"], "v1");
		assert_eq!(entry["revisions"][0]["timestamp"], 1_700_000_000_000_i64);
		assert!(entry["revisions"][1].get("label").is_none());
		assert!(entry["revisions"][1]["patch"].is_string());
	}

	#[test]
	fn invalid_json_is_an_error() {
		let dir = tempfile::tempdir().unwrap();
		let storage = JsonFileStorage::new(dir.path().join("history.json"));
		std::fs::write(storage.path(), "{ not json").unwrap();
		assert!(matches!(storage.load(), Err(StorageError::Json(_))));
	}
}
