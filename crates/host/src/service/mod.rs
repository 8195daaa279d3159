//! Command dispatch over a [`ChainStore`] and its storage backend.


use std::path::Path;
use std::sync::Arc;

use localhist_chain::retention::clamp_max_revisions;
use localhist_chain::{ChainStore, Clock, HistoryStorage, Position, SystemClock};
use similar::TextDiff;
use tracing::{debug, info, warn};

use crate::command::{HistoryView, HostCommand, HostResponse};
use crate::error::{HostError, Result};
use crate::settings::Settings;
use crate::storage::JsonFileStorage;

const DIFF_CONTEXT: usize = 3;

/// Local history for one host session.
///
/// Owns the chain store and the backend it is persisted to. Every command
/// that changes the store writes the full map back before returning.
pub struct LocalHistory<S = JsonFileStorage> {
	store: ChainStore,
	storage: S,
}

impl LocalHistory<JsonFileStorage> {
	/// Opens the JSON history file named by `settings`.
	///
	/// # Errors
	///
	/// Fails if the store path cannot be resolved or the file cannot be read.
	pub fn open_default(settings: Settings) -> Result<Self> {
		let path = settings.resolved_store_path()?;
		Self::open(settings, JsonFileStorage::new(path), Arc::new(SystemClock))
	}
}

impl<S: HistoryStorage> LocalHistory<S> {
	/// Loads the store from `storage` and applies the configured revision cap.
	///
	/// The store is written back only if startup retention removed anything.
	///
	/// # Errors
	///
	/// Fails if `storage` cannot be read, or written after trimming.
	pub fn open(settings: Settings, storage: S, clock: Arc<dyn Clock>) -> Result<Self> {
		let settings = settings.normalized();
		let store = ChainStore::load(&storage, settings.limits(), clock)?;
		let history = Self { store, storage };

		let report = history.store.apply_retention(settings.max_revisions_per_file);
		if report.trimmed > 0 {
			history.persist()?;
		}
		info!(
			files = history.store.len(),
			trimmed = report.trimmed,
			corrupt = report.corrupt.len(),
			"local history ready"
		);
		Ok(history)
	}

	/// Returns the underlying store.
	pub fn store(&self) -> &ChainStore {
		&self.store
	}

	/// Returns the storage backend.
	pub fn storage(&self) -> &S {
		&self.storage
	}

	/// Writes the full store to the backend.
	///
	/// # Errors
	///
	/// Returns [`HostError::Storage`] if the backend write fails.
	pub fn persist(&self) -> Result<()> {
		self.store.persist(&self.storage).map_err(HostError::from)
	}

	/// Executes one host command.
	///
	/// # Errors
	///
	/// Chain errors other than the oversized-content skip, and storage errors
	/// from persisting a mutation.
	pub fn handle(&self, command: HostCommand) -> Result<HostResponse> {
		let mutates = command.is_mutation();
		let response = self.dispatch(command)?;
		if mutates && !matches!(response, HostResponse::Skipped { .. }) {
			self.persist()?;
		}
		Ok(response)
	}

	fn dispatch(&self, command: HostCommand) -> Result<HostResponse> {
		match command {
			HostCommand::Save { file, content } => self.record(&file, &content, None),
			HostCommand::Snapshot {
				file,
				content,
				label,
			} => self.record(&file, &content, label.as_deref()),
			HostCommand::ConfigChanged { max_revisions } => {
				let clamped = clamp_max_revisions(max_revisions);
				if clamped != max_revisions {
					warn!(requested = max_revisions, clamped, "maxRevisionsPerFile out of range");
				}
				Ok(HostResponse::Retained(self.store.apply_retention(clamped)))
			}
			HostCommand::Cleanup { days } => {
				Ok(HostResponse::CleanedUp(self.store.cleanup_older_than(days)))
			}
			HostCommand::ViewHistory { file } => Ok(self.view(file)),
			HostCommand::Compare {
				file,
				index,
				current,
			} => {
				let pos = Position::from_signed(index);
				let historic = self.store.reconstruct(&file, pos)?;
				let label = self.position_label(&file, pos)?;
				let unified_diff = unified_diff(
					&historic,
					&current,
					&format!("{file} ({label})"),
					&format!("{file} (current)"),
				);
				Ok(HostResponse::Comparison {
					historic,
					current,
					unified_diff,
				})
			}
			HostCommand::Restore { file, index, mode } => {
				let pos = Position::from_signed(index);
				let content = self.store.reconstruct(&file, pos)?;
				let title = format!("{} @ {}", display_name(&file), self.position_label(&file, pos)?);
				debug!(file, ?pos, ?mode, "restoring revision");
				Ok(HostResponse::Restored {
					content,
					mode,
					title,
				})
			}
			HostCommand::Rename { file, index, label } => {
				self.store.rename_revision(&file, index, &label)?;
				Ok(HostResponse::Renamed)
			}
			HostCommand::ListFiles => Ok(HostResponse::Files(self.store.files())),
			HostCommand::Verify => Ok(HostResponse::Verified(self.store.verify())),
		}
	}

	fn record(&self, file: &str, content: &str, label: Option<&str>) -> Result<HostResponse> {
		match self.store.upsert_and_append(file, content, label) {
			Ok(outcome) => Ok(HostResponse::Recorded(outcome)),
			Err(err) if err.is_soft_skip() => Ok(HostResponse::Skipped {
				message: HostError::from(err).user_message(),
			}),
			Err(err) => Err(err.into()),
		}
	}

	fn view(&self, file: String) -> HostResponse {
		match self.store.get(&file) {
			Some(chain) => HostResponse::History(HistoryView {
				base_bytes: chain.base().len(),
				revisions: chain.summaries(),
				file,
			}),
			None => HostResponse::Nothing {
				message: format!("No local history for {}.", display_name(&file)),
			},
		}
	}

	fn position_label(&self, file: &str, pos: Position) -> Result<String> {
		Ok(match pos {
			Position::Base => "base".to_string(),
			Position::After(index) => self
				.store
				.summaries(file)?
				.get(index)
				.map_or_else(|| format!("#{index}"), |row| row.display_label.clone()),
		})
	}
}

/// Renders a line-based unified diff from `old` to `new`.
pub fn unified_diff(old: &str, new: &str, old_header: &str, new_header: &str) -> String {
	TextDiff::from_lines(old, new)
		.unified_diff()
		.context_radius(DIFF_CONTEXT)
		.header(old_header, new_header)
		.to_string()
}

fn display_name(file: &str) -> String {
	Path::new(file)
		.file_name()
		.map_or_else(|| file.to_string(), |name| name.to_string_lossy().into_owned())
}
