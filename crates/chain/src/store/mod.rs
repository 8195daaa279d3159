//! Ownership of every tracked file's chain.
//!
//! # Locking
//!
//! The map sits behind an outer `RwLock` that guards membership only; each
//! chain has its own `Mutex`, so operations on different files never wait on
//! each other. Lock order is always outer then chain. A chain is only removed
//! while holding both, and lookups acquire the chain lock before releasing
//! the outer read lock, so no operation ever lands on a chain that was
//! concurrently dropped from the map.


use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::chain::RevisionChain;
use crate::clock::{Clock, SystemClock};
use crate::error::{ChainError, Result, StorageError};
use crate::retention::{self, RetentionLimits};
use crate::revision::{Position, RevisionSummary};
use crate::storage::{HistoryStorage, StoredChains};

type ChainHandle = Arc<Mutex<RevisionChain>>;

/// Result of recording a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
	/// The file had no history; a chain was created with the content as base.
	Created {
		/// A label was supplied but not kept, since the base carries none.
		label_dropped: bool,
	},
	/// A revision was appended.
	Appended {
		/// Index of the new revision after retention.
		index: usize,
		/// Revisions dropped by max-count retention.
		trimmed: usize,
	},
}

/// A file skipped by a batch operation because its chain failed to replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorruptEntry {
	/// File identity.
	pub file: String,
	/// Description of the failure.
	pub reason: String,
}

/// Totals from [`ChainStore::apply_retention`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetentionReport {
	/// Revisions removed across all files.
	pub trimmed: usize,
	/// Number of files that lost at least one revision.
	pub files_trimmed: usize,
	/// Files whose chains could not be rebased.
	pub corrupt: Vec<CorruptEntry>,
}

/// Totals from [`ChainStore::cleanup_older_than`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
	/// Revisions removed across all files.
	pub removed: usize,
	/// Files whose whole history expired and was deleted.
	pub deleted_files: Vec<String>,
	/// Files whose chains could not be rebased.
	pub corrupt: Vec<CorruptEntry>,
}

#[derive(Default)]
struct Cleaned {
	removed: usize,
	deleted: bool,
}

/// Map from file identity to [`RevisionChain`].
///
/// All mutation goes through the store's operations. Reads hand out copies,
/// never references into the map.
pub struct ChainStore {
	chains: RwLock<HashMap<String, ChainHandle>>,
	limits: RwLock<RetentionLimits>,
	clock: Arc<dyn Clock>,
}

impl Default for ChainStore {
	fn default() -> Self {
		Self::new(RetentionLimits::default())
	}
}

impl ChainStore {
	/// Creates an empty store using the system clock.
	pub fn new(limits: RetentionLimits) -> Self {
		Self::with_clock(limits, Arc::new(SystemClock))
	}

	/// Creates an empty store with an injected clock.
	pub fn with_clock(limits: RetentionLimits, clock: Arc<dyn Clock>) -> Self {
		Self::from_chains(StoredChains::new(), limits, clock)
	}

	/// Creates a store holding previously persisted chains.
	pub fn from_chains(chains: StoredChains, limits: RetentionLimits, clock: Arc<dyn Clock>) -> Self {
		let chains = chains
			.into_iter()
			.map(|(file, chain)| (file, Arc::new(Mutex::new(chain))))
			.collect();
		Self {
			chains: RwLock::new(chains),
			limits: RwLock::new(limits.clamped()),
			clock,
		}
	}

	/// Loads the chain map from `storage`.
	///
	/// Retention is not applied here; hosts run [`Self::apply_retention`]
	/// once the store is loaded.
	///
	/// # Errors
	///
	/// Returns [`StorageError`] if the backend cannot be read.
	pub fn load(
		storage: &dyn HistoryStorage,
		limits: RetentionLimits,
		clock: Arc<dyn Clock>,
	) -> std::result::Result<Self, StorageError> {
		let chains = storage.load()?;
		debug!(files = chains.len(), "loaded revision chains");
		Ok(Self::from_chains(chains, limits, clock))
	}

	/// Hands the full chain map to `storage`.
	///
	/// # Errors
	///
	/// Returns [`StorageError`] if the backend cannot be written.
	pub fn persist(&self, storage: &dyn HistoryStorage) -> std::result::Result<(), StorageError> {
		let snapshot = self.snapshot();
		storage.save(&snapshot)?;
		debug!(files = snapshot.len(), "persisted revision chains");
		Ok(())
	}

	/// Returns the active limits.
	pub fn limits(&self) -> RetentionLimits {
		*self.limits.read()
	}

	/// Replaces the active limits. Existing chains are not trimmed until the
	/// next append or [`Self::apply_retention`].
	pub fn set_limits(&self, limits: RetentionLimits) {
		*self.limits.write() = limits.clamped();
	}

	/// Returns the current time from the store's clock.
	pub fn now_ms(&self) -> i64 {
		self.clock.now_ms()
	}

	/// Returns a copy of the chain for `file`.
	pub fn get(&self, file: &str) -> Option<RevisionChain> {
		self.with_chain(file, |chain| chain.clone())
	}

	/// Returns true if `file` has a chain.
	pub fn contains(&self, file: &str) -> bool {
		self.chains.read().contains_key(file)
	}

	/// Returns tracked file identities, sorted.
	pub fn files(&self) -> Vec<String> {
		let mut files: Vec<String> = self.chains.read().keys().cloned().collect();
		files.sort();
		files
	}

	/// Returns the number of tracked files.
	pub fn len(&self) -> usize {
		self.chains.read().len()
	}

	/// Returns true if no file is tracked.
	pub fn is_empty(&self) -> bool {
		self.chains.read().is_empty()
	}

	/// Returns the chain for `file`, creating it with `initial` as base if absent.
	///
	/// An existing chain is returned unchanged.
	pub fn create_or_get(&self, file: &str, initial: &str) -> RevisionChain {
		if let Some(chain) = self.get(file) {
			return chain;
		}

		let mut chains = self.chains.write();
		let handle = chains.entry(file.to_string()).or_insert_with(|| {
			debug!(file, "created revision chain");
			Arc::new(Mutex::new(RevisionChain::new(initial)))
		});
		handle.lock().clone()
	}

	/// Records `content` for `file`.
	///
	/// Creates the chain with `content` as base when the file has no history,
	/// otherwise appends a revision and applies max-count retention to that
	/// chain. A label given for the first snapshot is not kept; the outcome
	/// reports it as dropped.
	///
	/// # Errors
	///
	/// - [`ChainError::ContentTooLarge`] when `content` is over the byte
	///   ceiling. Nothing is recorded; callers treat this as a warning.
	/// - [`ChainError::CorruptChain`] when the existing chain cannot be replayed.
	pub fn upsert_and_append(
		&self,
		file: &str,
		content: &str,
		label: Option<&str>,
	) -> Result<AppendOutcome> {
		let limits = self.limits();
		if content.len() > limits.max_content_bytes {
			warn!(
				file,
				size = content.len(),
				limit = limits.max_content_bytes,
				"skipping oversized snapshot"
			);
			return Err(ChainError::ContentTooLarge {
				size: content.len(),
				limit: limits.max_content_bytes,
			});
		}

		let now = self.clock.now_ms();
		if let Some(outcome) =
			self.with_chain(file, |chain| append_locked(chain, content, label, now, limits))
		{
			return outcome.inspect(|outcome| debug!(file, ?outcome, "recorded revision"));
		}

		let mut chains = self.chains.write();
		if let Some(handle) = chains.get(file).map(Arc::clone) {
			let mut chain = handle.lock();
			drop(chains);
			return append_locked(&mut chain, content, label, now, limits);
		}

		chains.insert(
			file.to_string(),
			Arc::new(Mutex::new(RevisionChain::new(content))),
		);
		drop(chains);

		let label_dropped = label.is_some_and(|label| !label.trim().is_empty());
		if label_dropped {
			warn!(
				file,
				label = label.unwrap_or_default(),
				"first snapshot becomes the base; label not kept"
			);
		} else {
			debug!(file, "created revision chain");
		}
		Ok(AppendOutcome::Created { label_dropped })
	}

	/// Reconstructs the content of `file` at `pos`.
	///
	/// # Errors
	///
	/// [`ChainError::NoChainForFile`], [`ChainError::IndexOutOfRange`] or
	/// [`ChainError::CorruptChain`].
	pub fn reconstruct(&self, file: &str, pos: Position) -> Result<String> {
		self.with_chain(file, |chain| chain.reconstruct(pos))
			.unwrap_or_else(|| Err(no_chain(file)))
	}

	/// Sets or clears the label of revision `index` of `file`.
	///
	/// # Errors
	///
	/// [`ChainError::NoChainForFile`] or [`ChainError::IndexOutOfRange`].
	pub fn rename_revision(&self, file: &str, index: usize, label: &str) -> Result<()> {
		self.with_chain(file, |chain| chain.rename(index, label))
			.unwrap_or_else(|| Err(no_chain(file)))
	}

	/// Returns display rows for the history of `file`.
	///
	/// # Errors
	///
	/// [`ChainError::NoChainForFile`] if the file has no history.
	pub fn summaries(&self, file: &str) -> Result<Vec<RevisionSummary>> {
		self.with_chain(file, |chain| chain.summaries())
			.ok_or_else(|| no_chain(file))
	}

	/// Deletes the history of `file`. Returns false if there was none.
	pub fn remove(&self, file: &str) -> bool {
		let mut chains = self.chains.write();
		let Some(handle) = chains.get(file).map(Arc::clone) else {
			return false;
		};
		let _chain = handle.lock();
		chains.remove(file);
		debug!(file, "removed revision chain");
		true
	}

	/// Applies max-count retention to every chain and makes `max_count` the
	/// cap for future appends.
	///
	/// Chains that fail to rebase are left as they were and listed in the
	/// report; the batch always runs to completion.
	pub fn apply_retention(&self, max_count: usize) -> RetentionReport {
		let max_count = retention::clamp_max_revisions(max_count);
		self.limits.write().max_revisions = max_count;

		let mut report = RetentionReport::default();
		for (file, handle) in self.handles() {
			match handle.lock().trim_to_count(max_count) {
				Ok(0) => {}
				Ok(trimmed) => {
					report.trimmed += trimmed;
					report.files_trimmed += 1;
				}
				Err(err) => {
					warn!(file = file.as_str(), error = %err, "skipping corrupt chain during retention");
					report.corrupt.push(CorruptEntry {
						file,
						reason: err.to_string(),
					});
				}
			}
		}

		if report.trimmed > 0 {
			info!(
				max_count,
				trimmed = report.trimmed,
				files = report.files_trimmed,
				"applied revision retention"
			);
		}
		report
	}

	/// Removes revisions recorded `days` or more days ago from every chain.
	///
	/// Only a leading run of expired revisions is removed from each chain,
	/// and the chain is rebased onto its first survivor. A file whose every
	/// revision expired is deleted from the store, as is a file with no
	/// revisions at all.
	pub fn cleanup_older_than(&self, days: u32) -> CleanupReport {
		let cutoff = retention::age_cutoff(self.clock.now_ms(), days);

		let mut report = CleanupReport::default();
		for (file, handle) in self.handles() {
			match self.cleanup_one(&file, &handle, cutoff) {
				Ok(cleaned) => {
					report.removed += cleaned.removed;
					if cleaned.deleted {
						report.deleted_files.push(file);
					}
				}
				Err(err) => {
					warn!(file = file.as_str(), error = %err, "skipping corrupt chain during cleanup");
					report.corrupt.push(CorruptEntry {
						file,
						reason: err.to_string(),
					});
				}
			}
		}

		info!(
			days,
			removed = report.removed,
			deleted = report.deleted_files.len(),
			corrupt = report.corrupt.len(),
			"cleaned up old revisions"
		);
		report
	}

	/// Replays every chain and lists the ones that fail.
	pub fn verify(&self) -> Vec<CorruptEntry> {
		self.handles()
			.into_iter()
			.filter_map(|(file, handle)| {
				let err = handle.lock().verify().err()?;
				Some(CorruptEntry {
					file,
					reason: err.to_string(),
				})
			})
			.collect()
	}

	/// Returns a serializable copy of every chain.
	pub fn snapshot(&self) -> StoredChains {
		self.handles()
			.into_iter()
			.map(|(file, handle)| {
				let chain = handle.lock().clone();
				(file, chain)
			})
			.collect()
	}

	fn cleanup_one(&self, file: &str, handle: &ChainHandle, cutoff: i64) -> Result<Cleaned> {
		{
			let mut chain = handle.lock();
			let cut = chain.expired_prefix(cutoff);
			if cut < chain.len() {
				let removed = chain.rebase(cut)?;
				return Ok(Cleaned {
					removed,
					deleted: false,
				});
			}
		}

		let mut chains = self.chains.write();
		if !chains.get(file).is_some_and(|current| Arc::ptr_eq(current, handle)) {
			return Ok(Cleaned::default());
		}

		let mut chain = handle.lock();
		let cut = chain.expired_prefix(cutoff);
		if cut < chain.len() {
			drop(chains);
			let removed = chain.rebase(cut)?;
			return Ok(Cleaned {
				removed,
				deleted: false,
			});
		}

		let removed = chain.len();
		drop(chain);
		chains.remove(file);
		debug!(file, removed, "history fully expired; removed chain");
		Ok(Cleaned {
			removed,
			deleted: true,
		})
	}

	/// Runs `f` on the chain for `file` with the chain lock held.
	fn with_chain<R>(&self, file: &str, f: impl FnOnce(&mut RevisionChain) -> R) -> Option<R> {
		let chains = self.chains.read();
		let handle = Arc::clone(chains.get(file)?);
		let mut chain = handle.lock();
		drop(chains);
		Some(f(&mut *chain))
	}

	/// Returns every (file, chain) pair, sorted by file.
	fn handles(&self) -> Vec<(String, ChainHandle)> {
		let mut handles: Vec<(String, ChainHandle)> = self
			.chains
			.read()
			.iter()
			.map(|(file, handle)| (file.clone(), Arc::clone(handle)))
			.collect();
		handles.sort_by(|a, b| a.0.cmp(&b.0));
		handles
	}
}

fn append_locked(
	chain: &mut RevisionChain,
	content: &str,
	label: Option<&str>,
	now_ms: i64,
	limits: RetentionLimits,
) -> Result<AppendOutcome> {
	chain.append(content, label, now_ms, limits.max_content_bytes)?;
	let trimmed = chain.trim_to_count(limits.max_revisions)?;
	Ok(AppendOutcome::Appended {
		index: chain.len() - 1,
		trimmed,
	})
}

fn no_chain(file: &str) -> ChainError {
	ChainError::NoChainForFile {
		file: file.to_string(),
	}
}
