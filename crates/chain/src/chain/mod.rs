//! The revision chain: a base snapshot plus ordered patches.
//!
//! Reconstruction is a forward replay from `base` and costs O(index) patch
//! applications. No intermediate snapshots are cached; long chains are kept
//! in check by retention, which re-roots the chain through [`RevisionChain::rebase`].

#[cfg(test)]
mod tests;

use localhist_patch::{Patch, Rope};
use serde::{Deserialize, Serialize};

use crate::error::{ChainError, Result};
use crate::retention;
use crate::revision::{Position, Revision, RevisionSummary};

/// History of one file: the oldest retained content and the patches after it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionChain {
	base: String,
	#[serde(default)]
	revisions: Vec<Revision>,
}

impl RevisionChain {
	/// Creates a chain rooted at `base` with no revisions.
	pub fn new(base: impl Into<String>) -> Self {
		Self {
			base: base.into(),
			revisions: Vec::new(),
		}
	}

	/// Returns the oldest retained content.
	pub fn base(&self) -> &str {
		&self.base
	}

	/// Returns the revisions, oldest first.
	pub fn revisions(&self) -> &[Revision] {
		&self.revisions
	}

	/// Returns the number of revisions.
	pub fn len(&self) -> usize {
		self.revisions.len()
	}

	/// Returns true if the chain holds only its base.
	pub fn is_empty(&self) -> bool {
		self.revisions.is_empty()
	}

	/// Returns the position of the newest version.
	pub fn last_position(&self) -> Position {
		match self.revisions.len() {
			0 => Position::Base,
			n => Position::After(n - 1),
		}
	}

	/// Reconstructs the content at `pos`.
	///
	/// [`Position::Base`] returns `base` verbatim. [`Position::After`] replays
	/// `revisions[0..=i]` in order. The chain is never modified.
	///
	/// # Errors
	///
	/// - [`ChainError::IndexOutOfRange`] if `i` is not a revision index.
	/// - [`ChainError::CorruptChain`] if a stored patch fails to decode or apply.
	pub fn reconstruct(&self, pos: Position) -> Result<String> {
		let end = match pos {
			Position::Base => return Ok(self.base.clone()),
			Position::After(index) => {
				self.check_index(index)?;
				index
			}
		};

		let mut rope = Rope::from_str(&self.base);
		for (index, revision) in self.revisions[..=end].iter().enumerate() {
			let patch =
				Patch::from_text(&revision.patch).map_err(|e| ChainError::corrupt(index, &e))?;
			patch
				.apply_rope(&mut rope)
				.map_err(|e| ChainError::corrupt(index, &e))?;
		}
		Ok(rope.to_string())
	}

	/// Reconstructs the newest version.
	///
	/// # Errors
	///
	/// Returns [`ChainError::CorruptChain`] if replay fails.
	pub fn latest(&self) -> Result<String> {
		self.reconstruct(self.last_position())
	}

	/// Records `content` as a new revision.
	///
	/// The patch is computed against the reconstructed newest version. Identical
	/// content still records a revision; every append is a timestamped event.
	/// The timestamp is `now_ms`, raised to the previous revision's timestamp
	/// if the clock went backwards, so timestamps never decrease.
	///
	/// Returns the index of the new revision.
	///
	/// # Errors
	///
	/// - [`ChainError::ContentTooLarge`] if `content` exceeds `max_bytes`.
	/// - [`ChainError::CorruptChain`] if the newest version cannot be rebuilt.
	///
	/// The chain is unchanged on error.
	pub fn append(
		&mut self,
		content: &str,
		label: Option<&str>,
		now_ms: i64,
		max_bytes: usize,
	) -> Result<usize> {
		if content.len() > max_bytes {
			return Err(ChainError::ContentTooLarge {
				size: content.len(),
				limit: max_bytes,
			});
		}

		let previous = self.latest()?;
		let patch = Patch::diff(&previous, content).to_text()?;
		let timestamp = self
			.revisions
			.last()
			.map_or(now_ms, |last| now_ms.max(last.timestamp));

		self.revisions.push(Revision {
			patch,
			timestamp,
			label: normalize_label(label),
		});
		Ok(self.revisions.len() - 1)
	}

	/// Sets the label of `revisions[index]`; an empty label clears it.
	///
	/// # Errors
	///
	/// Returns [`ChainError::IndexOutOfRange`] for an invalid index.
	pub fn rename(&mut self, index: usize, label: &str) -> Result<()> {
		self.check_index(index)?;
		self.revisions[index].label = normalize_label(Some(label));
		Ok(())
	}

	/// Drops `revisions[..keep_from]`, first installing the content just
	/// before `revisions[keep_from]` as the new base.
	///
	/// Every surviving revision reconstructs to the same content as before.
	/// `keep_from == len()` collapses the chain to its newest version as base.
	///
	/// Returns the number of revisions removed.
	///
	/// # Errors
	///
	/// - [`ChainError::IndexOutOfRange`] if `keep_from > len()`.
	/// - [`ChainError::CorruptChain`] if the cut point cannot be rebuilt; the
	///   chain is left untouched.
	pub fn rebase(&mut self, keep_from: usize) -> Result<usize> {
		if keep_from == 0 {
			return Ok(0);
		}
		if keep_from > self.revisions.len() {
			return Err(ChainError::IndexOutOfRange {
				index: keep_from,
				len: self.revisions.len(),
			});
		}

		let new_base = self.reconstruct(Position::After(keep_from - 1))?;
		self.revisions.drain(..keep_from);
		self.base = new_base;
		Ok(keep_from)
	}

	/// Keeps only the `max_count` most recent revisions.
	///
	/// Returns the number of revisions removed.
	///
	/// # Errors
	///
	/// Returns [`ChainError::CorruptChain`] if the cut point cannot be rebuilt.
	pub fn trim_to_count(&mut self, max_count: usize) -> Result<usize> {
		match retention::count_cut(self.revisions.len(), max_count) {
			Some(cut) => self.rebase(cut),
			None => Ok(0),
		}
	}

	/// Removes the leading run of revisions with `timestamp <= cutoff_ms`.
	///
	/// Returns the number of revisions removed.
	///
	/// # Errors
	///
	/// Returns [`ChainError::CorruptChain`] if the cut point cannot be rebuilt.
	pub fn trim_older_than(&mut self, cutoff_ms: i64) -> Result<usize> {
		let cut = self.expired_prefix(cutoff_ms);
		self.rebase(cut)
	}

	/// Returns how many leading revisions are at or before `cutoff_ms`.
	pub fn expired_prefix(&self, cutoff_ms: i64) -> usize {
		retention::age_cut(self.revisions.iter().map(|r| r.timestamp), cutoff_ms)
	}

	/// Returns display rows for every revision, oldest first.
	pub fn summaries(&self) -> Vec<RevisionSummary> {
		self.revisions
			.iter()
			.enumerate()
			.map(|(index, revision)| RevisionSummary {
				index,
				label: revision.label.clone(),
				display_label: revision.display_label(index),
				timestamp: revision.timestamp,
				patch_bytes: revision.patch.len(),
			})
			.collect()
	}

	/// Replays the whole chain, returning the first failure.
	///
	/// # Errors
	///
	/// Returns [`ChainError::CorruptChain`] naming the first bad revision.
	pub fn verify(&self) -> Result<()> {
		self.latest().map(|_| ())
	}

	fn check_index(&self, index: usize) -> Result<()> {
		if index >= self.revisions.len() {
			return Err(ChainError::IndexOutOfRange {
				index,
				len: self.revisions.len(),
			});
		}
		Ok(())
	}
}

fn normalize_label(label: Option<&str>) -> Option<String> {
	label
		.map(str::trim)
		.filter(|label| !label.is_empty())
		.map(str::to_string)
}
