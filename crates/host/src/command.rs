//! Commands a host sends and the responses it gets back.
//!
//! Editor events and UI messages are translated into [`HostCommand`] values
//! and handed to [`LocalHistory::handle`](crate::LocalHistory::handle).

use localhist_chain::{AppendOutcome, CleanupReport, CorruptEntry, RetentionReport, RevisionSummary};
use serde::Serialize;

/// Where restored content should go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RestoreMode {
	/// Open the historic content in a new, unsaved buffer.
	NewTab,
	/// Replace the file's content. The host's next save records it as a new revision.
	InPlace,
}

/// A request from the host.
///
/// Indices are signed where a command can address the base: any negative
/// value means the base content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
	/// The file was saved.
	Save {
		/// File identity.
		file: String,
		/// Saved content.
		content: String,
	},
	/// The user asked for an explicit snapshot.
	Snapshot {
		/// File identity.
		file: String,
		/// Current content.
		content: String,
		/// Optional name for the revision.
		label: Option<String>,
	},
	/// `maxRevisionsPerFile` changed.
	ConfigChanged {
		/// New revision cap, clamped to the accepted range.
		max_revisions: usize,
	},
	/// Remove revisions older than `days` days from every file.
	Cleanup {
		/// Age threshold in days.
		days: u32,
	},
	/// List the history of one file.
	ViewHistory {
		/// File identity.
		file: String,
	},
	/// Diff a historic version against the current content.
	Compare {
		/// File identity.
		file: String,
		/// Revision index, negative for the base.
		index: i64,
		/// The file's current content.
		current: String,
	},
	/// Reconstruct a historic version for restoring.
	Restore {
		/// File identity.
		file: String,
		/// Revision index, negative for the base.
		index: i64,
		/// Destination of the content.
		mode: RestoreMode,
	},
	/// Set or clear a revision label. An empty label clears it.
	Rename {
		/// File identity.
		file: String,
		/// Revision index.
		index: usize,
		/// New label.
		label: String,
	},
	/// List tracked files.
	ListFiles,
	/// Replay every chain and report the ones that fail.
	Verify,
}

impl HostCommand {
	/// Returns true for commands that change the store and trigger a save.
	pub fn is_mutation(&self) -> bool {
		matches!(
			self,
			Self::Save { .. }
				| Self::Snapshot { .. }
				| Self::ConfigChanged { .. }
				| Self::Cleanup { .. }
				| Self::Rename { .. }
		)
	}
}

/// History listing for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryView {
	/// File identity.
	pub file: String,
	/// Byte length of the base content.
	pub base_bytes: usize,
	/// Revisions, oldest first.
	pub revisions: Vec<RevisionSummary>,
}

/// The result of a [`HostCommand`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostResponse {
	/// A snapshot was recorded.
	Recorded(AppendOutcome),
	/// A snapshot was skipped; `message` explains why.
	Skipped {
		/// User-facing explanation.
		message: String,
	},
	/// Retention was re-applied.
	Retained(RetentionReport),
	/// Age cleanup ran.
	CleanedUp(CleanupReport),
	/// History listing.
	History(HistoryView),
	/// Nothing to show.
	Nothing {
		/// User-facing explanation.
		message: String,
	},
	/// Historic and current content side by side.
	Comparison {
		/// Reconstructed historic content.
		historic: String,
		/// The content it was compared against.
		current: String,
		/// Unified diff from historic to current.
		unified_diff: String,
	},
	/// Reconstructed content to restore.
	Restored {
		/// Historic content.
		content: String,
		/// Requested destination.
		mode: RestoreMode,
		/// Title for a new buffer, e.g. `notes.txt @ v1`.
		title: String,
	},
	/// A label was changed.
	Renamed,
	/// Tracked files, sorted.
	Files(Vec<String>),
	/// Chains that failed to replay.
	Verified(Vec<CorruptEntry>),
}
