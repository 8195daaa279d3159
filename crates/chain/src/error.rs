use std::path::PathBuf;

use localhist_patch::PatchError;
use thiserror::Error;

/// Errors produced by revision chain operations.
///
/// Every variant is scoped to a single file's chain; batch operations record
/// the failure and move on to the next file.
#[derive(Debug, Error)]
pub enum ChainError {
	/// New content exceeds the configured byte ceiling. Nothing was recorded.
	#[error("content is {size} bytes, over the {limit} byte snapshot limit")]
	ContentTooLarge {
		/// Byte length of the rejected content.
		size: usize,
		/// Configured ceiling.
		limit: usize,
	},

	/// A stored patch failed to decode or apply during replay.
	#[error("history is corrupt at revision {index}: {reason}")]
	CorruptChain {
		/// Index of the revision whose patch failed.
		index: usize,
		/// Codec error description.
		reason: String,
	},

	/// A revision index outside `[0, len)` was requested.
	#[error("revision {index} does not exist (history has {len} revisions)")]
	IndexOutOfRange {
		/// Requested index.
		index: usize,
		/// Number of revisions in the chain.
		len: usize,
	},

	/// No history is tracked for the file.
	#[error("no history recorded for {file}")]
	NoChainForFile {
		/// File identity that was looked up.
		file: String,
	},

	/// A freshly computed patch could not be encoded.
	#[error(transparent)]
	Patch(#[from] PatchError),
}

impl ChainError {
	pub(crate) fn corrupt(index: usize, err: &PatchError) -> Self {
		Self::CorruptChain {
			index,
			reason: err.to_string(),
		}
	}

	/// Returns true for the soft size guard, which callers report as a
	/// warning rather than a failure.
	pub fn is_soft_skip(&self) -> bool {
		matches!(self, Self::ContentTooLarge { .. })
	}
}

/// Result type for chain operations.
pub type Result<T> = std::result::Result<T, ChainError>;

/// Errors produced by [`HistoryStorage`](crate::HistoryStorage) backends.
#[derive(Debug, Error)]
pub enum StorageError {
	/// Reading or writing the backing store failed.
	#[error("I/O error on {path}: {error}")]
	Io {
		/// Path of the backing file.
		path: PathBuf,
		/// The underlying I/O error.
		#[source]
		error: std::io::Error,
	},

	/// The stored map could not be (de)serialized.
	#[error("history store is not valid JSON: {0}")]
	Json(#[from] serde_json::Error),
}
