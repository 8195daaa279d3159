//! Error types for the patch codec.

use thiserror::Error;

/// Errors produced while encoding, decoding or applying a [`Patch`](crate::Patch).
#[derive(Debug, Error)]
pub enum PatchError {
	/// Stored patch text is not a valid wire patch.
	#[error("malformed patch text: {0}")]
	Decode(#[source] serde_json::Error),

	/// The patch could not be serialized.
	#[error("failed to encode patch: {0}")]
	Encode(#[source] serde_json::Error),

	/// The patch was built for a source of a different length.
	#[error("patch expects a source of {expected} chars, found {actual}")]
	LengthMismatch {
		/// Chars consumed by the patch's retain and delete operations.
		expected: usize,
		/// Length of the text the patch was applied to.
		actual: usize,
	},

	/// Stored operation counts add up past `usize::MAX`.
	#[error("patch operation counts overflow")]
	LengthOverflow,
}

/// Result type for patch operations.
pub type Result<T> = std::result::Result<T, PatchError>;
