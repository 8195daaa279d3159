use serde::{Deserialize, Serialize};

/// One recorded change step.
///
/// `patch` is only meaningful relative to the content produced by replaying
/// every earlier revision of the same chain from its base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
	/// Serialized patch from the previous version to this one.
	pub patch: String,
	/// Creation time, milliseconds since the Unix epoch.
	pub timestamp: i64,
	/// Optional user-assigned name.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub label: Option<String>,
}

impl Revision {
	/// Returns the label, or `#<index>` for unnamed revisions.
	pub fn display_label(&self, index: usize) -> String {
		match &self.label {
			Some(label) => label.clone(),
			None => format!("#{index}"),
		}
	}
}

/// Logical position in a chain to reconstruct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
	/// The base content, with no revisions applied.
	Base,
	/// The content after applying revisions `0..=i`.
	After(usize),
}

impl Position {
	/// Maps a host-facing signed index: negative values mean [`Position::Base`].
	pub fn from_signed(index: i64) -> Self {
		match usize::try_from(index) {
			Ok(i) => Self::After(i),
			Err(_) => Self::Base,
		}
	}
}

impl From<usize> for Position {
	fn from(index: usize) -> Self {
		Self::After(index)
	}
}

/// Display row for one revision in a history listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevisionSummary {
	/// Position of the revision in its chain.
	pub index: usize,
	/// User label, if any.
	pub label: Option<String>,
	/// Label with positional fallback.
	pub display_label: String,
	/// Creation time, milliseconds since the Unix epoch.
	pub timestamp: i64,
	/// Size of the stored patch text in bytes.
	pub patch_bytes: usize,
}
