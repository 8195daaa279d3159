//! Retention rules.
//!
//! Both rules only compute a cut point: the index of the first surviving
//! revision. Applying a cut is the chain's job ([`RevisionChain::rebase`]),
//! which materializes the content at the cut before discarding anything.
//!
//! [`RevisionChain::rebase`]: crate::RevisionChain::rebase

/// Milliseconds in one day.
pub const DAY_MS: i64 = 86_400_000;

/// Default cap on revisions kept per file.
pub const DEFAULT_MAX_REVISIONS: usize = 50;

/// Smallest accepted revision cap.
pub const MIN_MAX_REVISIONS: usize = 1;

/// Largest accepted revision cap.
pub const MAX_MAX_REVISIONS: usize = 1000;

/// Default byte ceiling for a single snapshot (5 MiB).
pub const DEFAULT_MAX_CONTENT_BYTES: usize = 5 * 1024 * 1024;

/// Limits applied to every chain in a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionLimits {
	/// Maximum revisions kept per file.
	pub max_revisions: usize,
	/// Maximum byte length of a snapshot; larger content is skipped.
	pub max_content_bytes: usize,
}

impl Default for RetentionLimits {
	fn default() -> Self {
		Self {
			max_revisions: DEFAULT_MAX_REVISIONS,
			max_content_bytes: DEFAULT_MAX_CONTENT_BYTES,
		}
	}
}

impl RetentionLimits {
	/// Returns these limits with `max_revisions` clamped into the accepted range.
	pub fn clamped(self) -> Self {
		Self {
			max_revisions: clamp_max_revisions(self.max_revisions),
			..self
		}
	}
}

/// Clamps a revision cap into `[MIN_MAX_REVISIONS, MAX_MAX_REVISIONS]`.
pub fn clamp_max_revisions(max: usize) -> usize {
	max.clamp(MIN_MAX_REVISIONS, MAX_MAX_REVISIONS)
}

/// Computes the max-count cut for a chain of `len` revisions.
///
/// Returns `None` when nothing needs trimming, otherwise the index of the
/// first of the `max_count` most recent revisions. A cap of zero is treated
/// as one so the rule never empties a chain.
pub fn count_cut(len: usize, max_count: usize) -> Option<usize> {
	let max_count = max_count.max(MIN_MAX_REVISIONS);
	(len > max_count).then(|| len - max_count)
}

/// Returns the timestamp at or before which revisions are expired.
pub fn age_cutoff(now_ms: i64, days: u32) -> i64 {
	now_ms.saturating_sub(i64::from(days).saturating_mul(DAY_MS))
}

/// Computes the age cut: the length of the leading run of revisions whose
/// timestamp is at or before `cutoff`.
///
/// A revision older than the cutoff that follows a younger one is not part
/// of the run and survives, so only a strict prefix is ever removed.
pub fn age_cut(timestamps: impl IntoIterator<Item = i64>, cutoff: i64) -> usize {
	timestamps.into_iter().take_while(|&ts| ts <= cutoff).count()
}
