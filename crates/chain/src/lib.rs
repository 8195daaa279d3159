//! Per-file revision history stored as a base snapshot plus a patch chain.
//!
//! # Mental Model
//!
//! Every tracked file owns one [`RevisionChain`]: the full text of the oldest
//! retained version (`base`) followed by an ordered list of [`Revision`]s,
//! each holding the patch from the previous version to the next. Any version
//! is recovered by replaying patches forward from `base`. Retention drops the
//! oldest revisions by first materializing the content at the cut point and
//! installing it as the new base.
//!
//! # Invariants
//!
//! - Replayability: replaying `revisions[0..=k]` against `base` succeeds for
//!   every `k`, after every mutation.
//! - Ordering: revision timestamps never decrease along a chain.
//! - Prefix-only trimming: retention only ever removes a leading run of
//!   revisions, and always rebases before doing so.
//!
//! The [`ChainStore`] maps file identities to chains, serializes access per
//! file, and hands the whole map to a [`HistoryStorage`] backend on request.

/// Injectable wall-clock time sources.
pub mod clock;
/// Error types for chain and storage operations.
pub mod error;
/// Pure retention rules and limits.
pub mod retention;
/// Revision records and reconstruction positions.
pub mod revision;
/// Persistence seam for the chain map.
pub mod storage;

mod chain;
mod store;

pub use chain::RevisionChain;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ChainError, Result, StorageError};
pub use retention::RetentionLimits;
pub use revision::{Position, Revision, RevisionSummary};
pub use storage::{HistoryStorage, MemoryStorage, StoredChains};
pub use store::{AppendOutcome, ChainStore, CleanupReport, CorruptEntry, RetentionReport};
