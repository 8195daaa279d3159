//! Text patch codec used by the revision chain.
//!
//! A [`Patch`] is a sequence of retain/delete/insert operations counted in
//! chars, the same operation model the editor's changesets use. Patches are
//! produced by diffing two strings ([`Patch::diff`]), applied with up-front
//! validation ([`Patch::apply`]), and stored as text ([`Patch::to_text`],
//! [`Patch::from_text`]).

mod diff;
/// Error types for decoding and applying patches.
pub mod error;
mod patch;
/// Patch operation types.
pub mod types;
/// Serializable wire form of a patch.
pub mod wire;


pub use error::{PatchError, Result};
pub use patch::Patch;
pub use ropey::Rope;
pub use types::{CharLen, Insertion, Operation};
pub use wire::{WireOp, WirePatch};
