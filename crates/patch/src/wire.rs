//! Conversion between [`Patch`] and its storable text form.
//!
//! The wire form is a JSON array of [`WireOp`]s, e.g.
//! `[{"Retain":5},{"Insert":" world"}]`. It carries no source length; that is
//! recomputed from the operations on decode.

use serde::{Deserialize, Serialize};

use crate::error::{PatchError, Result};
use crate::patch::Patch;
use crate::types::Operation;

/// A single serializable patch operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WireOp {
	/// Skip over N characters.
	Retain(usize),
	/// Delete N characters.
	Delete(usize),
	/// Insert the given string at the current position.
	Insert(String),
}

/// A serializable patch: an ordered list of [`WireOp`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirePatch(pub Vec<WireOp>);

impl From<&Patch> for WirePatch {
	fn from(patch: &Patch) -> Self {
		let ops = patch
			.operations()
			.iter()
			.map(|op| match op {
				Operation::Retain(n) => WireOp::Retain(*n),
				Operation::Delete(n) => WireOp::Delete(*n),
				Operation::Insert(ins) => WireOp::Insert(ins.text().to_string()),
			})
			.collect();
		WirePatch(ops)
	}
}

impl TryFrom<WirePatch> for Patch {
	type Error = PatchError;

	/// Rebuilds a patch from stored operations.
	///
	/// Counts come from persisted data, so source and target totals are
	/// checked before any operation is added.
	fn try_from(wire: WirePatch) -> Result<Self> {
		let mut source = 0usize;
		let mut target = 0usize;
		for op in &wire.0 {
			let (consumed, produced) = match op {
				WireOp::Retain(n) => (*n, *n),
				WireOp::Delete(n) => (*n, 0),
				WireOp::Insert(text) => (0, text.chars().count()),
			};
			source = source.checked_add(consumed).ok_or(PatchError::LengthOverflow)?;
			target = target.checked_add(produced).ok_or(PatchError::LengthOverflow)?;
		}

		let mut patch = Patch::new();
		for op in wire.0 {
			match op {
				WireOp::Retain(n) => patch.retain(n),
				WireOp::Delete(n) => patch.delete(n),
				WireOp::Insert(text) => patch.insert(text),
			}
		}
		Ok(patch)
	}
}

impl Patch {
	/// Serializes this patch to its storable text form.
	///
	/// # Errors
	///
	/// Returns [`PatchError::Encode`] if serialization fails.
	pub fn to_text(&self) -> Result<String> {
		serde_json::to_string(&WirePatch::from(self)).map_err(PatchError::Encode)
	}

	/// Parses a patch from its stored text form.
	///
	/// # Errors
	///
	/// Returns [`PatchError::Decode`] if `text` is not a valid wire patch and
	/// [`PatchError::LengthOverflow`] if its counts cannot be totalled.
	pub fn from_text(text: &str) -> Result<Self> {
		let wire: WirePatch = serde_json::from_str(text).map_err(PatchError::Decode)?;
		Patch::try_from(wire)
	}
}
