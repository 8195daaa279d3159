use ropey::Rope;

use crate::error::{PatchError, Result};
use crate::types::{CharLen, Insertion, Operation};

/// A sequence of operations transforming one text into another.
///
/// `len` is the char length of the source text the patch was built against
/// and `len_after` the char length of the result. Application checks `len`
/// against the actual source before any mutation, so a patch replayed on the
/// wrong text fails cleanly instead of corrupting it.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Patch {
	pub(crate) ops: Vec<Operation>,
	pub(crate) len: usize,
	pub(crate) len_after: usize,
}

impl Patch {
	/// Creates an empty patch for an empty source.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the char length of the source text (before changes).
	pub fn len(&self) -> usize {
		self.len
	}

	/// Returns the char length of the text after applying changes.
	pub fn len_after(&self) -> usize {
		self.len_after
	}

	/// Returns true if this patch contains no operations.
	pub fn is_empty(&self) -> bool {
		self.ops.is_empty()
	}

	/// Returns true if applying this patch leaves the source unchanged.
	pub fn is_noop(&self) -> bool {
		self.ops.iter().all(|op| matches!(op, Operation::Retain(_)))
	}

	/// Returns a slice of all operations in this patch.
	pub fn operations(&self) -> &[Operation] {
		&self.ops
	}

	/// Adds a retain operation, merging with a preceding retain.
	pub(crate) fn retain(&mut self, n: CharLen) {
		if n == 0 {
			return;
		}

		self.len += n;
		self.len_after += n;

		if let Some(Operation::Retain(count)) = self.ops.last_mut() {
			*count += n;
		} else {
			self.ops.push(Operation::Retain(n));
		}
	}

	/// Adds a delete operation, merging with a preceding delete.
	pub(crate) fn delete(&mut self, n: CharLen) {
		if n == 0 {
			return;
		}

		self.len += n;

		if let Some(Operation::Delete(count)) = self.ops.last_mut() {
			*count += n;
		} else {
			self.ops.push(Operation::Delete(n));
		}
	}

	/// Adds an insert operation at the current position.
	///
	/// Inserts are kept ahead of an adjacent delete so that equivalent edits
	/// always serialize to the same operation order.
	pub(crate) fn insert(&mut self, text: String) {
		if text.is_empty() {
			return;
		}

		let ins = Insertion::new(text);
		self.len_after += ins.char_len();

		match self.ops.as_mut_slice() {
			[.., Operation::Insert(prev)] | [.., Operation::Insert(prev), Operation::Delete(_)] => {
				prev.push(ins);
			}
			[.., last @ Operation::Delete(_)] => {
				let del = std::mem::replace(last, Operation::Insert(ins));
				self.ops.push(del);
			}
			_ => {
				self.ops.push(Operation::Insert(ins));
			}
		}
	}

	/// Checks that this patch consumes exactly `source_len` chars.
	fn check_source(&self, source_len: usize) -> Result<()> {
		let consumed = self
			.ops
			.iter()
			.try_fold(0usize, |total, op| match op {
				Operation::Retain(n) | Operation::Delete(n) => total.checked_add(*n),
				Operation::Insert(_) => Some(total),
			})
			.ok_or(PatchError::LengthOverflow)?;

		if consumed != source_len || self.len != source_len {
			return Err(PatchError::LengthMismatch {
				expected: consumed,
				actual: source_len,
			});
		}
		Ok(())
	}

	/// Applies this patch to a rope in place.
	///
	/// # Errors
	///
	/// Returns [`PatchError::LengthMismatch`] without touching `doc` when the
	/// patch was built for a source of a different length.
	pub fn apply_rope(&self, doc: &mut Rope) -> Result<()> {
		self.check_source(doc.len_chars())?;

		let mut pos = 0;
		for op in &self.ops {
			match op {
				Operation::Retain(n) => {
					pos += n;
				}
				Operation::Delete(n) => {
					doc.remove(pos..pos + n);
				}
				Operation::Insert(ins) => {
					doc.insert(pos, ins.text());
					pos += ins.char_len();
				}
			}
		}
		Ok(())
	}

	/// Applies this patch to `source` and returns the resulting text.
	///
	/// # Errors
	///
	/// Returns [`PatchError::LengthMismatch`] when the patch was built for a
	/// source of a different length.
	pub fn apply(&self, source: &str) -> Result<String> {
		let mut rope = Rope::from_str(source);
		self.apply_rope(&mut rope)?;
		Ok(rope.to_string())
	}
}
