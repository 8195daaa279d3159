/// Length of a text span counted in chars.
pub type CharLen = usize;

/// A text insertion with cached character length.
///
/// Storing the character count avoids repeated O(n) `.chars().count()` calls
/// while validating and applying a patch.
///
/// Fields are private to enforce the invariant that `char_len` always equals
/// `text.chars().count()`. Construct via [`Insertion::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
	text: String,
	char_len: CharLen,
}

impl Insertion {
	/// Creates a new insertion, computing the character length once.
	#[inline]
	pub fn new(text: String) -> Self {
		let char_len = text.chars().count();
		Self { text, char_len }
	}

	/// Returns true if this insertion is empty.
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.char_len == 0
	}

	/// Returns the inserted text.
	#[inline]
	pub fn text(&self) -> &str {
		&self.text
	}

	/// Returns the cached character length.
	#[inline]
	pub fn char_len(&self) -> CharLen {
		self.char_len
	}

	/// Appends text from another insertion, updating the cached length.
	pub(crate) fn push(&mut self, other: Insertion) {
		self.text.push_str(&other.text);
		self.char_len += other.char_len;
	}
}

/// A single operation in a patch.
///
/// Operations walk the source text from the start. Retained and deleted
/// counts consume source chars; insertions consume none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
	/// Retain the next N characters from the source text.
	Retain(CharLen),
	/// Delete the next N characters from the source text.
	Delete(CharLen),
	/// Insert new text at the current position.
	Insert(Insertion),
}
