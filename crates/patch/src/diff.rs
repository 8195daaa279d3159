use similar::{DiffTag, TextDiff};

use crate::patch::Patch;

fn char_count(lines: &[&str]) -> usize {
	lines.iter().map(|line| line.chars().count()).sum()
}

impl Patch {
	/// Builds a patch turning `old` into `new`.
	///
	/// Diffs line by line (Myers) and expresses every hunk as char-counted
	/// operations. Lines keep their terminators, so unchanged spans retain
	/// exactly the source text. Identical inputs yield a no-op patch.
	pub fn diff(old: &str, new: &str) -> Self {
		let diff = TextDiff::from_lines(old, new);
		let old_lines = diff.old_slices();
		let new_lines = diff.new_slices();

		let mut patch = Patch::new();
		for op in diff.ops() {
			let (tag, old_range, new_range) = op.as_tag_tuple();
			match tag {
				DiffTag::Equal => patch.retain(char_count(&old_lines[old_range])),
				DiffTag::Delete => patch.delete(char_count(&old_lines[old_range])),
				DiffTag::Insert => patch.insert(new_lines[new_range].concat()),
				DiffTag::Replace => {
					patch.delete(char_count(&old_lines[old_range]));
					patch.insert(new_lines[new_range].concat());
				}
			}
		}
		patch
	}
}
