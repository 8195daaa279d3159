use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::RevisionChain;
use crate::error::ChainError;
use crate::revision::{Position, Revision};

const LIMIT: usize = 1024;

fn chain_of(base: &str, versions: &[&str]) -> RevisionChain {
	let mut chain = RevisionChain::new(base);
	for (i, version) in versions.iter().enumerate() {
		chain.append(version, None, i as i64 * 1_000, LIMIT).unwrap();
	}
	chain
}

fn all_versions(chain: &RevisionChain) -> Vec<String> {
	(0..chain.len())
		.map(|i| chain.reconstruct(Position::After(i)).unwrap())
		.collect()
}

#[test]
fn hello_world_scenario() {
	let mut chain = RevisionChain::new("hello");
	chain.append("hello world", Some("v1"), 1, LIMIT).unwrap();
	chain.append("hello world!", None, 2, LIMIT).unwrap();

	assert_eq!(chain.len(), 2);
	assert_eq!(chain.reconstruct(Position::After(0)).unwrap(), "hello world");
	assert_eq!(chain.reconstruct(Position::After(1)).unwrap(), "hello world!");
	assert_eq!(chain.reconstruct(Position::from_signed(-1)).unwrap(), "hello");
	assert_eq!(chain.revisions()[0].label.as_deref(), Some("v1"));
	assert_eq!(chain.revisions()[1].label, None);
}

#[test]
fn new_chain_has_only_base() {
	let chain = RevisionChain::new("seed");
	assert!(chain.is_empty());
	assert_eq!(chain.last_position(), Position::Base);
	assert_eq!(chain.latest().unwrap(), "seed");
}

#[test]
fn identical_content_still_records_a_revision() {
	let mut chain = RevisionChain::new("same\n");
	chain.append("same\n", None, 5, LIMIT).unwrap();
	chain.append("same\n", None, 6, LIMIT).unwrap();
	assert_eq!(chain.len(), 2);
	assert_eq!(all_versions(&chain), vec!["same\n", "same\n"]);
}

#[test]
fn oversized_content_is_rejected_without_mutation() {
	let mut chain = chain_of("a", &["ab"]);
	let before = chain.clone();
	let err = chain.append("abcdef", None, 10, 4).unwrap_err();
	assert!(matches!(err, ChainError::ContentTooLarge { size: 6, limit: 4 }));
	assert!(err.is_soft_skip());
	assert_eq!(chain, before);
}

#[test]
fn timestamps_never_decrease() {
	let mut chain = RevisionChain::new("");
	chain.append("a", None, 500, LIMIT).unwrap();
	chain.append("b", None, 100, LIMIT).unwrap();
	assert_eq!(chain.revisions()[1].timestamp, 500);
}

#[test]
fn reconstruct_rejects_out_of_range_index() {
	let chain = chain_of("x", &["y", "z"]);
	assert!(matches!(
		chain.reconstruct(Position::After(2)),
		Err(ChainError::IndexOutOfRange { index: 2, len: 2 })
	));
}

#[test]
fn malformed_patch_is_reported_as_corrupt() {
	let mut chain = chain_of("one\n", &["one\ntwo\n"]);
	chain.revisions.push(Revision {
		patch: "garbage".into(),
		timestamp: 10,
		label: None,
	});

	assert_eq!(chain.reconstruct(Position::After(0)).unwrap(), "one\ntwo\n");
	assert!(matches!(
		chain.reconstruct(Position::After(1)),
		Err(ChainError::CorruptChain { index: 1, .. })
	));
	assert!(chain.verify().is_err());
}

#[test]
fn overflowing_patch_is_reported_as_corrupt() {
	let chain: RevisionChain = serde_json::from_value(serde_json::json!({
		"base": "abcdef",
		"revisions": [
			{ "patch": format!(r#"[{{"Retain":{}}},{{"Delete":6}}]"#, usize::MAX), "timestamp": 1 },
		],
	}))
	.unwrap();

	assert!(matches!(
		chain.reconstruct(Position::After(0)),
		Err(ChainError::CorruptChain { index: 0, .. })
	));
	assert!(chain.verify().is_err());

	let mut trimmed = chain.clone();
	assert!(trimmed.trim_to_count(1).is_ok());
	assert!(matches!(
		trimmed.trim_older_than(i64::MAX),
		Err(ChainError::CorruptChain { index: 0, .. })
	));
	assert_eq!(trimmed, chain);
}

#[test]
fn patch_for_wrong_source_is_reported_as_corrupt() {
	let mut chain = chain_of("abc", &["abcd"]);
	chain.base = "a much longer base".into();
	assert!(matches!(
		chain.reconstruct(Position::After(0)),
		Err(ChainError::CorruptChain { index: 0, .. })
	));
}

#[test]
fn append_on_corrupt_chain_fails_and_leaves_it_alone() {
	let mut chain = chain_of("abc", &["abcd"]);
	chain.revisions[0].patch = "[]".into();
	let before = chain.clone();
	assert!(matches!(
		chain.append("new", None, 9, LIMIT),
		Err(ChainError::CorruptChain { .. })
	));
	assert_eq!(chain, before);
}

#[test]
fn rename_sets_and_clears_labels() {
	let mut chain = chain_of("a", &["b", "c"]);
	let versions = all_versions(&chain);

	chain.rename(1, "release").unwrap();
	chain.rename(1, "release").unwrap();
	assert_eq!(chain.revisions()[1].label.as_deref(), Some("release"));
	assert_eq!(chain.revisions()[1].display_label(1), "release");

	chain.rename(1, "  ").unwrap();
	assert_eq!(chain.revisions()[1].label, None);
	assert_eq!(chain.revisions()[1].display_label(1), "#1");

	assert_eq!(all_versions(&chain), versions);
	assert!(matches!(
		chain.rename(2, "nope"),
		Err(ChainError::IndexOutOfRange { index: 2, len: 2 })
	));
}

#[test]
fn trim_to_count_keeps_newest_and_rebases() {
	let mut chain = chain_of("v0", &["v1", "v2", "v3", "v4", "v5"]);
	let before = all_versions(&chain);

	let removed = chain.trim_to_count(2).unwrap();
	assert_eq!(removed, 3);
	assert_eq!(chain.len(), 2);
	assert_eq!(chain.base(), "v3");
	assert_eq!(all_versions(&chain), before[3..].to_vec());
	assert_eq!(chain.revisions()[0].timestamp, 3_000);
}

#[test]
fn trim_to_count_below_cap_is_noop() {
	let mut chain = chain_of("a", &["b"]);
	let before = chain.clone();
	assert_eq!(chain.trim_to_count(50).unwrap(), 0);
	assert_eq!(chain, before);
}

#[test]
fn trim_older_than_rebases_onto_survivors() {
	let mut chain = chain_of("v0", &["v1", "v2", "v3", "v4"]);
	let before = all_versions(&chain);

	let removed = chain.trim_older_than(1_000).unwrap();
	assert_eq!(removed, 2);
	assert_eq!(chain.base(), "v2");
	assert_eq!(all_versions(&chain), before[2..].to_vec());
}

#[test]
fn trim_older_than_keeps_revisions_after_a_younger_one() {
	let mut chain = chain_of("v0", &["v1", "v2", "v3"]);
	chain.revisions[1].timestamp = 5_000;
	chain.revisions[2].timestamp = 0;

	assert_eq!(chain.trim_older_than(1_000).unwrap(), 1);
	assert_eq!(chain.len(), 2);
	assert_eq!(chain.reconstruct(Position::After(1)).unwrap(), "v3");
}

#[test]
fn trimming_everything_collapses_to_latest() {
	let mut chain = chain_of("v0", &["v1", "v2"]);
	assert_eq!(chain.trim_older_than(i64::MAX).unwrap(), 2);
	assert!(chain.is_empty());
	assert_eq!(chain.base(), "v2");
}

#[test]
fn rebase_failure_leaves_chain_untouched() {
	let mut chain = chain_of("v0", &["v1", "v2", "v3"]);
	chain.revisions[0].patch = "{".into();
	let before = chain.clone();
	assert!(chain.trim_to_count(1).is_err());
	assert_eq!(chain, before);
}

#[test]
fn rebase_past_end_is_out_of_range() {
	let mut chain = chain_of("v0", &["v1"]);
	assert!(matches!(
		chain.rebase(2),
		Err(ChainError::IndexOutOfRange { index: 2, len: 1 })
	));
}

#[test]
fn summaries_fall_back_to_index() {
	let mut chain = RevisionChain::new("a");
	chain.append("b", Some("first"), 7, LIMIT).unwrap();
	chain.append("c", None, 8, LIMIT).unwrap();
	let rows = chain.summaries();
	assert_eq!(rows.len(), 2);
	assert_eq!(rows[0].display_label, "first");
	assert_eq!(rows[1].display_label, "#1");
	assert_eq!(rows[1].timestamp, 8);
	assert_eq!(rows[1].patch_bytes, chain.revisions()[1].patch.len());
}

#[test]
fn serialized_layout_matches_host_format() {
	let mut chain = RevisionChain::new("hello");
	chain.append("hello world", Some("v1"), 1_700_000_000_000, LIMIT).unwrap();
	chain.append("hello world!", None, 1_700_000_001_000, LIMIT).unwrap();

	let value = serde_json::to_value(&chain).unwrap();
	assert_eq!(value["base"], "hello");
	assert_eq!(value["revisions"][0]["timestamp"], 1_700_000_000_000_i64);
	assert_eq!(value["revisions"][0]["label"], "v1");
	assert!(value["revisions"][1].get("label").is_none());

	let restored: RevisionChain = serde_json::from_value(value).unwrap();
	assert_eq!(restored, chain);
}

fn arb_versions() -> impl Strategy<Value = Vec<String>> {
	prop::collection::vec("[ab\n]{0,12}", 1..12)
}

proptest! {
	#[test]
	fn last_revision_is_last_appended(base in "[ab\n]{0,12}", versions in arb_versions()) {
		let mut chain = RevisionChain::new(base);
		for (i, version) in versions.iter().enumerate() {
			let before = chain.len();
			let index = chain.append(version, None, i as i64, LIMIT).unwrap();
			prop_assert_eq!(index, before);
			prop_assert_eq!(chain.len(), before + 1);
			prop_assert_eq!(&chain.latest().unwrap(), version);
		}
	}

	#[test]
	fn reads_are_deterministic(versions in arb_versions()) {
		let mut chain = RevisionChain::new("");
		for (i, version) in versions.iter().enumerate() {
			chain.append(version, None, i as i64, LIMIT).unwrap();
		}
		let snapshot = chain.clone();
		let first = all_versions(&chain);
		let second = all_versions(&chain);
		prop_assert_eq!(&first, &second);
		prop_assert_eq!(&first, &versions);
		prop_assert_eq!(chain, snapshot);
	}

	#[test]
	fn count_trim_preserves_survivors(versions in arb_versions(), max in 1usize..6) {
		let mut chain = RevisionChain::new("root");
		for (i, version) in versions.iter().enumerate() {
			chain.append(version, None, i as i64, LIMIT).unwrap();
		}
		let before = all_versions(&chain);
		chain.trim_to_count(max).unwrap();

		prop_assert!(chain.len() <= max);
		let dropped = before.len() - chain.len();
		prop_assert_eq!(all_versions(&chain), before[dropped..].to_vec());
	}

	#[test]
	fn age_trim_preserves_survivors(versions in arb_versions(), cutoff in -1i64..14) {
		let mut chain = RevisionChain::new("root");
		for (i, version) in versions.iter().enumerate() {
			chain.append(version, None, i as i64, LIMIT).unwrap();
		}
		let before = all_versions(&chain);
		let removed = chain.trim_older_than(cutoff).unwrap();

		prop_assert!(chain.revisions().iter().all(|r| r.timestamp > cutoff));
		prop_assert_eq!(all_versions(&chain), before[removed..].to_vec());
	}
}
