//! Plain-text rendering of host responses.

use std::fmt::Write as _;

use chrono::{DateTime, Local, TimeDelta};
use chrono_humanize::HumanTime;
use localhist_chain::{AppendOutcome, CleanupReport, CorruptEntry, RetentionReport};
use localhist_host::HistoryView;

/// Describes `timestamp_ms` relative to `now_ms`, e.g. `5 minutes ago`.
pub fn relative_time(timestamp_ms: i64, now_ms: i64) -> String {
	let delta = TimeDelta::milliseconds(timestamp_ms.saturating_sub(now_ms));
	HumanTime::from(delta).to_string()
}

fn local_time(timestamp_ms: i64) -> String {
	DateTime::from_timestamp_millis(timestamp_ms)
		.map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
		.unwrap_or_else(|| timestamp_ms.to_string())
}

/// Renders a history listing, newest revision first.
pub fn history(view: &HistoryView, now_ms: i64) -> String {
	let mut out = String::new();
	let _ = writeln!(out, "{}", view.file);
	for row in view.revisions.iter().rev() {
		let _ = writeln!(
			out,
			"  {:>4}  {:<20}  {}  ({}, {} byte patch)",
			row.index,
			row.display_label,
			local_time(row.timestamp),
			relative_time(row.timestamp, now_ms),
			row.patch_bytes,
		);
	}
	let _ = writeln!(out, "  base  ({} bytes)", view.base_bytes);
	out
}

pub fn outcome(outcome: AppendOutcome) -> String {
	match outcome {
		AppendOutcome::Created { label_dropped: false } => "started history".to_string(),
		AppendOutcome::Created { label_dropped: true } => {
			"started history; the first snapshot is the base and keeps no label".to_string()
		}
		AppendOutcome::Appended { index, trimmed: 0 } => format!("recorded revision #{index}"),
		AppendOutcome::Appended { index, trimmed } => {
			format!("recorded revision #{index}, dropped {trimmed} oldest")
		}
	}
}

pub fn retention(report: &RetentionReport) -> String {
	let mut out = format!(
		"trimmed {} revisions across {} files",
		report.trimmed, report.files_trimmed
	);
	corrupt_lines(&mut out, &report.corrupt);
	out
}

pub fn cleanup(report: &CleanupReport) -> String {
	let mut out = format!("removed {} revisions", report.removed);
	if !report.deleted_files.is_empty() {
		let _ = write!(out, ", deleted history for {} files", report.deleted_files.len());
	}
	corrupt_lines(&mut out, &report.corrupt);
	out
}

pub fn corrupt(entries: &[CorruptEntry]) -> String {
	if entries.is_empty() {
		return "all histories replay cleanly".to_string();
	}
	let mut out = format!("{} damaged histories", entries.len());
	corrupt_lines(&mut out, entries);
	out
}

fn corrupt_lines(out: &mut String, entries: &[CorruptEntry]) {
	for entry in entries {
		let _ = write!(out, "\n  skipped {}: {}", entry.file, entry.reason);
	}
}

#[cfg(test)]
mod tests {
	use localhist_chain::RevisionSummary;

	use super::*;

	#[test]
	fn relative_time_reads_naturally() {
		assert_eq!(relative_time(0, 120_000), "2 minutes ago");
		assert_eq!(relative_time(5_000, 5_000), "now");
	}

	#[test]
	fn outcome_mentions_trimming() {
		assert_eq!(
			outcome(AppendOutcome::Created { label_dropped: false }),
			"started history"
		);
		assert_eq!(
			outcome(AppendOutcome::Created { label_dropped: true }),
			"started history; the first snapshot is the base and keeps no label"
		);
		assert_eq!(
			outcome(AppendOutcome::Appended { index: 3, trimmed: 0 }),
			"recorded revision #3"
		);
		assert_eq!(
			outcome(AppendOutcome::Appended { index: 49, trimmed: 1 }),
			"recorded revision #49, dropped 1 oldest"
		);
	}

	#[test]
	fn history_lists_newest_first() {
		let view = HistoryView {
			file: "/w/a.txt".into(),
			base_bytes: 5,
			revisions: vec![
				RevisionSummary {
					index: 0,
					label: Some("v1".into()),
					display_label: "v1".into(),
					timestamp: 0,
					patch_bytes: 10,
				},
				RevisionSummary {
					index: 1,
					label: None,
					display_label: "#1".into(),
					timestamp: 60_000,
					patch_bytes: 12,
				},
			],
		};
		let text = history(&view, 60_000);
		let lines: Vec<&str> = text.lines().collect();
		assert_eq!(lines[0], "/w/a.txt");
		assert!(lines[1].contains("#1"));
		assert!(lines[2].contains("v1"));
		assert!(lines[2].contains(&relative_time(0, 60_000)));
		assert_eq!(lines[3], "  base  (5 bytes)");
	}

	#[test]
	fn reports_list_corrupt_files() {
		let report = CleanupReport {
			removed: 4,
			deleted_files: vec!["/w/a".into()],
			corrupt: vec![CorruptEntry {
				file: "/w/b".into(),
				reason: "bad patch".into(),
			}],
		};
		assert_eq!(
			cleanup(&report),
			"removed 4 revisions, deleted history for 1 files\n  skipped /w/b: bad patch"
		);
		assert_eq!(corrupt(&[]), "all histories replay cleanly");
	}
}
