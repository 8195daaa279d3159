//! Wall-clock time for revision timestamps.
//!
//! Timestamps are milliseconds since the Unix epoch. The [`Clock`] trait lets
//! tests drive age-based retention deterministically with [`ManualClock`].

use std::sync::atomic::{AtomicI64, Ordering};

/// Source of the current time in milliseconds since the Unix epoch.
pub trait Clock: Send + Sync {
	/// Returns the current time in milliseconds since the Unix epoch.
	fn now_ms(&self) -> i64;
}

/// System wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now_ms(&self) -> i64 {
		chrono::Utc::now().timestamp_millis()
	}
}

/// Settable clock for tests and replay.
#[derive(Debug, Default)]
pub struct ManualClock {
	now: AtomicI64,
}

impl ManualClock {
	/// Creates a clock reading `start_ms`.
	pub fn new(start_ms: i64) -> Self {
		Self {
			now: AtomicI64::new(start_ms),
		}
	}

	/// Sets the current time.
	pub fn set(&self, now_ms: i64) {
		self.now.store(now_ms, Ordering::SeqCst);
	}

	/// Moves the clock forward by `delta_ms`.
	pub fn advance(&self, delta_ms: i64) {
		self.now.fetch_add(delta_ms, Ordering::SeqCst);
	}
}

impl Clock for ManualClock {
	fn now_ms(&self) -> i64 {
		self.now.load(Ordering::SeqCst)
	}
}
