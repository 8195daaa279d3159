//! Persistence seam for the chain map.
//!
//! The store never performs I/O on its own. Hosts call
//! [`ChainStore::persist`](crate::ChainStore::persist) after a successful
//! mutation and the whole map is handed to a [`HistoryStorage`] backend.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::chain::RevisionChain;
use crate::error::StorageError;

/// The persisted form of a store: file identity to chain.
///
/// Ordered so serialized output is stable across saves.
pub type StoredChains = BTreeMap<String, RevisionChain>;

/// Backing store for the serialized chain map.
pub trait HistoryStorage {
	/// Loads the full map. A backend with nothing saved yet returns an empty map.
	///
	/// # Errors
	///
	/// Returns [`StorageError`] if the backing store cannot be read or parsed.
	fn load(&self) -> Result<StoredChains, StorageError>;

	/// Replaces the stored map with `chains`.
	///
	/// # Errors
	///
	/// Returns [`StorageError`] if the backing store cannot be written.
	fn save(&self, chains: &StoredChains) -> Result<(), StorageError>;
}

/// In-memory backend for tests and embedders that persist elsewhere.
#[derive(Debug, Default)]
pub struct MemoryStorage {
	chains: Mutex<StoredChains>,
	saves: AtomicUsize,
}

impl MemoryStorage {
	/// Creates an empty backend.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a backend pre-populated with `chains`.
	pub fn with_chains(chains: StoredChains) -> Self {
		Self {
			chains: Mutex::new(chains),
			saves: AtomicUsize::new(0),
		}
	}

	/// Returns a copy of the stored map.
	pub fn contents(&self) -> StoredChains {
		self.chains.lock().clone()
	}

	/// Returns how many times [`HistoryStorage::save`] was called.
	pub fn save_count(&self) -> usize {
		self.saves.load(Ordering::SeqCst)
	}
}

impl HistoryStorage for MemoryStorage {
	fn load(&self) -> Result<StoredChains, StorageError> {
		Ok(self.chains.lock().clone())
	}

	fn save(&self, chains: &StoredChains) -> Result<(), StorageError> {
		*self.chains.lock() = chains.clone();
		self.saves.fetch_add(1, Ordering::SeqCst);
		Ok(())
	}
}
