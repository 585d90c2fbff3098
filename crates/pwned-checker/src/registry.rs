use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use pwned_core::CredentialRecord;

/// Shared map of full hash -> resolved credential
///
/// Every read and write takes the one lock, but callers never hold it
/// across resolution: `contains` and `insert` are separate critical
/// sections. Two workers that both miss `contains` for the same hash will
/// both resolve it; the second insert overwrites with the same value.
#[derive(Debug, Default)]
pub struct PasswordRegistry {
    entries: Mutex<HashMap<String, CredentialRecord>>,
}

impl PasswordRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CredentialRecord>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn contains(&self, full_hash: &str) -> bool {
        self.lock().contains_key(full_hash)
    }

    /// Insert or overwrite the record for its hash
    pub fn insert(&self, record: CredentialRecord) {
        self.lock().insert(record.full_hash.clone(), record);
    }

    pub fn get(&self, full_hash: &str) -> Option<CredentialRecord> {
        self.lock().get(full_hash).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copy of all records, in no particular order
    pub fn records(&self) -> Vec<CredentialRecord> {
        self.lock().values().cloned().collect()
    }
}
