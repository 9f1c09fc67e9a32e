//! LocalStorage persistence for range pairs.
//!
//! Pairs live under a single key (default `wb_pairs`) as a JSON array of
//! `{"startId", "endId"}` objects. The key is shared by every tab on the
//! origin, which is why callers reload before each pass.

use branchweave_core::{PairStore, RangePair, StoreError};
use gloo_storage::errors::StorageError;
use gloo_storage::{LocalStorage, Storage};

/// `PairStore` backed by `window.localStorage`.
#[derive(Clone, Debug)]
pub struct LocalPairStore {
    key: String,
}

impl LocalPairStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// Remove the stored pairs entirely.
    pub fn clear(&self) {
        if available() {
            LocalStorage::delete(&self.key);
        }
    }
}

// gloo's LocalStorage throws when storage is disabled, so check first.
fn available() -> bool {
    web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten()
        .is_some()
}

fn map_error(err: StorageError) -> StoreError {
    match err {
        StorageError::SerdeError(e) => StoreError::Serde(e.to_string()),
        StorageError::JsError(e) => StoreError::Backend(e.to_string()),
        StorageError::KeyNotFound(key) => StoreError::Backend(format!("missing key {}", key)),
    }
}

impl PairStore for LocalPairStore {
    fn load(&self) -> Result<Vec<RangePair>, StoreError> {
        if !available() {
            return Err(StoreError::Unavailable);
        }
        match LocalStorage::get::<Vec<RangePair>>(&self.key) {
            Ok(pairs) => Ok(pairs),
            Err(StorageError::KeyNotFound(_)) => Ok(Vec::new()),
            Err(e) => Err(map_error(e)),
        }
    }

    fn save(&self, pairs: &[RangePair]) -> Result<(), StoreError> {
        if !available() {
            return Err(StoreError::Unavailable);
        }
        LocalStorage::set(&self.key, pairs).map_err(map_error)
    }
}
