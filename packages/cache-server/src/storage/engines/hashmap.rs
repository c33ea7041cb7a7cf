//! In-memory [`StorageEngine`] implementation backed by [`DashMap`].
//!
//! Lock-free for readers, fine-grained sharded locking for writers. This is
//! the engine the local Blob Store tier runs on.

use dashmap::DashMap;

use crate::storage::engine::StorageEngine;
use crate::storage::blob::Blob;

pub struct HashMapStorage {
    entries: DashMap<String, Blob>,
}

impl HashMapStorage {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl Default for HashMapStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageEngine for HashMapStorage {
    fn put(&self, key: &str, blob: Blob) -> Option<Blob> {
        self.entries.insert(key.to_string(), blob)
    }

    fn get(&self, key: &str) -> Option<Blob> {
        self.entries.get(key).map(|r| r.clone())
    }

    fn remove(&self, key: &str) -> Option<Blob> {
        self.entries.remove(key).map(|(_, r)| r)
    }

    fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn clear(&self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_blob(cas: u64) -> Blob {
        Blob::new(vec![1, 2, 3], cas, 0)
    }

    #[test]
    fn put_get_remove_round_trip() {
        let storage = HashMapStorage::new();
        assert!(storage.put("key1", make_blob(1)).is_none());

        let fetched = storage.get("key1");
        assert!(fetched.is_some());
        assert_eq!(fetched.unwrap().cas_token, 1);

        let removed = storage.remove("key1");
        assert!(removed.is_some());
        assert!(storage.get("key1").is_none());
    }

    #[test]
    fn contains_key_reflects_state() {
        let storage = HashMapStorage::new();
        assert!(!storage.contains_key("key1"));
        storage.put("key1", make_blob(1));
        assert!(storage.contains_key("key1"));
        storage.remove("key1");
        assert!(!storage.contains_key("key1"));
    }

    #[test]
    fn len_and_is_empty() {
        let storage = HashMapStorage::new();
        assert!(storage.is_empty());
        storage.put("a", make_blob(1));
        storage.put("b", make_blob(2));
        assert_eq!(storage.len(), 2);
        storage.remove("a");
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn clear_empties_storage() {
        let storage = HashMapStorage::new();
        storage.put("a", make_blob(1));
        storage.put("b", make_blob(2));
        storage.clear();
        assert!(storage.is_empty());
    }

    #[test]
    fn put_replaces_and_returns_previous() {
        let storage = HashMapStorage::new();
        storage.put("a", make_blob(1));
        let previous = storage.put("a", make_blob(2));
        assert_eq!(previous.unwrap().cas_token, 1);
        assert_eq!(storage.get("a").unwrap().cas_token, 2);
    }
}
