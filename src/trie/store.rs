//! Concurrent holder of the current trie root.
//!
//! The trie itself is immutable; what changes is which version is
//! "current". `TrieStore` keeps that one mutable root reference behind a
//! `RwLock`: readers clone the root handle (an `Arc` bump) and walk it
//! with no lock held, writers swap in the successor version. Readers that
//! started before a write keep seeing their snapshot.

use std::any::Any;
use std::sync::Arc;

use parking_lot::RwLock;

use super::Trie;

#[derive(Default)]
pub struct TrieStore {
    root: RwLock<Trie>,
}

impl TrieStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current trie version. Later writes do not affect it.
    pub fn snapshot(&self) -> Trie {
        self.root.read().clone()
    }

    /// Looks up `key` in the current version, returning a handle that
    /// stays valid however long the caller keeps it.
    pub fn get<T: Any + Send + Sync>(&self, key: &[u8]) -> Option<Arc<T>> {
        let snapshot = self.snapshot();
        let value = Arc::clone(snapshot.value_ref(key)?);
        value.downcast::<T>().ok()
    }

    pub fn put<T: Any + Send + Sync>(&self, key: &[u8], value: T) {
        let mut root = self.root.write();
        let next = root.put(key, value);
        *root = next;
    }

    pub fn remove(&self, key: &[u8]) {
        let mut root = self.root.write();
        let next = root.remove(key);
        *root = next;
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn put_get_remove_through_the_store() {
        let store = TrieStore::new();
        store.put(b"k", 5u32);

        assert_eq!(store.get::<u32>(b"k").as_deref(), Some(&5));
        assert_eq!(store.get::<u64>(b"k"), None);

        store.remove(b"k");
        assert_eq!(store.get::<u32>(b"k"), None);
    }

    #[test]
    fn snapshots_survive_later_writes() {
        let store = TrieStore::new();
        store.put(b"k", 1u32);

        let before = store.snapshot();
        store.put(b"k", 2u32);

        assert_eq!(before.get::<u32>(b"k"), Some(&1));
        assert_eq!(store.get::<u32>(b"k").as_deref(), Some(&2));
    }

    #[test]
    fn value_handles_outlive_removal() {
        let store = TrieStore::new();
        store.put(b"k", "kept".to_string());

        let handle = store.get::<String>(b"k").unwrap();
        store.remove(b"k");
        assert_eq!(handle.as_str(), "kept");
    }

    #[test]
    fn concurrent_readers_see_complete_versions() {
        let store = Arc::new(TrieStore::new());
        for i in 0..16u32 {
            store.put(format!("key{i}").as_bytes(), i);
        }

        let mut handles = Vec::new();
        for _ in 0..4 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                for round in 0..100u32 {
                    let i = round % 16;
                    let value = store
                        .get::<u32>(format!("key{i}").as_bytes())
                        .expect("seeded keys are never removed");
                    assert_eq!(*value % 16, i);
                }
            }));
        }

        let writer = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for round in 0..100u32 {
                    let i = round % 16;
                    store.put(format!("key{i}").as_bytes(), i + 16 * round);
                }
            })
        };

        for handle in handles {
            handle.join().unwrap();
        }
        writer.join().unwrap();
    }
}
