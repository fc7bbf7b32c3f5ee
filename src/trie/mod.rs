//! # Copy-on-Write Trie
//!
//! A persistent map from byte-string keys to typed values. `put` and
//! `remove` never mutate an existing node: they copy the nodes along the
//! affected path and share every unchanged subtree with the original via
//! `Arc`, then hand back a new [`Trie`] root. Readers holding an earlier
//! root are never affected by later writers, which is what makes the
//! structure safe for read-mostly concurrent use (see [`TrieStore`]).
//!
//! ```text
//! t1 = {}.put(b"ab", 1).put(b"ac", 2)          t2 = t1.put(b"ab", 3)
//!
//!        root                                        root'
//!         │ a                                          │ a
//!        node          ── shared children ──►        node'
//!        ╱  ╲                                        ╱    ╲
//!    b ╱      ╲ c                                b ╱        ╲ c
//!   (1)        (2) ◄───────── shared ──────────── (3)        │
//! ```
//!
//! ## Value Typing
//!
//! Values are type-erased (`Arc<dyn Any + Send + Sync>`) and recovered by
//! runtime downcast: `get::<T>` on a key holding another type yields
//! `None`, not an error. A node is a *value node* iff it holds a value;
//! interior nodes exist only to carry children, and `remove` prunes any
//! node left with neither.
//!
//! Costs: `get`, `put`, and `remove` are all O(|key|) in nodes visited;
//! `put`/`remove` allocate O(|key|) fresh nodes and bump child `Arc`s for
//! everything they do not touch.

mod store;

use std::any::Any;
use std::sync::Arc;

use hashbrown::HashMap;

pub use store::TrieStore;

pub(crate) type ValueRef = Arc<dyn Any + Send + Sync>;

#[derive(Clone, Default)]
struct TrieNode {
    children: HashMap<u8, Arc<TrieNode>>,
    value: Option<ValueRef>,
}

/// Handle to one immutable trie version. Cloning copies the root pointer;
/// both handles see the same (unchanging) version.
#[derive(Clone, Default)]
pub struct Trie {
    root: Option<Arc<TrieNode>>,
}

impl Trie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up `key` and returns its value if present *and* of type `T`.
    /// The empty key consults the root node itself.
    pub fn get<T: Any>(&self, key: &[u8]) -> Option<&T> {
        self.value_ref(key)?.downcast_ref::<T>()
    }

    /// Returns a new trie in which `key` maps to `value`. Existing
    /// children below the key are preserved; the original trie is
    /// untouched.
    pub fn put<T: Any + Send + Sync>(&self, key: &[u8], value: T) -> Trie {
        let value: ValueRef = Arc::new(value);
        let root = Self::put_node(self.root.as_ref(), key, value);
        Trie {
            root: Some(Arc::new(root)),
        }
    }

    /// Returns a new trie without `key`. Nodes left with neither value
    /// nor children are pruned; a missing key shares the original
    /// subtrees untouched.
    pub fn remove(&self, key: &[u8]) -> Trie {
        let Some(root) = self.root.as_ref() else {
            return self.clone();
        };
        Trie {
            root: Self::remove_node(root, key),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub(crate) fn value_ref(&self, key: &[u8]) -> Option<&ValueRef> {
        let mut node = self.root.as_ref()?;
        for byte in key {
            node = node.children.get(byte)?;
        }
        node.value.as_ref()
    }

    fn put_node(node: Option<&Arc<TrieNode>>, key: &[u8], value: ValueRef) -> TrieNode {
        match key.split_first() {
            // Terminal position: a value node over whatever children were
            // already here.
            None => TrieNode {
                children: node.map(|n| n.children.clone()).unwrap_or_default(),
                value: Some(value),
            },
            Some((&byte, rest)) => {
                let mut parent = match node {
                    Some(n) => (**n).clone(),
                    None => TrieNode::default(),
                };
                let child = parent.children.get(&byte).cloned();
                let new_child = Self::put_node(child.as_ref(), rest, value);
                parent.children.insert(byte, Arc::new(new_child));
                parent
            }
        }
    }

    /// Copy-on-write removal. `None` tells the caller to drop the edge to
    /// this node entirely.
    fn remove_node(node: &Arc<TrieNode>, key: &[u8]) -> Option<Arc<TrieNode>> {
        let Some((&byte, rest)) = key.split_first() else {
            // Terminal position: childless nodes vanish, others live on
            // as non-value nodes.
            if node.children.is_empty() {
                return None;
            }
            return Some(Arc::new(TrieNode {
                children: node.children.clone(),
                value: None,
            }));
        };

        let Some(child) = node.children.get(&byte) else {
            // Key not present: this subtree is unchanged, share it.
            return Some(Arc::clone(node));
        };

        let new_child = Self::remove_node(child, rest);
        let mut parent = (**node).clone();
        match new_child {
            Some(child) => {
                parent.children.insert(byte, child);
            }
            None => {
                parent.children.remove(&byte);
                if parent.children.is_empty() && parent.value.is_none() {
                    return None;
                }
            }
        }
        Some(Arc::new(parent))
    }
}
