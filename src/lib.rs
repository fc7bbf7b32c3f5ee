//! # RookDB - Storage-Side Memory Management Core
//!
//! RookDB is the storage engine core of an educational embedded relational
//! database. It provides the three primitives every layer above depends on:
//! a bounded buffer pool brokering access to fixed-size disk pages, an LRU-K
//! replacement policy choosing eviction victims, and a persistent
//! copy-on-write trie used as the in-memory key/value index primitive.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use rookdb::{BufferPool, FileDiskManager};
//!
//! let disk = Arc::new(FileDiskManager::open("./rook.db")?);
//! let pool = BufferPool::new(64, disk, 2);
//!
//! let (page_id, mut guard) = pool.new_guarded()?.expect("pool exhausted");
//! guard.data_mut()[..5].copy_from_slice(b"hello");
//! drop(guard); // unpins, marked dirty
//!
//! let guard = pool.fetch_read(page_id)?.expect("pool exhausted");
//! assert_eq!(&guard.data()[..5], b"hello");
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────┐
//! │    Access methods / catalog (higher layers)│
//! ├──────────────────────────┬─────────────────┤
//! │   Buffer Pool            │  Trie Index     │
//! │   (pin/unpin, guards)    │  (copy-on-write)│
//! ├──────────────────────────┤                 │
//! │   LRU-K Replacer         │                 │
//! ├──────────────────────────┴─────────────────┤
//! │   DiskManager (file-backed or in-memory)   │
//! └────────────────────────────────────────────┘
//! ```
//!
//! Callers request pages from the buffer pool by id. The pool returns an
//! already-resident frame, draws from its free list, or asks the replacer
//! for a victim (writing it back through the disk manager if dirty) and
//! repurposes it. The trie is independent of the pool and serves higher
//! layers as an in-memory index.
//!
//! ## Module Overview
//!
//! - [`buffer`]: buffer pool, LRU-K replacer, RAII page guards
//! - [`storage`]: the `DiskManager` contract plus file- and heap-backed
//!   implementations
//! - [`trie`]: persistent copy-on-write trie and its concurrent store
//! - [`config`]: page geometry and pool defaults

pub mod buffer;
pub mod config;
pub mod storage;
pub mod trie;

pub use buffer::{BufferPool, LruKReplacer, PageGuard, ReadPageGuard, WritePageGuard};
pub use config::{FrameId, PageId, INVALID_PAGE_ID, PAGE_SIZE};
pub use storage::{DiskManager, FileDiskManager, MemoryDiskManager};
pub use trie::{Trie, TrieStore};
