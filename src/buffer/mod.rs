//! # Buffer Pool Module
//!
//! A bounded cache of disk pages. The pool owns `pool_size` fixed-size
//! frames and maps logical page ids onto them, reading and writing through
//! a [`DiskManager`](crate::storage::DiskManager) and delegating victim
//! selection to the LRU-K replacer when every frame is occupied.
//!
//! ## Pin Protocol
//!
//! Pages must be pinned before access so the replacer cannot pull the
//! frame out from under the caller:
//!
//! 1. `fetch_basic` / `fetch_read` / `fetch_write` / `new_guarded` pin the
//!    frame and return a guard
//! 2. the caller reads or writes through the guard
//! 3. dropping the guard unpins exactly once, carrying the dirty flag
//! 4. frames with `pin_count > 0` are never evicted
//!
//! ## Latching Discipline
//!
//! One mutex serializes every pool operation for its whole body, disk I/O
//! included: page table, free list, frame metadata, and the replacer all
//! change under it. Each frame's *contents* sit behind a separate
//! `RwLock`; read/write guards hold it for their scope and release it
//! before unpinning, and the pool only acquires a content lock for frames
//! with no outstanding pins (eviction, write-back) or transiently for
//! flushes. The two levels never nest in the deadlocking direction.
//!
//! ## Eviction
//!
//! LRU-K: a frame accessed fewer than `k` times is a "warming" frame and
//! is preferred for eviction, oldest arrival first, so one-shot scans
//! cannot displace the hot set. Frames at `k` or more accesses are evicted
//! in least-recently-used order. See [`replacer`] for the exact rules.

mod guard;
mod pool;
mod replacer;

pub use guard::{PageGuard, ReadPageGuard, WritePageGuard};
pub use pool::BufferPool;
pub use replacer::LruKReplacer;
