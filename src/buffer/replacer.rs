//! LRU-K frame replacement policy.
//!
//! Classical LRU-K split into two ordered lists:
//!
//! - **history list**: frames seen fewer than `k` times. Ordered by first
//!   access; later sub-k accesses do not move an entry. These are scan or
//!   warm-up frames and are evicted first, oldest arrival first.
//! - **cache list**: frames seen `k` or more times. Every access from the
//!   k-th on refreshes the entry to the most-recently-used end; eviction
//!   takes the least-recently-used end.
//!
//! Evicting history before cache keeps a one-pass scan from displacing the
//! hot set. Both lists are `LinkedHashMap`s, giving O(1) insert, remove,
//! and refresh while preserving order; per-frame `use_count`/`evictable`
//! state lives in flat arrays indexed by frame id.
//!
//! The type carries no lock of its own: the buffer pool owns one and calls
//! it under the pool latch. Standalone use wraps it in a `Mutex`.

use eyre::{ensure, Result};
use hashlink::LinkedHashMap;

use crate::config::FrameId;

pub struct LruKReplacer {
    /// Frames with `0 < use_count < k`, oldest first access at the front.
    history: LinkedHashMap<FrameId, ()>,
    /// Frames with `use_count >= k`, least recently used at the front.
    cache: LinkedHashMap<FrameId, ()>,
    use_count: Box<[usize]>,
    evictable: Box<[bool]>,
    curr_size: usize,
    num_frames: usize,
    k: usize,
}

impl LruKReplacer {
    pub fn new(num_frames: usize, k: usize) -> Self {
        assert!(k >= 1, "LRU-K requires k >= 1");
        Self {
            history: LinkedHashMap::new(),
            cache: LinkedHashMap::new(),
            use_count: vec![0; num_frames].into_boxed_slice(),
            evictable: vec![false; num_frames].into_boxed_slice(),
            curr_size: 0,
            num_frames,
            k,
        }
    }

    /// Registers one access to `frame_id`, promoting it between lists as
    /// its access count crosses `k`.
    pub fn record_access(&mut self, frame_id: FrameId) -> Result<()> {
        self.check_frame_id(frame_id)?;

        self.use_count[frame_id] += 1;
        let count = self.use_count[frame_id];

        if count == self.k {
            // Graduates: out of history, in at the cache's MRU end.
            self.history.remove(&frame_id);
            self.cache.insert(frame_id, ());
        } else if count > self.k {
            // Refresh to the MRU end.
            self.cache.remove(&frame_id);
            self.cache.insert(frame_id, ());
        } else if !self.history.contains_key(&frame_id) {
            // Sub-k entries keep their first-seen position.
            self.history.insert(frame_id, ());
        }

        Ok(())
    }

    /// Marks `frame_id` as a legal (or illegal) eviction candidate. A
    /// frame with no recorded access is unknown and the call is a no-op.
    pub fn set_evictable(&mut self, frame_id: FrameId, evictable: bool) -> Result<()> {
        self.check_frame_id(frame_id)?;

        if self.use_count[frame_id] == 0 {
            return Ok(());
        }
        if self.evictable[frame_id] != evictable {
            self.evictable[frame_id] = evictable;
            if evictable {
                self.curr_size += 1;
            } else {
                self.curr_size -= 1;
            }
        }

        Ok(())
    }

    /// Chooses and removes a victim: the oldest evictable history entry if
    /// any, otherwise the least-recently-used evictable cache entry.
    pub fn evict(&mut self) -> Option<FrameId> {
        let victim = self
            .history
            .keys()
            .copied()
            .find(|&frame_id| self.evictable[frame_id])
            .or_else(|| {
                self.cache
                    .keys()
                    .copied()
                    .find(|&frame_id| self.evictable[frame_id])
            })?;

        if self.use_count[victim] < self.k {
            self.history.remove(&victim);
        } else {
            self.cache.remove(&victim);
        }
        self.use_count[victim] = 0;
        self.evictable[victim] = false;
        self.curr_size -= 1;

        Some(victim)
    }

    /// Force-removes an evictable frame, resetting its access state.
    /// No-op when the frame is not evictable.
    pub fn remove(&mut self, frame_id: FrameId) -> Result<()> {
        self.check_frame_id(frame_id)?;

        if !self.evictable[frame_id] {
            return Ok(());
        }
        if self.use_count[frame_id] < self.k {
            self.history.remove(&frame_id);
        } else {
            self.cache.remove(&frame_id);
        }
        self.use_count[frame_id] = 0;
        self.evictable[frame_id] = false;
        self.curr_size -= 1;

        Ok(())
    }

    /// Count of currently evictable frames.
    pub fn size(&self) -> usize {
        self.curr_size
    }

    fn check_frame_id(&self, frame_id: FrameId) -> Result<()> {
        ensure!(
            frame_id < self.num_frames,
            "frame id {} out of range for replacer of {} frames",
            frame_id,
            self.num_frames
        );
        Ok(())
    }
}
