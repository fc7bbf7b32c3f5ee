//! Buffer pool manager.
//!
//! Frame metadata (resident page id, pin count, dirty flag), the page
//! table, the free list, and the replacer all live in [`PoolInner`] behind
//! one mutex; every public operation holds it for its whole body, disk I/O
//! included. Frame *contents* live outside it, one `RwLock` per frame, so
//! page guards can latch bytes without serializing against unrelated pool
//! traffic.

use std::sync::Arc;

use eyre::Result;
use hashbrown::HashMap;
use parking_lot::{Mutex, RwLock};

use super::guard::{PageGuard, ReadPageGuard, WritePageGuard};
use super::replacer::LruKReplacer;
use crate::config::{FrameId, PageId, DEFAULT_POOL_SIZE, DEFAULT_REPLACER_K, INVALID_PAGE_ID, PAGE_SIZE};
use crate::storage::DiskManager;

pub(crate) type FrameData = Box<[u8; PAGE_SIZE]>;

struct FrameMeta {
    page_id: PageId,
    pin_count: u32,
    is_dirty: bool,
}

impl FrameMeta {
    fn empty() -> Self {
        Self {
            page_id: INVALID_PAGE_ID,
            pin_count: 0,
            is_dirty: false,
        }
    }
}

struct PoolInner {
    page_table: HashMap<PageId, FrameId>,
    free_list: Vec<FrameId>,
    replacer: LruKReplacer,
    meta: Box<[FrameMeta]>,
    next_page_id: PageId,
}

impl PoolInner {
    fn allocate_page(&mut self) -> PageId {
        let page_id = self.next_page_id;
        self.next_page_id += 1;
        page_id
    }
}

pub struct BufferPool {
    disk: Arc<dyn DiskManager>,
    frames: Box<[RwLock<FrameData>]>,
    inner: Mutex<PoolInner>,
}

impl BufferPool {
    pub fn new(pool_size: usize, disk: Arc<dyn DiskManager>, replacer_k: usize) -> Self {
        assert!(pool_size >= 1, "the pool needs at least one frame");

        let frames: Vec<RwLock<FrameData>> = (0..pool_size)
            .map(|_| RwLock::new(Box::new([0u8; PAGE_SIZE])))
            .collect();
        let meta: Vec<FrameMeta> = (0..pool_size).map(|_| FrameMeta::empty()).collect();

        Self {
            disk,
            frames: frames.into_boxed_slice(),
            inner: Mutex::new(PoolInner {
                page_table: HashMap::with_capacity(pool_size),
                free_list: (0..pool_size).collect(),
                replacer: LruKReplacer::new(pool_size, replacer_k),
                meta: meta.into_boxed_slice(),
                next_page_id: 0,
            }),
        }
    }

    pub fn with_defaults(disk: Arc<dyn DiskManager>) -> Self {
        Self::new(DEFAULT_POOL_SIZE, disk, DEFAULT_REPLACER_K)
    }

    /// Allocates a fresh page id, claims a zeroed frame for it, and
    /// returns the id with a pinned guard. `Ok(None)` when every frame is
    /// pinned.
    pub fn new_guarded(&self) -> Result<Option<(PageId, PageGuard<'_>)>> {
        let mut inner = self.inner.lock();
        let page_id = inner.allocate_page();

        let Some(frame_id) = self.obtain_frame(&mut inner)? else {
            return Ok(None);
        };

        self.frames[frame_id].write().fill(0);
        inner.meta[frame_id].page_id = page_id;
        inner.meta[frame_id].pin_count = 1;
        inner.meta[frame_id].is_dirty = false;
        inner.page_table.insert(page_id, frame_id);
        inner
            .replacer
            .record_access(frame_id)
            .expect("frame id is within the replacer's range");
        inner
            .replacer
            .set_evictable(frame_id, false)
            .expect("frame id is within the replacer's range");
        drop(inner);

        Ok(Some((page_id, PageGuard::new(self, page_id, frame_id))))
    }

    /// Pins `page_id` and returns a basic guard over its frame, reading
    /// the page in from disk if it is not resident. `Ok(None)` when the
    /// page is absent and every frame is pinned.
    pub fn fetch_basic(&self, page_id: PageId) -> Result<Option<PageGuard<'_>>> {
        Ok(self
            .fetch_pinned(page_id)?
            .map(|frame_id| PageGuard::new(self, page_id, frame_id)))
    }

    /// As [`fetch_basic`](Self::fetch_basic), but the guard holds the
    /// frame's reader latch for its whole scope.
    pub fn fetch_read(&self, page_id: PageId) -> Result<Option<ReadPageGuard<'_>>> {
        let Some(frame_id) = self.fetch_pinned(page_id)? else {
            return Ok(None);
        };
        // The pin taken above keeps the frame resident, so latching after
        // the pool latch is released cannot race with eviction.
        let data = self.frames[frame_id].read();
        Ok(Some(ReadPageGuard::new(self, page_id, data)))
    }

    /// As [`fetch_basic`](Self::fetch_basic), but the guard holds the
    /// frame's writer latch for its whole scope and unpins as dirty.
    pub fn fetch_write(&self, page_id: PageId) -> Result<Option<WritePageGuard<'_>>> {
        let Some(frame_id) = self.fetch_pinned(page_id)? else {
            return Ok(None);
        };
        let data = self.frames[frame_id].write();
        Ok(Some(WritePageGuard::new(self, page_id, data)))
    }

    /// Drops one pin on `page_id`, OR-ing `is_dirty` into its dirty flag.
    /// The frame becomes evictable when its pin count reaches zero.
    /// Returns `false` for a non-resident or already-unpinned page.
    pub fn unpin_page(&self, page_id: PageId, is_dirty: bool) -> bool {
        let mut inner = self.inner.lock();
        let Some(&frame_id) = inner.page_table.get(&page_id) else {
            return false;
        };
        if inner.meta[frame_id].pin_count == 0 {
            return false;
        }

        inner.meta[frame_id].is_dirty |= is_dirty;
        inner.meta[frame_id].pin_count -= 1;
        if inner.meta[frame_id].pin_count == 0 {
            inner
                .replacer
                .set_evictable(frame_id, true)
                .expect("frame id is within the replacer's range");
        }
        true
    }

    /// Writes `page_id` back to disk unconditionally and clears its dirty
    /// flag. Pin state and the replacer are untouched. Returns `Ok(false)`
    /// for `INVALID_PAGE_ID` or a non-resident page.
    ///
    /// Blocks until no writer holds the frame's content latch; do not call
    /// while holding a write guard on the same page.
    pub fn flush_page(&self, page_id: PageId) -> Result<bool> {
        if page_id == INVALID_PAGE_ID {
            return Ok(false);
        }
        let mut inner = self.inner.lock();
        let Some(&frame_id) = inner.page_table.get(&page_id) else {
            return Ok(false);
        };

        {
            let data = self.frames[frame_id].read();
            self.disk.write_page(page_id, &data[..])?;
        }
        inner.meta[frame_id].is_dirty = false;
        Ok(true)
    }

    /// Writes back every dirty resident page, clearing dirty flags.
    pub fn flush_all_pages(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        for frame_id in 0..self.frames.len() {
            if inner.meta[frame_id].page_id == INVALID_PAGE_ID || !inner.meta[frame_id].is_dirty {
                continue;
            }
            let page_id = inner.meta[frame_id].page_id;
            {
                let data = self.frames[frame_id].read();
                self.disk.write_page(page_id, &data[..])?;
            }
            inner.meta[frame_id].is_dirty = false;
        }
        Ok(())
    }

    /// Evicts `page_id` from the pool and deallocates it on disk. Returns
    /// `Ok(true)` for a page that is not resident (already absent),
    /// `Ok(false)` for a pinned page.
    pub fn delete_page(&self, page_id: PageId) -> Result<bool> {
        let mut inner = self.inner.lock();
        let Some(&frame_id) = inner.page_table.get(&page_id) else {
            return Ok(true);
        };
        if inner.meta[frame_id].pin_count > 0 {
            return Ok(false);
        }

        if inner.meta[frame_id].is_dirty {
            let data = self.frames[frame_id].read();
            self.disk.write_page(page_id, &data[..])?;
        }

        inner.page_table.remove(&page_id);
        inner.meta[frame_id].page_id = INVALID_PAGE_ID;
        inner.meta[frame_id].is_dirty = false;
        self.frames[frame_id].write().fill(0);
        inner
            .replacer
            .remove(frame_id)
            .expect("frame id is within the replacer's range");
        inner.free_list.push(frame_id);
        self.disk.deallocate_page(page_id);
        Ok(true)
    }

    pub fn pool_size(&self) -> usize {
        self.frames.len()
    }

    /// Pin count of a resident page, `None` if the page is not resident.
    pub fn pin_count(&self, page_id: PageId) -> Option<u32> {
        let inner = self.inner.lock();
        let &frame_id = inner.page_table.get(&page_id)?;
        Some(inner.meta[frame_id].pin_count)
    }

    /// Dirty flag of a resident page, `None` if the page is not resident.
    pub fn is_dirty(&self, page_id: PageId) -> Option<bool> {
        let inner = self.inner.lock();
        let &frame_id = inner.page_table.get(&page_id)?;
        Some(inner.meta[frame_id].is_dirty)
    }

    /// Frames currently holding no page.
    pub fn free_frames(&self) -> usize {
        self.inner.lock().free_list.len()
    }

    /// Frames the replacer may currently evict.
    pub fn evictable_frames(&self) -> usize {
        self.inner.lock().replacer.size()
    }

    pub(crate) fn frame_data(&self, frame_id: FrameId) -> &RwLock<FrameData> {
        &self.frames[frame_id]
    }

    /// Pins `page_id` into a frame. Residency fast path bumps the pin;
    /// otherwise a frame is claimed and the page read in from disk.
    fn fetch_pinned(&self, page_id: PageId) -> Result<Option<FrameId>> {
        let mut inner = self.inner.lock();

        if let Some(&frame_id) = inner.page_table.get(&page_id) {
            inner.meta[frame_id].pin_count += 1;
            inner
                .replacer
                .record_access(frame_id)
                .expect("frame id is within the replacer's range");
            inner
                .replacer
                .set_evictable(frame_id, false)
                .expect("frame id is within the replacer's range");
            return Ok(Some(frame_id));
        }

        let Some(frame_id) = self.obtain_frame(&mut inner)? else {
            return Ok(None);
        };

        let read_result = {
            let mut data = self.frames[frame_id].write();
            self.disk.read_page(page_id, &mut data[..])
        };
        if let Err(err) = read_result {
            // The frame was detached by obtain_frame; hand it back rather
            // than leaking it.
            inner.free_list.push(frame_id);
            return Err(err);
        }

        inner.meta[frame_id].page_id = page_id;
        inner.meta[frame_id].pin_count = 1;
        inner.meta[frame_id].is_dirty = false;
        inner.page_table.insert(page_id, frame_id);
        inner
            .replacer
            .record_access(frame_id)
            .expect("frame id is within the replacer's range");
        inner
            .replacer
            .set_evictable(frame_id, false)
            .expect("frame id is within the replacer's range");

        Ok(Some(frame_id))
    }

    /// Claims a frame for a new resident: free list first, then an
    /// eviction victim, writing the displaced page back if dirty and
    /// detaching its mapping. `Ok(None)` when no frame can be freed.
    fn obtain_frame(&self, inner: &mut PoolInner) -> Result<Option<FrameId>> {
        if let Some(frame_id) = inner.free_list.pop() {
            return Ok(Some(frame_id));
        }

        let Some(frame_id) = inner.replacer.evict() else {
            return Ok(None);
        };

        if inner.meta[frame_id].is_dirty {
            let data = self.frames[frame_id].read();
            self.disk.write_page(inner.meta[frame_id].page_id, &data[..])?;
            inner.meta[frame_id].is_dirty = false;
        }

        let displaced = inner.meta[frame_id].page_id;
        inner.meta[frame_id].page_id = INVALID_PAGE_ID;
        inner.page_table.remove(&displaced);

        Ok(Some(frame_id))
    }
}
