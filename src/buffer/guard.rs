//! RAII page guards.
//!
//! Every guard owns one pin on its page and gives it back exactly once on
//! drop, carrying the dirty flag observed during the scope. The read and
//! write variants additionally hold the frame's content latch for the
//! whole scope; it is released before the drop-time unpin so no thread
//! ever waits on the pool latch while holding a content latch.
//!
//! Guards are movable but not copyable: a pin has a single owner.

use parking_lot::{
    MappedRwLockReadGuard, MappedRwLockWriteGuard, RwLockReadGuard, RwLockWriteGuard,
};

use super::pool::{BufferPool, FrameData};
use crate::config::{FrameId, PageId};

/// Pinned page with per-access latching. `data` latches the frame for the
/// duration of the returned borrow only; `data_mut` additionally records
/// that the page was modified, so the drop-time unpin marks it dirty.
pub struct PageGuard<'a> {
    pool: &'a BufferPool,
    page_id: PageId,
    frame_id: FrameId,
    dirty: bool,
}

impl<'a> PageGuard<'a> {
    pub(crate) fn new(pool: &'a BufferPool, page_id: PageId, frame_id: FrameId) -> Self {
        Self {
            pool,
            page_id,
            frame_id,
            dirty: false,
        }
    }

    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    pub fn data(&self) -> MappedRwLockReadGuard<'_, [u8]> {
        RwLockReadGuard::map(self.pool.frame_data(self.frame_id).read(), |data| &data[..])
    }

    pub fn data_mut(&mut self) -> MappedRwLockWriteGuard<'_, [u8]> {
        self.dirty = true;
        RwLockWriteGuard::map(self.pool.frame_data(self.frame_id).write(), |data| {
            &mut data[..]
        })
    }
}

impl Drop for PageGuard<'_> {
    fn drop(&mut self) {
        let _ = self.pool.unpin_page(self.page_id, self.dirty);
    }
}

/// Pinned page holding the frame's reader latch for its whole scope.
pub struct ReadPageGuard<'a> {
    pool: &'a BufferPool,
    page_id: PageId,
    data: Option<RwLockReadGuard<'a, FrameData>>,
}

impl<'a> ReadPageGuard<'a> {
    pub(crate) fn new(
        pool: &'a BufferPool,
        page_id: PageId,
        data: RwLockReadGuard<'a, FrameData>,
    ) -> Self {
        Self {
            pool,
            page_id,
            data: Some(data),
        }
    }

    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    pub fn data(&self) -> &[u8] {
        let data = self.data.as_ref().expect("content latch held until drop");
        &data[..]
    }
}

impl Drop for ReadPageGuard<'_> {
    fn drop(&mut self) {
        // Latch first, then pin.
        self.data.take();
        let _ = self.pool.unpin_page(self.page_id, false);
    }
}

/// Pinned page holding the frame's writer latch for its whole scope.
/// Unpins as dirty: holding the writer latch is taken as intent to write.
pub struct WritePageGuard<'a> {
    pool: &'a BufferPool,
    page_id: PageId,
    data: Option<RwLockWriteGuard<'a, FrameData>>,
}

impl<'a> WritePageGuard<'a> {
    pub(crate) fn new(
        pool: &'a BufferPool,
        page_id: PageId,
        data: RwLockWriteGuard<'a, FrameData>,
    ) -> Self {
        Self {
            pool,
            page_id,
            data: Some(data),
        }
    }

    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    pub fn data(&self) -> &[u8] {
        let data = self.data.as_ref().expect("content latch held until drop");
        &data[..]
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        let data = self.data.as_mut().expect("content latch held until drop");
        &mut data[..]
    }
}

impl Drop for WritePageGuard<'_> {
    fn drop(&mut self) {
        self.data.take();
        let _ = self.pool.unpin_page(self.page_id, true);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::storage::MemoryDiskManager;

    fn pool_with(pool_size: usize) -> (BufferPool, Arc<MemoryDiskManager>) {
        let disk = Arc::new(MemoryDiskManager::new());
        let pool = BufferPool::new(pool_size, disk.clone(), 2);
        (pool, disk)
    }

    #[test]
    fn basic_guard_unpins_clean_when_untouched() {
        let (pool, _disk) = pool_with(2);
        let (p, guard) = pool.new_guarded().unwrap().unwrap();

        assert_eq!(pool.pin_count(p), Some(1));
        drop(guard);
        assert_eq!(pool.pin_count(p), Some(0));
        assert_eq!(pool.is_dirty(p), Some(false));
    }

    #[test]
    fn basic_guard_unpins_dirty_after_data_mut() {
        let (pool, _disk) = pool_with(2);
        let (p, mut guard) = pool.new_guarded().unwrap().unwrap();

        guard.data_mut()[0] = 1;
        drop(guard);
        assert_eq!(pool.is_dirty(p), Some(true));
    }

    #[test]
    fn write_guard_always_unpins_dirty() {
        let (pool, _disk) = pool_with(2);
        let (p, guard) = pool.new_guarded().unwrap().unwrap();
        drop(guard);

        let guard = pool.fetch_write(p).unwrap().unwrap();
        assert_eq!(pool.pin_count(p), Some(1));
        drop(guard);
        assert_eq!(pool.pin_count(p), Some(0));
        assert_eq!(pool.is_dirty(p), Some(true));
    }

    #[test]
    fn write_guard_round_trips_through_read_guard() {
        let (pool, _disk) = pool_with(2);
        let (p, guard) = pool.new_guarded().unwrap().unwrap();
        drop(guard);

        let mut guard = pool.fetch_write(p).unwrap().unwrap();
        guard.data_mut()[..4].copy_from_slice(b"rook");
        drop(guard);

        let guard = pool.fetch_read(p).unwrap().unwrap();
        assert_eq!(&guard.data()[..4], b"rook");
    }

    #[test]
    fn read_guards_admit_concurrent_readers() {
        let (pool, _disk) = pool_with(2);
        let (p, guard) = pool.new_guarded().unwrap().unwrap();
        drop(guard);

        let first = pool.fetch_read(p).unwrap().unwrap();
        let second = pool.fetch_read(p).unwrap().unwrap();
        assert_eq!(pool.pin_count(p), Some(2));
        drop(first);
        drop(second);
        assert_eq!(pool.pin_count(p), Some(0));
    }

    #[test]
    fn guards_keep_their_page_resident() {
        let (pool, _disk) = pool_with(1);

        let (p, guard) = pool.new_guarded().unwrap().unwrap();
        // The only frame is pinned, so a second page cannot be created.
        assert!(pool.new_guarded().unwrap().is_none());
        drop(guard);
        assert!(pool.new_guarded().unwrap().is_some());
        let _ = p;
    }

    #[test]
    fn moved_guard_unpins_once_at_final_owner() {
        let (pool, _disk) = pool_with(2);
        let (p, guard) = pool.new_guarded().unwrap().unwrap();

        let moved = guard;
        assert_eq!(pool.pin_count(p), Some(1));
        drop(moved);
        assert_eq!(pool.pin_count(p), Some(0));
    }
}
