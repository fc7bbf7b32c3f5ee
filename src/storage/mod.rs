//! # Storage Module
//!
//! The persistence seam underneath the buffer pool. The pool never touches
//! files itself; it consumes the [`DiskManager`] contract, which reads and
//! writes whole fixed-size pages by id and manages the page-id lifecycle.
//!
//! ## Contract
//!
//! ```text
//! read_page(id, buf)        fill a PAGE_SIZE buffer from durable storage
//! write_page(id, data)      persist a PAGE_SIZE buffer
//! allocate_page() -> id     hand out an unused page id
//! deallocate_page(id)       return a page id to the allocator
//! ```
//!
//! Reads of pages that were never written are defined: the buffer is
//! zero-filled. This is what lets the pool fetch a freshly allocated page
//! without a prior write.
//!
//! ## Implementations
//!
//! - [`FileDiskManager`]: a single database file, page offset
//!   `id * PAGE_SIZE`. Every write is flushed through to the file.
//! - [`MemoryDiskManager`]: heap-backed pages with per-page write counters,
//!   built for tests that assert on write-back behavior.
//!
//! ## Thread Safety
//!
//! Both implementations take `&self` and synchronize internally, so a
//! single instance can sit behind an `Arc` shared by the pool and by test
//! code observing it.

mod disk;
mod memory;

use eyre::Result;

use crate::config::PageId;

pub use disk::FileDiskManager;
pub use memory::MemoryDiskManager;

/// Page-granular persistence consumed by the buffer pool.
pub trait DiskManager: Send + Sync {
    /// Fills `buf` (exactly `PAGE_SIZE` bytes) with the page's contents.
    /// Pages never written read back as zeroes.
    fn read_page(&self, page_id: PageId, buf: &mut [u8]) -> Result<()>;

    /// Persists `data` (exactly `PAGE_SIZE` bytes) as the page's contents.
    fn write_page(&self, page_id: PageId, data: &[u8]) -> Result<()>;

    /// Hands out a page id not currently in use. Deallocated ids may be
    /// reused.
    fn allocate_page(&self) -> PageId;

    /// Returns a page id to the allocator.
    fn deallocate_page(&self, page_id: PageId);
}
