//! Heap-backed disk manager with observable I/O counters.
//!
//! Drop-in stand-in for [`FileDiskManager`] in tests: pages live in a map,
//! and every read and write is counted so tests can assert exactly when the
//! pool wrote a page back (and how many times).

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use eyre::{ensure, Result};
use hashbrown::HashMap;
use parking_lot::Mutex;

use super::DiskManager;
use crate::config::{PageId, PAGE_SIZE};

#[derive(Default)]
pub struct MemoryDiskManager {
    pages: Mutex<HashMap<PageId, Box<[u8; PAGE_SIZE]>>>,
    write_counts: Mutex<HashMap<PageId, u64>>,
    next_page_id: AtomicU32,
    total_reads: AtomicU64,
    total_writes: AtomicU64,
}

impl MemoryDiskManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `write_page` calls observed for `page_id`.
    pub fn writes_to(&self, page_id: PageId) -> u64 {
        self.write_counts.lock().get(&page_id).copied().unwrap_or(0)
    }

    pub fn total_reads(&self) -> u64 {
        self.total_reads.load(Ordering::Relaxed)
    }

    pub fn total_writes(&self) -> u64 {
        self.total_writes.load(Ordering::Relaxed)
    }

    /// Current durable contents of `page_id`, if it was ever written.
    pub fn page_data(&self, page_id: PageId) -> Option<Vec<u8>> {
        self.pages.lock().get(&page_id).map(|data| data.to_vec())
    }
}

impl DiskManager for MemoryDiskManager {
    fn read_page(&self, page_id: PageId, buf: &mut [u8]) -> Result<()> {
        ensure!(
            buf.len() == PAGE_SIZE,
            "read buffer is {} bytes, expected {}",
            buf.len(),
            PAGE_SIZE
        );

        self.total_reads.fetch_add(1, Ordering::Relaxed);
        match self.pages.lock().get(&page_id) {
            Some(data) => buf.copy_from_slice(&data[..]),
            None => buf.fill(0),
        }
        Ok(())
    }

    fn write_page(&self, page_id: PageId, data: &[u8]) -> Result<()> {
        ensure!(
            data.len() == PAGE_SIZE,
            "write buffer is {} bytes, expected {}",
            data.len(),
            PAGE_SIZE
        );

        self.total_writes.fetch_add(1, Ordering::Relaxed);
        *self.write_counts.lock().entry(page_id).or_insert(0) += 1;

        let mut page = Box::new([0u8; PAGE_SIZE]);
        page.copy_from_slice(data);
        self.pages.lock().insert(page_id, page);
        Ok(())
    }

    fn allocate_page(&self) -> PageId {
        self.next_page_id.fetch_add(1, Ordering::Relaxed)
    }

    fn deallocate_page(&self, page_id: PageId) {
        self.pages.lock().remove(&page_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwritten_pages_read_as_zeroes() {
        let disk = MemoryDiskManager::new();
        let mut buf = vec![0xFFu8; PAGE_SIZE];
        disk.read_page(9, &mut buf).unwrap();
        assert!(buf.iter().all(|&b| b == 0));
        assert_eq!(disk.total_reads(), 1);
    }

    #[test]
    fn writes_are_counted_per_page() {
        let disk = MemoryDiskManager::new();
        let page = vec![1u8; PAGE_SIZE];

        disk.write_page(0, &page).unwrap();
        disk.write_page(0, &page).unwrap();
        disk.write_page(1, &page).unwrap();

        assert_eq!(disk.writes_to(0), 2);
        assert_eq!(disk.writes_to(1), 1);
        assert_eq!(disk.writes_to(2), 0);
        assert_eq!(disk.total_writes(), 3);
    }

    #[test]
    fn deallocate_drops_page_contents() {
        let disk = MemoryDiskManager::new();
        let page = vec![5u8; PAGE_SIZE];
        disk.write_page(2, &page).unwrap();
        assert!(disk.page_data(2).is_some());

        disk.deallocate_page(2);
        assert!(disk.page_data(2).is_none());

        let mut buf = vec![0xFFu8; PAGE_SIZE];
        disk.read_page(2, &mut buf).unwrap();
        assert!(buf.iter().all(|&b| b == 0));
    }
}
