//! File-backed disk manager.
//!
//! One flat database file; page `n` lives at byte offset `n * PAGE_SIZE`.
//! There is no file header: the layout above the disk manager (catalog,
//! directory pages) belongs to higher layers.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};

use eyre::{ensure, Result, WrapErr};
use parking_lot::Mutex;

use super::DiskManager;
use crate::config::{PageId, PAGE_SIZE};

/// Single-file [`DiskManager`]. Writes go straight through to the file;
/// reads past the current end of file zero-fill the buffer.
pub struct FileDiskManager {
    file: Mutex<File>,
    path: PathBuf,
    next_page_id: AtomicU32,
    free_pages: Mutex<Vec<PageId>>,
}

impl FileDiskManager {
    /// Opens (or creates) the database file at `path`. The page-id
    /// allocator resumes after the highest page the file already holds.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)
            .wrap_err_with(|| format!("failed to open database file '{}'", path.display()))?;

        let len = file
            .metadata()
            .wrap_err_with(|| format!("failed to stat database file '{}'", path.display()))?
            .len();
        let existing_pages = len.div_ceil(PAGE_SIZE as u64) as u32;

        log::debug!(
            "opened database file '{}' ({} existing pages)",
            path.display(),
            existing_pages
        );

        Ok(Self {
            file: Mutex::new(file),
            path,
            next_page_id: AtomicU32::new(existing_pages),
            free_pages: Mutex::new(Vec::new()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DiskManager for FileDiskManager {
    fn read_page(&self, page_id: PageId, buf: &mut [u8]) -> Result<()> {
        ensure!(
            buf.len() == PAGE_SIZE,
            "read buffer is {} bytes, expected {}",
            buf.len(),
            PAGE_SIZE
        );

        let offset = page_id as u64 * PAGE_SIZE as u64;
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(offset))
            .wrap_err_with(|| format!("failed to seek to page {}", page_id))?;

        let mut filled = 0;
        while filled < buf.len() {
            let n = file
                .read(&mut buf[filled..])
                .wrap_err_with(|| format!("failed to read page {}", page_id))?;
            if n == 0 {
                break;
            }
            filled += n;
        }

        if filled < buf.len() {
            // Page beyond EOF or partially written: the unwritten tail
            // reads as zeroes.
            log::warn!(
                "short read of page {} ({} of {} bytes), zero-filling",
                page_id,
                filled,
                PAGE_SIZE
            );
            buf[filled..].fill(0);
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

        let offset = page_id as u64 * PAGE_SIZE as u64;
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(offset))
            .wrap_err_with(|| format!("failed to seek to page {}", page_id))?;
        file.write_all(data)
            .wrap_err_with(|| format!("failed to write page {}", page_id))?;
        file.flush()
            .wrap_err_with(|| format!("failed to flush page {}", page_id))?;

        Ok(())
    }

    fn allocate_page(&self) -> PageId {
        if let Some(page_id) = self.free_pages.lock().pop() {
            return page_id;
        }
        self.next_page_id.fetch_add(1, Ordering::Relaxed)
    }

    fn deallocate_page(&self, page_id: PageId) {
        self.free_pages.lock().push(page_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempdir().unwrap();
        let disk = FileDiskManager::open(dir.path().join("test.db")).unwrap();

        let mut page = vec![0u8; PAGE_SIZE];
        page[..4].copy_from_slice(b"rook");
        disk.write_page(3, &page).unwrap();

        let mut buf = vec![0xFFu8; PAGE_SIZE];
        disk.read_page(3, &mut buf).unwrap();
        assert_eq!(buf, page);
    }

    #[test]
    fn read_of_unwritten_page_is_zero_filled() {
        let dir = tempdir().unwrap();
        let disk = FileDiskManager::open(dir.path().join("test.db")).unwrap();

        let mut buf = vec![0xFFu8; PAGE_SIZE];
        disk.read_page(42, &mut buf).unwrap();
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn read_rejects_wrong_buffer_size() {
        let dir = tempdir().unwrap();
        let disk = FileDiskManager::open(dir.path().join("test.db")).unwrap();

        let mut buf = vec![0u8; PAGE_SIZE - 1];
        assert!(disk.read_page(0, &mut buf).is_err());
    }

    #[test]
    fn allocation_is_monotone_and_reuses_deallocated_ids() {
        let dir = tempdir().unwrap();
        let disk = FileDiskManager::open(dir.path().join("test.db")).unwrap();

        let a = disk.allocate_page();
        let b = disk.allocate_page();
        assert_ne!(a, b);

        disk.deallocate_page(a);
        assert_eq!(disk.allocate_page(), a);
    }

    #[test]
    fn reopen_resumes_allocation_after_existing_pages() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        {
            let disk = FileDiskManager::open(&path).unwrap();
            let page = vec![7u8; PAGE_SIZE];
            disk.write_page(4, &page).unwrap();
        }

        let disk = FileDiskManager::open(&path).unwrap();
        assert!(disk.allocate_page() >= 5);
    }
}
