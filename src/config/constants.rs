//! # RookDB Configuration Constants
//!
//! All page geometry and pool sizing lives here. Constants that depend on
//! each other are co-located and guarded by compile-time assertions so a
//! change to one cannot silently invalidate another.
//!
//! ```text
//! PAGE_SIZE (4096 bytes)
//!       │
//!       └─> every frame buffer, disk transfer, and zero-fill is exactly
//!           this many bytes; the disk managers reject other lengths
//!
//! DEFAULT_POOL_SIZE (16)
//!       │
//!       └─> frames allocated by BufferPool::with_defaults; the replacer
//!           is always sized to match the pool
//!
//! DEFAULT_REPLACER_K (2)
//!       │
//!       └─> accesses before a frame graduates from the replacer's
//!           history list to its cache list
//! ```

// ============================================================================
// IDENTIFIER TYPES
// ============================================================================

/// Logical page identifier, allocated monotonically by the buffer pool.
pub type PageId = u32;

/// Index of a frame slot in the buffer pool, in `[0, pool_size)`.
pub type FrameId = usize;

/// Sentinel meaning "no page resident".
pub const INVALID_PAGE_ID: PageId = PageId::MAX;

// ============================================================================
// PAGE GEOMETRY
// ============================================================================

/// Size of each database page in bytes.
/// This is the fundamental unit of I/O and caching.
pub const PAGE_SIZE: usize = 4096;

// ============================================================================
// POOL DEFAULTS
// ============================================================================

/// Default number of frames in the buffer pool.
pub const DEFAULT_POOL_SIZE: usize = 16;

/// Default K for the LRU-K replacer.
pub const DEFAULT_REPLACER_K: usize = 2;

const _: () = assert!(
    PAGE_SIZE % 512 == 0,
    "PAGE_SIZE must be a multiple of the smallest sector size"
);

const _: () = assert!(DEFAULT_POOL_SIZE >= 1, "the pool needs at least one frame");

const _: () = assert!(DEFAULT_REPLACER_K >= 1, "LRU-K requires k >= 1");
