//! # Configuration Module
//!
//! Centralizes page geometry, identifier types, and pool sizing defaults.
//! Import from here rather than redefining values locally:
//!
//! ```ignore
//! use rookdb::config::{PageId, PAGE_SIZE};
//! ```

mod constants;

pub use constants::{
    FrameId, PageId, DEFAULT_POOL_SIZE, DEFAULT_REPLACER_K, INVALID_PAGE_ID, PAGE_SIZE,
};
