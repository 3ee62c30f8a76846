//! Remembers the page size a user picked for a widget, keyed by its slug.
//!
//! Widgets mounted without a slug never read or write persisted state.
//! Entries expire after [`PAGE_SIZE_TTL_DAYS`].

pub mod file;
pub mod memory;

pub use file::JsonFilePageSizeStorage;
pub use memory::MemoryPageSizeStorage;

use crate::error::PagerError;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

pub const PAGE_SIZE_TTL_DAYS: i64 = 365;

/// A persisted page size with the time it was chosen
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StoredPageSize {
    pub page_size: u32,
    pub stored_at: OffsetDateTime,
}

impl StoredPageSize {
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size,
            stored_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc() - self.stored_at > Duration::days(PAGE_SIZE_TTL_DAYS)
    }

    /// The stored size, if it is still usable
    pub fn usable_size(&self) -> Option<u32> {
        if self.page_size == 0 || self.is_expired() {
            None
        } else {
            Some(self.page_size)
        }
    }
}

/// Pluggable backing store for per-widget page sizes
pub trait PageSizeStorage: Send + Sync {
    /// Stored size for `slug`, or `fallback` when there is no slug, no entry,
    /// an expired or unusable entry, or the store cannot be read
    fn get(&self, slug: Option<&str>, fallback: u32) -> u32;

    /// Overwrite the size for `slug`. Does nothing without a slug.
    fn set(&self, slug: Option<&str>, page_size: u32) -> Result<(), PagerError>;

    fn remove(&self, slug: &str) -> Result<(), PagerError>;

    fn clear(&self) -> Result<(), PagerError>;

    /// All live entries, for inspection
    fn entries(&self) -> Result<Vec<(String, StoredPageSize)>, PagerError>;

    /// Human-readable name for logging
    fn strategy_name(&self) -> &'static str;
}

/// `None` for a missing, empty or whitespace-only slug
pub(crate) fn normalize_slug(slug: Option<&str>) -> Option<&str> {
    slug.filter(|s| !s.trim().is_empty())
}
