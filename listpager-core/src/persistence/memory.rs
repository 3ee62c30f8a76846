//! In-memory page size storage.
//!
//! Keeps entries in a map and records every `set()` call, so tests can
//! assert exactly when a widget persisted (or did not persist) its size.

use super::{PageSizeStorage, StoredPageSize, normalize_slug};
use crate::error::PagerError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Default)]
pub struct MemoryPageSizeStorage {
    entries: Arc<Mutex<HashMap<String, StoredPageSize>>>,
    /// Record of all set() calls as (slug, size), including slug-less ones
    pub set_calls: Arc<Mutex<Vec<(Option<String>, u32)>>>,
    pub should_fail_set: bool,
}

impl MemoryPageSizeStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A storage whose writes always fail
    pub fn failing() -> Self {
        Self {
            should_fail_set: true,
            ..Self::default()
        }
    }

    /// Pre-populate storage (simulates a value persisted in an earlier session)
    pub fn preload(&self, slug: &str, entry: StoredPageSize) {
        self.lock_entries().insert(slug.to_string(), entry);
    }

    pub fn set_call_count(&self) -> usize {
        self.set_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn lock_entries(&self) -> MutexGuard<'_, HashMap<String, StoredPageSize>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PageSizeStorage for MemoryPageSizeStorage {
    fn get(&self, slug: Option<&str>, fallback: u32) -> u32 {
        let Some(slug) = normalize_slug(slug) else {
            return fallback;
        };
        self.lock_entries()
            .get(slug)
            .and_then(StoredPageSize::usable_size)
            .unwrap_or(fallback)
    }

    fn set(&self, slug: Option<&str>, page_size: u32) -> Result<(), PagerError> {
        self.set_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((slug.map(str::to_string), page_size));

        let Some(slug) = normalize_slug(slug) else {
            return Ok(());
        };
        if self.should_fail_set {
            return Err(PagerError::Storage("simulated write failure".to_string()));
        }
        self.lock_entries()
            .insert(slug.to_string(), StoredPageSize::new(page_size));
        Ok(())
    }

    fn remove(&self, slug: &str) -> Result<(), PagerError> {
        self.lock_entries().remove(slug);
        Ok(())
    }

    fn clear(&self) -> Result<(), PagerError> {
        self.lock_entries().clear();
        Ok(())
    }

    fn entries(&self) -> Result<Vec<(String, StoredPageSize)>, PagerError> {
        let mut entries: Vec<_> = self
            .lock_entries()
            .iter()
            .filter(|(_, entry)| !entry.is_expired())
            .map(|(slug, entry)| (slug.clone(), *entry))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(entries)
    }

    fn strategy_name(&self) -> &'static str {
        "MemoryPageSizeStorage"
    }
}
