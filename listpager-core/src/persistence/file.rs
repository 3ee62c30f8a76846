//! JSON file storage for page sizes.
//!
//! All widgets share one pretty-printed file mapping slug to
//! `{ page_size, stored_at }`, so the persisted sizes stay human-readable.

use super::{PageSizeStorage, StoredPageSize, normalize_slug};
use crate::error::PagerError;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use time::OffsetDateTime;
use tracing::{debug, info, warn};

pub const PAGE_SIZES_FILENAME: &str = "page_sizes.json";
/// Overrides the directory the page size file lives in
pub const STATE_DIR_ENV: &str = "LISTPAGER_STATE_DIR";

#[derive(Debug, Default, Serialize, Deserialize)]
struct PageSizeFile {
    entries: BTreeMap<String, StoredPageSize>,
    last_updated: Option<OffsetDateTime>,
}

#[derive(Debug)]
pub struct JsonFilePageSizeStorage {
    file_path: PathBuf,
    // Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl JsonFilePageSizeStorage {
    /// Storage backed by `dir/page_sizes.json`; creates `dir` if needed
    pub fn new(dir: &Path) -> Result<Self, PagerError> {
        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|e| {
                PagerError::Storage(format!("Failed to create state directory: {}", e))
            })?;
            info!(state_dir = %dir.display(), "Created page size state directory");
        }

        Ok(Self {
            file_path: dir.join(PAGE_SIZES_FILENAME),
            write_lock: Mutex::new(()),
        })
    }

    /// Storage in the platform config directory, or `$LISTPAGER_STATE_DIR`
    pub fn open_default() -> Result<Self, PagerError> {
        Self::new(&default_state_dir())
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    fn load(&self) -> Result<PageSizeFile, PagerError> {
        match self.read_content()? {
            Some(content) => parse_page_size_file(&content),
            None => Ok(PageSizeFile::default()),
        }
    }

    fn read_content(&self) -> Result<Option<String>, PagerError> {
        if !self.file_path.exists() {
            debug!(file = %self.file_path.display(), "No page size file yet");
            return Ok(None);
        }

        fs::read_to_string(&self.file_path)
            .map(Some)
            .map_err(|e| PagerError::Storage(format!("Failed to read page size file: {}", e)))
    }

    fn save(&self, mut file: PageSizeFile) -> Result<(), PagerError> {
        file.entries.retain(|_, entry| !entry.is_expired());
        file.last_updated = Some(OffsetDateTime::now_utc());

        let content = serde_json::to_string_pretty(&file).map_err(|e| {
            PagerError::Storage(format!("Failed to serialize page sizes: {}", e))
        })?;
        fs::write(&self.file_path, content)
            .map_err(|e| PagerError::Storage(format!("Failed to write page size file: {}", e)))?;

        debug!(
            entries = file.entries.len(),
            file = %self.file_path.display(),
            "Saved page sizes"
        );
        Ok(())
    }

    fn modify(&self, change: impl FnOnce(&mut PageSizeFile)) -> Result<(), PagerError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        // A file that cannot be read is left alone; only unparseable content is replaced
        let mut file = match self.read_content()? {
            Some(content) => parse_page_size_file(&content).unwrap_or_else(|e| {
                warn!(error = %e, "Discarding corrupt page size file");
                PageSizeFile::default()
            }),
            None => PageSizeFile::default(),
        };
        change(&mut file);
        self.save(file)
    }
}

impl PageSizeStorage for JsonFilePageSizeStorage {
    fn get(&self, slug: Option<&str>, fallback: u32) -> u32 {
        let Some(slug) = normalize_slug(slug) else {
            return fallback;
        };

        match self.load() {
            Ok(file) => match file.entries.get(slug).and_then(StoredPageSize::usable_size) {
                Some(size) => {
                    debug!(slug, page_size = size, "Restored page size");
                    size
                }
                None => fallback,
            },
            Err(e) => {
                warn!(slug, error = %e, "Could not read persisted page size");
                fallback
            }
        }
    }

    fn set(&self, slug: Option<&str>, page_size: u32) -> Result<(), PagerError> {
        let Some(slug) = normalize_slug(slug) else {
            return Ok(());
        };
        self.modify(|file| {
            file.entries
                .insert(slug.to_string(), StoredPageSize::new(page_size));
        })?;
        log::info!("Persisted page size {} for '{}'", page_size, slug);
        Ok(())
    }

    fn remove(&self, slug: &str) -> Result<(), PagerError> {
        self.modify(|file| {
            file.entries.remove(slug);
        })
    }

    fn clear(&self) -> Result<(), PagerError> {
        if self.file_path.exists() {
            fs::remove_file(&self.file_path).map_err(|e| {
                PagerError::Storage(format!("Failed to remove page size file: {}", e))
            })?;
        }
        Ok(())
    }

    fn entries(&self) -> Result<Vec<(String, StoredPageSize)>, PagerError> {
        Ok(self
            .load()?
            .entries
            .into_iter()
            .filter(|(_, entry)| !entry.is_expired())
            .collect())
    }

    fn strategy_name(&self) -> &'static str {
        "JsonFilePageSizeStorage"
    }
}

fn parse_page_size_file(content: &str) -> Result<PageSizeFile, PagerError> {
    serde_json::from_str(content)
        .map_err(|e| PagerError::Storage(format!("Failed to parse page size file: {}", e)))
}

/// `$LISTPAGER_STATE_DIR`, else the platform config dir, else a temp dir
pub fn default_state_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(STATE_DIR_ENV).filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    ProjectDirs::from("", "", "listpager")
        .map(|proj_dirs| proj_dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| std::env::temp_dir().join("listpager-state"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::PAGE_SIZE_TTL_DAYS;
    use std::env;
    use time::Duration;

    fn create_test_storage(name: &str) -> JsonFilePageSizeStorage {
        let dir = env::temp_dir().join(format!(
            "listpager-file-test-{}-{}",
            name,
            std::process::id()
        ));
        let storage = JsonFilePageSizeStorage::new(&dir).unwrap();
        storage.clear().unwrap();
        storage
    }

    fn cleanup(storage: &JsonFilePageSizeStorage) {
        storage.clear().ok();
        if let Some(dir) = storage.file_path().parent() {
            fs::remove_dir(dir).ok();
        }
    }

    #[test]
    fn test_round_trip_across_instances() {
        let storage = create_test_storage("roundtrip");
        storage.set(Some("case-list"), 100).unwrap();

        // A fresh instance reads what the first one wrote
        let dir = storage.file_path().parent().unwrap().to_path_buf();
        let reopened = JsonFilePageSizeStorage::new(&dir).unwrap();
        assert_eq!(reopened.get(Some("case-list"), 25), 100);
        assert_eq!(reopened.get(Some("other"), 25), 25);

        cleanup(&storage);
    }

    #[test]
    fn test_file_is_human_readable() {
        let storage = create_test_storage("readable");
        storage.set(Some("exports"), 50).unwrap();

        let content = fs::read_to_string(storage.file_path()).unwrap();
        assert!(content.contains("\"exports\""));
        assert!(content.contains("\"page_size\": 50"));

        cleanup(&storage);
    }

    #[test]
    fn test_no_slug_never_creates_file() {
        let storage = create_test_storage("noslug");
        storage.set(None, 50).unwrap();
        assert!(!storage.file_path().exists());
        assert_eq!(storage.get(None, 5), 5);

        cleanup(&storage);
    }

    #[test]
    fn test_corrupt_file_falls_back_and_recovers() {
        let storage = create_test_storage("corrupt");
        fs::write(storage.file_path(), "not json").unwrap();

        assert_eq!(storage.get(Some("cases"), 25), 25);
        storage.set(Some("cases"), 5).unwrap();
        assert_eq!(storage.get(Some("cases"), 25), 5);

        cleanup(&storage);
    }

    #[test]
    fn test_unreadable_file_is_not_overwritten() {
        let storage = create_test_storage("unreadable");
        // A directory in place of the file makes every read fail
        fs::create_dir_all(storage.file_path().join("keep")).unwrap();

        let result = storage.set(Some("cases"), 5);
        match result {
            Err(PagerError::Storage(message)) => assert!(message.contains("read")),
            other => panic!("expected a read error, got {:?}", other),
        }
        assert!(storage.file_path().join("keep").is_dir());
        assert_eq!(storage.get(Some("cases"), 25), 25);

        fs::remove_dir_all(storage.file_path()).ok();
        cleanup(&storage);
    }

    #[test]
    fn test_expired_entries_are_dropped() {
        let storage = create_test_storage("expiry");
        let stale = StoredPageSize {
            page_size: 100,
            stored_at: OffsetDateTime::now_utc() - Duration::days(PAGE_SIZE_TTL_DAYS + 30),
        };
        storage
            .modify(|file| {
                file.entries.insert("stale".to_string(), stale);
            })
            .unwrap();
        // save() already pruned it
        assert_eq!(storage.get(Some("stale"), 25), 25);

        storage.set(Some("fresh"), 5).unwrap();
        let entries = storage.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "fresh");

        cleanup(&storage);
    }

    #[test]
    fn test_remove_entry() {
        let storage = create_test_storage("remove");
        storage.set(Some("a"), 5).unwrap();
        storage.set(Some("b"), 50).unwrap();
        storage.remove("a").unwrap();
        assert_eq!(storage.get(Some("a"), 25), 25);
        assert_eq!(storage.get(Some("b"), 25), 50);

        cleanup(&storage);
    }
}
