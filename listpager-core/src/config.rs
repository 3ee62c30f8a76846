use crate::error::PagerError;
use crate::persistence::normalize_slug;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Page sizes offered by the size selector unless the host supplies its own
pub const DEFAULT_PAGE_SIZES: [u32; 4] = [5, 25, 50, 100];
pub const DEFAULT_PAGE_SIZE: u32 = 25;
/// Number of page links shown around the current page
pub const DEFAULT_MAX_PAGES_SHOWN: u32 = 9;

/// Options a host page mounts a pagination widget with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PagerOptions {
    pub allowed_page_sizes: Vec<u32>,
    /// Used when nothing was persisted for the slug (or there is no slug)
    pub default_page_size: u32,
    pub max_pages_shown: u32,
    /// Persistence key; widgets without one never persist their page size
    pub slug: Option<String>,
    /// Hide the summary line and the size selector
    pub inline_page_list_only: bool,
    /// Container id the host renders the widget into
    pub id: Option<String>,
}

impl Default for PagerOptions {
    fn default() -> Self {
        Self {
            allowed_page_sizes: DEFAULT_PAGE_SIZES.to_vec(),
            default_page_size: DEFAULT_PAGE_SIZE,
            max_pages_shown: DEFAULT_MAX_PAGES_SHOWN,
            slug: None,
            inline_page_list_only: false,
            id: None,
        }
    }
}

impl PagerOptions {
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn with_default_page_size(mut self, page_size: u32) -> Self {
        self.default_page_size = page_size;
        self
    }

    /// Load options from a JSON file; missing fields take their defaults
    pub fn from_json_file(path: &Path) -> Result<Self, PagerError> {
        let content = std::fs::read_to_string(path)?;
        let options: PagerOptions = serde_json::from_str(&content)?;
        options.validate()?;
        Ok(options)
    }

    pub fn is_allowed_page_size(&self, page_size: u32) -> bool {
        self.allowed_page_sizes.contains(&page_size)
    }

    /// The slug, treating an empty or blank string as no slug at all
    pub fn persistence_slug(&self) -> Option<&str> {
        normalize_slug(self.slug.as_deref())
    }

    pub fn validate(&self) -> Result<(), PagerError> {
        if self.allowed_page_sizes.is_empty() {
            return Err(PagerError::InvalidOptions(
                "at least one page size must be allowed".to_string(),
            ));
        }
        if self.allowed_page_sizes.contains(&0) {
            return Err(PagerError::InvalidOptions(
                "page sizes must be positive".to_string(),
            ));
        }
        if !self.is_allowed_page_size(self.default_page_size) {
            return Err(PagerError::InvalidOptions(format!(
                "default page size {} is not one of {:?}",
                self.default_page_size, self.allowed_page_sizes
            )));
        }
        if self.max_pages_shown == 0 {
            return Err(PagerError::InvalidOptions(
                "max_pages_shown must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
