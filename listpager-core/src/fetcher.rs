//! The page fetching contract between a pagination widget and its host.
//!
//! A fetcher turns `(page, page_size)` into one page of items plus the total
//! item count of the underlying query. Hosts can plug in a synchronous
//! closure, an async closure, an owned list or an HTTP endpoint.

use crate::error::PagerError;
use crate::pagination::item_range;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// A request for one page, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }
}

/// One page of items and the size of the whole result set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult<T> {
    pub items: Vec<T>,
    #[serde(alias = "total_item_count", alias = "total")]
    pub total_item_count: u64,
}

impl<T> PageResult<T> {
    pub fn new(items: Vec<T>, total_item_count: u64) -> Self {
        Self {
            items,
            total_item_count,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), 0)
    }
}

pub trait PageFetcher<T>: Send + Sync {
    /// Fetch one page. Must report the same total for every page of an
    /// unchanged query. Failures are returned as errors and never retried.
    fn fetch(
        &self,
        request: PageRequest,
    ) -> impl Future<Output = Result<PageResult<T>, PagerError>> + Send;
}

/// Adapts a synchronous closure into a fetcher
pub struct SyncFetcher<F> {
    fetch_fn: F,
}

impl<F> SyncFetcher<F> {
    pub fn new(fetch_fn: F) -> Self {
        Self { fetch_fn }
    }
}

impl<T, F> PageFetcher<T> for SyncFetcher<F>
where
    T: Send,
    F: Fn(PageRequest) -> Result<PageResult<T>, PagerError> + Send + Sync,
{
    fn fetch(
        &self,
        request: PageRequest,
    ) -> impl Future<Output = Result<PageResult<T>, PagerError>> + Send {
        std::future::ready((self.fetch_fn)(request))
    }
}

/// Adapts a closure returning a future into a fetcher
pub struct AsyncFetcher<F> {
    fetch_fn: F,
}

impl<F> AsyncFetcher<F> {
    pub fn new(fetch_fn: F) -> Self {
        Self { fetch_fn }
    }
}

impl<T, F, Fut> PageFetcher<T> for AsyncFetcher<F>
where
    F: Fn(PageRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<PageResult<T>, PagerError>> + Send,
{
    fn fetch(
        &self,
        request: PageRequest,
    ) -> impl Future<Output = Result<PageResult<T>, PagerError>> + Send {
        (self.fetch_fn)(request)
    }
}

/// Serves pages out of an owned list
#[derive(Debug, Clone)]
pub struct VecFetcher<T> {
    items: Vec<T>,
}

impl<T> VecFetcher<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> PageFetcher<T> for VecFetcher<T>
where
    T: Clone + Send + Sync,
{
    fn fetch(
        &self,
        request: PageRequest,
    ) -> impl Future<Output = Result<PageResult<T>, PagerError>> + Send {
        let total = self.items.len() as u64;
        let range = item_range(request.page, request.page_size, total);
        let page = PageResult::new(self.items[range].to_vec(), total);
        std::future::ready(Ok(page))
    }
}
