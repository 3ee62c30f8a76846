//! Client-side paginated list widget.
//!
//! A host supplies a [`PageFetcher`] and a [`DisplayComponent`]; the
//! [`Paginator`] drives page and page-size transitions, remembers the chosen
//! page size per widget slug, and the [`PaginationView`] turns its state into
//! page links, a summary line and a size selector.

pub mod config;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod pagination;
pub mod paginator;
pub mod persistence;
pub mod state;
pub mod view;

pub use config::{DEFAULT_MAX_PAGES_SHOWN, DEFAULT_PAGE_SIZE, DEFAULT_PAGE_SIZES, PagerOptions};
pub use error::PagerError;
pub use fetcher::{AsyncFetcher, PageFetcher, PageRequest, PageResult, SyncFetcher, VecFetcher};
pub use http::HttpPageFetcher;
pub use pagination::{clamp_page, expected_len, item_range, page_count, page_window, parse_page_input};
pub use paginator::{FetchOutcome, Paginator, PaginatorEvent};
pub use persistence::{
    JsonFilePageSizeStorage, MemoryPageSizeStorage, PAGE_SIZE_TTL_DAYS, PageSizeStorage,
    StoredPageSize,
};
pub use state::{Completion, FetchTicket, LoadState, PageSnapshot, PaginationState};
pub use view::{
    DisplayComponent, ListDisplay, NavControl, PageLink, PaginationView, RenderedPage,
    SizeSelector, Summary, ViewAction,
};
