//! Pagination state machine.
//!
//! Every transition is split in two: `begin_*` validates and clamps the
//! request, flips the widget into `Loading` and hands out a [`FetchTicket`];
//! `complete` applies the fetch result for that ticket. Only the newest
//! ticket may change the state, so overlapping fetches cannot make the list
//! flicker back to an older page.

use crate::error::PagerError;
use crate::fetcher::{PageRequest, PageResult};
use crate::pagination::{clamp_page, page_count};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
}

/// Handle for one in-flight fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub sequence: u64,
    pub request: PageRequest,
    /// Set when this fetch is a page size change
    pub changes_page_size: bool,
}

/// What `complete` did with a successful response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied {
        page: u32,
        page_size: u32,
        total_item_count: u64,
        /// The page size differs from before this fetch and should be persisted
        page_size_changed: bool,
    },
    /// A newer fetch was issued after this one; the response was dropped
    Stale { sequence: u64 },
}

/// Everything a view needs to render one frame
#[derive(Debug, Clone, PartialEq)]
pub struct PageSnapshot<T> {
    pub current_page: u32,
    pub page_size: u32,
    pub items: Vec<T>,
    pub total_item_count: u64,
    pub is_loading: bool,
    pub max_page: u32,
}

#[derive(Debug, Clone)]
pub struct PaginationState<T> {
    current_page: u32,
    page_size: u32,
    items: Vec<T>,
    total_item_count: u64,
    load_state: LoadState,
    allowed_page_sizes: Vec<u32>,
    last_issued: u64,
}

impl<T> PaginationState<T> {
    pub fn new(page_size: u32, allowed_page_sizes: Vec<u32>) -> Self {
        Self {
            current_page: 1,
            page_size,
            items: Vec::new(),
            total_item_count: 0,
            load_state: LoadState::Idle,
            allowed_page_sizes,
            last_issued: 0,
        }
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn total_item_count(&self) -> u64 {
        self.total_item_count
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    pub fn is_loading(&self) -> bool {
        self.load_state == LoadState::Loading
    }

    pub fn allowed_page_sizes(&self) -> &[u32] {
        &self.allowed_page_sizes
    }

    /// Last page for the last-known total; 1 before anything was loaded
    pub fn max_page(&self) -> u32 {
        page_count(self.total_item_count, self.page_size)
    }

    pub fn can_go_prev(&self) -> bool {
        self.current_page > 1
    }

    pub fn can_go_next(&self) -> bool {
        self.current_page < self.max_page()
    }

    /// Start loading `page`, clamped into `[1, max_page]`
    pub fn begin_go_to_page(&mut self, page: u32) -> FetchTicket {
        let page = clamp_page(page, self.total_item_count, self.page_size);
        self.issue(PageRequest::new(page, self.page_size), false)
    }

    /// Start loading the first page at `page_size`
    pub fn begin_change_page_size(&mut self, page_size: u32) -> Result<FetchTicket, PagerError> {
        if !self.allowed_page_sizes.contains(&page_size) {
            return Err(PagerError::InvalidPageSize(page_size));
        }
        Ok(self.issue(PageRequest::new(1, page_size), true))
    }

    fn issue(&mut self, request: PageRequest, changes_page_size: bool) -> FetchTicket {
        self.last_issued += 1;
        self.load_state = LoadState::Loading;
        FetchTicket {
            sequence: self.last_issued,
            request,
            changes_page_size,
        }
    }

    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        ticket.sequence == self.last_issued
    }

    /// Give up on `ticket` without touching the page (widget torn down)
    pub fn abandon(&mut self, ticket: &FetchTicket) {
        if self.is_current(ticket) {
            self.load_state = LoadState::Idle;
        }
    }

    /// Apply the outcome of the fetch issued for `ticket`.
    ///
    /// A failure of the newest fetch clears the loading flag and leaves the
    /// last-known-good page in place before returning the error.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: Result<PageResult<T>, PagerError>,
    ) -> Result<Completion, PagerError> {
        if !self.is_current(&ticket) {
            return Ok(Completion::Stale {
                sequence: ticket.sequence,
            });
        }

        self.load_state = LoadState::Idle;
        let page = result?;

        let page_size_changed = ticket.request.page_size != self.page_size;
        self.items = page.items;
        self.total_item_count = page.total_item_count;
        self.current_page = ticket.request.page;
        self.page_size = ticket.request.page_size;

        Ok(Completion::Applied {
            page: self.current_page,
            page_size: self.page_size,
            total_item_count: self.total_item_count,
            page_size_changed,
        })
    }

    pub fn snapshot(&self) -> PageSnapshot<T>
    where
        T: Clone,
    {
        PageSnapshot {
            current_page: self.current_page,
            page_size: self.page_size,
            items: self.items.clone(),
            total_item_count: self.total_item_count,
            is_loading: self.is_loading(),
            max_page: self.max_page(),
        }
    }
}
