//! Async controller owning one widget's pagination state.
//!
//! The state lock is only held while a transition begins or completes, never
//! across the fetch itself, so `is_loading()` and `snapshot()` can be read
//! while a fetch is in flight and overlapping operations may race. The newest
//! operation always wins.

use crate::config::PagerOptions;
use crate::error::PagerError;
use crate::fetcher::PageFetcher;
use crate::pagination::parse_page_input;
use crate::persistence::PageSizeStorage;
use crate::state::{Completion, FetchTicket, PageSnapshot, PaginationState};
use crate::view::ViewAction;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Notifications for the host page, in the order they happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaginatorEvent {
    LoadingStarted { page: u32, page_size: u32 },
    PageLoaded { page: u32, page_size: u32, total_item_count: u64 },
    FetchFailed { page: u32, page_size: u32, error: String },
    StaleDiscarded { page: u32, page_size: u32 },
    PageSizePersisted { slug: String, page_size: u32 },
}

/// Result of an operation that reached the fetcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied { page: u32, page_size: u32 },
    /// Superseded by a newer operation before the response arrived
    Superseded,
}

pub struct Paginator<T, F> {
    options: PagerOptions,
    fetcher: F,
    storage: Option<Arc<dyn PageSizeStorage>>,
    state: Mutex<PaginationState<T>>,
    subscribers: Mutex<Vec<UnboundedSender<PaginatorEvent>>>,
    unmounted: CancellationToken,
}

impl<T, F> Paginator<T, F>
where
    T: Clone + Send,
    F: PageFetcher<T>,
{
    /// Mount a widget. With a slug and a storage, the page size is restored
    /// from the previous session.
    pub fn new(
        options: PagerOptions,
        fetcher: F,
        storage: Option<Arc<dyn PageSizeStorage>>,
    ) -> Result<Self, PagerError> {
        options.validate()?;

        let page_size = match (&storage, options.persistence_slug()) {
            (Some(storage), Some(slug)) => {
                let restored = storage.get(Some(slug), options.default_page_size);
                if options.is_allowed_page_size(restored) {
                    debug!(
                        slug,
                        page_size = restored,
                        storage = storage.strategy_name(),
                        "Page size restored"
                    );
                    restored
                } else {
                    warn!(
                        slug,
                        page_size = restored,
                        "Persisted page size is not allowed, using default"
                    );
                    options.default_page_size
                }
            }
            _ => options.default_page_size,
        };

        let state = PaginationState::new(page_size, options.allowed_page_sizes.clone());
        Ok(Self {
            options,
            fetcher,
            storage,
            state: Mutex::new(state),
            subscribers: Mutex::new(Vec::new()),
            unmounted: CancellationToken::new(),
        })
    }

    pub fn options(&self) -> &PagerOptions {
        &self.options
    }

    /// Receive every event from now on
    pub fn subscribe(&self) -> UnboundedReceiver<PaginatorEvent> {
        let (tx, rx) = unbounded_channel();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    pub fn snapshot(&self) -> PageSnapshot<T> {
        self.lock_state().snapshot()
    }

    pub fn is_loading(&self) -> bool {
        self.lock_state().is_loading()
    }

    pub fn current_page(&self) -> u32 {
        self.lock_state().current_page()
    }

    pub fn page_size(&self) -> u32 {
        self.lock_state().page_size()
    }

    pub fn is_unmounted(&self) -> bool {
        self.unmounted.is_cancelled()
    }

    /// Tear the widget down. In-flight fetches are abandoned and later
    /// operations fail with [`PagerError::Unmounted`].
    pub fn unmount(&self) {
        info!(slug = ?self.options.slug, "Unmounting pagination widget");
        self.unmounted.cancel();
    }

    /// Load `page`, clamped into `[1, max_page]`
    pub async fn go_to_page(&self, page: u32) -> Result<FetchOutcome, PagerError> {
        self.ensure_mounted()?;
        let ticket = self.lock_state().begin_go_to_page(page);
        self.run(ticket).await
    }

    /// Switch to `page_size` and go back to the first page
    pub async fn change_page_size(&self, page_size: u32) -> Result<FetchOutcome, PagerError> {
        self.ensure_mounted()?;
        let ticket = self.lock_state().begin_change_page_size(page_size)?;
        self.run(ticket).await
    }

    pub async fn next_page(&self) -> Result<FetchOutcome, PagerError> {
        let page = self.current_page().saturating_add(1);
        self.go_to_page(page).await
    }

    pub async fn previous_page(&self) -> Result<FetchOutcome, PagerError> {
        let page = self.current_page().saturating_sub(1);
        self.go_to_page(page).await
    }

    /// Re-fetch the current page with the current size
    pub async fn refresh(&self) -> Result<FetchOutcome, PagerError> {
        let page = self.current_page();
        self.go_to_page(page).await
    }

    /// Handle "go to page" text. Non-numeric input is ignored (`Ok(None)`).
    pub async fn go_to_input(&self, text: &str) -> Result<Option<FetchOutcome>, PagerError> {
        let max_page = self.lock_state().max_page();
        match parse_page_input(text, max_page) {
            Some(page) => self.go_to_page(page).await.map(Some),
            None => {
                debug!(input = text, "Ignoring non-numeric page input");
                Ok(None)
            }
        }
    }

    /// Route a view interaction to the matching operation
    pub async fn dispatch(&self, action: ViewAction) -> Result<Option<FetchOutcome>, PagerError> {
        match action {
            ViewAction::GoToPage(page) => self.go_to_page(page).await.map(Some),
            ViewAction::Previous => self.previous_page().await.map(Some),
            ViewAction::Next => self.next_page().await.map(Some),
            ViewAction::ChangePageSize(size) => self.change_page_size(size).await.map(Some),
            ViewAction::GoToInput(text) => self.go_to_input(&text).await,
        }
    }

    async fn run(&self, ticket: FetchTicket) -> Result<FetchOutcome, PagerError> {
        let request = ticket.request;
        self.emit(PaginatorEvent::LoadingStarted {
            page: request.page,
            page_size: request.page_size,
        });
        debug!(
            sequence = ticket.sequence,
            page = request.page,
            page_size = request.page_size,
            "Fetching page"
        );

        let result = tokio::select! {
            _ = self.unmounted.cancelled() => Err(PagerError::Unmounted),
            result = self.fetcher.fetch(request) => result,
        };

        if self.is_unmounted() {
            debug!(sequence = ticket.sequence, "Dropping response for unmounted widget");
            self.lock_state().abandon(&ticket);
            return Err(PagerError::Unmounted);
        }

        let completion = {
            let mut state = self.lock_state();
            // Persist before the new size becomes visible
            if ticket.changes_page_size && result.is_ok() && state.is_current(&ticket) {
                self.persist_page_size(request.page_size);
            }
            state.complete(ticket, result)
        };

        self.report(ticket, completion)
    }

    fn report(
        &self,
        ticket: FetchTicket,
        completion: Result<Completion, PagerError>,
    ) -> Result<FetchOutcome, PagerError> {
        let request = ticket.request;
        match completion {
            Ok(Completion::Applied {
                page,
                page_size,
                total_item_count,
                ..
            }) => {
                self.emit(PaginatorEvent::PageLoaded {
                    page,
                    page_size,
                    total_item_count,
                });
                Ok(FetchOutcome::Applied { page, page_size })
            }
            Ok(Completion::Stale { sequence }) => {
                debug!(sequence, page = request.page, "Discarding stale page response");
                self.emit(PaginatorEvent::StaleDiscarded {
                    page: request.page,
                    page_size: request.page_size,
                });
                Ok(FetchOutcome::Superseded)
            }
            Err(e) => {
                warn!(
                    page = request.page,
                    page_size = request.page_size,
                    error = %e,
                    "Page fetch failed"
                );
                self.emit(PaginatorEvent::FetchFailed {
                    page: request.page,
                    page_size: request.page_size,
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    fn persist_page_size(&self, page_size: u32) {
        let (Some(storage), Some(slug)) = (&self.storage, self.options.persistence_slug()) else {
            return;
        };
        match storage.set(Some(slug), page_size) {
            Ok(()) => self.emit(PaginatorEvent::PageSizePersisted {
                slug: slug.to_string(),
                page_size,
            }),
            Err(e) => warn!(slug, page_size, error = %e, "Failed to persist page size"),
        }
    }

    fn ensure_mounted(&self) -> Result<(), PagerError> {
        if self.is_unmounted() {
            Err(PagerError::Unmounted)
        } else {
            Ok(())
        }
    }

    fn emit(&self, event: PaginatorEvent) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // Receivers that were dropped are forgotten
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn lock_state(&self) -> MutexGuard<'_, PaginationState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
