//! Lazy, forward-only pagination
//!
//! A [`Paginator`] wraps a page-fetch function and walks the result set one
//! page per call to [`Paginator::next_page`]. Nothing is fetched until asked
//! for, so dropping the paginator early never triggers another request.
//!
//! Two modes:
//! - [`PaginationMode::Cursor`]: follow `next_page_token` until absent
//! - [`PaginationMode::PageNumber`]: request pages 1, 2, ... until
//!   `page_number >= page_count` or an empty page
//!
//! A server that repeats a cursor, or a result set longer than the page
//! bound, ends the sequence with a [`PaginationError`]. The page carrying a
//! repeated cursor is still delivered; the error comes on the next call.

use std::future::Future;
use std::marker::PhantomData;

use callwire_domain::errors::PaginationError;
use callwire_domain::{CallwireError, PageResult, PageWindow, PaginationMode, Result};
use futures::stream::{self, Stream, TryStreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::executor::DEFAULT_MAX_PAGES;

/// Single-pass iterator over the pages of one list call
pub struct Paginator<T, F> {
    fetch: F,
    mode: PaginationMode,
    next_window: Option<PageWindow>,
    previous_cursor: Option<String>,
    pending_error: Option<CallwireError>,
    pages_fetched: u32,
    max_pages: u32,
    cancel: CancellationToken,
    _record: PhantomData<fn() -> T>,
}

impl<T, F> std::fmt::Debug for Paginator<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Paginator")
            .field("mode", &self.mode)
            .field("next_window", &self.next_window)
            .field("pages_fetched", &self.pages_fetched)
            .field("max_pages", &self.max_pages)
            .finish_non_exhaustive()
    }
}

impl<T, F, Fut> Paginator<T, F>
where
    F: FnMut(PageWindow) -> Fut,
    Fut: Future<Output = Result<PageResult<T>>>,
{
    /// Paginate with `fetch`, starting at `first`.
    ///
    /// In page-number mode a `first` window without a page number starts at 1.
    pub fn new(fetch: F, first: PageWindow, mode: PaginationMode, cancel: CancellationToken) -> Self {
        let first = match (mode, first.page_number()) {
            (PaginationMode::PageNumber, None) => first.clone().with_page_number(1).unwrap_or(first),
            _ => first,
        };
        Self {
            fetch,
            mode,
            next_window: Some(first),
            previous_cursor: None,
            pending_error: None,
            pages_fetched: 0,
            max_pages: DEFAULT_MAX_PAGES,
            cancel,
            _record: PhantomData,
        }
    }

    #[must_use]
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    pub fn mode(&self) -> PaginationMode {
        self.mode
    }

    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    /// Whether the sequence has ended (terminal page, error or cancellation).
    pub fn is_finished(&self) -> bool {
        self.next_window.is_none() && self.pending_error.is_none()
    }

    /// Fetch the next page, or `Ok(None)` once the sequence has ended.
    ///
    /// After an error the paginator is finished.
    ///
    /// # Errors
    /// - [`PaginationError::RepeatedCursor`] on the call after the page that
    ///   repeated its predecessor's cursor
    /// - [`PaginationError::PageLimitExceeded`] past the page bound
    /// - [`CallwireError::Cancelled`], or whatever the fetch function returns
    pub async fn next_page(&mut self) -> Result<Option<PageResult<T>>> {
        if let Some(err) = self.pending_error.take() {
            return Err(err);
        }
        let Some(window) = self.next_window.take() else {
            return Ok(None);
        };

        if self.cancel.is_cancelled() {
            return Err(CallwireError::Cancelled);
        }
        if self.pages_fetched >= self.max_pages {
            warn!(max_pages = self.max_pages, "page bound reached with more pages pending");
            return Err(PaginationError::PageLimitExceeded { max_pages: self.max_pages }.into());
        }

        let page = tokio::select! {
            biased;
            () = self.cancel.cancelled() => return Err(CallwireError::Cancelled),
            page = (self.fetch)(window.clone()) => page?,
        };
        self.pages_fetched += 1;

        if page.is_terminal(self.mode) {
            debug!(pages = self.pages_fetched, "pagination complete");
            return Ok(Some(page));
        }

        match self.advance(window, &page) {
            Ok(next) => self.next_window = Some(next),
            Err(err) => self.pending_error = Some(err),
        }
        Ok(Some(page))
    }

    /// Window for the page after `page`, or a guard error.
    fn advance(&mut self, window: PageWindow, page: &PageResult<T>) -> Result<PageWindow> {
        match self.mode {
            PaginationMode::Cursor => {
                let cursor = page.next_cursor.clone().unwrap_or_default();
                if self.previous_cursor.as_deref() == Some(cursor.as_str()) {
                    warn!(cursor = %cursor, "server repeated pagination cursor");
                    return Err(PaginationError::RepeatedCursor { cursor }.into());
                }
                self.previous_cursor = Some(cursor.clone());
                Ok(window.with_cursor(cursor))
            }
            PaginationMode::PageNumber => {
                let current = page.page_number.or(window.page_number()).unwrap_or(1);
                window.with_page_number(current.saturating_add(1))
            }
        }
    }

    /// Drain every remaining page into one record list.
    ///
    /// # Errors
    /// The first error [`Paginator::next_page`] returns.
    pub async fn collect_all(mut self) -> Result<Vec<T>> {
        let mut records = Vec::new();
        while let Some(page) = self.next_page().await? {
            records.extend(page.records);
        }
        Ok(records)
    }

    /// Pages as a stream; ends after the terminal page or the first error.
    pub fn into_stream(self) -> impl Stream<Item = Result<PageResult<T>>> {
        stream::unfold(self, |mut paginator| async move {
            match paginator.next_page().await {
                Ok(Some(page)) => Some((Ok(page), paginator)),
                Ok(None) => None,
                Err(e) => Some((Err(e), paginator)),
            }
        })
    }

    /// Records of every page, flattened in order.
    pub fn into_records(self) -> impl Stream<Item = Result<T>> {
        self.into_stream()
            .map_ok(|page| stream::iter(page.records.into_iter().map(Ok::<T, CallwireError>)))
            .try_flatten()
    }
}
