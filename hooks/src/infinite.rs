//! Offset-paginated lists fetched a page at a time in either direction.
//!
//! # Design
//! The page parameter is the numeric offset sent to the server. After a
//! non-empty page, the next offset is that page's offset plus the number of
//! items it actually held; an empty page ends forward pagination. Going
//! backwards steps the first offset down by the page size (the requested
//! limit, or a per-resource default), floored at zero, and stops at zero.
//!
//! Pages and their offsets live side by side in two deques so either end
//! can grow. With `max_pages` set, adding a page evicts one from the
//! opposite end.

use std::collections::VecDeque;

use story_schematics_core::ApiError;
use tracing::debug;

use crate::error::HooksError;
use crate::key::QueryKey;
use crate::retry::RetryPolicy;

/// A list read one offset window at a time.
pub trait InfiniteQuery {
    type Item;

    fn key(&self) -> QueryKey;

    fn enabled(&self) -> bool {
        true
    }

    /// Offset of the first page fetched.
    fn initial_page_param(&self) -> u32;

    /// Step used when paging backwards.
    fn page_size(&self) -> u32;

    fn fetch_page(&self, offset: u32) -> Result<Vec<Self::Item>, ApiError>;

    fn should_retry(&self, error: &ApiError) -> bool {
        error.is_internal()
    }
}

/// Offset after a page fetched at `offset` that returned `len` items.
pub fn next_page_param(offset: u32, len: usize) -> Option<u32> {
    if len == 0 {
        return None;
    }
    Some(offset.saturating_add(u32::try_from(len).unwrap_or(u32::MAX)))
}

/// Offset of the page before one fetched at `offset`.
pub fn previous_page_param(offset: u32, page_size: u32) -> Option<u32> {
    (offset > 0).then(|| offset.saturating_sub(page_size))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationState {
    NotFetched,
    /// More pages are available in both directions.
    Partial,
    /// The last page came back empty.
    ExhaustedForward,
    /// The first page starts at offset 0.
    ExhaustedBackward,
    Exhausted,
}

pub struct InfiniteQueryState<Q: InfiniteQuery> {
    query: Q,
    retry: RetryPolicy,
    max_pages: Option<usize>,
    pages: VecDeque<Vec<Q::Item>>,
    page_params: VecDeque<u32>,
}

impl<Q: InfiniteQuery> InfiniteQueryState<Q> {
    pub fn new(query: Q) -> Self {
        Self {
            query,
            retry: RetryPolicy::default(),
            max_pages: None,
            pages: VecDeque::new(),
            page_params: VecDeque::new(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Keep at most `max_pages` pages (at least one).
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = Some(max_pages.max(1));
        self
    }

    pub fn key(&self) -> QueryKey {
        self.query.key()
    }

    pub fn pages(&self) -> &VecDeque<Vec<Q::Item>> {
        &self.pages
    }

    pub fn page_params(&self) -> &VecDeque<u32> {
        &self.page_params
    }

    /// Every retained item, in offset order.
    pub fn items(&self) -> impl Iterator<Item = &Q::Item> {
        self.pages.iter().flatten()
    }

    pub fn next_page_param(&self) -> Option<u32> {
        let offset = *self.page_params.back()?;
        let len = self.pages.back().map_or(0, Vec::len);
        next_page_param(offset, len)
    }

    pub fn previous_page_param(&self) -> Option<u32> {
        let offset = *self.page_params.front()?;
        previous_page_param(offset, self.query.page_size())
    }

    pub fn has_next_page(&self) -> bool {
        self.next_page_param().is_some()
    }

    pub fn has_previous_page(&self) -> bool {
        self.previous_page_param().is_some()
    }

    pub fn state(&self) -> PaginationState {
        if self.pages.is_empty() {
            return PaginationState::NotFetched;
        }
        match (self.has_next_page(), self.has_previous_page()) {
            (true, true) => PaginationState::Partial,
            (false, true) => PaginationState::ExhaustedForward,
            (true, false) => PaginationState::ExhaustedBackward,
            (false, false) => PaginationState::Exhausted,
        }
    }

    /// Drop every page and fetch the initial one again.
    pub fn refetch(&mut self) -> Result<&[Q::Item], HooksError> {
        let offset = self.query.initial_page_param();
        let page = self.fetch(offset)?;
        self.pages.clear();
        self.page_params.clear();
        self.pages.push_back(page);
        self.page_params.push_back(offset);
        Ok(self.pages.back().map_or(&[][..], Vec::as_slice))
    }

    /// Fetch the page after the last one. Returns `None` when forward
    /// pagination is exhausted. The first call fetches the initial page.
    pub fn fetch_next_page(&mut self) -> Result<Option<&[Q::Item]>, HooksError> {
        if self.pages.is_empty() {
            return self.refetch().map(Some);
        }
        let Some(offset) = self.next_page_param() else {
            return Ok(None);
        };
        let page = self.fetch(offset)?;
        self.pages.push_back(page);
        self.page_params.push_back(offset);
        if self.over_limit() {
            self.pages.pop_front();
            self.page_params.pop_front();
        }
        Ok(self.pages.back().map(Vec::as_slice))
    }

    /// Fetch the page before the first one. Returns `None` once the first
    /// page starts at offset 0. The first call fetches the initial page.
    pub fn fetch_previous_page(&mut self) -> Result<Option<&[Q::Item]>, HooksError> {
        if self.pages.is_empty() {
            return self.refetch().map(Some);
        }
        let Some(offset) = self.previous_page_param() else {
            return Ok(None);
        };
        let page = self.fetch(offset)?;
        self.pages.push_front(page);
        self.page_params.push_front(offset);
        if self.over_limit() {
            self.pages.pop_back();
            self.page_params.pop_back();
        }
        Ok(self.pages.front().map(Vec::as_slice))
    }

    fn over_limit(&self) -> bool {
        self.max_pages.is_some_and(|max| self.pages.len() > max)
    }

    fn fetch(&self, offset: u32) -> Result<Vec<Q::Item>, HooksError> {
        let key = self.query.key();
        if !self.query.enabled() {
            return Err(HooksError::Disabled {
                key: key.fingerprint(),
            });
        }
        let label = key.fingerprint();
        let page = self.retry.run(
            &label,
            |err| self.query.should_retry(err),
            || self.query.fetch_page(offset),
        )?;
        debug!(key = %label, offset, len = page.len(), "page fetched");
        Ok(page)
    }
}
