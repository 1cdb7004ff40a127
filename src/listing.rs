//! Per-source listing sessions
//!
//! Each wallpaper source keeps its own paginated view state, so switching
//! sources or pages never clobbers another source's progress. Every fetch
//! is issued against a ticket; a result is committed only while its ticket
//! is still the newest request for that source, which makes overlapping
//! and out-of-order responses safe (last write wins, stale results are
//! dropped).

use crate::types::{PaginatedResponse, WallpaperListItem, WallpaperSource};
use std::collections::HashMap;

/// Listing state for one source.
#[derive(Debug, Clone)]
pub struct ListingPage {
    pub items: Vec<WallpaperListItem>,
    /// Current page number, 1-based.
    pub page: u32,
    pub last_page: u32,
    pub per_page: u32,
    pub total: u32,
    /// False until the first successful fetch for this source.
    pub loaded: bool,
}

impl Default for ListingPage {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            page: 1,
            last_page: 1,
            per_page: 0,
            total: 0,
            loaded: false,
        }
    }
}

/// Proof of an issued fetch, consumed by `commit_page`/`commit_failure`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    source: WallpaperSource,
    page: u32,
    generation: u64,
}

impl FetchTicket {
    pub fn source(&self) -> WallpaperSource {
        self.source
    }

    /// The page this ticket was issued for, after clamping.
    pub fn page(&self) -> u32 {
        self.page
    }
}

/// All listing sessions, keyed by source.
#[derive(Debug, Default)]
pub struct ListingStore {
    pages: HashMap<WallpaperSource, ListingPage>,
    in_flight: HashMap<WallpaperSource, u64>,
    generation: u64,
}

impl ListingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current page state for a source; an unseen source yields the
    /// canonical empty (`loaded = false`) page.
    pub fn page(&mut self, source: WallpaperSource) -> &ListingPage {
        self.pages.entry(source).or_default()
    }

    /// Non-inserting read; `None` means the source was never touched.
    pub fn try_page(&self, source: WallpaperSource) -> Option<&ListingPage> {
        self.pages.get(&source)
    }

    /// Whether a fetch for this source is still awaiting its result.
    pub fn is_fetching(&self, source: WallpaperSource) -> bool {
        self.in_flight.contains_key(&source)
    }

    /// Mark a (source, page) fetch as in flight and return its ticket.
    ///
    /// Page numbers are floored to 1. Requesting past the known last
    /// page of a loaded source is a no-op and yields `None`. Issuing a
    /// new ticket for a source invalidates any earlier outstanding one.
    pub fn begin_fetch(&mut self, source: WallpaperSource, page: u32) -> Option<FetchTicket> {
        let page = page.max(1);
        if let Some(existing) = self.pages.get(&source) {
            if existing.loaded && page > existing.last_page {
                return None;
            }
        }

        self.generation += 1;
        self.in_flight.insert(source, self.generation);
        Some(FetchTicket {
            source,
            page,
            generation: self.generation,
        })
    }

    /// Apply a fetch result, unless a newer request for the same source
    /// superseded the ticket in the meantime. Returns whether the page
    /// was committed.
    pub fn commit_page(
        &mut self,
        ticket: FetchTicket,
        response: PaginatedResponse<WallpaperListItem>,
    ) -> bool {
        if !self.ticket_is_current(&ticket) {
            return false;
        }
        self.in_flight.remove(&ticket.source);

        let page = self.pages.entry(ticket.source).or_default();
        page.items = response.data;
        page.last_page = response.last_page.max(1);
        page.page = response.current_page.clamp(1, page.last_page);
        page.per_page = response.per_page;
        page.total = response.total;
        page.loaded = true;
        true
    }

    /// Record that a fetch failed. Previously loaded items and the
    /// `loaded` flag are left untouched; only the in-flight marker is
    /// cleared (and only if the ticket is still current).
    pub fn commit_failure(&mut self, ticket: FetchTicket) -> bool {
        if !self.ticket_is_current(&ticket) {
            return false;
        }
        self.in_flight.remove(&ticket.source);
        true
    }

    fn ticket_is_current(&self, ticket: &FetchTicket) -> bool {
        self.in_flight.get(&ticket.source) == Some(&ticket.generation)
    }
}
