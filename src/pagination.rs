//! Pagination state machine
//!
//! ```text
//!  Idle ──search──▶ Searching ──hits──▶ Displaying(0) ──load_more──▶ LoadingMore
//!                       │                    ▲                            │
//!                       └─no hits/last─▶ EndReached ◀──no hits/last───────┤
//!                                            │                            │
//!                                            │           Displaying(p+1) ◀┘
//!  any state ──search──▶ Searching    any state ──reset──▶ Idle
//! ```

use serde::{Deserialize, Serialize};

use crate::results::ResultPayload;

/// Observable pagination phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaginationPhase {
    Idle,
    Searching,
    Displaying(u32),
    LoadingMore,
    EndReached,
}

/// Snapshot of the pagination bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationState {
    pub last_requested_page: u32,
    /// `None` until the first page of the current search is displayed
    pub last_displayed_page: Option<u32>,
    pub end_reached: bool,
    pub phase: PaginationPhase,
}

/// Tracks requested/displayed pages and whether more pages exist
#[derive(Debug, Clone)]
pub struct PaginationController {
    last_requested_page: u32,
    last_displayed_page: Option<u32>,
    end_reached: bool,
    phase: PaginationPhase,
}

impl Default for PaginationController {
    fn default() -> Self {
        Self::new()
    }
}

impl PaginationController {
    #[must_use]
    pub fn new() -> Self {
        Self {
            last_requested_page: 0,
            last_displayed_page: None,
            end_reached: false,
            phase: PaginationPhase::Idle,
        }
    }

    /// Restart for a fresh search (valid from every phase)
    pub fn begin_search(&mut self) {
        self.last_requested_page = 0;
        self.last_displayed_page = None;
        self.end_reached = false;
        self.phase = PaginationPhase::Searching;
    }

    /// Reserve the next page, or `None` if a load-more is not allowed now
    pub fn begin_load_more(&mut self) -> Option<u32> {
        if !self.should_load_more() {
            return None;
        }
        self.last_requested_page += 1;
        self.phase = PaginationPhase::LoadingMore;
        Some(self.last_requested_page)
    }

    /// Apply an accepted first-page response
    pub fn first_page_displayed(&mut self, payload: &ResultPayload) {
        self.end_reached = !payload.has_hits() || payload.is_last_page();
        self.last_displayed_page = Some(0);
        self.phase = if self.end_reached {
            PaginationPhase::EndReached
        } else {
            PaginationPhase::Displaying(0)
        };
    }

    /// Apply an accepted load-more response
    ///
    /// Returns `true` if the page has hits and should be shown.
    pub fn next_page_received(&mut self, payload: &ResultPayload) -> bool {
        if !payload.has_hits() {
            self.end_reached = true;
            self.phase = PaginationPhase::EndReached;
            return false;
        }

        self.last_displayed_page = Some(self.last_requested_page);
        if payload.is_last_page() {
            self.end_reached = true;
        }
        self.phase = if self.end_reached {
            PaginationPhase::EndReached
        } else {
            PaginationPhase::Displaying(self.last_requested_page)
        };
        true
    }

    /// Release the page reserved by `begin_load_more` after its request failed
    ///
    /// The displayed page stays as it was, so the same page can be requested again.
    pub fn load_more_failed(&mut self) {
        if self.phase != PaginationPhase::LoadingMore {
            return;
        }
        if let Some(displayed) = self.last_displayed_page {
            self.last_requested_page = displayed;
            self.phase = PaginationPhase::Displaying(displayed);
        }
    }

    /// Leave `Searching` after the first page failed to arrive
    ///
    /// Nothing is displayed, so the session goes back to `Idle` until the
    /// next search.
    pub fn search_failed(&mut self) {
        if self.phase == PaginationPhase::Searching {
            self.reset();
        }
    }

    /// Back to `Idle`: nothing requested, nothing displayed
    pub fn reset(&mut self) {
        self.last_requested_page = 0;
        self.last_displayed_page = None;
        self.end_reached = false;
        self.phase = PaginationPhase::Idle;
    }

    /// True unless the end was reached or a requested page is not displayed yet
    #[must_use]
    pub fn should_load_more(&self) -> bool {
        if self.end_reached {
            return false;
        }
        match self.last_displayed_page {
            Some(displayed) => self.last_requested_page <= displayed,
            None => false,
        }
    }

    #[must_use]
    pub fn end_reached(&self) -> bool {
        self.end_reached
    }

    #[must_use]
    pub fn phase(&self) -> PaginationPhase {
        self.phase
    }

    #[must_use]
    pub fn last_requested_page(&self) -> u32 {
        self.last_requested_page
    }

    #[must_use]
    pub fn last_displayed_page(&self) -> Option<u32> {
        self.last_displayed_page
    }

    #[must_use]
    pub fn snapshot(&self) -> PaginationState {
        PaginationState {
            last_requested_page: self.last_requested_page,
            last_displayed_page: self.last_displayed_page,
            end_reached: self.end_reached,
            phase: self.phase,
        }
    }
}
