//! Decides when the next page should be pulled while the user scrolls.
//!
//! The host reports visibility of a trailing sentinel element; the
//! pager turns that into at most one next-page fetch at a time. It is
//! re-armed after every applied page, so a tall viewport that still
//! shows the sentinel keeps loading until the buffer reports exhausted.

/// Pagination phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PagerPhase {
    #[default]
    Idle,
    FetchingNext,
}

/// Sentinel-driven next-page trigger with a duplicate-fetch guard.
#[derive(Debug, Default)]
pub struct Pager {
    phase: PagerPhase,
}

impl Pager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> PagerPhase {
        self.phase
    }

    /// True when a sentinel sighting should start a next-page fetch.
    pub fn should_fetch(&self, sentinel_visible: bool, has_more: bool) -> bool {
        sentinel_visible && has_more && self.phase == PagerPhase::Idle
    }

    /// A next-page fetch was started.
    pub fn on_dispatch(&mut self) {
        self.phase = PagerPhase::FetchingNext;
    }

    /// The in-flight next-page fetch settled, applied or failed. A
    /// failure changes nothing else; retrying is the user's call.
    pub fn on_settled(&mut self) {
        self.phase = PagerPhase::Idle;
    }

    /// A facet change restarted the result set; pagination starts over.
    pub fn reset(&mut self) {
        self.phase = PagerPhase::Idle;
    }
}
