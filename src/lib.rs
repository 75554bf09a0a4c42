//! Faceted filter and pagination engine for scored photo libraries.
//!
//! This crate is the state/query core a photo-browsing shell embeds: it
//! owns what is currently being searched for (the facet state), turns
//! that state into fetchable result pages with cancel-on-supersede
//! semantics, accumulates pages while the user scrolls, and derives the
//! removable "active filter" chips shown above the grid. Rendering,
//! dialogs, and the server-side scoring all live elsewhere.

pub mod api;
pub mod config;
pub mod fetch;
pub mod filter;
pub mod logging;
pub mod pager;
pub mod people;
pub mod results;
pub mod session;

pub use api::{ApiError, HttpListing, ListingPage, PhotoListing};
pub use config::Config;
pub use fetch::{query_params, FetchEvent, FetchKind, ResultFetcher};
pub use filter::{
    clear_chip, derive_chips, Chip, ClearKey, Facet, FacetKind, FacetValue, FilterState,
    FilterStore, RangePair, RANGE_PAIRS,
};
pub use pager::{Pager, PagerPhase};
pub use people::{PersonDirectory, PersonRecord, TypeCount, TypeLabels};
pub use results::{PhotoSummary, ResultPage};
pub use session::BrowseSession;
