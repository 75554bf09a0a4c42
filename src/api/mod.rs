//! Boundary to the photo read API.
//!
//! The engine drives three read endpoints: the photo listing, the
//! person directory, and the per-type counts. Implementations block;
//! the fetcher calls them from background threads.

pub mod client;

use serde::Deserialize;
use thiserror::Error;

use crate::people::{PersonRecord, TypeCount};
use crate::results::PhotoSummary;

pub use client::HttpListing;

/// Failure crossing the API boundary. Previously fetched results stay
/// untouched; a failed fetch is retried only on an explicit
/// user-triggered re-fetch.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("server returned HTTP {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Decode(String),
}

/// One page of the photo listing, as the server returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct ListingPage {
    pub photos: Vec<PhotoSummary>,
    pub total: u64,
    /// Older server versions omit this field.
    #[serde(default)]
    pub has_more: Option<bool>,
}

impl ListingPage {
    /// The "more" flag with the absent case resolved: an empty batch
    /// means exhausted, a non-empty one optimistically means more.
    pub fn more(&self) -> bool {
        self.has_more.unwrap_or(!self.photos.is_empty())
    }
}

/// The photo read API consumed by the engine.
pub trait PhotoListing: Send + Sync {
    /// Fetch one listing page for the given query parameters.
    fn list_photos(&self, params: &[(&'static str, String)]) -> Result<ListingPage, ApiError>;

    /// Fetch the person directory.
    fn list_people(&self) -> Result<Vec<PersonRecord>, ApiError>;

    /// Fetch the per-type counts and display labels.
    fn type_counts(&self) -> Result<Vec<TypeCount>, ApiError>;
}
