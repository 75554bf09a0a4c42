//! The accumulated result window the browser scrolls through.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One photo row of a listing response.
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoSummary {
    pub id: i64,
    pub filename: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub taken_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub camera: Option<String>,
    #[serde(default)]
    pub is_favorite: bool,
}

/// Ordered photo buffer plus the server's total and "more" flag.
///
/// Replaced wholesale when a facet changes; appended to while the user
/// scrolls. Appending is id-deduplicated so a server that repeats rows
/// across page boundaries cannot grow the buffer with duplicates.
#[derive(Debug, Clone, Default)]
pub struct ResultPage {
    photos: Vec<PhotoSummary>,
    total: u64,
    has_more: bool,
    seen: HashSet<i64>,
}

impl ResultPage {
    pub fn photos(&self) -> &[PhotoSummary] {
        &self.photos
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    /// Start over with a fresh first window.
    pub(crate) fn replace(&mut self, photos: Vec<PhotoSummary>, total: u64, has_more: bool) {
        self.seen = photos.iter().map(|p| p.id).collect();
        self.photos = photos;
        self.total = total;
        self.has_more = has_more;
    }

    /// Extend with the next window, skipping rows already present.
    /// Returns how many rows were genuinely new.
    pub(crate) fn append(&mut self, photos: Vec<PhotoSummary>, total: u64, has_more: bool) -> usize {
        let mut added = 0;
        for photo in photos {
            if self.seen.insert(photo.id) {
                self.photos.push(photo);
                added += 1;
            }
        }
        self.total = total;
        self.has_more = has_more;
        added
    }

    /// Force the exhausted state, overriding the server's flag.
    pub(crate) fn mark_exhausted(&mut self) {
        self.has_more = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(id: i64) -> PhotoSummary {
        PhotoSummary {
            id,
            filename: format!("IMG_{id:04}.jpg"),
            thumbnail_url: None,
            score: None,
            taken_at: None,
            camera: None,
            is_favorite: false,
        }
    }

    #[test]
    fn test_replace_resets_the_buffer() {
        let mut page = ResultPage::default();
        page.replace(vec![photo(1), photo(2)], 10, true);
        assert_eq!(page.len(), 2);

        page.replace(vec![photo(3)], 1, false);
        assert_eq!(page.len(), 1);
        assert_eq!(page.photos()[0].id, 3);
        assert!(!page.has_more());
    }

    #[test]
    fn test_append_skips_rows_already_present() {
        let mut page = ResultPage::default();
        page.replace(vec![photo(1), photo(2)], 4, true);

        let added = page.append(vec![photo(2), photo(3)], 4, true);
        assert_eq!(added, 1);
        assert_eq!(page.len(), 3);

        let added = page.append(vec![photo(1), photo(2)], 4, false);
        assert_eq!(added, 0);
        assert_eq!(page.len(), 3);
    }

    #[test]
    fn test_mark_exhausted_overrides_server_flag() {
        let mut page = ResultPage::default();
        page.replace(vec![photo(1)], 1, true);
        page.mark_exhausted();
        assert!(!page.has_more());
    }
}
