//! The embedding surface: one object wiring the filter store, the
//! result fetcher, the pager, and the lookup caches together.
//!
//! A host (TUI, desktop shell, web view) mutates facets and reports
//! sentinel visibility; the session keeps the result buffer in step and
//! hands back chip descriptors for rendering. Call [`BrowseSession::poll`]
//! once per host tick to apply finished background fetches.

use std::sync::Arc;

use tracing::debug;

use crate::api::{ApiError, PhotoListing};
use crate::config::Config;
use crate::fetch::{FetchEvent, FetchKind, ResultFetcher};
use crate::filter::chips::{clear_chip, derive_chips, Chip, ClearKey};
use crate::filter::schema::Facet;
use crate::filter::state::{FacetValue, FilterState, FilterStore};
use crate::pager::Pager;
use crate::people::{PersonDirectory, TypeLabels};
use crate::results::ResultPage;

pub struct BrowseSession {
    store: FilterStore,
    fetcher: ResultFetcher,
    pager: Pager,
    people: PersonDirectory,
    type_labels: TypeLabels,
    client: Arc<dyn PhotoListing>,
    sentinel_visible: bool,
}

impl BrowseSession {
    /// Create an idle session. Nothing is fetched until the first facet
    /// mutation or an explicit [`BrowseSession::refresh`].
    pub fn new(client: Arc<dyn PhotoListing>, config: &Config) -> Self {
        Self {
            store: FilterStore::with_per_page(config.browse.per_page),
            fetcher: ResultFetcher::new(Arc::clone(&client)),
            pager: Pager::new(),
            people: PersonDirectory::new(),
            type_labels: TypeLabels::new(),
            client,
            sentinel_visible: false,
        }
    }

    /// Current filter snapshot.
    pub fn filters(&self) -> Arc<FilterState> {
        self.store.get()
    }

    /// Facets deviating from their defaults, for UI badges.
    pub fn active_filter_count(&self) -> usize {
        self.store.active_count()
    }

    pub fn results(&self) -> &ResultPage {
        self.fetcher.results()
    }

    pub fn loading(&self) -> bool {
        self.fetcher.loading()
    }

    pub fn last_error(&self) -> Option<&ApiError> {
        self.fetcher.last_error()
    }

    /// Replace one facet and refetch from a clean result set.
    pub fn set_facet(&mut self, facet: Facet, value: impl Into<FacetValue>) {
        self.store.set_one(facet, value.into());
        self.restart();
    }

    /// Replace a batch of facets atomically, then refetch.
    pub fn set_facets(&mut self, updates: &[(Facet, FacetValue)]) {
        self.store.set_many(updates);
        self.restart();
    }

    /// Select a sort key. Re-selecting the active key flips the
    /// direction; a new key starts descending. The current page is kept
    /// and re-requested under the new order.
    pub fn set_sort(&mut self, key: &str) {
        let state = self.store.get();
        let direction = if state.sort == key && state.sort_direction == "DESC" {
            "ASC"
        } else {
            "DESC"
        };
        self.store.set_many(&[
            (Facet::Sort, key.into()),
            (Facet::SortDirection, direction.into()),
        ]);
        self.restart();
    }

    /// Drop every active facet and refetch.
    pub fn reset_filters(&mut self) {
        self.store.reset();
        self.restart();
    }

    /// Explicit re-fetch of the current state. This is also the only
    /// way a failed fetch is retried.
    pub fn refresh(&mut self) {
        self.restart();
    }

    /// Active chips for the current snapshot, in presentation order.
    pub fn chips(&self) -> Vec<Chip> {
        derive_chips(&self.store.get(), &self.people, &self.type_labels)
    }

    /// Remove one chip and refetch.
    pub fn clear_chip(&mut self, key: &ClearKey) {
        clear_chip(&mut self.store, key);
        self.restart();
    }

    /// Report whether the trailing sentinel is visible; arms or disarms
    /// the next-page trigger.
    pub fn notify_sentinel(&mut self, visible: bool) {
        self.sentinel_visible = visible;
        self.maybe_fetch_next();
    }

    /// Drain finished background fetches and apply them. Returns what
    /// changed so the host knows when to redraw.
    pub fn poll(&mut self) -> Vec<FetchEvent> {
        let events = self.fetcher.poll();
        let mut rearm = false;
        for event in &events {
            match event {
                FetchEvent::Appended { .. } => {
                    self.pager.on_settled();
                    // The window advances once the page has landed.
                    let page = self.store.get().page;
                    self.store.set_page(page + 1);
                    rearm = true;
                }
                FetchEvent::Failed(FetchKind::Append) => self.pager.on_settled(),
                FetchEvent::Replaced => rearm = true,
                FetchEvent::Failed(FetchKind::Replace) => {}
            }
        }
        if rearm {
            // On a tall, sparse viewport the sentinel may still be
            // visible after a page lands.
            self.maybe_fetch_next();
        }
        events
    }

    /// Reload the person directory used for chip names. Blocking.
    pub fn refresh_people(&mut self) -> Result<(), ApiError> {
        self.people.replace(self.client.list_people()?);
        Ok(())
    }

    /// Reload the display labels for the type facet. Blocking.
    pub fn refresh_type_labels(&mut self) -> Result<(), ApiError> {
        self.type_labels.replace(self.client.type_counts()?);
        Ok(())
    }

    fn restart(&mut self) {
        self.pager.reset();
        self.fetcher.dispatch_replace(&self.store.get());
    }

    fn maybe_fetch_next(&mut self) {
        let has_more = self.fetcher.results().has_more();
        if !self.pager.should_fetch(self.sentinel_visible, has_more) || self.fetcher.loading() {
            return;
        }
        if self.fetcher.dispatch_append(&self.store.get()) {
            self.pager.on_dispatch();
            debug!(page = self.store.get().page + 1, "requested next page");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ListingPage;
    use crate::people::{PersonRecord, TypeCount};
    use crate::results::PhotoSummary;
    use std::time::{Duration, Instant};

    fn photos(ids: std::ops::Range<i64>) -> Vec<PhotoSummary> {
        ids.map(|id| PhotoSummary {
            id,
            filename: format!("IMG_{id:04}.jpg"),
            thumbnail_url: None,
            score: None,
            taken_at: None,
            camera: None,
            is_favorite: false,
        })
        .collect()
    }

    /// Serves `pages` pages of `rows_per_page` distinct rows each.
    struct PagedListing {
        pages: u32,
        rows_per_page: i64,
    }

    impl PhotoListing for PagedListing {
        fn list_photos(
            &self,
            params: &[(&'static str, String)],
        ) -> Result<ListingPage, ApiError> {
            let page: u32 = params
                .iter()
                .find(|(key, _)| *key == "page")
                .and_then(|(_, value)| value.parse().ok())
                .unwrap_or(1);
            let rows = if page <= self.pages {
                let start = (page as i64 - 1) * self.rows_per_page;
                photos(start..start + self.rows_per_page)
            } else {
                Vec::new()
            };
            Ok(ListingPage {
                photos: rows,
                total: self.pages as u64 * self.rows_per_page as u64,
                has_more: Some(page < self.pages),
            })
        }

        fn list_people(&self) -> Result<Vec<PersonRecord>, ApiError> {
            Ok(vec![PersonRecord {
                id: 1,
                name: Some("Ada".to_string()),
            }])
        }

        fn type_counts(&self) -> Result<Vec<TypeCount>, ApiError> {
            Ok(Vec::new())
        }
    }

    /// First page succeeds, every later page fails.
    struct FlakyListing;

    impl PhotoListing for FlakyListing {
        fn list_photos(
            &self,
            params: &[(&'static str, String)],
        ) -> Result<ListingPage, ApiError> {
            let page: u32 = params
                .iter()
                .find(|(key, _)| *key == "page")
                .and_then(|(_, value)| value.parse().ok())
                .unwrap_or(1);
            if page > 1 {
                return Err(ApiError::Status(502));
            }
            Ok(ListingPage {
                photos: photos(0..2),
                total: 10,
                has_more: Some(true),
            })
        }

        fn list_people(&self) -> Result<Vec<PersonRecord>, ApiError> {
            Ok(Vec::new())
        }

        fn type_counts(&self) -> Result<Vec<TypeCount>, ApiError> {
            Ok(Vec::new())
        }
    }

    fn session_with(client: impl PhotoListing + 'static) -> BrowseSession {
        BrowseSession::new(Arc::new(client), &Config::default())
    }

    /// Poll until at least one event has arrived and nothing is in
    /// flight any more.
    fn settle(session: &mut BrowseSession) -> Vec<FetchEvent> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut all = Vec::new();
        loop {
            all.extend(session.poll());
            if !all.is_empty() && !session.loading() {
                return all;
            }
            assert!(Instant::now() < deadline, "session never settled");
            std::thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn test_refresh_loads_the_first_page() {
        let mut session = session_with(PagedListing {
            pages: 3,
            rows_per_page: 2,
        });
        assert!(session.results().is_empty());

        session.refresh();
        let events = settle(&mut session);
        assert_eq!(events, vec![FetchEvent::Replaced]);
        assert_eq!(session.results().len(), 2);
        assert_eq!(session.results().total(), 6);
        assert!(session.results().has_more());
    }

    #[test]
    fn test_infinite_scroll_until_exhausted() {
        let mut session = session_with(PagedListing {
            pages: 3,
            rows_per_page: 2,
        });
        session.refresh();
        settle(&mut session);

        // The sentinel stays visible; appends chain until the server
        // runs out of pages.
        session.notify_sentinel(true);
        settle(&mut session);

        assert_eq!(session.results().len(), 6);
        assert!(!session.results().has_more());
        assert_eq!(session.filters().page, 3);

        // Exhausted: further sentinel sightings fetch nothing.
        session.notify_sentinel(true);
        assert!(!session.loading());
    }

    #[test]
    fn test_facet_change_restarts_the_window() {
        let mut session = session_with(PagedListing {
            pages: 3,
            rows_per_page: 2,
        });
        session.refresh();
        settle(&mut session);
        session.notify_sentinel(true);
        settle(&mut session);
        session.notify_sentinel(false);
        assert!(session.filters().page > 1);

        session.set_facet(Facet::Tag, "nature");
        assert_eq!(session.filters().page, 1);
        let events = settle(&mut session);
        assert_eq!(events, vec![FetchEvent::Replaced]);
        assert_eq!(session.results().len(), 2);
    }

    #[test]
    fn test_tag_chip_round_trip() {
        let mut session = session_with(PagedListing {
            pages: 1,
            rows_per_page: 2,
        });
        assert!(session.chips().is_empty());

        session.set_facet(Facet::Tag, "nature");
        let chips = session.chips();
        assert_eq!(chips.len(), 1);
        assert_eq!(chips[0].id, "tag");
        assert_eq!(chips[0].value, "nature");

        let clear = chips[0].clear;
        session.clear_chip(&clear);
        assert!(session.chips().is_empty());
        settle(&mut session);
    }

    #[test]
    fn test_person_chips_use_the_directory() {
        let mut session = session_with(PagedListing {
            pages: 1,
            rows_per_page: 2,
        });
        session.refresh_people().unwrap();

        session.set_facet(Facet::PersonId, "1,2");
        let chips = session.chips();
        let values: Vec<&str> = chips.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, ["Ada", "#2"]);
        settle(&mut session);
    }

    #[test]
    fn test_set_sort_flips_direction_on_reselect() {
        let mut session = session_with(PagedListing {
            pages: 1,
            rows_per_page: 2,
        });

        session.set_sort("iso");
        let state = session.filters();
        assert_eq!(state.sort, "iso");
        assert_eq!(state.sort_direction, "DESC");

        session.set_sort("iso");
        assert_eq!(session.filters().sort_direction, "ASC");

        session.set_sort("score");
        assert_eq!(session.filters().sort_direction, "DESC");
        settle(&mut session);
    }

    #[test]
    fn test_failed_append_is_not_retried_automatically() {
        let mut session = session_with(FlakyListing);
        session.refresh();
        settle(&mut session);

        session.notify_sentinel(true);
        let events = settle(&mut session);
        assert_eq!(events, vec![FetchEvent::Failed(FetchKind::Append)]);
        assert!(matches!(session.last_error(), Some(ApiError::Status(502))));

        // The buffer survives the failure and no retry is dispatched.
        assert_eq!(session.results().len(), 2);
        assert_eq!(session.filters().page, 1);
        assert!(session.poll().is_empty());
        assert!(!session.loading());
    }

    #[test]
    fn test_active_filter_count_tracks_mutations() {
        let mut session = session_with(PagedListing {
            pages: 1,
            rows_per_page: 2,
        });
        assert_eq!(session.active_filter_count(), 0);

        session.set_facet(Facet::Camera, "X100V");
        session.set_facet(Facet::HideBursts, false);
        assert_eq!(session.active_filter_count(), 2);

        session.reset_filters();
        assert_eq!(session.active_filter_count(), 0);
        settle(&mut session);
    }
}
