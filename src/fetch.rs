//! Turns the current filter state into listing requests and owns the
//! in-flight fetch lifecycle.
//!
//! Two kinds of fetch exist. A *replace* fetch (any facet change)
//! supersedes whatever is in flight: dispatching one bumps the
//! generation counter, and results arriving for an older generation are
//! discarded instead of applied. An *append* fetch (next page) is never
//! cancelled but is refused while another append for the same
//! generation is outstanding.
//!
//! Requests run on background threads; finished outcomes travel over a
//! channel and are applied on the consumer's thread in [`ResultFetcher::poll`].

use std::sync::mpsc;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::api::{ApiError, ListingPage, PhotoListing};
use crate::filter::schema::{HIDE_FACETS, TEXT_FACETS, TOGGLE_CHIP_FACETS};
use crate::filter::state::FilterState;
use crate::results::ResultPage;

/// Appends that contribute nothing new before the list is declared
/// exhausted, whatever the server claims.
const MAX_EMPTY_APPENDS: u8 = 2;

/// Why a fetch was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// Facet change: discard the buffer and start over.
    Replace,
    /// Next page: extend the buffer.
    Append,
}

/// What [`ResultFetcher::poll`] applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchEvent {
    /// The buffer was replaced with a fresh window.
    Replaced,
    /// A next page landed; `added` counts genuinely new rows.
    Appended { added: usize },
    /// A fetch failed. The buffer is untouched and the error is
    /// readable from [`ResultFetcher::last_error`].
    Failed(FetchKind),
}

struct FetchOutcome {
    generation: u64,
    kind: FetchKind,
    result: Result<ListingPage, ApiError>,
}

/// Query parameters for the current state: every non-empty text facet
/// verbatim, the hide toggles always, the opt-in toggles only when on,
/// and the result window.
pub fn query_params(state: &FilterState) -> Vec<(&'static str, String)> {
    query_params_for_page(state, state.page)
}

fn query_params_for_page(state: &FilterState, page: u32) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    for &facet in TEXT_FACETS {
        let value = state.text(facet);
        if !value.is_empty() {
            params.push((facet.name(), value.to_string()));
        }
    }
    for &facet in HIDE_FACETS {
        params.push((facet.name(), state.flag(facet).to_string()));
    }
    for &(facet, _) in TOGGLE_CHIP_FACETS {
        if state.flag(facet) {
            params.push((facet.name(), "true".to_string()));
        }
    }
    params.push(("page", page.to_string()));
    params.push(("per_page", state.per_page.to_string()));
    params
}

/// Owns the result buffer and the in-flight request bookkeeping.
pub struct ResultFetcher {
    client: Arc<dyn PhotoListing>,
    outcome_tx: mpsc::Sender<FetchOutcome>,
    outcomes: mpsc::Receiver<FetchOutcome>,
    generation: u64,
    replace_for: Option<u64>,
    append_for: Option<u64>,
    empty_appends: u8,
    last_error: Option<ApiError>,
    page: ResultPage,
}

impl ResultFetcher {
    pub fn new(client: Arc<dyn PhotoListing>) -> Self {
        let (outcome_tx, outcomes) = mpsc::channel();
        Self {
            client,
            outcome_tx,
            outcomes,
            generation: 0,
            replace_for: None,
            append_for: None,
            empty_appends: 0,
            last_error: None,
            page: ResultPage::default(),
        }
    }

    /// The accumulated results.
    pub fn results(&self) -> &ResultPage {
        &self.page
    }

    /// Error of the most recent failed fetch, until the next dispatch.
    pub fn last_error(&self) -> Option<&ApiError> {
        self.last_error.as_ref()
    }

    /// True while a fetch for the current generation is in flight.
    pub fn loading(&self) -> bool {
        self.replace_for == Some(self.generation) || self.append_for == Some(self.generation)
    }

    /// Start a replace fetch for the state's current window. Supersedes
    /// any in-flight fetch: their results will be discarded on arrival.
    pub fn dispatch_replace(&mut self, state: &FilterState) {
        self.generation += 1;
        self.replace_for = Some(self.generation);
        self.last_error = None;
        debug!(generation = self.generation, "dispatching replace fetch");
        self.spawn(FetchKind::Replace, self.generation, query_params(state));
    }

    /// Start an append fetch for the page after the state's current one.
    /// Refused while an append for this generation is outstanding.
    pub fn dispatch_append(&mut self, state: &FilterState) -> bool {
        if self.append_for == Some(self.generation) {
            debug!("append fetch already outstanding, refused");
            return false;
        }
        self.append_for = Some(self.generation);
        let params = query_params_for_page(state, state.page + 1);
        debug!(
            generation = self.generation,
            page = state.page + 1,
            "dispatching append fetch"
        );
        self.spawn(FetchKind::Append, self.generation, params);
        true
    }

    /// Drain finished fetches and apply the ones that still match the
    /// current generation.
    pub fn poll(&mut self) -> Vec<FetchEvent> {
        let mut events = Vec::new();
        while let Ok(outcome) = self.outcomes.try_recv() {
            match outcome.kind {
                FetchKind::Replace if self.replace_for == Some(outcome.generation) => {
                    self.replace_for = None;
                }
                FetchKind::Append if self.append_for == Some(outcome.generation) => {
                    self.append_for = None;
                }
                _ => {}
            }
            if outcome.generation != self.generation {
                debug!(
                    generation = outcome.generation,
                    current = self.generation,
                    "discarding superseded fetch result"
                );
                continue;
            }
            match (outcome.kind, outcome.result) {
                (FetchKind::Replace, Ok(listing)) => {
                    let more = listing.more();
                    self.page.replace(listing.photos, listing.total, more);
                    self.empty_appends = 0;
                    events.push(FetchEvent::Replaced);
                }
                (FetchKind::Append, Ok(listing)) => {
                    let more = listing.more();
                    let added = self.page.append(listing.photos, listing.total, more);
                    if added == 0 {
                        self.empty_appends += 1;
                        if self.empty_appends >= MAX_EMPTY_APPENDS {
                            // The server keeps claiming more while
                            // returning nothing new; stop scrolling.
                            self.page.mark_exhausted();
                        }
                    } else {
                        self.empty_appends = 0;
                    }
                    events.push(FetchEvent::Appended { added });
                }
                (kind, Err(error)) => {
                    warn!(%error, ?kind, "fetch failed, keeping current results");
                    self.last_error = Some(error);
                    events.push(FetchEvent::Failed(kind));
                }
            }
        }
        events
    }

    fn spawn(&self, kind: FetchKind, generation: u64, params: Vec<(&'static str, String)>) {
        let client = Arc::clone(&self.client);
        let tx = self.outcome_tx.clone();
        std::thread::spawn(move || {
            let result = client.list_photos(&params);
            // The receiver may be gone if the engine was dropped mid-flight.
            let _ = tx.send(FetchOutcome {
                generation,
                kind,
                result,
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::schema::Facet;
    use crate::filter::state::FilterStore;
    use crate::people::{PersonRecord, TypeCount};
    use crate::results::PhotoSummary;
    use std::time::{Duration, Instant};

    fn listing(ids: &[i64], total: u64, has_more: Option<bool>) -> ListingPage {
        ListingPage {
            photos: ids
                .iter()
                .map(|&id| PhotoSummary {
                    id,
                    filename: format!("IMG_{id:04}.jpg"),
                    thumbnail_url: None,
                    score: None,
                    taken_at: None,
                    camera: None,
                    is_favorite: false,
                })
                .collect(),
            total,
            has_more,
        }
    }

    /// Serves the same fixed page for every request.
    struct StaticListing {
        page: ListingPage,
    }

    impl PhotoListing for StaticListing {
        fn list_photos(
            &self,
            _params: &[(&'static str, String)],
        ) -> Result<ListingPage, ApiError> {
            Ok(self.page.clone())
        }

        fn list_people(&self) -> Result<Vec<PersonRecord>, ApiError> {
            Ok(Vec::new())
        }

        fn type_counts(&self) -> Result<Vec<TypeCount>, ApiError> {
            Ok(Vec::new())
        }
    }

    fn fetcher_with(ids: &[i64]) -> ResultFetcher {
        ResultFetcher::new(Arc::new(StaticListing {
            page: listing(ids, ids.len() as u64, Some(true)),
        }))
    }

    fn poll_until_settled(fetcher: &mut ResultFetcher) -> Vec<FetchEvent> {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let events = fetcher.poll();
            if !events.is_empty() {
                return events;
            }
            assert!(Instant::now() < deadline, "fetch never settled");
            std::thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn test_query_params_cover_window_and_hide_toggles() {
        let state = FilterState::default();
        let params = query_params(&state);

        // Default sort facets are non-empty, so they always appear.
        assert!(params.contains(&("sort", "score".to_string())));
        assert!(params.contains(&("sort_direction", "DESC".to_string())));
        assert!(params.contains(&("hide_rejected", "true".to_string())));
        assert!(params.contains(&("page", "1".to_string())));
        assert!(params.contains(&("per_page", "60".to_string())));
        // Off opt-in toggles and empty facets are left out entirely.
        assert!(!params.iter().any(|(key, _)| *key == "favorites_only"));
        assert!(!params.iter().any(|(key, _)| *key == "tag"));
    }

    #[test]
    fn test_query_params_pass_facets_verbatim() {
        let mut store = FilterStore::new();
        store.set_many(&[
            (Facet::Tag, "nature".into()),
            (Facet::MinScore, "not a number".into()),
            (Facet::FavoritesOnly, true.into()),
            (Facet::HideBlinks, false.into()),
        ]);
        let params = query_params(&store.get());

        assert!(params.contains(&("tag", "nature".to_string())));
        // No numeric validation on range facets.
        assert!(params.contains(&("min_score", "not a number".to_string())));
        assert!(params.contains(&("favorites_only", "true".to_string())));
        // Hide toggles are meaningful even when switched off.
        assert!(params.contains(&("hide_blinks", "false".to_string())));
    }

    #[test]
    fn test_dispatch_replace_round_trip() {
        let mut fetcher = fetcher_with(&[1, 2, 3]);
        fetcher.dispatch_replace(&FilterState::default());
        assert!(fetcher.loading());

        let events = poll_until_settled(&mut fetcher);
        assert_eq!(events, vec![FetchEvent::Replaced]);
        assert!(!fetcher.loading());
        assert_eq!(fetcher.results().len(), 3);
        assert!(fetcher.results().has_more());
    }

    #[test]
    fn test_superseded_replace_is_discarded() {
        let mut fetcher = fetcher_with(&[]);
        fetcher.generation = 2;
        fetcher.replace_for = Some(2);

        // A result from generation 1 arrives after generation 2's.
        fetcher
            .outcome_tx
            .send(FetchOutcome {
                generation: 2,
                kind: FetchKind::Replace,
                result: Ok(listing(&[10, 11], 2, Some(false))),
            })
            .unwrap();
        fetcher
            .outcome_tx
            .send(FetchOutcome {
                generation: 1,
                kind: FetchKind::Replace,
                result: Ok(listing(&[99], 1, Some(true))),
            })
            .unwrap();

        let events = fetcher.poll();
        assert_eq!(events, vec![FetchEvent::Replaced]);
        let ids: Vec<i64> = fetcher.results().photos().iter().map(|p| p.id).collect();
        assert_eq!(ids, [10, 11]);
        assert!(!fetcher.results().has_more());
    }

    #[test]
    fn test_append_refused_while_outstanding() {
        let mut fetcher = fetcher_with(&[1]);
        fetcher.generation = 1;
        fetcher.append_for = Some(1);
        assert!(!fetcher.dispatch_append(&FilterState::default()));
    }

    #[test]
    fn test_stale_append_releases_guard_without_applying() {
        let mut fetcher = fetcher_with(&[]);
        fetcher.generation = 2;
        fetcher.append_for = Some(1);

        fetcher
            .outcome_tx
            .send(FetchOutcome {
                generation: 1,
                kind: FetchKind::Append,
                result: Ok(listing(&[5], 1, Some(true))),
            })
            .unwrap();

        assert!(fetcher.poll().is_empty());
        assert_eq!(fetcher.append_for, None);
        assert!(fetcher.results().is_empty());
    }

    #[test]
    fn test_failure_keeps_previous_results() {
        let mut fetcher = fetcher_with(&[]);
        fetcher.generation = 1;
        fetcher
            .outcome_tx
            .send(FetchOutcome {
                generation: 1,
                kind: FetchKind::Replace,
                result: Ok(listing(&[1, 2], 5, Some(true))),
            })
            .unwrap();
        fetcher
            .outcome_tx
            .send(FetchOutcome {
                generation: 1,
                kind: FetchKind::Append,
                result: Err(ApiError::Status(502)),
            })
            .unwrap();

        let events = fetcher.poll();
        assert_eq!(
            events,
            vec![FetchEvent::Replaced, FetchEvent::Failed(FetchKind::Append)]
        );
        assert_eq!(fetcher.results().len(), 2);
        // Errors never flip the "more" flag.
        assert!(fetcher.results().has_more());
        assert!(matches!(fetcher.last_error(), Some(ApiError::Status(502))));
    }

    #[test]
    fn test_two_empty_appends_force_exhaustion() {
        let mut fetcher = fetcher_with(&[]);
        fetcher.generation = 1;
        fetcher
            .outcome_tx
            .send(FetchOutcome {
                generation: 1,
                kind: FetchKind::Replace,
                result: Ok(listing(&[1, 2], 4, Some(true))),
            })
            .unwrap();
        // The server repeats the same rows and keeps claiming more.
        for _ in 0..2 {
            fetcher
                .outcome_tx
                .send(FetchOutcome {
                    generation: 1,
                    kind: FetchKind::Append,
                    result: Ok(listing(&[1, 2], 4, Some(true))),
                })
                .unwrap();
        }

        let events = fetcher.poll();
        assert_eq!(
            events,
            vec![
                FetchEvent::Replaced,
                FetchEvent::Appended { added: 0 },
                FetchEvent::Appended { added: 0 },
            ]
        );
        assert!(!fetcher.results().has_more());
    }

    #[test]
    fn test_new_rows_reset_the_empty_streak() {
        let mut fetcher = fetcher_with(&[]);
        fetcher.generation = 1;
        let outcomes = [
            (FetchKind::Replace, listing(&[1], 4, Some(true))),
            (FetchKind::Append, listing(&[1], 4, Some(true))),
            (FetchKind::Append, listing(&[2], 4, Some(true))),
            (FetchKind::Append, listing(&[2], 4, Some(true))),
        ];
        for (kind, page) in outcomes {
            fetcher
                .outcome_tx
                .send(FetchOutcome {
                    generation: 1,
                    kind,
                    result: Ok(page),
                })
                .unwrap();
        }

        fetcher.poll();
        // Only one empty append since the last productive one.
        assert!(fetcher.results().has_more());
        assert_eq!(fetcher.empty_appends, 1);
    }
}
