//! Debounced search-as-you-type.
//!
//! Each call to [`SearchSession::submit`] starts a new *generation*. The
//! search for a generation is only sent after the debounce interval has
//! passed without another submission, and its results are only published
//! while it is still the current generation. Superseded tasks are
//! aborted, so a slow response for an old query can never replace the
//! results of a newer one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::{GeocodedPlace, Geocoder};

/// Input inactivity required before a search is sent.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// What a search session is currently showing.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchState {
    /// Nothing has been searched, the query was cleared, or the search
    /// was cancelled.
    Idle,
    /// Waiting for the debounce interval or the provider.
    Pending {
        /// Generation of the pending search.
        generation: u64,
        /// The submitted query.
        query: String,
    },
    /// Results for the latest query.
    Ready {
        /// Generation that produced these results.
        generation: u64,
        /// The query that was searched.
        query: String,
        /// Places found, possibly none.
        places: Vec<GeocodedPlace>,
    },
    /// The latest search failed.
    Failed {
        /// Generation of the failed search.
        generation: u64,
        /// The query that was searched.
        query: String,
        /// Human-readable failure.
        message: String,
    },
}

impl SearchState {
    /// Generation this state belongs to, if any.
    #[must_use]
    pub const fn generation(&self) -> Option<u64> {
        match self {
            Self::Idle => None,
            Self::Pending { generation, .. }
            | Self::Ready { generation, .. }
            | Self::Failed { generation, .. } => Some(*generation),
        }
    }

    /// Whether no search is outstanding.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        !matches!(self, Self::Pending { .. })
    }
}

/// Reads the debounce interval from `MARKETPLACE_SEARCH_DEBOUNCE_MS`,
/// falling back to [`DEFAULT_DEBOUNCE`].
#[must_use]
pub fn debounce_from_env() -> Duration {
    std::env::var("MARKETPLACE_SEARCH_DEBOUNCE_MS")
        .ok()
        .and_then(|ms| ms.trim().parse().ok())
        .map_or(DEFAULT_DEBOUNCE, Duration::from_millis)
}

/// A debounced, last-request-wins search over a [`Geocoder`].
pub struct SearchSession<G: Geocoder + 'static> {
    geocoder: Arc<G>,
    debounce: Duration,
    generation: Arc<AtomicU64>,
    state: Arc<watch::Sender<SearchState>>,
    in_flight: Mutex<Option<JoinHandle<()>>>,
}

impl<G: Geocoder + 'static> SearchSession<G> {
    /// Creates an idle session.
    #[must_use]
    pub fn new(geocoder: Arc<G>, debounce: Duration) -> Self {
        let (state, _) = watch::channel(SearchState::Idle);
        Self {
            geocoder,
            debounce,
            generation: Arc::new(AtomicU64::new(0)),
            state: Arc::new(state),
            in_flight: Mutex::new(None),
        }
    }

    /// Submits a query, superseding any earlier one, and returns its
    /// generation.
    ///
    /// A blank query clears the results without contacting the provider.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn submit(&self, query: impl Into<String>) -> u64 {
        let query = query.into();
        let blank = query.trim().is_empty();

        let mut generation = 0;
        self.state.send_modify(|state| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *state = if blank {
                SearchState::Idle
            } else {
                SearchState::Pending {
                    generation,
                    query: query.clone(),
                }
            };
        });

        if blank {
            self.replace_in_flight(None);
            return generation;
        }

        let geocoder = Arc::clone(&self.geocoder);
        let current = Arc::clone(&self.generation);
        let state = Arc::clone(&self.state);
        let debounce = self.debounce;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if current.load(Ordering::SeqCst) != generation {
                return;
            }

            log::debug!("Searching {query:?} (generation {generation})");
            let next = match geocoder.search(&query).await {
                Ok(places) => SearchState::Ready {
                    generation,
                    query,
                    places,
                },
                Err(e) => {
                    log::warn!("Search for {query:?} failed: {e}");
                    SearchState::Failed {
                        generation,
                        query,
                        message: e.to_string(),
                    }
                }
            };

            let published = state.send_if_modified(|state| {
                if current.load(Ordering::SeqCst) != generation {
                    return false;
                }
                *state = next;
                true
            });

            if !published {
                log::debug!("Discarded stale results for generation {generation}");
            }
        });

        self.replace_in_flight(Some(handle));
        generation
    }

    /// Cancels any outstanding search and returns to [`SearchState::Idle`].
    pub fn cancel(&self) {
        self.state.send_modify(|state| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            *state = SearchState::Idle;
        });
        self.replace_in_flight(None);
    }

    /// Returns a snapshot of the current state.
    #[must_use]
    pub fn current(&self) -> SearchState {
        self.state.borrow().clone()
    }

    /// Returns a receiver notified on every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    /// Waits until the latest submission has settled and returns its
    /// state.
    pub async fn wait_settled(&self) -> SearchState {
        let mut rx = self.subscribe();
        rx.wait_for(SearchState::is_settled)
            .await
            .map_or(SearchState::Idle, |state| state.clone())
    }

    fn replace_in_flight(&self, handle: Option<JoinHandle<()>>) {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = std::mem::replace(&mut *in_flight, handle) {
            previous.abort();
        }
    }
}

impl<G: Geocoder + 'static> Drop for SearchSession<G> {
    fn drop(&mut self) {
        self.replace_in_flight(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GeocodeError;
    use async_trait::async_trait;
    use marketplace_address_models::Coordinates;

    /// Queries starting with "slow" take 5 seconds; "fail" errors.
    #[derive(Default)]
    struct FakeGeocoder {
        calls: Mutex<Vec<String>>,
    }

    impl FakeGeocoder {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Geocoder for FakeGeocoder {
        async fn search(&self, query: &str) -> Result<Vec<GeocodedPlace>, GeocodeError> {
            self.calls.lock().unwrap().push(query.to_string());
            if query.starts_with("slow") {
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
            if query == "fail" {
                return Err(GeocodeError::RateLimited);
            }
            Ok(vec![GeocodedPlace {
                display_name: format!("{query}, Goiânia, Goiás, Brasil"),
                coordinates: Coordinates::new(-16.68, -49.25),
            }])
        }

        async fn reverse(
            &self,
            _coordinates: Coordinates,
        ) -> Result<Option<GeocodedPlace>, GeocodeError> {
            Ok(None)
        }
    }

    fn session() -> (Arc<FakeGeocoder>, SearchSession<FakeGeocoder>) {
        let geocoder = Arc::new(FakeGeocoder::default());
        let session = SearchSession::new(Arc::clone(&geocoder), DEFAULT_DEBOUNCE);
        (geocoder, session)
    }

    #[tokio::test(start_paused = true)]
    async fn only_last_submission_in_debounce_window_is_sent() {
        let (geocoder, session) = session();

        session.submit("rua");
        tokio::time::sleep(Duration::from_millis(100)).await;
        let last = session.submit("rua 10");

        let state = session.wait_settled().await;
        assert_eq!(state.generation(), Some(last));
        assert!(matches!(state, SearchState::Ready { ref query, .. } if query == "rua 10"));
        assert_eq!(geocoder.calls(), vec!["rua 10".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_superseded_search_is_never_published() {
        let (geocoder, session) = session();

        session.submit("slow query");
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(geocoder.calls(), vec!["slow query".to_string()]);

        let last = session.submit("fast query");
        let state = session.wait_settled().await;
        assert_eq!(state.generation(), Some(last));
        assert!(matches!(state, SearchState::Ready { ref query, .. } if query == "fast query"));

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(session.current(), state);
    }

    #[tokio::test(start_paused = true)]
    async fn pending_until_debounce_elapses() {
        let (geocoder, session) = session();

        let generation = session.submit("goiânia");
        assert_eq!(
            session.current(),
            SearchState::Pending {
                generation,
                query: "goiânia".to_string()
            }
        );
        assert!(geocoder.calls().is_empty());

        let state = session.wait_settled().await;
        match state {
            SearchState::Ready { places, .. } => assert_eq!(places.len(), 1),
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn blank_query_clears_without_searching() {
        let (geocoder, session) = session();

        session.submit("rua");
        session.submit("   ");
        assert_eq!(session.current(), SearchState::Idle);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(geocoder.calls().is_empty());
        assert_eq!(session.current(), SearchState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_is_published() {
        let (_geocoder, session) = session();

        session.submit("fail");
        let state = session.wait_settled().await;
        assert!(matches!(
            state,
            SearchState::Failed { ref message, .. } if message == "Rate limit exceeded"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_discards_outstanding_search() {
        let (geocoder, session) = session();

        session.submit("rua");
        session.cancel();

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(geocoder.calls().is_empty());
        assert_eq!(session.current(), SearchState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_session_aborts_search() {
        let (geocoder, session) = session();

        session.submit("rua");
        drop(session);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(geocoder.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn generations_increase() {
        let (_geocoder, session) = session();

        let first = session.submit("a");
        let second = session.submit("b");
        assert!(second > first);
    }
}
