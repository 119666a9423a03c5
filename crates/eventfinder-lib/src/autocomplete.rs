//! Debounced autocomplete for the keyword and location inputs.
//!
//! Time is passed in explicitly so the debounce window and the ordering of
//! overlapping responses can be driven deterministically. A caller types with
//! [`Autocomplete::input`], asks for due work with [`Autocomplete::poll`], runs
//! the request however it likes and reports back through
//! [`Autocomplete::complete`].

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::Result;
use crate::geocode::{Geocoder, LocationSuggestion};
use crate::search::SearchBackend;

/// Quiet period after the last keystroke before a request is issued.
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(250);

/// Inputs shorter than this (after trimming) never hit the network.
pub const MIN_QUERY_CHARS: usize = 2;

/// Holds the latest value until it has been left alone for `delay`.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Replace the pending value and restart the timer.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    /// Take the pending value once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, deadline)) if now >= *deadline => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEBOUNCE_DELAY)
    }
}

/// Which response is allowed to overwrite the suggestion list when requests
/// overlap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StaleResponsePolicy {
    /// Whatever arrives last replaces the list, even for a superseded query.
    #[default]
    LastArrivalWins,
    /// Only the response to the most recently issued request is applied.
    LatestRequestWins,
}

/// A request released by the debouncer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionRequest {
    pub seq: u64,
    pub query: String,
}

/// Remote lookup backing one autocomplete input.
pub trait SuggestionSource {
    type Item: Clone;

    fn fetch(&self, query: &str) -> Result<Vec<Self::Item>>;
}

/// Candidate event titles from the search index.
#[derive(Debug)]
pub struct KeywordSuggestions<'a, B: SearchBackend> {
    backend: &'a B,
}

impl<'a, B: SearchBackend> KeywordSuggestions<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }
}

impl<B: SearchBackend> SuggestionSource for KeywordSuggestions<'_, B> {
    type Item = String;

    fn fetch(&self, query: &str) -> Result<Vec<String>> {
        self.backend.keyword_suggestions(query)
    }
}

/// Place candidates from the geocoder.
#[derive(Debug)]
pub struct LocationSuggestions<'a, G: Geocoder> {
    geocoder: &'a G,
}

impl<'a, G: Geocoder> LocationSuggestions<'a, G> {
    pub fn new(geocoder: &'a G) -> Self {
        Self { geocoder }
    }
}

impl<G: Geocoder> SuggestionSource for LocationSuggestions<'_, G> {
    type Item = LocationSuggestion;

    fn fetch(&self, query: &str) -> Result<Vec<LocationSuggestion>> {
        self.geocoder.suggest(query)
    }
}

/// Suggestion list for one input box.
#[derive(Debug, Clone)]
pub struct Autocomplete<T> {
    debouncer: Debouncer<String>,
    policy: StaleResponsePolicy,
    enabled: bool,
    issued: u64,
    suggestions: Vec<T>,
}

impl<T: Clone> Default for Autocomplete<T> {
    fn default() -> Self {
        Self::new(StaleResponsePolicy::default())
    }
}

impl<T: Clone> Autocomplete<T> {
    pub fn new(policy: StaleResponsePolicy) -> Self {
        Self {
            debouncer: Debouncer::default(),
            policy,
            enabled: true,
            issued: 0,
            suggestions: Vec::new(),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.debouncer = Debouncer::new(delay);
        self
    }

    pub fn policy(&self) -> StaleResponsePolicy {
        self.policy
    }

    pub fn suggestions(&self) -> &[T] {
        &self.suggestions
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Gate requests (input focus, or suppression right after a pick).
    /// Disabling drops any pending request and the current list.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.clear();
        }
    }

    pub fn clear(&mut self) {
        self.debouncer.cancel();
        self.suggestions.clear();
    }

    /// Record a keystroke.
    pub fn input(&mut self, text: &str, now: Instant) {
        let query = text.trim();
        if !self.enabled || query.chars().count() < MIN_QUERY_CHARS {
            self.clear();
            return;
        }
        self.debouncer.push(query.to_string(), now);
    }

    /// Release the debounced query once the quiet period has passed.
    pub fn poll(&mut self, now: Instant) -> Option<SuggestionRequest> {
        if !self.enabled {
            return None;
        }
        let query = self.debouncer.poll(now)?;
        self.issued += 1;
        debug!(seq = self.issued, query = %query, "suggestion request due");
        Some(SuggestionRequest {
            seq: self.issued,
            query,
        })
    }

    /// Apply a response. Returns whether the list was replaced.
    pub fn complete(&mut self, request: &SuggestionRequest, result: Result<Vec<T>>) -> bool {
        if self.policy == StaleResponsePolicy::LatestRequestWins && request.seq != self.issued {
            debug!(seq = request.seq, latest = self.issued, "dropping stale suggestions");
            return false;
        }
        if !self.enabled {
            return false;
        }

        self.suggestions = match result {
            Ok(items) => items,
            Err(err) => {
                warn!(query = %request.query, error = %err, "suggestion lookup failed");
                Vec::new()
            }
        };
        true
    }

    /// Poll and, if a request is due, run it against `source` immediately.
    pub fn fetch_due<S>(&mut self, now: Instant, source: &S) -> bool
    where
        S: SuggestionSource<Item = T>,
    {
        match self.poll(now) {
            Some(request) => {
                let result = source.fetch(&request.query);
                self.complete(&request, result)
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::cell::RefCell;

    struct Echo {
        calls: RefCell<Vec<String>>,
    }

    impl SuggestionSource for Echo {
        type Item = String;

        fn fetch(&self, query: &str) -> Result<Vec<String>> {
            self.calls.borrow_mut().push(query.to_string());
            Ok(vec![format!("{query}!")])
        }
    }

    fn echo() -> Echo {
        Echo {
            calls: RefCell::new(Vec::new()),
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn debouncer_waits_for_quiet_period() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(ms(250));
        debouncer.push("a", t0);
        debouncer.push("ab", t0 + ms(100));
        assert_eq!(debouncer.poll(t0 + ms(300)), None);
        assert_eq!(debouncer.poll(t0 + ms(350)), Some("ab"));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn short_input_clears_without_request() {
        let t0 = Instant::now();
        let source = echo();
        let mut ac = Autocomplete::default();
        ac.input("man", t0);
        assert!(ac.fetch_due(t0 + ms(250), &source));
        assert_eq!(ac.suggestions(), ["man!".to_string()]);

        ac.input(" m ", t0 + ms(400));
        assert!(ac.suggestions().is_empty());
        assert!(!ac.fetch_due(t0 + ms(1000), &source));
        assert_eq!(source.calls.borrow().len(), 1);
    }

    #[test]
    fn rapid_typing_issues_one_request() {
        let t0 = Instant::now();
        let source = echo();
        let mut ac = Autocomplete::default();
        for (i, text) in ["le", "lee", "leed", "leeds"].iter().enumerate() {
            ac.input(text, t0 + ms(50 * i as u64));
            assert!(!ac.fetch_due(t0 + ms(50 * i as u64 + 10), &source));
        }
        assert!(ac.fetch_due(t0 + ms(150 + 250), &source));
        assert_eq!(*source.calls.borrow(), vec!["leeds".to_string()]);
    }

    #[test]
    fn late_response_overwrites_by_default() {
        let t0 = Instant::now();
        let mut ac: Autocomplete<String> = Autocomplete::default();
        ac.input("le", t0);
        let first = ac.poll(t0 + ms(250)).unwrap();
        ac.input("leeds", t0 + ms(300));
        let second = ac.poll(t0 + ms(550)).unwrap();

        assert!(ac.complete(&second, Ok(vec!["Leeds".to_string()])));
        assert!(ac.complete(&first, Ok(vec!["Leicester".to_string()])));
        assert_eq!(ac.suggestions(), ["Leicester".to_string()]);
    }

    #[test]
    fn latest_request_policy_drops_stale_response() {
        let t0 = Instant::now();
        let mut ac: Autocomplete<String> =
            Autocomplete::new(StaleResponsePolicy::LatestRequestWins);
        ac.input("le", t0);
        let first = ac.poll(t0 + ms(250)).unwrap();
        ac.input("leeds", t0 + ms(300));
        let second = ac.poll(t0 + ms(550)).unwrap();

        assert!(ac.complete(&second, Ok(vec!["Leeds".to_string()])));
        assert!(!ac.complete(&first, Ok(vec!["Leicester".to_string()])));
        assert_eq!(ac.suggestions(), ["Leeds".to_string()]);
    }

    #[test]
    fn failure_yields_empty_list() {
        let t0 = Instant::now();
        let mut ac: Autocomplete<String> = Autocomplete::default();
        ac.input("york", t0);
        let request = ac.poll(t0 + ms(250)).unwrap();
        ac.complete(&request, Ok(vec!["York".to_string()]));
        ac.input("yorks", t0 + ms(300));
        let request = ac.poll(t0 + ms(550)).unwrap();
        ac.complete(
            &request,
            Err(Error::UnexpectedResponse {
                service: "test",
                message: "boom".to_string(),
            }),
        );
        assert!(ac.suggestions().is_empty());
    }

    #[test]
    fn disabled_input_never_requests() {
        let t0 = Instant::now();
        let source = echo();
        let mut ac = Autocomplete::default();
        ac.set_enabled(false);
        ac.input("leeds", t0);
        assert!(!ac.fetch_due(t0 + ms(500), &source));
        assert!(source.calls.borrow().is_empty());
    }
}
