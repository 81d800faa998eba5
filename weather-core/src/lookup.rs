//! Lookup lifecycle: `Idle -> Loading -> Success | Error`, driven by intents.

use tracing::{debug, instrument, warn};

use crate::{
    fetcher::WeatherFetcher,
    history::SearchHistory,
    model::{LookupError, WeatherQuery, WeatherResult},
};

/// Cities offered before anything has been looked up.
pub const SUGGESTED_CITIES: &[&str] = &["London", "New York", "Tokyo", "Paris", "Sydney", "Dubai"];

#[derive(Debug, Clone, Default, PartialEq)]
pub enum LookupState {
    #[default]
    Idle,
    Loading(WeatherQuery),
    Success(WeatherResult),
    Error(LookupError),
}

impl LookupState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LookupState::Loading(_))
    }

    pub fn result(&self) -> Option<&WeatherResult> {
        match self {
            LookupState::Success(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&LookupError> {
        match self {
            LookupState::Error(err) => Some(err),
            _ => None,
        }
    }
}

/// Something the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Submit(String),
    SelectHistory(usize),
    SelectSuggestion(usize),
}

/// Outcome of a `submit` transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Now `Loading`; the caller must fetch `query` and `resolve` the outcome.
    Started(WeatherQuery),
    /// Input was rejected and the state is now `Error`.
    Rejected(LookupError),
    /// A lookup is already in flight; nothing changed.
    Busy,
}

/// Owns the current [`LookupState`] and the session's [`SearchHistory`].
/// Presentation code reads both and talks back only through intents.
#[derive(Debug)]
pub struct LookupController {
    fetcher: WeatherFetcher,
    state: LookupState,
    history: SearchHistory,
}

impl LookupController {
    pub fn new(fetcher: WeatherFetcher) -> Self {
        Self {
            fetcher,
            state: LookupState::Idle,
            history: SearchHistory::new(),
        }
    }

    pub fn state(&self) -> &LookupState {
        &self.state
    }

    pub fn history(&self) -> &SearchHistory {
        &self.history
    }

    /// Suggestions are offered while there is no weather to show.
    pub fn suggestions(&self) -> &'static [&'static str] {
        match self.state {
            LookupState::Success(_) | LookupState::Loading(_) => &[],
            _ => SUGGESTED_CITIES,
        }
    }

    pub fn submit(&mut self, city: &str) -> Submission {
        if self.state.is_loading() {
            warn!(city, "Ignoring submit while a lookup is in flight");
            return Submission::Busy;
        }

        match WeatherQuery::parse(city) {
            Ok(query) => {
                debug!(city = %query, "Lookup started");
                self.state = LookupState::Loading(query.clone());
                Submission::Started(query)
            }
            Err(err) => {
                self.state = LookupState::Error(err.clone());
                Submission::Rejected(err)
            }
        }
    }

    /// Apply the outcome of the in-flight fetch. Outside `Loading` this is a no-op.
    pub fn resolve(&mut self, outcome: Result<WeatherResult, LookupError>) {
        let LookupState::Loading(query) = &self.state else {
            warn!("Dropping fetch outcome: no lookup in flight");
            return;
        };

        self.state = match outcome {
            Ok(result) => {
                self.history = self.history.record(query.as_str());
                LookupState::Success(result)
            }
            Err(err) => LookupState::Error(err),
        };
    }

    /// Pick the city an intent names and `submit` it. `None` when the intent
    /// points past the end of its list; the state is then untouched.
    pub fn begin(&mut self, intent: &Intent) -> Option<Submission> {
        let city = match intent {
            Intent::Submit(city) => city.clone(),
            Intent::SelectHistory(index) => match self.history.select(*index) {
                Some(city) => city.to_owned(),
                None => {
                    debug!(index, "No history entry at index");
                    return None;
                }
            },
            Intent::SelectSuggestion(index) => match SUGGESTED_CITIES.get(*index) {
                Some(city) => city.to_string(),
                None => {
                    debug!(index, "No suggested city at index");
                    return None;
                }
            },
        };

        Some(self.submit(&city))
    }

    /// Fetch the in-flight query and `resolve` the outcome. Outside `Loading`
    /// this is a no-op. If the future is dropped before the provider answers,
    /// the state becomes `Error` so a new submit is accepted.
    pub async fn finish(&mut self) -> &LookupState {
        let query = match &self.state {
            LookupState::Loading(query) => query.clone(),
            _ => return &self.state,
        };

        let guard = CancelGuard::new(&mut self.state);
        let outcome = self.fetcher.fetch_query(&query).await;
        guard.disarm();

        self.resolve(outcome);
        &self.state
    }

    /// `submit`, await the fetch, then `resolve`.
    #[instrument(skip(self))]
    pub async fn search(&mut self, city: &str) -> &LookupState {
        if let Submission::Started(_) = self.submit(city) {
            self.finish().await;
        }

        &self.state
    }

    /// Replay a recent search. Unknown indices leave the state untouched.
    pub async fn select_history(&mut self, index: usize) -> &LookupState {
        self.dispatch(Intent::SelectHistory(index)).await
    }

    pub async fn select_suggestion(&mut self, index: usize) -> &LookupState {
        self.dispatch(Intent::SelectSuggestion(index)).await
    }

    pub async fn dispatch(&mut self, intent: Intent) -> &LookupState {
        if let Some(Submission::Started(_)) = self.begin(&intent) {
            self.finish().await;
        }

        &self.state
    }
}

/// Armed while a fetch is awaited; a still-`Loading` state is moved to
/// `Error` when dropped armed.
struct CancelGuard<'a> {
    state: &'a mut LookupState,
    armed: bool,
}

impl<'a> CancelGuard<'a> {
    fn new(state: &'a mut LookupState) -> Self {
        Self { state, armed: true }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for CancelGuard<'_> {
    fn drop(&mut self) {
        if self.armed && self.state.is_loading() {
            warn!("Lookup cancelled before the provider answered");
            *self.state = LookupState::Error(LookupError::NetworkFailure(
                "lookup cancelled".to_string(),
            ));
        }
    }
}
