use serde::Serialize;

/// Maximum number of recent searches kept.
pub const MAX_HISTORY: usize = 5;

/// Recently searched city names, most recent first.
///
/// Entries are unique by exact string match, so "London" and "london" are two
/// entries. The list lives for one session only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SearchHistory {
    entries: Vec<String>,
}

impl SearchHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the history with `city` moved (or inserted) to the front.
    pub fn record(&self, city: &str) -> SearchHistory {
        let entries = std::iter::once(city.to_string())
            .chain(self.entries.iter().filter(|c| c.as_str() != city).cloned())
            .take(MAX_HISTORY)
            .collect();

        SearchHistory { entries }
    }

    pub fn select(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_of(cities: &[&str]) -> SearchHistory {
        cities
            .iter()
            .fold(SearchHistory::new(), |h, city| h.record(city))
    }

    #[test]
    fn starts_empty() {
        let history = SearchHistory::new();
        assert!(history.is_empty());
        assert_eq!(history.select(0), None);
    }

    #[test]
    fn most_recent_first() {
        let history = history_of(&["London", "Paris"]);
        assert_eq!(history.entries(), ["Paris", "London"]);
    }

    #[test]
    fn repeat_moves_to_front_without_duplicating() {
        let history = history_of(&["London", "London"]);
        assert_eq!(history.entries(), ["London"]);

        let history = history_of(&["London", "Paris", "Tokyo", "London"]);
        assert_eq!(history.entries(), ["London", "Tokyo", "Paris"]);
    }

    #[test]
    fn dedup_is_case_sensitive() {
        let history = history_of(&["London", "london"]);
        assert_eq!(history.entries(), ["london", "London"]);
    }

    #[test]
    fn bounded_to_five_dropping_oldest() {
        let history = history_of(&["A", "B", "C", "D", "E", "F"]);
        assert_eq!(history.len(), MAX_HISTORY);
        assert_eq!(history.entries(), ["F", "E", "D", "C", "B"]);
    }

    #[test]
    fn record_does_not_mutate_original() {
        let before = history_of(&["London"]);
        let after = before.record("Paris");

        assert_eq!(before.entries(), ["London"]);
        assert_eq!(after.select(0), Some("Paris"));
        assert_eq!(after.select(1), Some("London"));
        assert_eq!(after.select(2), None);
    }
}
