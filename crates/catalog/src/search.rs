//! Catalog search query normalization.

use crate::card::Card;

/// Normalized card-name search.
///
/// Matching is a case-insensitive substring test on the card name. An empty
/// term matches everything; results are capped at [`CatalogQuery::MAX_RESULTS`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatalogQuery {
    term: Option<String>,
}

impl CatalogQuery {
    pub const MAX_RESULTS: usize = 100;

    pub fn new(search: Option<&str>) -> Self {
        let term = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);
        Self { term }
    }

    pub fn term(&self) -> Option<&str> {
        self.term.as_deref()
    }

    /// SQL `ILIKE` pattern for the term, with LIKE metacharacters escaped.
    pub fn like_pattern(&self) -> Option<String> {
        self.term.as_ref().map(|t| {
            let escaped = t
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_");
            format!("%{escaped}%")
        })
    }

    pub fn matches(&self, card: &Card) -> bool {
        match &self.term {
            None => true,
            Some(t) => card.name.to_lowercase().contains(t.as_str()),
        }
    }

    /// Filter, order (name, set code, number) and cap an in-memory card set.
    pub fn apply<'a>(&self, cards: impl IntoIterator<Item = &'a Card>) -> Vec<Card> {
        let mut hits: Vec<Card> = cards.into_iter().filter(|c| self.matches(c)).cloned().collect();
        hits.sort_by(|a, b| {
            (a.name.as_str(), a.set_code.as_str(), a.number.as_str())
                .cmp(&(b.name.as_str(), b.set_code.as_str(), b.number.as_str()))
        });
        hits.truncate(Self::MAX_RESULTS);
        hits
    }
}
