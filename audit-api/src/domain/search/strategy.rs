//! Picks how a search is executed.

use super::parser::compile;
use super::types::QueryCondition;

/// One of the mutually exclusive ways to run a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchStrategy {
    /// Blank query: list everything in the date range, newest first.
    Unfiltered,
    /// `search_vector @@ to_tsquery(..)` with a relevance rank.
    FullText(String),
    /// Per-column `ILIKE` filters.
    Columns(Vec<QueryCondition>),
    /// The query compiled to nothing; the result is empty.
    Empty,
}

impl SearchStrategy {
    pub fn select(query: &str) -> Self {
        if query.trim().is_empty() {
            return SearchStrategy::Unfiltered;
        }

        let compiled = compile(query);
        if compiled.is_column_specific && !compiled.conditions.is_empty() {
            SearchStrategy::Columns(compiled.conditions)
        } else if !compiled.full_text.is_empty() {
            SearchStrategy::FullText(compiled.full_text)
        } else {
            SearchStrategy::Empty
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SearchStrategy::Unfiltered => "unfiltered",
            SearchStrategy::FullText(_) => "full_text",
            SearchStrategy::Columns(_) => "columns",
            SearchStrategy::Empty => "empty",
        }
    }
}
