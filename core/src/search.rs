//! Diacritic-insensitive substring search over the corpus

use crate::corpus::Corpus;
use crate::normalize::normalize;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Upper bound on materialized results per query
pub const MAX_SEARCH_RESULTS: usize = 100;

/// Minimum trimmed query length, in characters
pub const MIN_QUERY_CHARS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub text: String,
    pub chapter_id: u32,
    pub chapter_name: String,
    pub verse: u32,
    pub page: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults {
    pub query: String,
    /// Every match in the corpus, before truncation
    pub total_hits: usize,
    pub offset: usize,
    pub results: Vec<SearchResult>,
    pub elapsed_ms: u64,
}

/// Outcome of a search request.
///
/// A too-short query is not an empty result: the front-end prompts for more
/// input instead of reporting "no results".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SearchOutcome {
    TooShort { min_chars: usize },
    Results(SearchResults),
}

impl SearchOutcome {
    pub fn is_too_short(&self) -> bool {
        matches!(self, SearchOutcome::TooShort { .. })
    }

    pub fn results(&self) -> Option<&SearchResults> {
        match self {
            SearchOutcome::Results(results) => Some(results),
            SearchOutcome::TooShort { .. } => None,
        }
    }
}

/// Linear scan over pre-normalized verse texts in canonical order.
pub struct SearchEngine {
    corpus: Arc<Corpus>,
    /// `normalize(verse.text)`, parallel to `corpus.verses()`
    normalized: Vec<String>,
}

impl SearchEngine {
    pub fn new(corpus: Arc<Corpus>) -> Self {
        let normalized = corpus.verses().map(|(_, verse)| normalize(&verse.text)).collect();
        Self { corpus, normalized }
    }

    /// First `MAX_SEARCH_RESULTS` matches
    pub fn search(&self, query: &str) -> SearchOutcome {
        self.search_paged(query, 0, MAX_SEARCH_RESULTS)
    }

    /// Matches `[offset, offset + limit)` in scan order; `limit` is capped at
    /// `MAX_SEARCH_RESULTS`. `total_hits` always counts every match.
    pub fn search_paged(&self, query: &str, offset: usize, limit: usize) -> SearchOutcome {
        let start = Instant::now();
        let trimmed = query.trim();

        if trimmed.chars().count() < MIN_QUERY_CHARS {
            return SearchOutcome::TooShort { min_chars: MIN_QUERY_CHARS };
        }

        // A query made only of diacritics would otherwise match every verse
        let needle = normalize(trimmed);
        if needle.is_empty() {
            return SearchOutcome::TooShort { min_chars: MIN_QUERY_CHARS };
        }

        let limit = limit.min(MAX_SEARCH_RESULTS);
        let mut total_hits = 0;
        let mut results = Vec::with_capacity(limit.min(16));

        for ((chapter, verse), normalized) in self.corpus.verses().zip(&self.normalized) {
            if !normalized.contains(needle.as_str()) {
                continue;
            }
            if total_hits >= offset && results.len() < limit {
                results.push(SearchResult {
                    text: verse.text.clone(),
                    chapter_id: chapter.id,
                    chapter_name: chapter.name.clone(),
                    verse: verse.position,
                    page: verse.page,
                });
            }
            total_hits += 1;
        }

        let elapsed_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(query = trimmed, total_hits, returned = results.len(), elapsed_ms, "search");

        SearchOutcome::Results(SearchResults {
            query: trimmed.to_string(),
            total_hits,
            offset,
            results,
            elapsed_ms,
        })
    }
}
