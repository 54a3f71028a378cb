//! Filename-to-record matching.
//!
//! The index is built once per run from the store's records in ascending id
//! order. Lookup priority:
//! 1. exact equality between the cleaned filename and a record's key
//! 2. containment in either direction
//!
//! Within each tier the lowest id wins. The heuristic is not symmetric and
//! not transitive: two files can land on the same record, and a short key
//! like "up" is contained in many filenames.

use rustc_hash::FxHashMap;
use strsim::jaro_winkler;

use crate::models::MovieRecord;
use crate::normalize::{clean_title, comparison_key};

/// Index mapping a comparison key to the position of its first record
pub type ExactIndex = FxHashMap<String, usize>;

pub struct TitleIndex {
    movies: Vec<MovieRecord>,
    keys: Vec<String>,
    exact: ExactIndex,
}

/// How a record was found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    Containment,
}

impl TitleIndex {
    pub fn new(mut movies: Vec<MovieRecord>) -> Self {
        movies.sort_by_key(|m| m.id);
        let keys: Vec<String> = movies.iter().map(|m| comparison_key(&m.title)).collect();

        let mut exact = ExactIndex::default();
        for (idx, key) in keys.iter().enumerate() {
            if !key.is_empty() {
                exact.entry(key.clone()).or_insert(idx);
            }
        }

        Self {
            movies,
            keys,
            exact,
        }
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    /// Find the record for a filename stem (extension already removed).
    pub fn find(&self, stem: &str) -> Option<(&MovieRecord, MatchKind)> {
        let cleaned = clean_title(stem);
        self.find_cleaned(&cleaned)
    }

    fn find_cleaned(&self, cleaned: &str) -> Option<(&MovieRecord, MatchKind)> {
        if cleaned.is_empty() {
            return None;
        }

        if let Some(&idx) = self.exact.get(cleaned) {
            return Some((&self.movies[idx], MatchKind::Exact));
        }

        self.keys
            .iter()
            .position(|key| !key.is_empty() && (key.contains(cleaned) || cleaned.contains(key.as_str())))
            .map(|idx| (&self.movies[idx], MatchKind::Containment))
    }
}

/// Order suggested titles by similarity to the normalized filename,
/// most similar first. Ties keep store order.
pub fn rank_suggestions(query: &str, movies: Vec<MovieRecord>) -> Vec<String> {
    let mut scored: Vec<(f64, String)> = movies
        .into_iter()
        .map(|m| {
            let score = jaro_winkler(query, &m.title.to_lowercase());
            (score, m.title)
        })
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.into_iter().map(|(_, title)| title).collect()
}
