//! # Ranked Search
//!
//! Deterministic substring ranking shared by contacts and persons.
//!
//! Each entity exposes its name-like fields; those are joined into a lowercase
//! search string and scored against the lowercased query:
//!
//! | match                               | score |
//! |-------------------------------------|-------|
//! | empty query                         | 1     |
//! | query starts the search string      | 100   |
//! | query starts a later word           | 10    |
//! | query appears anywhere else         | 1     |
//! | no occurrence                       | 0     |
//!
//! Zero-scored entities are dropped; the rest sort by descending score and
//! then by the entity's natural ordering.

use std::cmp::Ordering;

/// Score for a match at the very start of the search string.
pub const PREFIX_SCORE: u32 = 100;
/// Score for a match right after a space.
pub const WORD_START_SCORE: u32 = 10;
/// Score for any other occurrence, and for the empty query.
pub const SUBSTRING_SCORE: u32 = 1;

/// An entity that can be ranked by [`rank`].
pub trait Searchable {
    /// Name-like fields in search order (nickname, given name, family name).
    fn search_fields(&self) -> Vec<&str>;

    /// Tie-breaking order among equally scored entities.
    fn natural_order(&self, other: &Self) -> Ordering;

    /// Lowercase search string: non-empty fields joined by single spaces.
    fn search_string(&self) -> String {
        self.search_fields()
            .into_iter()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }
}

/// Score `search_string` (already lowercase) against `query`.
pub fn score(search_string: &str, query: &str) -> u32 {
    let query = query.to_lowercase();
    if query.is_empty() {
        return SUBSTRING_SCORE;
    }
    if search_string.starts_with(&query) {
        PREFIX_SCORE
    } else if search_string.contains(&format!(" {query}")) {
        WORD_START_SCORE
    } else if search_string.contains(&query) {
        SUBSTRING_SCORE
    } else {
        0
    }
}

/// Filter and rank `items` against `query`.
pub fn rank<T>(items: &[T], query: &str) -> Vec<T>
where
    T: Searchable + Clone,
{
    let mut scored: Vec<(u32, &T)> = items
        .iter()
        .map(|item| (score(&item.search_string(), query), item))
        .filter(|(s, _)| *s > 0)
        .collect();

    scored.sort_by(|(sa, a), (sb, b)| sb.cmp(sa).then_with(|| a.natural_order(b)));
    scored.into_iter().map(|(_, item)| item.clone()).collect()
}
