/// Title matching policies for catalog lookups.
///
/// Three tiers, applied in order: exact equality, containment either
/// direction, token-overlap scoring. Each tier is its own function so the
/// precedence and thresholds stay auditable.
use crate::models::FilmDoc;

/// Tuning constants for the fuzzy tier. The values are carried over from the
/// catalog's observed behavior; they are named here rather than inlined so
/// they can be adjusted in one place.
#[derive(Debug, Clone, Copy)]
pub struct MatchPolicy {
    /// Minimum token-overlap score for a fuzzy match to be accepted
    pub min_token_overlap: f32,
    /// Words at or below this length are ignored when scoring
    pub min_token_len: usize,
}

pub const DEFAULT_POLICY: MatchPolicy = MatchPolicy {
    min_token_overlap: 0.5,
    min_token_len: 2,
};

/// Case-insensitive equality after trimming
pub fn exact_match(query: &str, title: &str) -> bool {
    query.trim().to_lowercase() == title.trim().to_lowercase()
}

/// Case-insensitive containment, either direction.
///
/// Deliberately permissive: short or ambiguous titles can produce false
/// positives, which the exclusion use case accepts.
pub fn containment_match(query: &str, title: &str) -> bool {
    let query = query.trim().to_lowercase();
    let title = title.trim().to_lowercase();
    if query.is_empty() || title.is_empty() {
        return false;
    }
    title.contains(&query) || query.contains(&title)
}

/// Fraction of query words that share a substring relationship with some
/// title word. Words at or below `min_token_len` characters are ignored.
pub fn token_overlap_score(query: &str, title: &str, policy: &MatchPolicy) -> f32 {
    let query_words: Vec<&str> = tokens(query, policy);
    let title_words: Vec<&str> = tokens(title, policy);

    let matched = query_words
        .iter()
        .filter(|query_word| {
            title_words
                .iter()
                .any(|title_word| title_word.contains(*query_word) || query_word.contains(title_word))
        })
        .count();

    matched as f32 / query_words.len().max(1) as f32
}

fn tokens<'a>(text: &'a str, policy: &MatchPolicy) -> Vec<&'a str> {
    text.split_whitespace()
        .filter(|word| word.len() > policy.min_token_len)
        .collect()
}

/// Finds the best-matching catalog film for a title query.
///
/// Tiers are exhausted in order; the fuzzy tier returns the best-scoring
/// candidate only when its score clears `policy.min_token_overlap`. Films
/// without a usable title are skipped. `None` is a valid no-match outcome.
pub fn find_best_match<'a>(
    films: &'a [FilmDoc],
    query: &str,
    policy: &MatchPolicy,
) -> Option<&'a FilmDoc> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return None;
    }

    let titled: Vec<(&FilmDoc, String)> = films
        .iter()
        .filter_map(|film| {
            let title = film.metadata.as_ref()?.title.trim().to_lowercase();
            if title.is_empty() {
                None
            } else {
                Some((film, title))
            }
        })
        .collect();

    if let Some((film, _)) = titled.iter().find(|(_, title)| *title == query) {
        return Some(*film);
    }

    if let Some((film, _)) = titled
        .iter()
        .find(|(_, title)| title.contains(&query) || query.contains(title.as_str()))
    {
        return Some(*film);
    }

    let mut best: Option<&FilmDoc> = None;
    let mut best_score = 0.0f32;
    for (film, title) in &titled {
        let score = token_overlap_score(&query, title, policy);
        if score > best_score && score >= policy.min_token_overlap {
            best_score = score;
            best = Some(*film);
        }
    }

    best
}

/// Catalog ids whose title has a two-way containment relationship with any
/// of the extracted mention titles. Zero matches is a valid empty result.
pub fn exclusion_ids(films: &[FilmDoc], titles: &[String]) -> Vec<i64> {
    films
        .iter()
        .filter(|film| {
            let film_title = film
                .metadata
                .as_ref()
                .map(|metadata| metadata.title.as_str())
                .unwrap_or("");
            titles
                .iter()
                .any(|title| containment_match(title, film_title))
        })
        .map(|film| film.id)
        .collect()
}
