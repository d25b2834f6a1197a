/// External capability abstractions.
///
/// Each trait wraps one network dependency of the recommendation pipeline so
/// the orchestrator can be exercised against mocks. The production
/// implementations are thin reqwest clients constructed once from `Config`
/// fields; no ambient environment reads happen inside them.
use crate::{
    error::AppResult,
    models::{FilmDoc, FilmMatch, MatchQuery},
};

pub mod openai;
pub mod supabase;
pub mod tmdb;

/// Generative language capabilities: embeddings, title extraction, rationales.
///
/// All three calls share failure semantics: any transport or payload error
/// aborts the in-flight recommendation request. "Nothing extracted" is an
/// empty list, never an error.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait LanguageModel: Send + Sync {
    /// Converts the composed profile text into a fixed-dimension vector
    async fn embed_text(&self, input: &str) -> AppResult<Vec<f32>>;

    /// Pulls literal movie titles mentioned in free text
    async fn extract_movie_titles(&self, input: &str) -> AppResult<Vec<String>>;

    /// Writes a short rationale for one candidate, given its stored
    /// description and the profile text
    async fn write_rationale(&self, context: &str, input: &str) -> AppResult<String>;
}

/// The film catalog and its vector-similarity search
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait FilmIndex: Send + Sync {
    /// The full catalog listing (id, stored description, metadata),
    /// scanned in memory for title and synopsis lookups
    async fn list_films(&self) -> AppResult<Vec<FilmDoc>>;

    /// Unique non-null collection ids for the given films, used to extend
    /// exclusions to franchise siblings
    async fn collection_ids(&self, film_ids: &[i64]) -> AppResult<Vec<i64>>;

    /// One similarity search blended with coefficient boosts; an empty
    /// result is a valid outcome
    async fn match_films(&self, query: &MatchQuery) -> AppResult<Vec<FilmMatch>>;
}

/// Poster art lookup by movie title
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PosterSource: Send + Sync {
    async fn poster_url(&self, title: &str) -> AppResult<String>;
}
