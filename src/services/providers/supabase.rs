/// Supabase (PostgREST) film catalog provider
///
/// The catalog is read over Supabase's REST interface rather than a direct
/// SQL connection. Three operations:
/// 1. Listing: `GET /rest/v1/films` — the full catalog, scanned in memory
///    for title and synopsis matching (the dataset is a few thousand rows).
/// 2. Franchise lookup: `GET /rest/v1/films?select=collection_id&id=in.(…)`.
/// 3. Similarity search: `POST /rest/v1/rpc/match_films_v2` — cosine
///    similarity with coefficient blending computed store-side.
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{FilmDoc, FilmMatch, MatchQuery},
    services::providers::FilmIndex,
};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

const FILMS_CACHE_TTL: u64 = 3600; // 1 hour

/// Ranking policy constants. Fixed, not user-configurable: similarity must
/// clear the threshold, at most four candidates are returned, and the
/// coefficient weight keeps semantic similarity dominant so the mood/era
/// agreement only nudges close calls.
const MATCH_THRESHOLD: f32 = 0.3;
const MATCH_COUNT: usize = 4;
const COEFFICIENT_WEIGHT: f32 = 0.05;

const MATCH_RPC: &str = "match_films_v2";
const FILMS_LIMIT: &str = "5000";

#[derive(Clone)]
pub struct SupabaseFilmIndex {
    http_client: HttpClient,
    cache: Cache,
    base_url: String,
    api_key: String,
}

/// RPC parameters for the similarity search. Empty exclusion lists are sent
/// as explicit nulls, which the stored procedure treats as "exclude nothing".
#[derive(Serialize)]
struct MatchRpcParams<'a> {
    query_embedding: &'a [f32],
    match_threshold: f32,
    match_count: usize,
    exclude_ids: Option<&'a [i64]>,
    exclude_collection_ids: Option<&'a [i64]>,
    pref_era_new: f32,
    pref_era_classic: f32,
    pref_mood_fun: f32,
    pref_mood_serious: f32,
    pref_mood_inspiring: f32,
    pref_mood_scary: f32,
    coefficient_weight: f32,
}

#[derive(Deserialize)]
struct CollectionRow {
    collection_id: Option<i64>,
}

impl SupabaseFilmIndex {
    pub fn new(cache: Cache, base_url: String, api_key: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            cache,
            base_url,
            api_key,
        }
    }

    fn films_url(&self) -> String {
        format!("{}/rest/v1/films", self.base_url)
    }

    async fn check_status(response: reqwest::Response) -> AppResult<reqwest::Response> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Supabase returned status {}: {}",
                status, body
            )));
        }
        Ok(response)
    }
}

#[async_trait::async_trait]
impl FilmIndex for SupabaseFilmIndex {
    async fn list_films(&self) -> AppResult<Vec<FilmDoc>> {
        cached!(
            self.cache,
            CacheKey::Films,
            FILMS_CACHE_TTL,
            async move {
                let response = self
                    .http_client
                    .get(self.films_url())
                    .header("apikey", &self.api_key)
                    .bearer_auth(&self.api_key)
                    .query(&[("select", "id,content,metadata"), ("limit", FILMS_LIMIT)])
                    .send()
                    .await?;

                let response = Self::check_status(response).await?;
                let films: Vec<FilmDoc> = response.json().await?;

                tracing::info!(films = films.len(), "Film catalog fetched");

                Ok::<_, AppError>(films)
            }
        )
    }

    async fn collection_ids(&self, film_ids: &[i64]) -> AppResult<Vec<i64>> {
        if film_ids.is_empty() {
            return Ok(Vec::new());
        }

        let id_list = film_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");

        let id_filter = format!("in.({})", id_list);

        let response = self
            .http_client
            .get(self.films_url())
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .query(&[("select", "collection_id"), ("id", id_filter.as_str())])
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        let rows: Vec<CollectionRow> = response.json().await?;

        let mut collection_ids = Vec::new();
        for row in rows {
            if let Some(id) = row.collection_id {
                if !collection_ids.contains(&id) {
                    collection_ids.push(id);
                }
            }
        }

        tracing::debug!(
            films = film_ids.len(),
            collections = collection_ids.len(),
            "Collection ids resolved"
        );

        Ok(collection_ids)
    }

    async fn match_films(&self, query: &MatchQuery) -> AppResult<Vec<FilmMatch>> {
        let url = format!("{}/rest/v1/rpc/{}", self.base_url, MATCH_RPC);

        let params = MatchRpcParams {
            query_embedding: &query.embedding,
            match_threshold: MATCH_THRESHOLD,
            match_count: MATCH_COUNT,
            exclude_ids: if query.exclude_ids.is_empty() {
                None
            } else {
                Some(&query.exclude_ids)
            },
            exclude_collection_ids: if query.exclude_collection_ids.is_empty() {
                None
            } else {
                Some(&query.exclude_collection_ids)
            },
            pref_era_new: query.preferences.era_new,
            pref_era_classic: query.preferences.era_classic,
            pref_mood_fun: query.preferences.mood_fun,
            pref_mood_serious: query.preferences.mood_serious,
            pref_mood_inspiring: query.preferences.mood_inspiring,
            pref_mood_scary: query.preferences.mood_scary,
            coefficient_weight: COEFFICIENT_WEIGHT,
        };

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=representation")
            .json(&params)
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        let mut matches: Vec<FilmMatch> = response.json().await?;

        // The stored procedure already orders and caps; truncate anyway in
        // case its count parameter is ever ignored
        matches.truncate(MATCH_COUNT);

        tracing::info!(
            matches = matches.len(),
            excluded = query.exclude_ids.len(),
            "Similarity search completed"
        );

        Ok(matches)
    }
}
