/// TMDB poster provider
///
/// Resolves a poster URL for a movie title in two hops: title search for the
/// first matching TMDB id, then the image set for that id, taking the first
/// poster path. The composed URL uses the "original" size segment. Resolved
/// URLs are cached; posters churn rarely.
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    services::providers::PosterSource,
};
use reqwest::Client as HttpClient;
use serde::Deserialize;

const POSTER_CACHE_TTL: u64 = 604800; // 1 week
const POSTER_SIZE: &str = "original";

#[derive(Clone)]
pub struct TmdbClient {
    http_client: HttpClient,
    cache: Cache,
    api_key: String,
    api_url: String,
    image_url: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    results: Vec<SearchResult>,
}

#[derive(Deserialize)]
struct SearchResult {
    id: u64,
}

#[derive(Deserialize)]
struct ImagesResponse {
    posters: Vec<ImageEntry>,
}

#[derive(Deserialize)]
struct ImageEntry {
    file_path: String,
}

/// Joins the image base URL, size segment, and poster path. Poster paths
/// from TMDB already start with a slash.
fn compose_poster_url(image_url: &str, file_path: &str) -> String {
    format!("{}{}{}", image_url, POSTER_SIZE, file_path)
}

impl TmdbClient {
    pub fn new(cache: Cache, api_key: String, api_url: String, image_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            cache,
            api_key,
            api_url,
            image_url,
        }
    }

    async fn check_status(response: reqwest::Response) -> AppResult<reqwest::Response> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }
        Ok(response)
    }

    /// First search hit's TMDB id for a title
    async fn film_id(&self, title: &str) -> AppResult<u64> {
        let url = format!("{}/search/movie", self.api_url);

        let response = self
            .http_client
            .get(&url)
            .query(&[("query", title), ("api_key", self.api_key.as_str())])
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        let search: SearchResponse = response.json().await?;

        search
            .results
            .first()
            .map(|result| result.id)
            .ok_or_else(|| AppError::ExternalApi(format!("No TMDB match for title {}", title)))
    }

    /// First available poster path for a TMDB id
    async fn poster_path(&self, film_id: u64) -> AppResult<String> {
        let url = format!("{}/movie/{}/images", self.api_url, film_id);

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("language", "en-US"),
                ("include_image_language", "en,null"),
            ])
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        let images: ImagesResponse = response.json().await?;

        images
            .posters
            .into_iter()
            .next()
            .map(|entry| entry.file_path)
            .ok_or_else(|| {
                AppError::ExternalApi(format!("No poster available for TMDB id {}", film_id))
            })
    }
}

#[async_trait::async_trait]
impl PosterSource for TmdbClient {
    async fn poster_url(&self, title: &str) -> AppResult<String> {
        cached!(
            self.cache,
            CacheKey::Poster(title.to_string()),
            POSTER_CACHE_TTL,
            async move {
                let film_id = self.film_id(title).await?;
                let file_path = self.poster_path(film_id).await?;
                let url = compose_poster_url(&self.image_url, &file_path);

                tracing::debug!(title = %title, tmdb_id = film_id, "Poster resolved");

                Ok::<_, AppError>(url)
            }
        )
    }
}
