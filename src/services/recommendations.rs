/// The recommendation pipeline orchestrator.
///
/// One strictly linear flow per request: profile composition (with synopsis
/// enrichment), movie-mention resolution, embedding, similarity search with
/// coefficient blending, then per-candidate rationale and poster enrichment.
/// No stage retries; any external failure aborts the whole request and no
/// partial result is returned. Empty outcomes (no mentions, no catalog hit,
/// zero similarity results) are valid and flow through as empty collections.
use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{FilmDoc, FilmMatch, MatchQuery, PartyAnswers, RecommendationSet, UserProfile},
    services::{
        matching,
        profile,
        providers::{FilmIndex, LanguageModel, PosterSource},
    },
};

pub struct RecommendationService {
    language: Arc<dyn LanguageModel>,
    films: Arc<dyn FilmIndex>,
    posters: Arc<dyn PosterSource>,
}

impl RecommendationService {
    pub fn new(
        language: Arc<dyn LanguageModel>,
        films: Arc<dyn FilmIndex>,
        posters: Arc<dyn PosterSource>,
    ) -> Self {
        Self {
            language,
            films,
            posters,
        }
    }

    /// Produces one recommendation set for a full party of answers.
    pub async fn recommend(&self, party: &PartyAnswers) -> AppResult<RecommendationSet> {
        validate_party(party)?;

        let favourites = profile::favourite_movie_answers(&party.answers);
        let synopses = if favourites.is_empty() {
            HashMap::new()
        } else {
            let films = self.films.list_films().await?;
            synopsis_map(&films, &favourites)
        };

        let user_profile = profile::compose_profile(&party.answers, &synopses);
        tracing::info!(profile = %user_profile.text, "Preference profile composed");

        // Mentions are extracted from the plain variant so named favourites
        // stay visible after synopsis substitution
        let mentioned = self
            .language
            .extract_movie_titles(&user_profile.plain_text)
            .await?;
        tracing::debug!(titles = ?mentioned, "Movie mentions extracted");

        let exclude_ids = if mentioned.is_empty() {
            Vec::new()
        } else {
            let films = self.films.list_films().await?;
            matching::exclusion_ids(&films, &mentioned)
        };

        let exclude_collection_ids = if exclude_ids.is_empty() {
            Vec::new()
        } else {
            self.films.collection_ids(&exclude_ids).await?
        };

        let embedding = self.language.embed_text(&user_profile.text).await?;

        let candidates = self
            .films
            .match_films(&MatchQuery {
                embedding,
                exclude_ids,
                exclude_collection_ids,
                preferences: user_profile.preferences.clone(),
            })
            .await?;

        if candidates.is_empty() {
            tracing::info!("No candidates cleared the similarity threshold");
            return Ok(RecommendationSet::empty());
        }

        let rationales = self.fetch_rationales(&candidates, &user_profile).await?;
        let poster_urls = self.fetch_posters(&candidates).await?;

        tracing::info!(candidates = candidates.len(), "Recommendation set ready");

        Ok(RecommendationSet {
            candidates,
            rationales,
            poster_urls,
        })
    }

    /// One rationale per candidate, requested concurrently and awaited
    /// jointly. A single failure aborts the batch.
    async fn fetch_rationales(
        &self,
        candidates: &[FilmMatch],
        user_profile: &UserProfile,
    ) -> AppResult<Vec<String>> {
        let mut tasks = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            let language = Arc::clone(&self.language);
            let context = candidate.content.clone();
            let input = user_profile.text.clone();
            tasks.push(tokio::spawn(async move {
                language.write_rationale(&context, &input).await
            }));
        }

        let mut rationales = Vec::with_capacity(tasks.len());
        for task in tasks {
            let rationale = task.await.map_err(|e| AppError::Internal(e.to_string()))??;
            rationales.push(rationale);
        }

        Ok(rationales)
    }

    /// One poster per candidate, same concurrency and failure shape as the
    /// rationale batch
    async fn fetch_posters(&self, candidates: &[FilmMatch]) -> AppResult<Vec<String>> {
        let mut tasks = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            let posters = Arc::clone(&self.posters);
            let title = candidate.metadata.title.clone();
            tasks.push(tokio::spawn(
                async move { posters.poster_url(&title).await },
            ));
        }

        let mut poster_urls = Vec::with_capacity(tasks.len());
        for task in tasks {
            let url = task.await.map_err(|e| AppError::Internal(e.to_string()))??;
            poster_urls.push(url);
        }

        Ok(poster_urls)
    }
}

/// The answer list must match the declared party size before the pipeline
/// runs
fn validate_party(party: &PartyAnswers) -> AppResult<()> {
    if party.party_size == 0 {
        return Err(AppError::InvalidInput(
            "Party size must be at least 1".to_string(),
        ));
    }

    if party.answers.len() != party.party_size {
        return Err(AppError::InvalidInput(format!(
            "Expected answers from {} users, got {}",
            party.party_size,
            party.answers.len()
        )));
    }

    Ok(())
}

/// Best-match synopsis per favourite answer, covering only titles found in
/// the catalog
fn synopsis_map(films: &[FilmDoc], favourites: &[String]) -> HashMap<String, String> {
    let mut synopses = HashMap::new();

    for favourite in favourites {
        if let Some(film) = matching::find_best_match(films, favourite, &matching::DEFAULT_POLICY) {
            if !film.content.is_empty() {
                synopses.insert(favourite.clone(), film.content.clone());
            }
        }
    }

    synopses
}
