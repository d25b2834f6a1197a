use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    error::AppResult,
    models::{AnswerEntry, FilmMatch, PartyAnswers, RecommendationSet},
};

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub party_size: usize,
    /// One ordered entry list per user
    pub answers: Vec<Vec<AnswerEntry>>,
}

#[derive(Debug, Serialize)]
pub struct CandidateResponse {
    pub id: i64,
    pub title: String,
    pub year: Option<i32>,
    pub content: String,
    pub similarity: f32,
    pub boost: Option<f32>,
}

impl From<&FilmMatch> for CandidateResponse {
    fn from(film: &FilmMatch) -> Self {
        Self {
            id: film.id,
            title: film.metadata.title.clone(),
            year: film.metadata.year,
            content: film.content.clone(),
            similarity: film.similarity,
            boost: film.boost,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub candidates: Vec<CandidateResponse>,
    pub rationales: Vec<String>,
    pub poster_urls: Vec<String>,
}

impl From<RecommendationSet> for RecommendationResponse {
    fn from(set: RecommendationSet) -> Self {
        Self {
            candidates: set.candidates.iter().map(CandidateResponse::from).collect(),
            rationales: set.rationales,
            poster_urls: set.poster_urls,
        }
    }
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Runs the full recommendation pipeline for a completed party of answers
pub async fn recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    let party = PartyAnswers {
        party_size: request.party_size,
        answers: request.answers,
    };

    let set = state.recommendations.recommend(&party).await?;

    Ok(Json(RecommendationResponse::from(set)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FilmMetadata;

    #[test]
    fn test_candidate_response_from_film_match() {
        let film = FilmMatch {
            id: 42,
            content: "A hacker discovers reality is a simulation.".to_string(),
            metadata: FilmMetadata {
                title: "The Matrix".to_string(),
                year: Some(1999),
            },
            similarity: 0.82,
            boost: Some(0.02),
        };

        let response = CandidateResponse::from(&film);
        assert_eq!(response.id, 42);
        assert_eq!(response.title, "The Matrix");
        assert_eq!(response.year, Some(1999));
        assert_eq!(response.boost, Some(0.02));
    }

    #[test]
    fn test_recommendation_response_alignment() {
        let set = RecommendationSet {
            candidates: vec![FilmMatch {
                id: 1,
                content: "desc".to_string(),
                metadata: FilmMetadata {
                    title: "Up".to_string(),
                    year: Some(2009),
                },
                similarity: 0.7,
                boost: None,
            }],
            rationales: vec!["A feel-good adventure".to_string()],
            poster_urls: vec!["https://image.tmdb.org/t/p/original/up.jpg".to_string()],
        };

        let response = RecommendationResponse::from(set);
        assert_eq!(response.candidates.len(), 1);
        assert_eq!(response.rationales.len(), 1);
        assert_eq!(response.poster_urls.len(), 1);
    }
}
