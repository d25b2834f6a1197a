use std::sync::Arc;

use axum_test::TestServer;
use mockall::mock;
use serde_json::json;

use pop_choice_api::api::{create_router, AppState};
use pop_choice_api::error::{AppError, AppResult};
use pop_choice_api::models::{FilmDoc, FilmMatch, FilmMetadata, MatchQuery};
use pop_choice_api::services::providers::{FilmIndex, LanguageModel, PosterSource};
use pop_choice_api::services::RecommendationService;

mock! {
    Language {}

    #[async_trait::async_trait]
    impl LanguageModel for Language {
        async fn embed_text(&self, input: &str) -> AppResult<Vec<f32>>;
        async fn extract_movie_titles(&self, input: &str) -> AppResult<Vec<String>>;
        async fn write_rationale(&self, context: &str, input: &str) -> AppResult<String>;
    }
}

mock! {
    Films {}

    #[async_trait::async_trait]
    impl FilmIndex for Films {
        async fn list_films(&self) -> AppResult<Vec<FilmDoc>>;
        async fn collection_ids(&self, film_ids: &[i64]) -> AppResult<Vec<i64>>;
        async fn match_films(&self, query: &MatchQuery) -> AppResult<Vec<FilmMatch>>;
    }
}

mock! {
    Posters {}

    #[async_trait::async_trait]
    impl PosterSource for Posters {
        async fn poster_url(&self, title: &str) -> AppResult<String>;
    }
}

fn create_test_server(
    language: MockLanguage,
    films: MockFilms,
    posters: MockPosters,
) -> TestServer {
    let service =
        RecommendationService::new(Arc::new(language), Arc::new(films), Arc::new(posters));
    let state = AppState::new(service);
    let app = create_router(state);
    TestServer::new(app).unwrap()
}

fn catalog() -> Vec<FilmDoc> {
    vec![
        FilmDoc {
            id: 1,
            content: "A hacker discovers reality is a simulation.".to_string(),
            metadata: Some(FilmMetadata {
                title: "The Matrix".to_string(),
                year: Some(1999),
            }),
        },
        FilmDoc {
            id: 2,
            content: "A mind-bending heist inside dreams.".to_string(),
            metadata: Some(FilmMetadata {
                title: "Inception".to_string(),
                year: Some(2010),
            }),
        },
    ]
}

fn candidate(id: i64, title: &str, year: i32) -> FilmMatch {
    FilmMatch {
        id,
        content: format!("{} description", title),
        metadata: FilmMetadata {
            title: title.to_string(),
            year: Some(year),
        },
        similarity: 0.8,
        boost: Some(0.01),
    }
}

fn matrix_request() -> serde_json::Value {
    json!({
        "party_size": 1,
        "answers": [[
            { "question": "what's-your-favourite-movie-and-why?", "answer": "The Matrix" },
            { "question": "are-you-in-the-mood-for-something-new-or-classic?", "answer": "Classic" },
            { "question": "what-are-you-in-the-mood-for?", "answer": "Serious" }
        ]]
    })
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server(MockLanguage::new(), MockFilms::new(), MockPosters::new());

    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_recommendation_happy_path() {
    let mut language = MockLanguage::new();
    let mut films = MockFilms::new();
    let mut posters = MockPosters::new();

    films.expect_list_films().returning(|| Ok(catalog()));

    language
        .expect_extract_movie_titles()
        .returning(|_| Ok(vec!["The Matrix".to_string()]));

    films
        .expect_collection_ids()
        .withf(|ids| ids == [1])
        .returning(|_| Ok(vec![10]));

    language
        .expect_embed_text()
        .returning(|_| Ok(vec![0.1, 0.2, 0.3]));

    films
        .expect_match_films()
        .withf(|query| {
            query.exclude_ids == [1]
                && query.exclude_collection_ids == [10]
                && query.preferences.era_classic == 1.0
                && query.preferences.mood_serious == 1.0
        })
        .returning(|_| Ok(vec![candidate(2, "Inception", 2010)]));

    language
        .expect_write_rationale()
        .returning(|_, _| Ok("A cerebral pick that matches your taste.".to_string()));

    posters
        .expect_poster_url()
        .returning(|_| Ok("https://image.tmdb.org/t/p/original/inception.jpg".to_string()));

    let server = create_test_server(language, films, posters);

    let response = server
        .post("/api/v1/recommendations")
        .json(&matrix_request())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();

    let candidates = body["candidates"].as_array().unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0]["id"], 2);
    assert_eq!(candidates[0]["title"], "Inception");
    assert_eq!(candidates[0]["year"], 2010);

    assert_eq!(body["rationales"].as_array().unwrap().len(), 1);
    assert_eq!(
        body["rationales"][0],
        "A cerebral pick that matches your taste."
    );
    assert_eq!(
        body["poster_urls"][0],
        "https://image.tmdb.org/t/p/original/inception.jpg"
    );
}

#[tokio::test]
async fn test_party_size_mismatch_is_bad_request() {
    let server = create_test_server(MockLanguage::new(), MockFilms::new(), MockPosters::new());

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({
            "party_size": 3,
            "answers": [[
                { "question": "what's-your-favourite-movie-and-why?", "answer": "Up" }
            ]]
        }))
        .await;

    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("Expected answers"));
}

#[tokio::test]
async fn test_embedding_failure_returns_bad_gateway_without_partial_result() {
    let mut language = MockLanguage::new();
    let mut films = MockFilms::new();
    let posters = MockPosters::new();

    films.expect_list_films().returning(|| Ok(catalog()));
    language
        .expect_extract_movie_titles()
        .returning(|_| Ok(Vec::new()));
    language
        .expect_embed_text()
        .returning(|_| Err(AppError::ExternalApi("embedding service down".to_string())));
    films.expect_match_films().times(0);

    let server = create_test_server(language, films, posters);

    let response = server
        .post("/api/v1/recommendations")
        .json(&matrix_request())
        .await;

    response.assert_status(axum::http::StatusCode::BAD_GATEWAY);
    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("embedding"));
    // Failure responses carry only the error, never partial pipeline state
    assert!(body.get("candidates").is_none());
}

#[tokio::test]
async fn test_zero_matches_returns_empty_set() {
    let mut language = MockLanguage::new();
    let mut films = MockFilms::new();
    let posters = MockPosters::new();

    films.expect_list_films().returning(|| Ok(catalog()));
    language
        .expect_extract_movie_titles()
        .returning(|_| Ok(Vec::new()));
    language.expect_embed_text().returning(|_| Ok(vec![0.4]));
    films.expect_match_films().returning(|_| Ok(Vec::new()));

    let server = create_test_server(language, films, posters);

    let response = server
        .post("/api/v1/recommendations")
        .json(&matrix_request())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert!(body["candidates"].as_array().unwrap().is_empty());
    assert!(body["rationales"].as_array().unwrap().is_empty());
    assert!(body["poster_urls"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_request_id_header_is_set() {
    let server = create_test_server(MockLanguage::new(), MockFilms::new(), MockPosters::new());

    let response = server.get("/health").await;
    response.assert_status_ok();
    assert!(response.headers().contains_key("x-request-id"));
}
