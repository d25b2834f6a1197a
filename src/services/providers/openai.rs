/// OpenAI provider
///
/// Implements all three language capabilities against the OpenAI REST API:
/// embeddings for the semantic query, chat completions for title extraction
/// and for per-candidate rationales. One call per capability per request; no
/// retry or batching, failures abort the recommendation (surfaced upstream).
use crate::{
    error::{AppError, AppResult},
    services::{extraction, providers::LanguageModel},
};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

const EMBEDDING_MODEL: &str = "text-embedding-ada-002";
const CHAT_MODEL: &str = "gpt-3.5-turbo";
const EXTRACTION_TEMPERATURE: f32 = 0.3;
const RATIONALE_TEMPERATURE: f32 = 0.5;

const TITLE_EXTRACTOR_PROMPT: &str = "You are a movie title extractor. Your job is to extract \
movie titles from user input text. Extract ONLY the movie titles mentioned, nothing else. \
Return a JSON array of movie titles, even if there's only one. If no movie titles are found, \
return an empty array [].\n\
Examples:\n\
- \"User's favourite movie is Harry Potter\" -> [\"Harry Potter\"]\n\
- \"User likes The Matrix and Inception\" -> [\"The Matrix\", \"Inception\"]\n\
- \"User prefers action movies\" -> []\n\
Return ONLY valid JSON array, no other text.";

const RATIONALE_PROMPT: &str = "You are an enthusiastic movie expert who loves recommending \
movies to people. You will be given two pieces of information - some context about the chosen \
movie and the user input which includes questions for the user and his answers. Your main job \
is to formulate a short (20-25 words) explanation why the user should like this movie based on \
the context and the user input.";

#[derive(Clone)]
pub struct OpenAiClient {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
        }
    }

    /// One chat completion call; returns the first choice's content
    async fn chat(&self, system: &str, user: &str, temperature: f32) -> AppResult<String> {
        let url = format!("{}/chat/completions", self.api_url);

        let body = ChatRequest {
            model: CHAT_MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature,
        };

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "OpenAI API returned status {}: {}",
                status, body
            )));
        }

        let completion: ChatResponse = response.json().await?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| AppError::ExternalApi("OpenAI response contained no choices".to_string()))
    }
}

#[async_trait::async_trait]
impl LanguageModel for OpenAiClient {
    async fn embed_text(&self, input: &str) -> AppResult<Vec<f32>> {
        let url = format!("{}/embeddings", self.api_url);

        let body = EmbeddingRequest {
            model: EMBEDDING_MODEL,
            input,
        };

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "OpenAI API returned status {}: {}",
                status, body
            )));
        }

        let embedding_response: EmbeddingResponse = response.json().await?;

        let embedding = embedding_response
            .data
            .into_iter()
            .next()
            .map(|data| data.embedding)
            .ok_or_else(|| {
                AppError::ExternalApi("OpenAI embedding response contained no data".to_string())
            })?;

        tracing::debug!(dimensions = embedding.len(), "Embedding created");

        Ok(embedding)
    }

    async fn extract_movie_titles(&self, input: &str) -> AppResult<Vec<String>> {
        let reply = self
            .chat(TITLE_EXTRACTOR_PROMPT, input, EXTRACTION_TEMPERATURE)
            .await?;

        let titles = extraction::parse_title_reply(&reply);

        tracing::info!(titles = titles.len(), "Movie titles extracted");

        Ok(titles)
    }

    async fn write_rationale(&self, context: &str, input: &str) -> AppResult<String> {
        let user = format!("Context: {} User input: {}", context, input);
        self.chat(RATIONALE_PROMPT, &user, RATIONALE_TEMPERATURE)
            .await
    }
}
