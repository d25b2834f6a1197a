use std::sync::Arc;

use pop_choice_api::{
    api::{create_router, AppState},
    config::Config,
    db,
    services::{
        providers::{openai::OpenAiClient, supabase::SupabaseFilmIndex, tmdb::TmdbClient},
        RecommendationService,
    },
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    let redis_client = db::create_redis_client(&config.redis_url)?;
    let (cache, _cache_writer) = db::Cache::new(redis_client).await;

    let language = Arc::new(OpenAiClient::new(
        config.openai_api_key.clone(),
        config.openai_api_url.clone(),
    ));
    let films = Arc::new(SupabaseFilmIndex::new(
        cache.clone(),
        config.supabase_url.clone(),
        config.supabase_api_key.clone(),
    ));
    let posters = Arc::new(TmdbClient::new(
        cache,
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
        config.tmdb_image_url.clone(),
    ));

    let recommendations = RecommendationService::new(language, films, posters);
    let state = AppState::new(recommendations);

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Pop Choice API listening");
    axum::serve(listener, app).await?;

    Ok(())
}
