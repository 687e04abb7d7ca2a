//! HTTP surface over the classification pipeline.
//! Listens on `$GENRE_MAPPER_ADDR` (default 127.0.0.1:8080).

use genre_mapper::api::{self, AppState};
use genre_mapper::config::RunConfig;
use genre_mapper::metrics::Metrics;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    genre_mapper::init_tracing();

    let cfg = RunConfig::load_default()?;
    let pipeline = genre_mapper::build_pipeline(&cfg)?;
    let metrics = Metrics::init()?;
    let state = AppState::new(pipeline, cfg.concurrency).with_metrics(metrics);

    let addr = std::env::var("GENRE_MAPPER_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "genre mapper listening");
    axum::serve(listener, api::router(state)).await?;
    Ok(())
}
