use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;

use crate::batch::{ResultRecord, StoryInput};
use crate::metrics::Metrics;
use crate::pipeline::GenrePipeline;

#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<GenrePipeline>,
    metrics: Option<Arc<Metrics>>,
    concurrency: usize,
}

impl AppState {
    pub fn new(pipeline: GenrePipeline, concurrency: usize) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            metrics: None,
            concurrency: concurrency.max(1),
        }
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(Arc::new(metrics));
        self
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/taxonomy", get(taxonomy))
        .route("/classify", post(classify))
        .route("/classify/batch", post(classify_batch))
        .route("/metrics", get(metrics))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Serialize)]
struct LeafView<'a> {
    genre: &'a str,
    parent: Option<&'a str>,
}

#[derive(Serialize)]
struct TaxonomyResp<'a> {
    leaves: Vec<LeafView<'a>>,
    normalizer: &'static str,
    oracle: Option<&'static str>,
}

async fn taxonomy(State(state): State<AppState>) -> impl IntoResponse {
    let idx = state.pipeline.index();
    let body = TaxonomyResp {
        leaves: idx
            .allowed()
            .iter()
            .map(|g| LeafView {
                genre: g,
                parent: idx.parent_of(g),
            })
            .collect(),
        normalizer: state.pipeline.normalizer_name(),
        oracle: state.pipeline.oracle_provider(),
    };
    // Serialize here: the response borrows from state.
    Json(serde_json::to_value(&body).unwrap_or_default())
}

async fn classify(
    State(state): State<AppState>,
    Json(story): Json<StoryInput>,
) -> Json<ResultRecord> {
    Json(state.pipeline.classify(&story).await)
}

async fn classify_batch(
    State(state): State<AppState>,
    Json(stories): Json<Vec<StoryInput>>,
) -> Json<Vec<ResultRecord>> {
    let out = state
        .pipeline
        .classify_batch(stories, state.concurrency)
        .await;
    Json(out)
}

async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(m) => (StatusCode::OK, m.render()),
        None => (StatusCode::NOT_FOUND, "metrics disabled".to_string()),
    }
}
