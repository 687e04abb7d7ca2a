// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod analyze;
pub mod api;
pub mod batch;
pub mod config;
pub mod mapper;
pub mod metrics;
pub mod oracle;
pub mod pipeline;
pub mod reasoning;
pub mod resolver;
pub mod taxonomy;
pub mod validator;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::batch::{ResultRecord, StoryInput};
pub use crate::mapper::Genre;
pub use crate::pipeline::GenrePipeline;
pub use crate::taxonomy::{TaxonomyIndex, TaxonomyLoadError};
pub use crate::validator::{FinalGenre, UNMAPPED_LABEL};

use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{OracleConfig, RunConfig};

/// Install the tracing subscriber for binaries.
/// `RUST_LOG` wins; otherwise `genre_mapper=info,warn`. `GENRE_MAPPER_LOG_JSON=1` switches to JSON lines.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("genre_mapper=info,warn"));
    let json = std::env::var("GENRE_MAPPER_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    let registry = tracing_subscriber::registry().with(filter);
    // try_init: a subscriber may already be installed (tests).
    let _ = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
}

/// Build the pipeline a run needs: taxonomy (fatal on error), normalizer, optional oracle.
pub fn build_pipeline(cfg: &RunConfig) -> anyhow::Result<GenrePipeline> {
    let index = TaxonomyIndex::from_path(&cfg.taxonomy_path)
        .with_context(|| format!("loading taxonomy {}", cfg.taxonomy_path.display()))?;
    let normalizer = analyze::select_normalizer(Some(cfg.nlp_dir.as_path()));
    let oracle_cfg = OracleConfig::load_or_disabled(&cfg.oracle_config_path);
    let oracle = oracle::build_oracle(&oracle_cfg);

    Ok(GenrePipeline::new(index)
        .with_normalizer(normalizer)
        .with_oracle(oracle)
        .with_context_extraction(cfg.use_oracle_for_context))
}

/// One batch run: load stories, classify all, write results in input order.
pub async fn run_batch(cfg: &RunConfig) -> anyhow::Result<Vec<ResultRecord>> {
    let pipeline = build_pipeline(cfg)?;
    let stories = batch::load_stories(&cfg.input_path)?;
    tracing::info!(
        stories = stories.len(),
        normalizer = pipeline.normalizer_name(),
        oracle = pipeline.oracle_provider().unwrap_or("none"),
        "classifying batch"
    );

    let results = pipeline.classify_batch(stories, cfg.concurrency).await;
    batch::save_results(&cfg.output_path, &results)?;

    let unmapped = results.iter().filter(|r| r.mapped_genre.is_unmapped()).count();
    tracing::info!(
        total = results.len(),
        unmapped,
        output = %cfg.output_path.display(),
        "mapping complete"
    );
    Ok(results)
}
