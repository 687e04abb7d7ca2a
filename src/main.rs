//! Batch runner: taxonomy + story batch in, one result record per story out.
//!
//! Paths come from `config/mapper.toml` (or `$GENRE_MAPPER_CONFIG`) with env overrides.

use genre_mapper::config::RunConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    genre_mapper::init_tracing();

    let cfg = RunConfig::load_default()?;
    let results = genre_mapper::run_batch(&cfg).await?;

    println!(
        "Mapping complete: {} stories. Results saved to {}",
        results.len(),
        cfg.output_path.display()
    );
    Ok(())
}
