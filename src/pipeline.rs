//! # Classification Pipeline
//! text -> signals -> mapper -> ambiguity resolver -> validator -> reasoning.
//!
//! Each story is processed independently; the only shared state is the
//! read-only taxonomy index, the normalizer, and the oracle handle. A batch is
//! classified concurrently and reassembled in input order.

use std::sync::Arc;

use metrics::counter;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::analyze::{analyze, BasicNormalizer, DynNormalizer};
use crate::batch::{ResultRecord, StoryInput};
use crate::mapper::map_to_genre;
use crate::oracle::OracleHandle;
use crate::reasoning::explain;
use crate::resolver::AmbiguityResolver;
use crate::taxonomy::TaxonomyIndex;
use crate::validator::{validate_with_index, FinalGenre};

#[derive(Clone)]
pub struct GenrePipeline {
    index: Arc<TaxonomyIndex>,
    normalizer: DynNormalizer,
    oracle: Option<OracleHandle>,
    resolver: AmbiguityResolver,
    use_oracle_for_context: bool,
}

impl GenrePipeline {
    /// Basic normalizer, no oracle.
    pub fn new(index: TaxonomyIndex) -> Self {
        Self {
            index: Arc::new(index),
            normalizer: Arc::new(BasicNormalizer),
            oracle: None,
            resolver: AmbiguityResolver::new(None),
            use_oracle_for_context: false,
        }
    }

    pub fn with_normalizer(mut self, normalizer: DynNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// The same handle feeds both context extraction and the ambiguity resolver.
    pub fn with_oracle(mut self, oracle: Option<OracleHandle>) -> Self {
        self.resolver = AmbiguityResolver::new(oracle.clone());
        self.oracle = oracle;
        self
    }

    pub fn with_context_extraction(mut self, on: bool) -> Self {
        self.use_oracle_for_context = on;
        self
    }

    pub fn index(&self) -> &TaxonomyIndex {
        &self.index
    }

    pub fn normalizer_name(&self) -> &'static str {
        self.normalizer.name()
    }

    pub fn oracle_provider(&self) -> Option<&'static str> {
        self.oracle.as_ref().map(OracleHandle::provider_name)
    }

    pub async fn classify(&self, story: &StoryInput) -> ResultRecord {
        let text = story.story_snippet.as_str();

        let analysis = analyze(
            text,
            self.normalizer.as_ref(),
            self.use_oracle_for_context,
            self.oracle.as_ref(),
        )
        .await;

        let proposed = map_to_genre(&analysis, &story.user_tags);
        let refined = self
            .resolver
            .resolve(text, proposed, &analysis.rule_signals)
            .await;
        let final_genre = validate_with_index(refined, &self.index);
        let reasoning = explain(&analysis.rule_signals, &final_genre);

        counter!("genre_classified_total", "genre" => final_genre.as_str().to_string())
            .increment(1);
        tracing::debug!(
            id = %story.id,
            signals = ?analysis.rule_signals.active(),
            proposed = ?proposed,
            refined = ?refined,
            genre = %final_genre,
            "story classified"
        );

        ResultRecord {
            id: story.id.clone(),
            mapped_genre: final_genre,
            reasoning: reasoning.to_string(),
        }
    }

    /// Classify every story with at most `concurrency` in flight. Output order
    /// equals input order and there is exactly one record per input.
    pub async fn classify_batch(&self, stories: Vec<StoryInput>, concurrency: usize) -> Vec<ResultRecord> {
        let total = stories.len();
        let permits = Arc::new(Semaphore::new(concurrency.max(1)));
        let ids: Vec<String> = stories.iter().map(|s| s.id.clone()).collect();

        let mut set = JoinSet::new();
        for (idx, story) in stories.into_iter().enumerate() {
            let pipeline = self.clone();
            let permits = permits.clone();
            set.spawn(async move {
                // The semaphore is never closed, so acquire only fails if it were.
                let _permit = permits.acquire_owned().await.ok();
                (idx, pipeline.classify(&story).await)
            });
        }

        let mut slots: Vec<Option<ResultRecord>> = vec![None; total];
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((idx, rec)) => slots[idx] = Some(rec),
                Err(e) => tracing::warn!(error = %e, "classification task failed"),
            }
        }

        slots
            .into_iter()
            .zip(ids)
            .map(|(slot, id)| slot.unwrap_or_else(|| self.unmapped_record(id)))
            .collect()
    }

    fn unmapped_record(&self, id: String) -> ResultRecord {
        let final_genre = FinalGenre::Unmapped;
        let reasoning = explain(&Default::default(), &final_genre);
        ResultRecord {
            id,
            mapped_genre: final_genre,
            reasoning: reasoning.to_string(),
        }
    }
}
