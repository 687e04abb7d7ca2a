//! Synthetic honesty suite: seeded keyword soup through the whole pipeline.
//! Every output must be a taxonomy leaf or [UNMAPPED], non-fiction always wins,
//! and the oracle can only ever move a story between allowed leaves.

use std::path::Path;

use genre_mapper::analyze::{extract_rule_signals, BasicNormalizer, Normalizer};
use genre_mapper::oracle::{DominantFocus, MockOracle, OracleHandle};
use genre_mapper::reasoning::NON_FICTION_REASON;
use genre_mapper::{GenrePipeline, StoryInput, TaxonomyIndex, UNMAPPED_LABEL};
use rand::{rngs::StdRng, seq::IndexedRandom, Rng, SeedableRng};

const KEYWORDS: &[&str] = &[
    "love", "loved", "met", "married", "hated", "enemy", "war", "lawyer", "trial", "spy",
    "kgb", "ghost", "dark", "killer", "mask", "camp", "mansion", "corridors", "robot",
    "space", "future", "physics", "stasis", "neon", "tokyo", "megacity", "again", "years",
    "how", "recipe", "bake",
];

const FILLER: &[&str] = &[
    "the", "a", "quiet", "river", "letter", "morning", "she", "he", "walked", "under",
    "window", "stranger", "city", "old", "friend",
];

const TAGS: &[&str] = &["love", "scary", "space", "office", "cooking", "LOVE"];

fn synthetic_stories(seed: u64, n: usize) -> Vec<StoryInput> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let len = rng.random_range(3..14);
            let words: Vec<&str> = (0..len)
                .map(|_| {
                    let pool = if rng.random_bool(0.35) { KEYWORDS } else { FILLER };
                    *pool.choose(&mut rng).unwrap()
                })
                .collect();
            let tags: Vec<&str> = (0..rng.random_range(0..3))
                .map(|_| *TAGS.choose(&mut rng).unwrap())
                .collect();
            StoryInput::new(format!("s{i}"), words.join(" ")).with_tags(tags)
        })
        .collect()
}

fn index() -> TaxonomyIndex {
    TaxonomyIndex::from_path(Path::new("data/taxonomy.json")).expect("repo taxonomy loads")
}

fn is_non_fiction(text: &str) -> bool {
    let tokens = BasicNormalizer.normalize(text);
    extract_rule_signals(&tokens).non_fiction
}

#[tokio::test]
async fn outputs_stay_inside_the_taxonomy() {
    let idx = index();
    let stories = synthetic_stories(7, 150);
    let out = GenrePipeline::new(idx.clone())
        .classify_batch(stories.clone(), 8)
        .await;

    assert_eq!(out.len(), stories.len());
    for (story, rec) in stories.iter().zip(&out) {
        assert_eq!(story.id, rec.id, "order must be preserved");
        let label = rec.mapped_genre.as_str();
        assert!(
            label == UNMAPPED_LABEL || idx.contains(label),
            "off-taxonomy label {label:?} for {:?}",
            story.story_snippet
        );
        assert!(!rec.reasoning.is_empty());
    }
}

#[tokio::test]
async fn non_fiction_always_unmapped_even_with_oracle() {
    let pipeline = GenrePipeline::new(index()).with_oracle(Some(OracleHandle::from_oracle(
        MockOracle::with_focus(DominantFocus::EmotionalEvolution),
    )));
    let stories = synthetic_stories(42, 200);
    let out = pipeline.classify_batch(stories.clone(), 6).await;

    let mut vetoed = 0;
    for (story, rec) in stories.iter().zip(&out) {
        if is_non_fiction(&story.story_snippet) {
            vetoed += 1;
            assert!(
                rec.mapped_genre.is_unmapped(),
                "non-fiction mapped to {} for {:?}",
                rec.mapped_genre,
                story.story_snippet
            );
            assert_eq!(rec.reasoning, NON_FICTION_REASON);
        }
    }
    assert!(vetoed > 0, "seed should produce some non-fiction stories");
}

#[tokio::test]
async fn oracle_only_changes_ambiguous_stories() {
    let idx = index();
    let plain = GenrePipeline::new(idx.clone());
    let emotional = GenrePipeline::new(idx).with_oracle(Some(OracleHandle::from_oracle(
        MockOracle::with_focus(DominantFocus::EmotionalEvolution),
    )));

    let stories = synthetic_stories(2024, 200);
    let a = plain.classify_batch(stories.clone(), 4).await;
    let b = emotional.classify_batch(stories.clone(), 4).await;

    for ((story, x), y) in stories.iter().zip(&a).zip(&b) {
        if x.mapped_genre == y.mapped_genre {
            continue;
        }
        let sig = extract_rule_signals(&BasicNormalizer.normalize(&story.story_snippet));
        assert!(
            (sig.sci_fi || sig.cyberpunk) && sig.romance && !sig.non_fiction,
            "oracle changed a non-ambiguous story: {:?}",
            story.story_snippet
        );
        assert_eq!(y.mapped_genre.as_str(), "Slow-burn");
    }
}

#[tokio::test]
async fn same_seed_same_results() {
    let pipeline = GenrePipeline::new(index());
    let a = pipeline.classify_batch(synthetic_stories(99, 80), 1).await;
    let b = pipeline.classify_batch(synthetic_stories(99, 80), 16).await;
    assert_eq!(a, b);
}

#[tokio::test]
async fn shrunken_taxonomy_fails_closed() {
    // Only one leaf survives; every other proposal must collapse to [UNMAPPED].
    let idx = TaxonomyIndex::from_json_str(r#"{"Fiction": {"Romance": ["Slow-burn"]}}"#)
        .expect("inline taxonomy");
    let pipeline = GenrePipeline::new(idx);
    let out = pipeline.classify_batch(synthetic_stories(5, 120), 8).await;

    for rec in &out {
        let label = rec.mapped_genre.as_str();
        assert!(label == "Slow-burn" || label == UNMAPPED_LABEL, "got {label}");
    }
}
