// tests/pipeline_examples.rs
//
// End-to-end examples through the full pipeline:
// text -> signals -> mapper -> resolver -> validator -> reasoning.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use genre_mapper::oracle::{
    ContextOracle, DominantFocus, MockOracle, NarrativeContext, OracleError, OracleHandle,
};
use genre_mapper::reasoning::{NON_FICTION_REASON, NO_ALIGNMENT_REASON};
use genre_mapper::{batch, FinalGenre, GenrePipeline, StoryInput, TaxonomyIndex};

fn index() -> TaxonomyIndex {
    TaxonomyIndex::from_path(Path::new("data/taxonomy.json")).expect("repo taxonomy loads")
}

fn plain() -> GenrePipeline {
    GenrePipeline::new(index())
}

fn with_focus(focus: DominantFocus) -> GenrePipeline {
    plain().with_oracle(Some(OracleHandle::from_oracle(MockOracle::with_focus(focus))))
}

async fn label(p: &GenrePipeline, text: &str) -> String {
    p.classify(&StoryInput::new("t", text))
        .await
        .mapped_genre
        .as_str()
        .to_string()
}

/// Every call fails, like an unreachable provider.
struct DownOracle;

#[async_trait]
impl ContextOracle for DownOracle {
    async fn extract_context(&self, _text: &str) -> Result<NarrativeContext, OracleError> {
        Err(OracleError::Status(502))
    }
    async fn dominant_focus(&self, _text: &str) -> Result<DominantFocus, OracleError> {
        Err(OracleError::Status(502))
    }
    fn provider_name(&self) -> &'static str {
        "down"
    }
}

#[tokio::test]
async fn gothic_mansion() {
    let p = plain();
    assert_eq!(
        label(&p, "The old Victorian mansion held secrets in its corridor").await,
        "Gothic"
    );
}

#[tokio::test]
async fn kgb_spy() {
    let p = plain();
    assert_eq!(
        label(&p, "The spy infiltrated the KGB safehouse").await,
        "Espionage"
    );
}

#[tokio::test]
async fn second_chance_romance() {
    let p = plain();
    assert_eq!(
        label(&p, "They loved each other again after all these years").await,
        "Second Chance"
    );
}

#[tokio::test]
async fn enemies_to_lovers_and_hard_sci_fi_fixtures() {
    let p = plain();
    assert_eq!(
        label(
            &p,
            "They hated each other from the first meeting. Slowly the war between them turned into something else."
        )
        .await,
        "Enemies-to-Lovers"
    );
    assert_eq!(
        label(
            &p,
            "The crew relied on FTL physics and stasis pods to survive the voyage."
        )
        .await,
        "Hard Sci-Fi"
    );
}

#[tokio::test]
async fn non_fiction_recipe_is_unmapped_with_specific_reason() {
    let rec = plain()
        .classify(&StoryInput::new("nf", "How to bake bread, mix the ingredients"))
        .await;
    assert_eq!(rec.mapped_genre, FinalGenre::Unmapped);
    assert_eq!(rec.reasoning, NON_FICTION_REASON);
}

#[tokio::test]
async fn non_fiction_vetoes_cyberpunk_and_emotional_focus() {
    let p = with_focus(DominantFocus::EmotionalEvolution);
    let rec = p
        .classify(&StoryInput::new("nf", "How we fell in love in neon Tokyo"))
        .await;
    assert!(rec.mapped_genre.is_unmapped());
    assert_eq!(rec.reasoning, NON_FICTION_REASON);
}

#[tokio::test]
async fn legal_beats_romance() {
    let p = plain();
    assert_eq!(
        label(&p, "The lawyer and the judge fell in love during the trial").await,
        "Legal Thriller"
    );
}

#[tokio::test]
async fn no_signal_is_unmapped_generic_reason() {
    let rec = plain()
        .classify(&StoryInput::new("x", "A quiet afternoon by the lake"))
        .await;
    assert!(rec.mapped_genre.is_unmapped());
    assert_eq!(rec.reasoning, NO_ALIGNMENT_REASON);
}

#[tokio::test]
async fn user_tags_are_a_weak_fallback_only() {
    let p = plain();
    let weak = StoryInput::new("x", "A quiet afternoon by the lake").with_tags(["SPACE"]);
    assert_eq!(p.classify(&weak).await.mapped_genre.as_str(), "Space Opera");

    let strong = StoryInput::new("y", "The spy crossed the border").with_tags(["love"]);
    assert_eq!(p.classify(&strong).await.mapped_genre.as_str(), "Espionage");
}

const CYBER_LOVE: &str = "Under the neon lights of the megacity, they fell in love";

#[tokio::test]
async fn cyberpunk_romance_without_oracle_stays_cyberpunk() {
    assert_eq!(label(&plain(), CYBER_LOVE).await, "Cyberpunk");
}

#[tokio::test]
async fn cyberpunk_romance_emotional_focus_is_slow_burn() {
    let p = with_focus(DominantFocus::EmotionalEvolution);
    assert_eq!(label(&p, CYBER_LOVE).await, "Slow-burn");
}

#[tokio::test]
async fn technical_focus_picks_cyberpunk_or_hard_sci_fi() {
    let p = with_focus(DominantFocus::TechnicalScientific);
    assert_eq!(label(&p, CYBER_LOVE).await, "Cyberpunk");
    assert_eq!(
        label(&p, "In the future the robot and the pilot fell in love").await,
        "Hard Sci-Fi"
    );
}

#[tokio::test]
async fn other_focus_values_keep_the_proposal() {
    for focus in [
        DominantFocus::Atmosphere,
        DominantFocus::ActionConflict,
        DominantFocus::Unknown,
    ] {
        let p = with_focus(focus);
        assert_eq!(
            label(&p, "In the future the robot and the pilot fell in love").await,
            "Space Opera"
        );
    }
}

#[tokio::test]
async fn oracle_is_not_consulted_without_ambiguity() {
    let mock = Arc::new(MockOracle::with_focus(DominantFocus::EmotionalEvolution));
    let p = plain().with_oracle(Some(OracleHandle::new(
        mock.clone(),
        OracleHandle::DEFAULT_TIMEOUT,
    )));
    assert_eq!(label(&p, "Robots drifted through space").await, "Space Opera");
    assert_eq!(mock.focus_calls(), 0);
    assert_eq!(mock.context_calls(), 0);
}

#[tokio::test]
async fn scientific_themes_upgrade_space_opera_when_context_enabled() {
    let ctx = NarrativeContext {
        setting: "research vessel".into(),
        tone: "measured".into(),
        themes: "Scientific curiosity".into(),
    };
    let oracle = OracleHandle::from_oracle(MockOracle::new(ctx, DominantFocus::Unknown));

    let off = plain().with_oracle(Some(oracle.clone()));
    assert_eq!(label(&off, "Robots drifted through space").await, "Space Opera");

    let on = plain()
        .with_oracle(Some(oracle))
        .with_context_extraction(true);
    assert_eq!(label(&on, "Robots drifted through space").await, "Hard Sci-Fi");
}

#[tokio::test]
async fn failing_oracle_matches_disabled_oracle() {
    let stories = batch::load_stories(Path::new("data/test_cases.json")).unwrap();
    let none = plain().with_context_extraction(true);
    let down = plain()
        .with_oracle(Some(OracleHandle::from_oracle(DownOracle)))
        .with_context_extraction(true);

    let a = none.classify_batch(stories.clone(), 4).await;
    let b = down.classify_batch(stories, 4).await;
    assert_eq!(a, b);
}

#[tokio::test]
async fn repeated_runs_are_identical() {
    let stories = batch::load_stories(Path::new("data/test_cases.json")).unwrap();
    let p = with_focus(DominantFocus::EmotionalEvolution);
    let first = p.classify_batch(stories.clone(), 3).await;
    let second = p.classify_batch(stories, 1).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn legal_thriller_yields_to_emotional_focus_only_when_ambiguous() {
    let text = "The lawyer and the robot fell in love";
    assert_eq!(label(&plain(), text).await, "Legal Thriller");
    let p = with_focus(DominantFocus::EmotionalEvolution);
    assert_eq!(label(&p, text).await, "Slow-burn");
    assert_eq!(
        label(&p, "The lawyer and the judge fell in love during the trial").await,
        "Legal Thriller"
    );
}
