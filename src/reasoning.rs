//! Human-readable justification for a final label.
//!
//! Keyed only on the final label and the rule signals, never on oracle context,
//! so every stated reason can be checked against the deterministic signals.

use crate::analyze::RuleSignals;
use crate::mapper::Genre;
use crate::validator::FinalGenre;

pub const NON_FICTION_REASON: &str = "The story appears to be instructional or non-fictional in nature, \
which does not match any category in the fiction taxonomy.";

pub const NO_ALIGNMENT_REASON: &str = "The story does not strongly align with any available sub-genre \
in the internal taxonomy, so it was left unmapped.";

pub const FALLBACK_REASON: &str =
    "The genre was selected based on the dominant themes and context present in the story.";

pub fn genre_reason(genre: Genre) -> &'static str {
    match genre {
        Genre::EnemiesToLovers => "The story describes a romantic relationship that develops out of conflict, \
which is a defining trait of the enemies-to-lovers trope.",
        Genre::SecondChance => "The narrative focuses on characters reconnecting after a long period of separation, \
which aligns with the second-chance romance theme.",
        Genre::SlowBurn => "The story emphasizes gradual emotional development rather than immediate romance, \
which fits the slow-burn romance category.",
        Genre::LegalThriller => "The central tension revolves around legal proceedings and courtroom conflict, \
making legal thriller the most appropriate classification.",
        Genre::Espionage => "The plot centers on covert operations and intelligence work, \
which are key elements of the espionage thriller genre.",
        Genre::Gothic => "The setting and atmosphere emphasize an old, mysterious environment with a dark past, \
which are characteristic of gothic horror.",
        Genre::PsychologicalHorror => "The story relies on fear, suspense, and psychological tension rather than explicit violence, \
aligning with psychological horror.",
        Genre::Slasher => "The presence of a masked killer targeting victims in a confined setting \
strongly aligns with the slasher horror sub-genre.",
        Genre::Cyberpunk => "The story combines advanced technology with a futuristic urban setting, \
which are defining features of cyberpunk fiction.",
        Genre::HardSciFi => "The narrative focuses on scientifically grounded concepts and technical detail, \
which is characteristic of hard science fiction.",
        Genre::SpaceOpera => "The story emphasizes large-scale space-based elements and futuristic adventure, \
which fits the space opera sub-genre.",
    }
}

pub fn explain(signals: &RuleSignals, final_genre: &FinalGenre) -> &'static str {
    match final_genre {
        FinalGenre::Unmapped if signals.non_fiction => NON_FICTION_REASON,
        FinalGenre::Unmapped => NO_ALIGNMENT_REASON,
        FinalGenre::Mapped(label) => Genre::from_label(label)
            .map(genre_reason)
            .unwrap_or(FALLBACK_REASON),
    }
}
