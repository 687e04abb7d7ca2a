//! # Genre Mapper
//! Pure, ordered decision procedure: `(analysis, user tags)` -> proposed genre.
//! No I/O. First matching step wins:
//!
//! 1. non_fiction -> no opinion (veto over everything below)
//! 2. legal -> Legal Thriller; espionage -> Espionage
//! 3. slasher -> Slasher; gothic -> Gothic; horror -> Psychological Horror
//! 4. cyberpunk -> Cyberpunk; sci_fi -> Hard Sci-Fi (technical tokens or
//!    "scientific" themes) else Space Opera
//! 5. conflict + hate/hated/enemy -> Enemies-to-Lovers
//! 6. romance + again/years/met -> Second Chance
//! 7. romance -> Slow-burn
//! 8. user tags: love -> Slow-burn, scary -> Psychological Horror, space -> Space Opera
//! 9. no opinion

use serde::{Deserialize, Serialize};

use crate::analyze::signals::contains_any_token;
use crate::analyze::Analysis;

/// Every genre the mapper or resolver can propose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Genre {
    #[serde(rename = "Legal Thriller")]
    LegalThriller,
    #[serde(rename = "Espionage")]
    Espionage,
    #[serde(rename = "Slasher")]
    Slasher,
    #[serde(rename = "Gothic")]
    Gothic,
    #[serde(rename = "Psychological Horror")]
    PsychologicalHorror,
    #[serde(rename = "Cyberpunk")]
    Cyberpunk,
    #[serde(rename = "Hard Sci-Fi")]
    HardSciFi,
    #[serde(rename = "Space Opera")]
    SpaceOpera,
    #[serde(rename = "Enemies-to-Lovers")]
    EnemiesToLovers,
    #[serde(rename = "Second Chance")]
    SecondChance,
    #[serde(rename = "Slow-burn")]
    SlowBurn,
}

impl Genre {
    pub const ALL: [Genre; 11] = [
        Genre::LegalThriller,
        Genre::Espionage,
        Genre::Slasher,
        Genre::Gothic,
        Genre::PsychologicalHorror,
        Genre::Cyberpunk,
        Genre::HardSciFi,
        Genre::SpaceOpera,
        Genre::EnemiesToLovers,
        Genre::SecondChance,
        Genre::SlowBurn,
    ];

    /// Taxonomy leaf label.
    pub fn label(self) -> &'static str {
        match self {
            Genre::LegalThriller => "Legal Thriller",
            Genre::Espionage => "Espionage",
            Genre::Slasher => "Slasher",
            Genre::Gothic => "Gothic",
            Genre::PsychologicalHorror => "Psychological Horror",
            Genre::Cyberpunk => "Cyberpunk",
            Genre::HardSciFi => "Hard Sci-Fi",
            Genre::SpaceOpera => "Space Opera",
            Genre::EnemiesToLovers => "Enemies-to-Lovers",
            Genre::SecondChance => "Second Chance",
            Genre::SlowBurn => "Slow-burn",
        }
    }

    /// Exact (case-sensitive) reverse of `label`.
    pub fn from_label(label: &str) -> Option<Genre> {
        Genre::ALL.iter().copied().find(|g| g.label() == label)
    }
}

impl AsRef<str> for Genre {
    fn as_ref(&self) -> &str {
        self.label()
    }
}

impl std::fmt::Display for Genre {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

const HARD_SCI_FI_TOKENS: &[&str] = &["physics", "theory", "stasis", "metabolic"];
const ENEMIES_TOKENS: &[&str] = &["hate", "hated", "enemy"];
const SECOND_CHANCE_TOKENS: &[&str] = &["again", "years", "met"];

/// Weak tag fallback, checked in this order.
const TAG_FALLBACK: &[(&str, Genre)] = &[
    ("love", Genre::SlowBurn),
    ("scary", Genre::PsychologicalHorror),
    ("space", Genre::SpaceOpera),
];

pub fn map_to_genre(analysis: &Analysis, user_tags: &[String]) -> Option<Genre> {
    let sig = &analysis.rule_signals;
    let tokens = &analysis.tokens;

    // 1) Honesty veto
    if sig.non_fiction {
        return None;
    }

    // 2) Thriller
    if sig.legal {
        return Some(Genre::LegalThriller);
    }
    if sig.espionage {
        return Some(Genre::Espionage);
    }

    // 3) Horror
    if sig.slasher {
        return Some(Genre::Slasher);
    }
    if sig.gothic {
        return Some(Genre::Gothic);
    }
    if sig.horror {
        return Some(Genre::PsychologicalHorror);
    }

    // 4) Sci-Fi
    if sig.cyberpunk {
        return Some(Genre::Cyberpunk);
    }
    if sig.sci_fi {
        let themes = analysis.llm_context.themes.to_lowercase();
        if contains_any_token(tokens, HARD_SCI_FI_TOKENS) || themes.contains("scientific") {
            return Some(Genre::HardSciFi);
        }
        return Some(Genre::SpaceOpera);
    }

    // 5) Romance sub-genres
    if sig.conflict && contains_any_token(tokens, ENEMIES_TOKENS) {
        return Some(Genre::EnemiesToLovers);
    }
    if sig.romance && contains_any_token(tokens, SECOND_CHANCE_TOKENS) {
        return Some(Genre::SecondChance);
    }
    if sig.romance {
        return Some(Genre::SlowBurn);
    }

    // 6) Weak tag fallback
    tag_fallback(user_tags)
}

fn tag_fallback(user_tags: &[String]) -> Option<Genre> {
    let lowered: Vec<String> = user_tags.iter().map(|t| t.to_lowercase()).collect();
    TAG_FALLBACK
        .iter()
        .find(|(tag, _)| lowered.iter().any(|t| t == tag))
        .map(|(_, g)| *g)
}
