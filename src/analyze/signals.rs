//! Deterministic rule signals over a normalized token sequence.
//!
//! Each signal is a fixed keyword list plus a match mode:
//! - `Token`:     match if ANY keyword equals a token exactly
//! - `Substring`: match if ANY keyword appears inside the space-joined token text
//!
//! `gothic` and `cyberpunk` use `Substring`, so "mansions" or "tokyos" trigger them
//! while e.g. "ghosts" does not trigger `horror`. Mapper precedence depends on
//! exactly these semantics.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Romance,
    Conflict,
    Legal,
    Espionage,
    Horror,
    Gothic,
    Slasher,
    SciFi,
    Cyberpunk,
    NonFiction,
}

impl Signal {
    pub const ALL: [Signal; 10] = [
        Signal::Romance,
        Signal::Conflict,
        Signal::Legal,
        Signal::Espionage,
        Signal::Horror,
        Signal::Gothic,
        Signal::Slasher,
        Signal::SciFi,
        Signal::Cyberpunk,
        Signal::NonFiction,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Signal::Romance => "romance",
            Signal::Conflict => "conflict",
            Signal::Legal => "legal",
            Signal::Espionage => "espionage",
            Signal::Horror => "horror",
            Signal::Gothic => "gothic",
            Signal::Slasher => "slasher",
            Signal::SciFi => "sci_fi",
            Signal::Cyberpunk => "cyberpunk",
            Signal::NonFiction => "non_fiction",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Token,
    Substring,
}

#[derive(Debug, Clone, Copy)]
pub struct SignalRule {
    pub signal: Signal,
    pub mode: MatchMode,
    pub keywords: &'static [&'static str],
}

pub const SIGNAL_RULES: &[SignalRule] = &[
    SignalRule {
        signal: Signal::Romance,
        mode: MatchMode::Token,
        keywords: &[
            "love",
            "loved",
            "romantic",
            "relationship",
            "together",
            "met",
            "married",
        ],
    },
    SignalRule {
        signal: Signal::Conflict,
        mode: MatchMode::Token,
        keywords: &["hate", "hated", "enemy", "battle", "war"],
    },
    SignalRule {
        signal: Signal::Legal,
        mode: MatchMode::Token,
        keywords: &["lawyer", "judge", "court", "trial"],
    },
    SignalRule {
        signal: Signal::Espionage,
        mode: MatchMode::Token,
        keywords: &["spy", "agent", "kgb", "cia"],
    },
    SignalRule {
        signal: Signal::Horror,
        mode: MatchMode::Token,
        keywords: &["fear", "scary", "dark", "ghost", "killer"],
    },
    SignalRule {
        signal: Signal::Gothic,
        mode: MatchMode::Substring,
        keywords: &["mansion", "victorian", "corridor"],
    },
    SignalRule {
        signal: Signal::Slasher,
        mode: MatchMode::Token,
        keywords: &["killer", "mask", "camp"],
    },
    SignalRule {
        signal: Signal::SciFi,
        mode: MatchMode::Token,
        keywords: &["ai", "robot", "space", "future", "ftl", "physics", "time"],
    },
    SignalRule {
        signal: Signal::Cyberpunk,
        mode: MatchMode::Substring,
        keywords: &["neon", "tokyo", "megacity"],
    },
    SignalRule {
        signal: Signal::NonFiction,
        mode: MatchMode::Token,
        keywords: &["how", "build", "recipe", "mix", "bake"],
    },
];

/// One boolean per `Signal`. Same tokens always give the same set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSignals {
    pub romance: bool,
    pub conflict: bool,
    pub legal: bool,
    pub espionage: bool,
    pub horror: bool,
    pub gothic: bool,
    pub slasher: bool,
    pub sci_fi: bool,
    pub cyberpunk: bool,
    pub non_fiction: bool,
}

impl RuleSignals {
    pub fn get(&self, signal: Signal) -> bool {
        match signal {
            Signal::Romance => self.romance,
            Signal::Conflict => self.conflict,
            Signal::Legal => self.legal,
            Signal::Espionage => self.espionage,
            Signal::Horror => self.horror,
            Signal::Gothic => self.gothic,
            Signal::Slasher => self.slasher,
            Signal::SciFi => self.sci_fi,
            Signal::Cyberpunk => self.cyberpunk,
            Signal::NonFiction => self.non_fiction,
        }
    }

    pub fn set(&mut self, signal: Signal, value: bool) {
        let slot = match signal {
            Signal::Romance => &mut self.romance,
            Signal::Conflict => &mut self.conflict,
            Signal::Legal => &mut self.legal,
            Signal::Espionage => &mut self.espionage,
            Signal::Horror => &mut self.horror,
            Signal::Gothic => &mut self.gothic,
            Signal::Slasher => &mut self.slasher,
            Signal::SciFi => &mut self.sci_fi,
            Signal::Cyberpunk => &mut self.cyberpunk,
            Signal::NonFiction => &mut self.non_fiction,
        };
        *slot = value;
    }

    /// Names of the signals that fired, in declaration order (for logs).
    pub fn active(&self) -> Vec<&'static str> {
        Signal::ALL
            .iter()
            .filter(|s| self.get(**s))
            .map(|s| s.as_str())
            .collect()
    }
}

pub fn extract_rule_signals(tokens: &[String]) -> RuleSignals {
    let joined = tokens.join(" ");
    let mut out = RuleSignals::default();
    for rule in SIGNAL_RULES {
        out.set(rule.signal, rule_matches(rule, tokens, &joined));
    }
    out
}

fn rule_matches(rule: &SignalRule, tokens: &[String], joined: &str) -> bool {
    match rule.mode {
        MatchMode::Token => rule.keywords.iter().any(|k| contains_token(tokens, k)),
        MatchMode::Substring => rule.keywords.iter().any(|k| joined.contains(k)),
    }
}

/// Exact token membership.
pub fn contains_token(tokens: &[String], word: &str) -> bool {
    tokens.iter().any(|t| t == word)
}

pub fn contains_any_token(tokens: &[String], words: &[&str]) -> bool {
    words.iter().any(|w| contains_token(tokens, w))
}
