//! Ambiguity resolver: the only place oracle output can change a label.
//!
//! Trigger: (cyberpunk OR sci_fi) AND romance. Then the oracle's dominant focus
//! is mapped through a fixed table:
//! - emotional_evolution  -> Slow-burn
//! - technical_scientific -> Cyberpunk if cyberpunk fired, else Hard Sci-Fi
//! - anything else        -> mapper proposal unchanged
//!
//! The non-fiction veto still holds: a non_fiction snippet is never overridden.
//! Genre priority does not: an ambiguous snippet that also fired `legal` (mapper
//! proposal Legal Thriller) is overridden like any other proposal. The
//! "legal + romance is Legal Thriller" rule therefore applies only when neither
//! sci_fi nor cyberpunk fired, or when no oracle is configured.

use metrics::counter;

use crate::analyze::RuleSignals;
use crate::mapper::Genre;
use crate::oracle::{DominantFocus, OracleHandle, OracleResultExt};

#[derive(Debug, Clone, Default)]
pub struct AmbiguityResolver {
    oracle: Option<OracleHandle>,
}

impl AmbiguityResolver {
    pub fn new(oracle: Option<OracleHandle>) -> Self {
        Self { oracle }
    }

    pub fn has_oracle(&self) -> bool {
        self.oracle.is_some()
    }

    pub async fn resolve(
        &self,
        text: &str,
        proposed: Option<Genre>,
        signals: &RuleSignals,
    ) -> Option<Genre> {
        let Some(oracle) = &self.oracle else {
            return proposed;
        };
        if signals.non_fiction || !is_ambiguous(signals) {
            return proposed;
        }

        counter!("ambiguity_detected_total").increment(1);
        let focus = oracle.dominant_focus(text).await.or_safe_default("focus");
        let resolved = apply_focus(focus, proposed, signals);
        if resolved != proposed {
            tracing::debug!(
                focus = focus.as_str(),
                text = %crate::analyze::anon_hash(text),
                from = ?proposed,
                to = ?resolved,
                "ambiguity resolved by narrative focus"
            );
        }
        resolved
    }
}

pub fn is_ambiguous(signals: &RuleSignals) -> bool {
    (signals.cyberpunk || signals.sci_fi) && signals.romance
}

/// Fixed focus -> genre override table.
pub fn apply_focus(
    focus: DominantFocus,
    proposed: Option<Genre>,
    signals: &RuleSignals,
) -> Option<Genre> {
    match focus {
        DominantFocus::EmotionalEvolution => Some(Genre::SlowBurn),
        DominantFocus::TechnicalScientific if signals.cyberpunk => Some(Genre::Cyberpunk),
        DominantFocus::TechnicalScientific => Some(Genre::HardSciFi),
        DominantFocus::Atmosphere | DominantFocus::ActionConflict | DominantFocus::Unknown => {
            proposed
        }
    }
}
