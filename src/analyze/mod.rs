// src/analyze/mod.rs
//! Signal extraction entry: tokens + rule signals + optional oracle context.

pub mod context;
pub mod normalize;
pub mod signals;

use serde::Serialize;
use tracing::debug;

use crate::oracle::OracleHandle;

// Re-export convenient types.
pub use crate::analyze::context::{extract_context, NarrativeContext};
pub use crate::analyze::normalize::{
    select_normalizer, BasicNormalizer, DynNormalizer, EnhancedNormalizer, Normalizer,
};
pub use crate::analyze::signals::{extract_rule_signals, RuleSignals, Signal};

/// Everything the mapper and resolver need to know about one snippet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Analysis {
    pub tokens: Vec<String>,
    pub rule_signals: RuleSignals,
    /// Empty unless context extraction was requested and the oracle answered.
    pub llm_context: NarrativeContext,
}

/// Short, non-reversible id for a snippet so log lines never carry story text.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Normalize, extract rule signals, and (only when `use_oracle_for_context`) ask the
/// oracle for setting/tone/themes. Rule signals never depend on the oracle.
pub async fn analyze(
    text: &str,
    normalizer: &dyn Normalizer,
    use_oracle_for_context: bool,
    oracle: Option<&OracleHandle>,
) -> Analysis {
    let tokens = normalizer.normalize(text);
    let rule_signals = extract_rule_signals(&tokens);

    let llm_context = match (use_oracle_for_context, oracle) {
        (true, Some(o)) => {
            debug!(
                target: "genre_mapper::analyze",
                provider = o.provider_name(),
                text = %anon_hash(text),
                "context oracle called"
            );
            extract_context(text, Some(o)).await
        }
        _ => {
            debug!(target: "genre_mapper::analyze", "continued without context oracle");
            NarrativeContext::default()
        }
    };

    Analysis {
        tokens,
        rule_signals,
        llm_context,
    }
}
