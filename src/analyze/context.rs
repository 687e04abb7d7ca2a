//! Optional narrative context from the oracle.

use crate::oracle::{OracleHandle, OracleResultExt};

pub use crate::oracle::NarrativeContext;

/// No oracle -> empty context. Oracle failure -> empty context. Never an error.
pub async fn extract_context(text: &str, oracle: Option<&OracleHandle>) -> NarrativeContext {
    match oracle {
        None => NarrativeContext::default(),
        Some(o) => o.extract_context(text).await.or_safe_default("context"),
    }
}
