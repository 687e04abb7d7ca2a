//! Context oracle: the external text-understanding capability.
//!
//! The core only ever sees two operations:
//! - `extract_context(text)` -> `{ setting, tone, themes }`
//! - `dominant_focus(text)`  -> one `DominantFocus` label
//!
//! The oracle never names genres. Every call returns `Result<_, OracleError>`;
//! callers turn failures into the documented safe default with
//! `OracleResultExt::or_safe_default`, so no oracle error ever aborts a story.

pub mod cache;
pub mod openai;

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use metrics::counter;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::oracle::OracleConfig;

pub use cache::CachingOracle;
pub use openai::OpenAiOracle;

/// Setting/tone/themes as free text. All-empty means "no context".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeContext {
    #[serde(default)]
    pub setting: String,
    #[serde(default)]
    pub tone: String,
    #[serde(default)]
    pub themes: String,
}

impl NarrativeContext {
    pub fn is_empty(&self) -> bool {
        self.setting.is_empty() && self.tone.is_empty() && self.themes.is_empty()
    }
}

/// Closed set of narrative drivers the oracle may report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DominantFocus {
    EmotionalEvolution,
    TechnicalScientific,
    Atmosphere,
    ActionConflict,
    #[default]
    Unknown,
}

impl DominantFocus {
    /// Exact match after trimming whitespace; anything else is `Unknown`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "emotional_evolution" => Self::EmotionalEvolution,
            "technical_scientific" => Self::TechnicalScientific,
            "atmosphere" => Self::Atmosphere,
            "action_conflict" => Self::ActionConflict,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmotionalEvolution => "emotional_evolution",
            Self::TechnicalScientific => "technical_scientific",
            Self::Atmosphere => "atmosphere",
            Self::ActionConflict => "action_conflict",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle is not configured")]
    NotConfigured,
    #[error("oracle transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("oracle returned HTTP {0}")]
    Status(u16),
    #[error("oracle returned malformed output: {0}")]
    Malformed(String),
    #[error("oracle call timed out after {0:?}")]
    Timeout(Duration),
    #[error("oracle daily limit of {0} calls reached")]
    LimitReached(u32),
}

/// Capability object injected into the extractor and resolver.
#[async_trait]
pub trait ContextOracle: Send + Sync {
    async fn extract_context(&self, text: &str) -> Result<NarrativeContext, OracleError>;
    async fn dominant_focus(&self, text: &str) -> Result<DominantFocus, OracleError>;
    /// Provider name for diagnostics.
    fn provider_name(&self) -> &'static str;
}

pub type DynOracle = Arc<dyn ContextOracle>;

/// An oracle plus the per-call timeout the pipeline applies around it.
#[derive(Clone)]
pub struct OracleHandle {
    inner: DynOracle,
    timeout: Duration,
}

impl OracleHandle {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(inner: DynOracle, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn from_oracle<O: ContextOracle + 'static>(oracle: O) -> Self {
        Self::new(Arc::new(oracle), Self::DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }

    pub async fn extract_context(&self, text: &str) -> Result<NarrativeContext, OracleError> {
        self.timed("context", self.inner.extract_context(text)).await
    }

    pub async fn dominant_focus(&self, text: &str) -> Result<DominantFocus, OracleError> {
        self.timed("focus", self.inner.dominant_focus(text)).await
    }

    async fn timed<T>(
        &self,
        op: &'static str,
        fut: impl Future<Output = Result<T, OracleError>>,
    ) -> Result<T, OracleError> {
        counter!("oracle_calls_total", "op" => op).increment(1);
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(res) => res,
            Err(_) => Err(OracleError::Timeout(self.timeout)),
        }
    }
}

impl std::fmt::Debug for OracleHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleHandle")
            .field("provider", &self.inner.provider_name())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// The single degrade-to-default combinator used at every oracle call site.
pub trait OracleResultExt<T> {
    fn or_safe_default(self, op: &'static str) -> T;
}

impl<T: Default> OracleResultExt<T> for Result<T, OracleError> {
    fn or_safe_default(self, op: &'static str) -> T {
        match self {
            Ok(v) => v,
            Err(e) => {
                counter!("oracle_failures_total", "op" => op).increment(1);
                tracing::debug!(op, error = %e, "oracle call failed, using safe default");
                T::default()
            }
        }
    }
}

/// Deterministic provider for tests and `ORACLE_TEST_MODE=mock`.
#[derive(Debug, Default)]
pub struct MockOracle {
    pub context: NarrativeContext,
    pub focus: DominantFocus,
    context_calls: AtomicUsize,
    focus_calls: AtomicUsize,
}

impl MockOracle {
    pub fn new(context: NarrativeContext, focus: DominantFocus) -> Self {
        Self {
            context,
            focus,
            ..Default::default()
        }
    }

    pub fn with_focus(focus: DominantFocus) -> Self {
        Self::new(NarrativeContext::default(), focus)
    }

    pub fn context_calls(&self) -> usize {
        self.context_calls.load(Ordering::SeqCst)
    }

    pub fn focus_calls(&self) -> usize {
        self.focus_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContextOracle for MockOracle {
    async fn extract_context(&self, _text: &str) -> Result<NarrativeContext, OracleError> {
        self.context_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.context.clone())
    }
    async fn dominant_focus(&self, _text: &str) -> Result<DominantFocus, OracleError> {
        self.focus_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.focus)
    }
    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Factory: build an oracle according to config and environment variables.
///
/// * If `ORACLE_TEST_MODE=mock`, returns a neutral mock (empty context, `unknown` focus).
/// * Else if the config is disabled, the provider is unknown, or no key is present, returns `None`.
/// * Else builds the OpenAI provider wrapped with the file cache + daily limit.
pub fn build_oracle(config: &OracleConfig) -> Option<OracleHandle> {
    let timeout = Duration::from_millis(config.timeout_ms);

    if std::env::var("ORACLE_TEST_MODE")
        .map(|v| v == "mock")
        .unwrap_or(false)
    {
        tracing::info!("oracle: mock mode");
        return Some(OracleHandle::new(Arc::new(MockOracle::default()), timeout));
    }

    if !config.enabled {
        tracing::info!("oracle: disabled by config");
        return None;
    }

    match config.provider.as_str() {
        "openai" => {
            if config.api_key.trim().is_empty() {
                tracing::warn!("oracle: openai selected but no API key, running without oracle");
                return None;
            }
            let provider = match OpenAiOracle::new(&config.api_key, &config.model, timeout) {
                Ok(p) => p,
                Err(e) => {
                    tracing::warn!(error = %e, "oracle: could not build HTTP client");
                    return None;
                }
            };
            let cached = CachingOracle::new(provider, config.cache_dir.clone(), config.daily_limit);
            Some(OracleHandle::new(Arc::new(cached), timeout))
        }
        "mock" => Some(OracleHandle::new(Arc::new(MockOracle::default()), timeout)),
        other => {
            tracing::warn!(provider = other, "oracle: unsupported provider");
            None
        }
    }
}
