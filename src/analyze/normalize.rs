//! Text normalization strategies.
//!
//! `BasicNormalizer`: lowercase, strip everything outside `[a-z\s]`, split on whitespace.
//! `EnhancedNormalizer`: basic + stopword removal + lemma-table lookup.
//!
//! The enhanced variant needs two resource files under the NLP directory:
//! - `stopwords.txt` : one word per line, `#` comments allowed
//! - `lemmas.json`   : `{ "word": "lemma", ... }`
//!
//! `select_normalizer` picks once at startup; missing resources are not an error,
//! the basic variant is used instead.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::Arc;

pub const STOPWORDS_FILE: &str = "stopwords.txt";
pub const LEMMAS_FILE: &str = "lemmas.json";

static RE_NON_ALPHA: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z\s]").expect("non-alpha regex"));

pub trait Normalizer: Send + Sync {
    fn normalize(&self, text: &str) -> Vec<String>;
    fn name(&self) -> &'static str;
}

pub type DynNormalizer = Arc<dyn Normalizer>;

#[derive(Debug, Clone, Copy, Default)]
pub struct BasicNormalizer;

impl Normalizer for BasicNormalizer {
    fn normalize(&self, text: &str) -> Vec<String> {
        basic_tokens(text)
    }
    fn name(&self) -> &'static str {
        "basic"
    }
}

fn basic_tokens(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    RE_NON_ALPHA
        .replace_all(&lowered, "")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct EnhancedNormalizer {
    stopwords: HashSet<String>,
    lemmas: HashMap<String, String>,
}

impl EnhancedNormalizer {
    pub fn new(stopwords: HashSet<String>, lemmas: HashMap<String, String>) -> Self {
        Self { stopwords, lemmas }
    }

    /// Load both resources from `dir`. Any missing or unreadable file yields `None`.
    pub fn from_dir(dir: &Path) -> Option<Self> {
        let stop_raw = fs::read_to_string(dir.join(STOPWORDS_FILE)).ok()?;
        let lemma_raw = fs::read_to_string(dir.join(LEMMAS_FILE)).ok()?;
        let lemmas: HashMap<String, String> = serde_json::from_str(&lemma_raw).ok()?;

        let stopwords = stop_raw
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(str::to_lowercase)
            .collect();

        Some(Self::new(stopwords, lemmas))
    }

    fn lemmatize<'a>(&'a self, token: &'a str) -> &'a str {
        self.lemmas.get(token).map(String::as_str).unwrap_or(token)
    }
}

impl Normalizer for EnhancedNormalizer {
    fn normalize(&self, text: &str) -> Vec<String> {
        basic_tokens(text)
            .into_iter()
            .filter(|t| !self.stopwords.contains(t))
            .map(|t| self.lemmatize(&t).to_string())
            .collect()
    }
    fn name(&self) -> &'static str {
        "enhanced"
    }
}

/// Capability check done once per run.
pub fn select_normalizer(nlp_dir: Option<&Path>) -> DynNormalizer {
    if let Some(dir) = nlp_dir {
        if let Some(enhanced) = EnhancedNormalizer::from_dir(dir) {
            tracing::info!(
                dir = %dir.display(),
                stopwords = enhanced.stopwords.len(),
                lemmas = enhanced.lemmas.len(),
                "using enhanced normalizer"
            );
            return Arc::new(enhanced);
        }
        tracing::info!(dir = %dir.display(), "NLP resources not found, using basic normalizer");
    }
    Arc::new(BasicNormalizer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_strips_punctuation_digits_and_case() {
        let toks = BasicNormalizer.normalize("The KGB's agent, 007, met her in Tokyo!");
        assert_eq!(
            toks,
            vec!["the", "kgbs", "agent", "met", "her", "in", "tokyo"]
        );
    }

    #[test]
    fn basic_drops_non_ascii_letters() {
        let toks = BasicNormalizer.normalize("Café noir — über alles");
        assert_eq!(toks, vec!["caf", "noir", "ber", "alles"]);
    }

    #[test]
    fn basic_on_empty_text_is_empty() {
        assert!(BasicNormalizer.normalize("  ...  ").is_empty());
    }

    #[test]
    fn enhanced_removes_stopwords_and_lemmatizes() {
        let stop: HashSet<String> = ["the", "in"].iter().map(|s| s.to_string()).collect();
        let lemmas: HashMap<String, String> = [("ghosts", "ghost"), ("years", "year")]
            .iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect();
        let n = EnhancedNormalizer::new(stop, lemmas);
        assert_eq!(
            n.normalize("The ghosts in the years"),
            vec!["ghost", "year"]
        );
    }

    #[test]
    fn missing_resources_fall_back_to_basic() {
        let n = select_normalizer(Some(Path::new("__no_nlp_dir__")));
        assert_eq!(n.name(), "basic");
        assert_eq!(select_normalizer(None).name(), "basic");
    }

    #[test]
    fn enhanced_loads_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(STOPWORDS_FILE), "# english\nthe\n\nof\n").unwrap();
        fs::write(dir.path().join(LEMMAS_FILE), r#"{"corridors":"corridor"}"#).unwrap();
        let n = select_normalizer(Some(dir.path()));
        assert_eq!(n.name(), "enhanced");
        assert_eq!(n.normalize("The corridors of the Mansion"), vec!["corridor", "mansion"]);
    }
}
