// src/config/run.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use super::oracle::DEFAULT_ORACLE_CONFIG_PATH;

// --- env defaults & names ---
pub const DEFAULT_RUN_CONFIG_PATH: &str = "config/mapper.toml";
pub const ENV_RUN_CONFIG_PATH: &str = "GENRE_MAPPER_CONFIG";
pub const ENV_TAXONOMY_PATH: &str = "GENRE_MAPPER_TAXONOMY";
pub const ENV_INPUT_PATH: &str = "GENRE_MAPPER_INPUT";
pub const ENV_OUTPUT_PATH: &str = "GENRE_MAPPER_OUTPUT";

/// Paths and switches for one mapping run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub taxonomy_path: PathBuf,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    /// Directory holding `stopwords.txt` + `lemmas.json` for the enhanced normalizer.
    pub nlp_dir: PathBuf,
    /// Max stories classified concurrently.
    pub concurrency: usize,
    /// Ask the oracle for setting/tone/themes during analysis (independent of ambiguity resolution).
    pub use_oracle_for_context: bool,
    pub oracle_config_path: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            taxonomy_path: PathBuf::from("data/taxonomy.json"),
            input_path: PathBuf::from("data/test_cases.json"),
            output_path: PathBuf::from("outputs/results.json"),
            nlp_dir: PathBuf::from("config/nlp"),
            concurrency: 8,
            use_oracle_for_context: false,
            oracle_config_path: PathBuf::from(DEFAULT_ORACLE_CONFIG_PATH),
        }
    }
}

impl RunConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut cfg: RunConfig = toml::from_str(s).context("parsing run config TOML")?;
        if cfg.concurrency == 0 {
            cfg.concurrency = 1;
        }
        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading run config from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Load using env var + fallbacks:
    /// 1) $GENRE_MAPPER_CONFIG (must exist)
    /// 2) config/mapper.toml
    /// 3) built-in defaults
    ///
    /// Path overrides from $GENRE_MAPPER_TAXONOMY / _INPUT / _OUTPUT are applied last.
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = std::env::var(ENV_RUN_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_RUN_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from(&pb)?
        } else {
            let fallback = PathBuf::from(DEFAULT_RUN_CONFIG_PATH);
            if fallback.exists() {
                Self::load_from(&fallback)?
            } else {
                Self::default()
            }
        };
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    fn apply_env_overrides(&mut self) {
        let over = |name: &str, slot: &mut PathBuf| {
            if let Ok(v) = std::env::var(name) {
                if !v.trim().is_empty() {
                    *slot = PathBuf::from(v.trim());
                }
            }
        };
        over(ENV_TAXONOMY_PATH, &mut self.taxonomy_path);
        over(ENV_INPUT_PATH, &mut self.input_path);
        over(ENV_OUTPUT_PATH, &mut self.output_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = RunConfig::from_toml_str(
            r#"
taxonomy_path = "tax.json"
concurrency = 0
"#,
        )
        .unwrap();
        assert_eq!(cfg.taxonomy_path, PathBuf::from("tax.json"));
        assert_eq!(cfg.input_path, PathBuf::from("data/test_cases.json"));
        assert_eq!(cfg.concurrency, 1);
        assert!(!cfg.use_oracle_for_context);
    }

    #[serial_test::serial]
    #[test]
    fn default_uses_env_then_fallbacks() {
        // Isolate CWD so the real repo config/ is not read
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();
        env::remove_var(ENV_RUN_CONFIG_PATH);
        env::remove_var(ENV_TAXONOMY_PATH);

        // Nothing on disk -> defaults
        assert_eq!(RunConfig::load_default().unwrap(), RunConfig::default());

        // Explicit path wins
        let p = tmp.path().join("run.toml");
        fs::write(&p, "use_oracle_for_context = true\n").unwrap();
        env::set_var(ENV_RUN_CONFIG_PATH, p.display().to_string());
        env::set_var(ENV_TAXONOMY_PATH, "other.json");
        let cfg = RunConfig::load_default().unwrap();
        assert!(cfg.use_oracle_for_context);
        assert_eq!(cfg.taxonomy_path, PathBuf::from("other.json"));

        // Dangling env path is an error
        env::set_var(ENV_RUN_CONFIG_PATH, tmp.path().join("nope.toml").display().to_string());
        assert!(RunConfig::load_default().is_err());

        env::remove_var(ENV_RUN_CONFIG_PATH);
        env::remove_var(ENV_TAXONOMY_PATH);
        env::set_current_dir(&old).unwrap();
    }
}
