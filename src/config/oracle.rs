// src/config/oracle.rs
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path, path::PathBuf};

use crate::oracle::openai::DEFAULT_MODEL;

pub const DEFAULT_ORACLE_CONFIG_PATH: &str = "config/oracle.json";

fn default_provider() -> String {
    "openai".to_string()
}
fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}
fn default_daily_limit() -> u32 {
    200
}
fn default_timeout_ms() -> u64 {
    10_000
}
fn default_cache_dir() -> PathBuf {
    PathBuf::from("cache/oracle")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    #[serde(default)]
    pub enabled: bool,
    /// "openai" | "mock" (case-insensitive)
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// "ENV" means: read from OPENAI_API_KEY
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_daily_limit")]
    pub daily_limit: u32,
    /// Per-call timeout applied around every oracle request.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: default_provider(),
            model: default_model(),
            api_key: String::new(),
            daily_limit: default_daily_limit(),
            timeout_ms: default_timeout_ms(),
            cache_dir: default_cache_dir(),
        }
    }
}

impl OracleConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    pub fn from_json_str(data: &str) -> anyhow::Result<Self> {
        let mut cfg: OracleConfig = serde_json::from_str(data)?;

        // Normalize provider
        cfg.provider = cfg.provider.trim().to_lowercase();

        // Resolve api key if "ENV"; an unset variable leaves the key empty (oracle disabled).
        if cfg.api_key.trim().eq_ignore_ascii_case("env") {
            cfg.api_key = match cfg.provider.as_str() {
                "openai" => env::var("OPENAI_API_KEY").unwrap_or_default(),
                _ => String::new(),
            };
        }

        if cfg.timeout_ms == 0 {
            cfg.timeout_ms = default_timeout_ms();
        }

        Ok(cfg)
    }

    /// Oracle problems are never fatal: a missing or broken file means "no oracle".
    pub fn load_or_disabled<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::load_from_file(path) {
            Ok(cfg) => {
                // Safe diagnostics: only provider + enabled + key length
                tracing::info!(
                    provider = %cfg.provider,
                    enabled = cfg.enabled,
                    key_len = cfg.api_key.len(),
                    "oracle config loaded"
                );
                cfg
            }
            Err(e) => {
                tracing::info!(path = %path.display(), error = %e, "no usable oracle config, oracle disabled");
                Self::default()
            }
        }
    }
}
