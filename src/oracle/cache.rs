//! Caching oracle wrapper (file cache + daily limit).
//!
//! Real upstream calls increment the daily counter; cache hits do not.
//! Identical text therefore gets identical oracle answers across runs, which
//! keeps re-runs of a batch reproducible.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{ContextOracle, DominantFocus, NarrativeContext, OracleError};

pub struct CachingOracle<O: ContextOracle> {
    inner: O,
    cache_dir: PathBuf,
    daily_limit_max: u32,
    counter: Arc<Mutex<DailyCounter>>,
}

impl<O: ContextOracle> CachingOracle<O> {
    pub fn new(inner: O, cache_dir: PathBuf, daily_limit_max: u32) -> Self {
        let _ = fs::create_dir_all(&cache_dir); // best-effort
        let counter = Arc::new(Mutex::new(
            load_daily_counter(&cache_dir).unwrap_or_default(),
        ));
        Self {
            inner,
            cache_dir,
            daily_limit_max,
            counter,
        }
    }

    fn lock_counter(&self) -> MutexGuard<'_, DailyCounter> {
        self.counter.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Compare and increment under one guard, so concurrent callers can
    /// never overshoot the limit between the check and the upstream call.
    fn reserve_slot(&self) -> Result<(), OracleError> {
        let mut g = self.lock_counter();
        if g.is_expired() {
            g.reset_to_today();
        }
        if g.count >= self.daily_limit_max {
            return Err(OracleError::LimitReached(self.daily_limit_max));
        }
        g.count = g.count.saturating_add(1);
        let _ = save_daily_counter(&self.cache_dir, &g);
        Ok(())
    }

    /// Hand back a reserved slot after the upstream call failed.
    fn release_slot(&self) {
        let mut g = self.lock_counter();
        g.count = g.count.saturating_sub(1);
        let _ = save_daily_counter(&self.cache_dir, &g);
    }

    async fn metered<T, F>(&self, call: F) -> Result<T, OracleError>
    where
        F: std::future::Future<Output = Result<T, OracleError>>,
    {
        self.reserve_slot()?;
        let res = call.await;
        if res.is_err() {
            self.release_slot();
        }
        res
    }

    pub fn calls_today(&self) -> u32 {
        self.lock_counter().count
    }
}

#[async_trait]
impl<O: ContextOracle> ContextOracle for CachingOracle<O> {
    async fn extract_context(&self, text: &str) -> Result<NarrativeContext, OracleError> {
        let key = cache_key("context", text);
        if let Some(hit) = read_cache_file::<NarrativeContext>(&self.cache_dir, &key) {
            return Ok(hit);
        }
        let fresh = self.metered(self.inner.extract_context(text)).await?;
        if !fresh.is_empty() {
            let _ = write_cache_file(&self.cache_dir, &key, &fresh);
        }
        Ok(fresh)
    }

    async fn dominant_focus(&self, text: &str) -> Result<DominantFocus, OracleError> {
        let key = cache_key("focus", text);
        if let Some(hit) = read_cache_file::<DominantFocus>(&self.cache_dir, &key) {
            return Ok(hit);
        }
        let fresh = self.metered(self.inner.dominant_focus(text)).await?;
        let _ = write_cache_file(&self.cache_dir, &key, &fresh);
        Ok(fresh)
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }
}

// ------------------------------------------------------------
// File cache helpers
// ------------------------------------------------------------

fn cache_key(op: &str, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(op.as_bytes());
    hasher.update([0u8]);
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(32);
    for b in digest.iter().take(16) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

fn cache_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{key}.json"))
}

fn read_cache_file<T: DeserializeOwned>(dir: &Path, key: &str) -> Option<T> {
    let buf = fs::read_to_string(cache_path(dir, key)).ok()?;
    serde_json::from_str(&buf).ok()
}

fn write_cache_file<T: Serialize>(dir: &Path, key: &str, value: &T) -> io::Result<()> {
    let path = cache_path(dir, key);
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string(value).map_err(io::Error::other)?;
    let mut f = fs::File::create(&tmp)?;
    f.write_all(json.as_bytes())?;
    fs::rename(tmp, path)?;
    Ok(())
}

// ------------------------------------------------------------
// Daily counter helpers
// ------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DailyCounter {
    date: String,
    count: u32,
}

impl Default for DailyCounter {
    fn default() -> Self {
        Self {
            date: today(),
            count: 0,
        }
    }
}

impl DailyCounter {
    fn is_expired(&self) -> bool {
        self.date != today()
    }
    fn reset_to_today(&mut self) {
        self.date = today();
        self.count = 0;
    }
}

/// Days since UNIX epoch, as a string. Enough for equality and rollover.
fn today() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    (secs / 86_400).to_string()
}

fn counter_path(dir: &Path) -> PathBuf {
    dir.join("daily_count.json")
}

fn load_daily_counter(dir: &Path) -> io::Result<DailyCounter> {
    let s = fs::read_to_string(counter_path(dir))?;
    serde_json::from_str(&s).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn save_daily_counter(dir: &Path, dc: &DailyCounter) -> io::Result<()> {
    let p = counter_path(dir);
    let tmp = p.with_extension("json.tmp");
    let s = serde_json::to_string(dc).map_err(io::Error::other)?;
    let mut f = fs::File::create(&tmp)?;
    f.write_all(s.as_bytes())?;
    fs::rename(tmp, p)?;
    Ok(())
}
