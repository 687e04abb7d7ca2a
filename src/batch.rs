// src/batch.rs
//! Story batch input and result output (JSON arrays, order preserved).

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;

use crate::validator::FinalGenre;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryInput {
    pub id: String,
    /// Missing and `null` both mean "no tags".
    #[serde(default, deserialize_with = "null_as_empty")]
    pub user_tags: Vec<String>,
    pub story_snippet: String,
}

impl StoryInput {
    pub fn new(id: impl Into<String>, story_snippet: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user_tags: Vec::new(),
            story_snippet: story_snippet.into(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.user_tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRecord {
    pub id: String,
    pub mapped_genre: FinalGenre,
    pub reasoning: String,
}

pub fn parse_stories(raw: &str) -> Result<Vec<StoryInput>> {
    serde_json::from_str(raw).context("story batch is not a JSON array of {id, user_tags?, story_snippet}")
}

/// A batch that cannot be read or parsed is fatal for the run.
pub fn load_stories(path: &Path) -> Result<Vec<StoryInput>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading story batch from {}", path.display()))?;
    parse_stories(&raw)
}

/// Write all records as one pretty-printed JSON array, creating the parent dir if needed.
pub fn save_results(path: &Path, results: &[ResultRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating output dir {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(results)?;
    fs::write(path, json).with_context(|| format!("writing results to {}", path.display()))?;
    Ok(())
}
