// src/taxonomy.rs
//! Taxonomy index: category -> parent genre -> [leaf genres].
//!
//! JSON shape:
//! {
//!   "Fiction": {
//!     "Romance": ["Slow-burn", "Enemies-to-Lovers", "Second Chance"],
//!     "Thriller": ["Espionage", "Legal Thriller"]
//!   }
//! }
//!
//! Only leaves are valid classification output. The flattened allowed set and
//! the leaf -> parent lookup are built once and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Raw two-level structure as stored on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Taxonomy {
    pub categories: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

#[derive(Debug, Error)]
pub enum TaxonomyLoadError {
    #[error("reading taxonomy from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("taxonomy is not valid category -> parent -> [leaf] JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("leaf genre {leaf:?} appears under both {first:?} and {second:?}")]
    DuplicateLeaf {
        leaf: String,
        first: String,
        second: String,
    },
    #[error("taxonomy contains no leaf genres")]
    Empty,
}

/// Read and parse a taxonomy file. Structural validation happens in `TaxonomyIndex::build`.
pub fn load(path: &Path) -> Result<Taxonomy, TaxonomyLoadError> {
    let raw = fs::read_to_string(path).map_err(|source| TaxonomyLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&raw)
}

pub fn parse(raw: &str) -> Result<Taxonomy, TaxonomyLoadError> {
    Ok(serde_json::from_str(raw)?)
}

/// Visit every category and parent genre, collecting each leaf exactly once.
///
/// A leaf seen under two parents is rejected rather than letting the last
/// occurrence silently win the parent lookup.
pub fn flatten_leaves(
    taxonomy: &Taxonomy,
) -> Result<(BTreeSet<String>, BTreeMap<String, String>), TaxonomyLoadError> {
    let mut allowed = BTreeSet::new();
    let mut leaf_to_parent: BTreeMap<String, String> = BTreeMap::new();

    for parents in taxonomy.categories.values() {
        for (parent, leaves) in parents {
            for leaf in leaves {
                if let Some(first) = leaf_to_parent.get(leaf) {
                    return Err(TaxonomyLoadError::DuplicateLeaf {
                        leaf: leaf.clone(),
                        first: first.clone(),
                        second: parent.clone(),
                    });
                }
                allowed.insert(leaf.clone());
                leaf_to_parent.insert(leaf.clone(), parent.clone());
            }
        }
    }

    Ok((allowed, leaf_to_parent))
}

/// Read-only view shared by every story in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonomyIndex {
    allowed: BTreeSet<String>,
    leaf_to_parent: BTreeMap<String, String>,
}

impl TaxonomyIndex {
    pub fn build(taxonomy: &Taxonomy) -> Result<Self, TaxonomyLoadError> {
        let (allowed, leaf_to_parent) = flatten_leaves(taxonomy)?;
        if allowed.is_empty() {
            return Err(TaxonomyLoadError::Empty);
        }
        Ok(Self {
            allowed,
            leaf_to_parent,
        })
    }

    pub fn from_path(path: &Path) -> Result<Self, TaxonomyLoadError> {
        let taxonomy = load(path)?;
        let index = Self::build(&taxonomy)?;
        tracing::info!(
            path = %path.display(),
            leaves = index.allowed.len(),
            "taxonomy loaded"
        );
        Ok(index)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, TaxonomyLoadError> {
        Self::build(&parse(raw)?)
    }

    /// Case-sensitive exact membership.
    pub fn contains(&self, leaf: &str) -> bool {
        self.allowed.contains(leaf)
    }

    pub fn parent_of(&self, leaf: &str) -> Option<&str> {
        self.leaf_to_parent.get(leaf).map(String::as_str)
    }

    pub fn allowed(&self) -> &BTreeSet<String> {
        &self.allowed
    }

    pub fn len(&self) -> usize {
        self.allowed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }
}
