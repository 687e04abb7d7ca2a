//! Taxonomy validator: the single enforcement point of the "no off-taxonomy
//! output" rule. Upstream stages may propose anything; only this stage decides.

use serde::{Serialize, Serializer};
use std::collections::BTreeSet;

use crate::taxonomy::TaxonomyIndex;

pub const UNMAPPED_LABEL: &str = "[UNMAPPED]";

/// A leaf from the allowed set, or the unmapped sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FinalGenre {
    Mapped(String),
    Unmapped,
}

impl FinalGenre {
    pub fn as_str(&self) -> &str {
        match self {
            FinalGenre::Mapped(s) => s,
            FinalGenre::Unmapped => UNMAPPED_LABEL,
        }
    }

    pub fn is_unmapped(&self) -> bool {
        matches!(self, FinalGenre::Unmapped)
    }
}

impl std::fmt::Display for FinalGenre {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FinalGenre {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Fails closed: `None`, empty, or anything not in `allowed` (case-sensitive) is unmapped.
pub fn validate<S: AsRef<str>>(proposed: Option<S>, allowed: &BTreeSet<String>) -> FinalGenre {
    match proposed {
        Some(p) if !p.as_ref().is_empty() && allowed.contains(p.as_ref()) => {
            FinalGenre::Mapped(p.as_ref().to_string())
        }
        _ => FinalGenre::Unmapped,
    }
}

pub fn validate_with_index<S: AsRef<str>>(proposed: Option<S>, index: &TaxonomyIndex) -> FinalGenre {
    validate(proposed, index.allowed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::Genre;

    fn allowed() -> BTreeSet<String> {
        ["Slow-burn", "Gothic", ""].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn known_leaf_passes() {
        assert_eq!(
            validate(Some(Genre::Gothic), &allowed()),
            FinalGenre::Mapped("Gothic".into())
        );
    }

    #[test]
    fn fails_closed() {
        let a = allowed();
        assert!(validate(None::<&str>, &a).is_unmapped());
        // empty string is rejected even if it sneaks into the allowed set
        assert!(validate(Some(""), &a).is_unmapped());
        assert!(validate(Some("gothic"), &a).is_unmapped());
        assert!(validate(Some("Space Opera"), &a).is_unmapped());
    }

    #[test]
    fn serializes_as_plain_label() {
        assert_eq!(serde_json::to_value(FinalGenre::Unmapped).unwrap(), UNMAPPED_LABEL);
        assert_eq!(
            serde_json::to_value(FinalGenre::Mapped("Slow-burn".into())).unwrap(),
            "Slow-burn"
        );
        assert_eq!(FinalGenre::Unmapped.to_string(), "[UNMAPPED]");
    }
}
