use serde::{Deserialize, Serialize};
use std::fmt;

use crate::normalize::normalize;

/// Opaque key for a lesson's progress record.
///
/// The progress store is keyed by `LessonId`; each lesson's record is
/// independent of every other.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LessonId(String);

impl LessonId {
    /// Creates a new `LessonId`
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the underlying string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Opaque key identifying a lexical item's pronunciation.
///
/// Always the normalized form of the item's canonical text, so two spellings
/// that normalize alike count as one play.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemKey(String);

impl ItemKey {
    /// Derive the key from canonical text by normalizing it.
    #[must_use]
    pub fn from_canonical(canonical: &str) -> Self {
        Self(normalize(canonical))
    }

    /// Rehydrate a key that was previously persisted.
    ///
    /// Persisted keys are already normalized; normalization is idempotent, so
    /// re-applying it is safe for records written by older versions.
    #[must_use]
    pub fn from_stored(raw: impl AsRef<str>) -> Self {
        Self(normalize(raw.as_ref()))
    }

    /// Returns the underlying string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for LessonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LessonId({})", self.0)
    }
}

impl fmt::Debug for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemKey({})", self.0)
    }
}

// ─── Display Implementations ───────────────────────────────────────────────────

impl fmt::Display for LessonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lesson_id_display() {
        let id = LessonId::new("lesson-3");
        assert_eq!(id.to_string(), "lesson-3");
    }

    #[test]
    fn item_key_normalizes_canonical_text() {
        let key = ItemKey::from_canonical("Sêv");
        assert_eq!(key.as_str(), "sev");
    }

    #[test]
    fn item_key_variants_of_same_word_collide() {
        assert_eq!(
            ItemKey::from_canonical("SÊV"),
            ItemKey::from_canonical("sêv")
        );
    }

    #[test]
    fn stored_keys_round_trip() {
        let original = ItemKey::from_canonical("roj baş");
        let restored = ItemKey::from_stored(original.as_str());
        assert_eq!(original, restored);
    }
}
