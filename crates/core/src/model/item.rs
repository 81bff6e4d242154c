use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

use crate::model::ids::ItemKey;

//
// ─── ERRORS (domain validation) ────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ItemError {
    #[error("Canonical text cannot be empty.")]
    EmptyCanonicalText,

    #[error("Audio hint cannot be empty.")]
    EmptyAudioHint,
}

//
// ─── AUDIO HINT ────────────────────────────────────────────────────────────────
//

/// Explicit, caller-supplied audio reference attached to content data.
///
/// When present, the resolver uses it verbatim as the first fallback tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioHint {
    FilePath(PathBuf),
    Url(Url),
}

impl AudioHint {
    /// Build a hint pointing at a bundled audio file.
    ///
    /// # Errors
    ///
    /// Returns `ItemError::EmptyAudioHint` if the path is empty.
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ItemError> {
        let p = path.into();
        if p.as_os_str().is_empty() {
            return Err(ItemError::EmptyAudioHint);
        }
        Ok(AudioHint::FilePath(p))
    }

    /// Build a hint pointing at a remote audio URL.
    ///
    /// # Errors
    ///
    /// Returns `ItemError::EmptyAudioHint` if the string is empty or not a
    /// valid URL.
    pub fn from_url(url: impl AsRef<str>) -> Result<Self, ItemError> {
        let s = url.as_ref().trim();
        if s.is_empty() {
            return Err(ItemError::EmptyAudioHint);
        }
        let u = Url::parse(s).map_err(|_| ItemError::EmptyAudioHint)?;
        Ok(AudioHint::Url(u))
    }

    #[must_use]
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            AudioHint::FilePath(p) => Some(p.as_path()),
            AudioHint::Url(_) => None,
        }
    }

    #[must_use]
    pub fn as_url(&self) -> Option<&Url> {
        match self {
            AudioHint::Url(u) => Some(u),
            AudioHint::FilePath(_) => None,
        }
    }
}

//
// ─── LEXICAL ITEM ──────────────────────────────────────────────────────────────
//

/// An immutable content record: a word, sentence, or grammar example paired
/// with the canonical source-language text used for pronunciation lookup.
///
/// Owned by content data; never mutated at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexicalItem {
    display: String,
    canonical: String,
    phonetic: Option<String>,
    audio_hint: Option<AudioHint>,
}

impl LexicalItem {
    /// Create an item from its display string and canonical text.
    ///
    /// # Errors
    ///
    /// Returns `ItemError::EmptyCanonicalText` if the canonical text is blank.
    pub fn new(
        display: impl Into<String>,
        canonical: impl Into<String>,
    ) -> Result<Self, ItemError> {
        let canonical = canonical.into();
        if canonical.trim().is_empty() {
            return Err(ItemError::EmptyCanonicalText);
        }
        Ok(Self {
            display: display.into(),
            canonical,
            phonetic: None,
            audio_hint: None,
        })
    }

    /// Attach a phonetic hint for the local speech-synthesis tier.
    #[must_use]
    pub fn with_phonetic(mut self, phonetic: impl Into<String>) -> Self {
        self.phonetic = Some(phonetic.into());
        self
    }

    /// Attach an explicit audio reference.
    #[must_use]
    pub fn with_audio_hint(mut self, hint: AudioHint) -> Self {
        self.audio_hint = Some(hint);
        self
    }

    #[must_use]
    pub fn display(&self) -> &str {
        &self.display
    }

    #[must_use]
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    #[must_use]
    pub fn phonetic(&self) -> Option<&str> {
        self.phonetic.as_deref()
    }

    #[must_use]
    pub fn audio_hint(&self) -> Option<&AudioHint> {
        self.audio_hint.as_ref()
    }

    /// The normalized key used for asset lookup, caching, and play tracking.
    #[must_use]
    pub fn item_key(&self) -> ItemKey {
        ItemKey::from_canonical(&self.canonical)
    }

    /// True when the canonical text is a single word.
    ///
    /// The verified-pronunciation table and the dictionary lookup tiers only
    /// apply to single words, never to sentences.
    #[must_use]
    pub fn is_single_word(&self) -> bool {
        !self.canonical.trim().contains(char::is_whitespace)
    }
}
