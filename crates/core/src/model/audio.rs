use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

use crate::model::ids::ItemKey;
use crate::model::item::AudioHint;

//
// ─── AUDIO PAYLOAD ─────────────────────────────────────────────────────────────
//

/// Cheap-to-clone in-memory audio payload.
#[derive(Clone, PartialEq, Eq)]
pub struct AudioBlob(Arc<[u8]>);

impl AudioBlob {
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes.into())
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for AudioBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AudioBlob({} bytes)", self.0.len())
    }
}

//
// ─── RESOLVED SOURCES ──────────────────────────────────────────────────────────
//

/// A resolved, playable audio reference. Produced by the resolver cascade,
/// handed to the playback sink, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioSource {
    File(PathBuf),
    Url(Url),
    Blob(AudioBlob),
    /// Device speech synthesis of the canonical text, the terminal fallback.
    LocalVoice {
        text: String,
        phonetic_hint: Option<String>,
    },
}

impl From<&AudioHint> for AudioSource {
    fn from(hint: &AudioHint) -> Self {
        match hint {
            AudioHint::FilePath(p) => AudioSource::File(p.clone()),
            AudioHint::Url(u) => AudioSource::Url(u.clone()),
        }
    }
}

/// One candidate audio source in the fixed fallback priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Explicit,
    LocalAsset,
    RemoteSynthesis,
    VerifiedRemote,
    DictionaryLookup,
    LocalVoice,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::Explicit => "explicit",
            Tier::LocalAsset => "local-asset",
            Tier::RemoteSynthesis => "remote-synthesis",
            Tier::VerifiedRemote => "verified-remote",
            Tier::DictionaryLookup => "dictionary-lookup",
            Tier::LocalVoice => "local-voice",
        };
        write!(f, "{name}")
    }
}

/// Outcome of a successful resolution: the source that played and which tier
/// supplied it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAudio {
    pub source: AudioSource,
    pub tier: Tier,
}

//
// ─── PLAYBACK SESSION ──────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PlaybackStateError {
    #[error("cannot move playback session from {from} to {to}")]
    InvalidTransition {
        from: PlaybackStatus,
        to: PlaybackStatus,
    },
}

/// Lifecycle of a single play request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    Idle,
    Resolving,
    Playing,
    Ended,
    Failed,
}

impl PlaybackStatus {
    /// True while a new play request on the same control must be rejected.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        matches!(self, PlaybackStatus::Resolving | PlaybackStatus::Playing)
    }
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaybackStatus::Idle => "idle",
            PlaybackStatus::Resolving => "resolving",
            PlaybackStatus::Playing => "playing",
            PlaybackStatus::Ended => "ended",
            PlaybackStatus::Failed => "failed",
        };
        write!(f, "{name}")
    }
}

/// Transient state of one play request: created on tap, finished or failed on
/// completion. A button instance holds at most one at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackSession {
    item_key: ItemKey,
    status: PlaybackStatus,
}

impl PlaybackSession {
    /// Start a new session in the `Resolving` state.
    #[must_use]
    pub fn begin(item_key: ItemKey) -> Self {
        Self {
            item_key,
            status: PlaybackStatus::Resolving,
        }
    }

    #[must_use]
    pub fn item_key(&self) -> &ItemKey {
        &self.item_key
    }

    #[must_use]
    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    /// Mark playback as actually started.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackStateError::InvalidTransition` unless the session is
    /// currently `Resolving`.
    pub fn start_playing(&mut self) -> Result<(), PlaybackStateError> {
        self.transition(PlaybackStatus::Resolving, PlaybackStatus::Playing)
    }

    /// Mark playback as finished naturally.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackStateError::InvalidTransition` unless the session is
    /// currently `Playing`.
    pub fn finish(&mut self) -> Result<(), PlaybackStateError> {
        self.transition(PlaybackStatus::Playing, PlaybackStatus::Ended)
    }

    /// Mark the session as failed after tier exhaustion or a playback error.
    ///
    /// Valid from any non-terminal state.
    pub fn fail(&mut self) {
        self.status = PlaybackStatus::Failed;
    }

    fn transition(
        &mut self,
        expected: PlaybackStatus,
        next: PlaybackStatus,
    ) -> Result<(), PlaybackStateError> {
        if self.status != expected {
            return Err(PlaybackStateError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> ItemKey {
        ItemKey::from_canonical("sêv")
    }

    #[test]
    fn session_walks_happy_path() {
        let mut session = PlaybackSession::begin(key());
        assert_eq!(session.status(), PlaybackStatus::Resolving);
        assert!(session.status().is_busy());

        session.start_playing().unwrap();
        assert_eq!(session.status(), PlaybackStatus::Playing);
        assert!(session.status().is_busy());

        session.finish().unwrap();
        assert_eq!(session.status(), PlaybackStatus::Ended);
        assert!(!session.status().is_busy());
    }

    #[test]
    fn finish_before_playing_is_rejected() {
        let mut session = PlaybackSession::begin(key());
        let err = session.finish().unwrap_err();
        assert!(matches!(err, PlaybackStateError::InvalidTransition { .. }));
    }

    #[test]
    fn fail_is_terminal_and_not_busy() {
        let mut session = PlaybackSession::begin(key());
        session.fail();
        assert_eq!(session.status(), PlaybackStatus::Failed);
        assert!(!session.status().is_busy());
    }

    #[test]
    fn blob_debug_does_not_dump_bytes() {
        let blob = AudioBlob::new(vec![0_u8; 2048]);
        assert_eq!(format!("{blob:?}"), "AudioBlob(2048 bytes)");
    }
}
