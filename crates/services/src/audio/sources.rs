//! Collaborator seams for the audio fallback cascade.
//!
//! Every external capability the resolver touches is injected behind a trait
//! so the cascade can be exercised with fakes: the bundled asset table, the
//! synthesis API, the dictionary, the device voice, the playback engine, and
//! the in-process synthesis cache.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use url::Url;

use peyv_core::model::{AudioBlob, AudioSource, ItemKey};

use crate::error::TierError;

/// Filename→binary lookup over the bundled content buckets.
///
/// The packaging mechanism is the host's concern; this core only fixes the
/// normalized-filename convention and the bucket probe order.
#[async_trait]
pub trait AssetBundle: Send + Sync {
    /// Load a bundled audio file from a content bucket.
    ///
    /// Returns `Ok(None)` when the bucket has no such file (not an error,
    /// the next bucket is probed). Implementations must bound their wait
    /// (e.g. with an I/O timeout); a stalled load stalls the whole cascade.
    ///
    /// # Errors
    ///
    /// Returns `TierError` when the file exists but fails to load.
    async fn load(&self, bucket: &str, filename: &str) -> Result<Option<AudioBlob>, TierError>;
}

/// Remote text-to-speech synthesis endpoint.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize pronunciation audio for the canonical text.
    ///
    /// # Errors
    ///
    /// Returns `TierError::SourceUnavailable` when synthesis is not
    /// configured, or a tier-local failure for network/HTTP errors.
    async fn synthesize(&self, text: &str) -> Result<AudioBlob, TierError>;
}

/// Best-effort search against a public audio dictionary. Single words only.
#[async_trait]
pub trait DictionaryAudio: Send + Sync {
    /// Find a pronunciation recording for a normalized word.
    ///
    /// # Errors
    ///
    /// Returns `TierError` on transport failures; an entry simply missing
    /// from the dictionary is `Ok(None)`.
    async fn find_pronunciation(&self, word: &str) -> Result<Option<Url>, TierError>;
}

/// Platform speech-synthesis voice, the always-available terminal fallback.
#[async_trait]
pub trait LocalVoice: Send + Sync {
    /// Speak the canonical text aloud.
    ///
    /// Must either produce audible output or return an error; it is never
    /// allowed to fail silently. Implementations must bound how long they
    /// wait on the platform engine, returning `TierError::Timeout` when it
    /// does not respond.
    ///
    /// # Errors
    ///
    /// Returns `TierError` when the engine refuses or fails to speak.
    async fn speak(&self, text: &str, phonetic_hint: Option<&str>) -> Result<(), TierError>;
}

/// Playback engine that actually starts an audio stream.
#[async_trait]
pub trait AudioSink: Send + Sync {
    /// Start playback of a resolved source, returning once audio is rolling.
    ///
    /// Implementations must bound how long they wait for playback to start,
    /// returning `TierError::Timeout` when the device does not respond.
    ///
    /// # Errors
    ///
    /// Returns `TierError::PlaybackRejected` (or a load failure) when the
    /// device refuses to play the source.
    async fn play(&self, source: &AudioSource) -> Result<(), TierError>;
}

/// Observer for the moment playback actually begins.
///
/// Fired at most once per tap, whichever tier supplied the audio. This is
/// the sole signal the progress estimator counts a "play" from.
pub trait PlaybackListener: Send + Sync {
    fn on_playback_started(&self, key: &ItemKey);
}

/// Memoization of successful remote synthesis, keyed by normalized text.
///
/// Injected rather than global so the cascade is testable with a fake;
/// scoped to the process lifetime, never persisted to disk.
pub trait SynthesisCache: Send + Sync {
    fn get(&self, key: &ItemKey) -> Option<AudioBlob>;
    fn put(&self, key: ItemKey, blob: AudioBlob);
}

/// Process-wide in-memory synthesis cache.
///
/// Reads and inserts are check-then-act, so all access goes through one
/// mutex to keep a repeated play from issuing a duplicate network call.
#[derive(Default)]
pub struct InMemorySynthesisCache {
    entries: Mutex<HashMap<ItemKey, AudioBlob>>,
}

impl InMemorySynthesisCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SynthesisCache for InMemorySynthesisCache {
    fn get(&self, key: &ItemKey) -> Option<AudioBlob> {
        self.entries
            .lock()
            .ok()
            .and_then(|guard| guard.get(key).cloned())
    }

    fn put(&self, key: ItemKey, blob: AudioBlob) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.insert(key, blob);
        }
    }
}

/// Aggregates the cascade's collaborators behind trait objects, mirroring how
/// the storage layer bundles its repositories.
#[derive(Clone)]
pub struct AudioPipeline {
    pub assets: Arc<dyn AssetBundle>,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    pub dictionary: Arc<dyn DictionaryAudio>,
    pub voice: Arc<dyn LocalVoice>,
    pub sink: Arc<dyn AudioSink>,
    pub cache: Arc<dyn SynthesisCache>,
}
