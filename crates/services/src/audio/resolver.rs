use std::sync::Arc;

use tracing::debug;

use peyv_core::model::{
    AudioSource, ItemKey, LessonId, LexicalItem, PlaybackSession, PlaybackStatus, ResolvedAudio,
    Tier,
};

use super::sources::{AudioPipeline, PlaybackListener};
use super::verified::verified_audio_url;
use crate::error::{AudioError, TierError};

/// File extension used by the bundled pronunciation assets.
const ASSET_EXTENSION: &str = "mp3";

/// Shared content buckets probed after the lesson-specific one. The empty
/// string is the bundle root.
const SHARED_BUCKETS: [&str; 3] = ["phrases", "grammar", ""];

/// Resolves and plays pronunciation audio for one UI control.
///
/// Candidate sources are tried strictly in priority order (explicit hint,
/// bundled asset, remote synthesis, verified remote table, dictionary lookup,
/// device voice), stopping at the first that plays. Each tier gets exactly
/// one attempt per tap; a failed tier is never retried within the cascade.
///
/// One resolver holds at most one [`PlaybackSession`]: a tap that lands while
/// a session is resolving or playing is rejected, not queued.
pub struct AudioResolver {
    lesson_id: LessonId,
    pipeline: AudioPipeline,
    listener: Arc<dyn PlaybackListener>,
    session: Option<PlaybackSession>,
}

impl AudioResolver {
    #[must_use]
    pub fn new(
        lesson_id: LessonId,
        pipeline: AudioPipeline,
        listener: Arc<dyn PlaybackListener>,
    ) -> Self {
        Self {
            lesson_id,
            pipeline,
            listener,
            session: None,
        }
    }

    #[must_use]
    pub fn lesson_id(&self) -> &LessonId {
        &self.lesson_id
    }

    /// The session created by the most recent accepted tap, if any.
    #[must_use]
    pub fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    /// Resolve and start playback for a tap on `item`.
    ///
    /// On success the session is left in `Playing`; the host signals the
    /// natural end of the stream via [`AudioResolver::playback_finished`].
    /// `on_playback_started` fires exactly once, after whichever tier
    /// supplied the audio actually started it.
    ///
    /// # Errors
    ///
    /// Returns `AudioError::Busy` while a session is in flight, or
    /// `AudioError::Exhausted` when every tier including the terminal device
    /// voice failed. Tier-level failures in between are never surfaced.
    pub async fn play(&mut self, item: &LexicalItem) -> Result<ResolvedAudio, AudioError> {
        if self.session.as_ref().is_some_and(|s| s.status().is_busy()) {
            return Err(AudioError::Busy);
        }

        let key = item.item_key();
        self.session = Some(PlaybackSession::begin(key.clone()));

        match self.cascade(item, &key).await {
            Ok(resolved) => {
                if let Some(session) = self.session.as_mut() {
                    session.start_playing()?;
                }
                self.listener.on_playback_started(&key);
                Ok(resolved)
            }
            Err(last) => {
                if let Some(session) = self.session.as_mut() {
                    session.fail();
                }
                Err(AudioError::Exhausted { key, last })
            }
        }
    }

    /// Host callback for the natural end of the stream; returns the control
    /// to an idle, tappable state.
    pub fn playback_finished(&mut self) {
        if let Some(session) = self.session.as_mut() {
            if session.status() == PlaybackStatus::Playing {
                let _ = session.finish();
            }
        }
    }

    /// Walk the fallback tiers sequentially, returning the first source that
    /// actually starts playing, or the last failure once all are exhausted.
    async fn cascade(
        &self,
        item: &LexicalItem,
        key: &ItemKey,
    ) -> Result<ResolvedAudio, TierError> {
        // Tier 1: explicit caller-supplied reference, used verbatim.
        if let Some(hint) = item.audio_hint() {
            match self.start(AudioSource::from(hint), Tier::Explicit).await {
                Ok(resolved) => return Ok(resolved),
                Err(e) => self.tier_failed(Tier::Explicit, &e),
            }
        }

        // Tier 2: bundled assets, first bucket whose file loads wins.
        let filename = format!("{}.{ASSET_EXTENSION}", key.as_str());
        'buckets: for bucket in self.buckets() {
            match self.pipeline.assets.load(&bucket, &filename).await {
                Ok(Some(blob)) => match self.start(AudioSource::Blob(blob), Tier::LocalAsset).await
                {
                    Ok(resolved) => return Ok(resolved),
                    Err(e) => {
                        self.tier_failed(Tier::LocalAsset, &e);
                        break 'buckets;
                    }
                },
                // Absent from this bucket; probe the next one.
                Ok(None) => {}
                Err(e) => self.tier_failed(Tier::LocalAsset, &e),
            }
        }

        // Tier 3: remote synthesis, memoized by normalized text for the
        // process lifetime. A cache hit never re-issues the network call.
        if let Some(blob) = self.pipeline.cache.get(key) {
            match self.start(AudioSource::Blob(blob), Tier::RemoteSynthesis).await {
                Ok(resolved) => return Ok(resolved),
                Err(e) => self.tier_failed(Tier::RemoteSynthesis, &e),
            }
        } else {
            match self.pipeline.synthesizer.synthesize(item.canonical()).await {
                Ok(blob) => {
                    self.pipeline.cache.put(key.clone(), blob.clone());
                    match self.start(AudioSource::Blob(blob), Tier::RemoteSynthesis).await {
                        Ok(resolved) => return Ok(resolved),
                        Err(e) => self.tier_failed(Tier::RemoteSynthesis, &e),
                    }
                }
                // Synthesis not configured: nothing to try, skip silently.
                Err(TierError::SourceUnavailable) => {}
                Err(e) => self.tier_failed(Tier::RemoteSynthesis, &e),
            }
        }

        // Tiers 4 and 5 are word-only: sentences skip straight to the voice.
        if item.is_single_word() {
            if let Some(url) = verified_audio_url(key.as_str()) {
                match self.start(AudioSource::Url(url), Tier::VerifiedRemote).await {
                    Ok(resolved) => return Ok(resolved),
                    Err(e) => self.tier_failed(Tier::VerifiedRemote, &e),
                }
            }

            match self.pipeline.dictionary.find_pronunciation(key.as_str()).await {
                Ok(Some(url)) => {
                    match self.start(AudioSource::Url(url), Tier::DictionaryLookup).await {
                        Ok(resolved) => return Ok(resolved),
                        Err(e) => self.tier_failed(Tier::DictionaryLookup, &e),
                    }
                }
                Ok(None) => {}
                Err(e) => self.tier_failed(Tier::DictionaryLookup, &e),
            }
        }

        // Tier 6: device voice, the loss-less terminal fallback. It either
        // produces audible output or its own error ends the whole cascade.
        match self
            .pipeline
            .voice
            .speak(item.canonical(), item.phonetic())
            .await
        {
            Ok(()) => Ok(ResolvedAudio {
                source: AudioSource::LocalVoice {
                    text: item.canonical().to_string(),
                    phonetic_hint: item.phonetic().map(str::to_string),
                },
                tier: Tier::LocalVoice,
            }),
            Err(e) => {
                self.tier_failed(Tier::LocalVoice, &e);
                Err(e)
            }
        }
    }

    /// Hand a resolved source to the sink; success means audio is rolling.
    async fn start(&self, source: AudioSource, tier: Tier) -> Result<ResolvedAudio, TierError> {
        self.pipeline.sink.play(&source).await?;
        Ok(ResolvedAudio { source, tier })
    }

    fn tier_failed(&self, tier: Tier, error: &TierError) {
        debug!(lesson = %self.lesson_id, %tier, %error, "audio tier failed, falling back");
    }

    /// Ordered probe list: the lesson-specific bucket, then the shared ones.
    fn buckets(&self) -> Vec<String> {
        let mut buckets = Vec::with_capacity(1 + SHARED_BUCKETS.len());
        buckets.push(self.lesson_id.as_str().to_string());
        buckets.extend(SHARED_BUCKETS.iter().map(|b| (*b).to_string()));
        buckets
    }
}
