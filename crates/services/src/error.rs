//! Shared error types for the services crate.

use thiserror::Error;

use peyv_core::model::{ItemKey, PlaybackStateError};

/// Failure of a single fallback tier.
///
/// Tier failures are recovered locally by the cascade and never reach the
/// caller on their own; only exhaustion of every tier surfaces one, wrapped
/// in [`AudioError::Exhausted`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TierError {
    /// The tier had nothing to try. Expected, skipped silently.
    #[error("no source available at this tier")]
    SourceUnavailable,

    #[error("asset failed to load: {0}")]
    LoadFailed(String),

    #[error("request timed out")]
    Timeout,

    #[error("request failed with status {0}")]
    HttpStatus(u16),

    /// The device refused to start playback (e.g. autoplay policy).
    #[error("device refused to start playback")]
    PlaybackRejected,
}

/// Errors emitted by `AudioResolver`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AudioError {
    /// A play request arrived while a session was resolving or playing.
    /// The in-flight session is neither cancelled nor queued behind.
    #[error("a playback session is already active on this control")]
    Busy,

    /// Every tier, including the terminal local voice, failed.
    #[error("all audio sources exhausted for '{key}'")]
    Exhausted {
        key: ItemKey,
        #[source]
        last: TierError,
    },

    #[error(transparent)]
    Session(#[from] PlaybackStateError),
}
