mod audio;
mod config;
mod ids;
mod item;
mod progress;

pub use audio::{
    AudioBlob, AudioSource, PlaybackSession, PlaybackStateError, PlaybackStatus, ResolvedAudio,
    Tier,
};
pub use config::{
    ConfigError, EstimatedPriorState, PRACTICE_PASS_SCORE, ProgressConfig, estimate_prior_state,
};
pub use ids::{ItemKey, LessonId};
pub use item::{AudioHint, ItemError, LexicalItem};
pub use progress::{LessonProgress, LessonStatus, MAX_TIME_SPENT_MINUTES, ProgressError};
