#![forbid(unsafe_code)]

pub mod audio;
pub mod error;
pub mod progress;
pub mod tts_client;

pub use peyv_core::Clock;

pub use audio::{
    AssetBundle, AudioPipeline, AudioResolver, AudioSink, DictionaryAudio, InMemorySynthesisCache,
    LocalVoice, PlaybackListener, SpeechSynthesizer, SynthesisCache,
};
pub use error::{AudioError, TierError};
pub use progress::ProgressEstimator;
pub use tts_client::{TtsClient, TtsConfig};
