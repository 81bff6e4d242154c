mod resolver;
pub mod sources;
pub mod verified;

pub use resolver::AudioResolver;
pub use sources::{
    AssetBundle, AudioPipeline, AudioSink, DictionaryAudio, InMemorySynthesisCache, LocalVoice,
    PlaybackListener, SpeechSynthesizer, SynthesisCache,
};
