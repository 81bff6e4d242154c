use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use peyv_core::model::AudioBlob;

use crate::audio::sources::{DictionaryAudio, SpeechSynthesizer};
use crate::error::TierError;

/// Tier-local bound on each network attempt, so one unresponsive endpoint
/// cannot stall the whole cascade.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const DICTIONARY_BASE_URL: &str = "https://api.dictionaryapi.dev/api/v2/entries/ku";

#[derive(Clone, Debug)]
pub struct TtsConfig {
    pub base_url: String,
    pub api_key: String,
    pub speaker_id: String,
}

impl TtsConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("PEYV_TTS_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url = env::var("PEYV_TTS_BASE_URL")
            .unwrap_or_else(|_| "https://api.peyv.app/v1".into());
        let speaker_id = env::var("PEYV_TTS_SPEAKER_ID").unwrap_or_else(|_| "kmr-f-1".into());
        Some(Self {
            base_url,
            api_key,
            speaker_id,
        })
    }
}

/// HTTP client for the remote synthesis tier and the public dictionary tier.
///
/// Synthesis is disabled when no API key is configured; the cascade then
/// skips that tier as source-unavailable. The dictionary needs no key.
#[derive(Clone)]
pub struct TtsClient {
    client: Client,
    config: Option<TtsConfig>,
    dictionary_base_url: String,
}

impl TtsClient {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(TtsConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<TtsConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
            dictionary_base_url: DICTIONARY_BASE_URL.into(),
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }
}

fn transport_err(e: reqwest::Error) -> TierError {
    if e.is_timeout() {
        TierError::Timeout
    } else {
        TierError::LoadFailed(e.to_string())
    }
}

#[async_trait]
impl SpeechSynthesizer for TtsClient {
    async fn synthesize(&self, text: &str) -> Result<AudioBlob, TierError> {
        let config = self.config.as_ref().ok_or(TierError::SourceUnavailable)?;

        let url = format!("{}/tts", config.base_url.trim_end_matches('/'));
        let payload = SynthesisRequest {
            text: text.to_string(),
            speaker_id: config.speaker_id.clone(),
        };

        let response = self
            .client
            .post(url)
            .header("x-api-key", &config.api_key)
            .json(&payload)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(transport_err)?;

        if !response.status().is_success() {
            // 503 and any other non-2xx are the same to the cascade: the
            // next tier gets its turn.
            return Err(TierError::HttpStatus(response.status().as_u16()));
        }

        let bytes = response.bytes().await.map_err(transport_err)?;
        if bytes.is_empty() {
            return Err(TierError::LoadFailed("empty synthesis payload".into()));
        }
        Ok(AudioBlob::new(bytes.to_vec()))
    }
}

#[async_trait]
impl DictionaryAudio for TtsClient {
    async fn find_pronunciation(&self, word: &str) -> Result<Option<Url>, TierError> {
        let url = format!("{}/{word}", self.dictionary_base_url.trim_end_matches('/'));

        let response = self
            .client
            .get(url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(transport_err)?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(TierError::HttpStatus(response.status().as_u16()));
        }

        let entries: Vec<DictionaryEntry> = response.json().await.map_err(transport_err)?;
        Ok(entries
            .iter()
            .flat_map(|entry| entry.phonetics.iter())
            .filter_map(|phonetic| phonetic.audio.as_deref())
            .filter(|audio| !audio.is_empty())
            .find_map(|audio| Url::parse(audio).ok()))
    }
}

#[derive(Debug, Serialize)]
struct SynthesisRequest {
    text: String,
    speaker_id: String,
}

#[derive(Debug, Deserialize)]
struct DictionaryEntry {
    #[serde(default)]
    phonetics: Vec<Phonetic>,
}

#[derive(Debug, Deserialize)]
struct Phonetic {
    audio: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_without_key_is_disabled() {
        let client = TtsClient::new(None);
        assert!(!client.enabled());
    }

    #[tokio::test]
    async fn disabled_synthesis_is_source_unavailable() {
        let client = TtsClient::new(None);
        let err = client.synthesize("sêv").await.unwrap_err();
        assert!(matches!(err, TierError::SourceUnavailable));
    }

    #[test]
    fn dictionary_payload_shape_parses() {
        let body = r#"[{"word":"sev","phonetics":[{"audio":""},{"audio":"https://audio.example.org/sev.mp3"}]}]"#;
        let entries: Vec<DictionaryEntry> = serde_json::from_str(body).unwrap();
        let found = entries
            .iter()
            .flat_map(|entry| entry.phonetics.iter())
            .filter_map(|phonetic| phonetic.audio.as_deref())
            .filter(|audio| !audio.is_empty())
            .find_map(|audio| Url::parse(audio).ok());
        assert!(found.is_some());
    }
}
