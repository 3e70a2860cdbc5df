use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// The fixed audio contract of the recognition backend. Every buffer sent to
/// [`Recognizer::recognize`] either came out of the transcoder with these
/// parameters or was uploaded as audio the caller declares compliant.
#[derive(Debug, Clone, Copy)]
pub struct EncodingProfile {
    pub codec: &'static str,
    pub container: &'static str,
    pub sample_rate_hz: u32,
    pub channels: u32,
    pub model: &'static str,
}

impl EncodingProfile {
    /// Encoding name in the backend's wire format, e.g. "WEBM_OPUS".
    pub fn wire_name(&self) -> String {
        format!("{}_{}", self.container, self.codec)
    }
}

pub const ENCODING_PROFILE: EncodingProfile = EncodingProfile {
    codec: "OPUS",
    container: "WEBM",
    sample_rate_hz: 48_000,
    channels: 2,
    model: "video",
};

pub const DEFAULT_LANGUAGE: &str = "en-US";

const DEFAULT_BASE_URL: &str = "https://speech.googleapis.com";

// Wire types for the speech:recognize contract.

#[derive(Debug, Serialize)]
struct RecognizeRequest {
    audio: RecognitionAudio,
    config: RecognitionConfig,
}

#[derive(Debug, Serialize)]
struct RecognitionAudio {
    content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognitionConfig {
    encoding: String,
    sample_rate_hertz: u32,
    language_code: String,
    audio_channel_count: u32,
    model: String,
}

#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<SpeechResult>,
}

#[derive(Debug, Deserialize)]
struct SpeechResult {
    #[serde(default)]
    alternatives: Vec<SpeechAlternative>,
}

#[derive(Debug, Deserialize)]
struct SpeechAlternative {
    #[serde(default)]
    transcript: String,
}

/// Client handle for the recognition backend.
///
/// Constructed once at startup and shared by reference across requests; each
/// call builds an independent request value, so concurrent use is safe.
pub struct Recognizer {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl Recognizer {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Point the client at a non-default endpoint (test servers, proxies).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/speech:recognize?key={}", self.base_url, self.api_key)
    }

    fn build_request(&self, audio: &[u8], language_code: &str) -> RecognizeRequest {
        RecognizeRequest {
            audio: RecognitionAudio {
                content: base64::engine::general_purpose::STANDARD.encode(audio),
            },
            config: RecognitionConfig {
                encoding: ENCODING_PROFILE.wire_name(),
                sample_rate_hertz: ENCODING_PROFILE.sample_rate_hz,
                language_code: language_code.to_string(),
                audio_channel_count: ENCODING_PROFILE.channels,
                model: ENCODING_PROFILE.model.to_string(),
            },
        }
    }

    /// Submit one finalized audio buffer and return the joined transcript.
    ///
    /// Result segments are joined with newlines in backend order, taking the
    /// top-ranked alternative of each. Zero segments yield an empty string,
    /// not an error.
    pub async fn recognize(&self, audio: &[u8], language_code: &str) -> Result<String> {
        info!(
            bytes = audio.len(),
            language = language_code,
            "requesting recognition"
        );

        let body = self.build_request(audio, language_code);

        let response = self
            .client
            .post(self.endpoint())
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Recognition(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::Recognition(format!(
                "backend returned HTTP {status}: {detail}"
            )));
        }

        let parsed: RecognizeResponse = response
            .json()
            .await
            .map_err(|e| Error::Recognition(format!("invalid response: {e}")))?;

        let transcript = join_transcript(&parsed);
        debug!(
            segments = parsed.results.len(),
            chars = transcript.len(),
            "recognition complete"
        );

        Ok(transcript)
    }
}

fn join_transcript(response: &RecognizeResponse) -> String {
    response
        .results
        .iter()
        .filter_map(|r| r.alternatives.first())
        .map(|a| a.transcript.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Map bare two-letter language shorthands to the regioned BCP-47 codes the
/// backend expects. Already-qualified codes pass through unchanged.
pub fn normalize_lang_code(lang: &str) -> String {
    match lang {
        "en" => "en-US",
        "hi" => "hi-IN",
        "mr" => "mr-IN",
        "ta" => "ta-IN",
        "te" => "te-IN",
        "kn" => "kn-IN",
        "gu" => "gu-IN",
        "ml" => "ml-IN",
        "bn" => "bn-IN",
        "pa" => "pa-IN",
        "or" => "or-IN",
        "ur" => "ur-PK",
        other => other,
    }
    .to_string()
}
