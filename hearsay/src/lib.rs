pub mod error;
pub mod fetch;
pub mod pipeline;
pub mod recognize;
pub mod source;
pub mod transcode;

pub use error::{Error, Result};
pub use pipeline::CompletionSlot;
pub use recognize::{
    normalize_lang_code, EncodingProfile, Recognizer, DEFAULT_LANGUAGE, ENCODING_PROFILE,
};
pub use source::{classify, normalize_url, SourceKind};

use std::future::Future;
use std::time::Duration;

/// Policy knobs for one pipeline run.
///
/// The observed service behavior has no stage timeout; `stage_timeout` is an
/// opt-in bound applied to each of the transcode, fetch, and recognition
/// awaits individually.
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    pub stage_timeout: Option<Duration>,
}

impl PipelineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage_timeout(mut self, timeout: Duration) -> Self {
        self.stage_timeout = Some(timeout);
        self
    }
}

fn is_video_mime(mime_type: &str) -> bool {
    mime_type.starts_with("video/")
}

async fn bounded<T, F>(
    timeout: Option<Duration>,
    stage: impl FnOnce(String) -> Error,
    fut: F,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match timeout {
        None => fut.await,
        Some(limit) => match tokio::time::timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => Err(stage(format!("stage timed out after {limit:?}"))),
        },
    }
}

/// Transcribe an uploaded media buffer with default options.
///
/// Video MIME types go through the transcoder first; audio MIME types are
/// submitted to the recognizer as-is. The recognizer is only invoked once the
/// transcoder has fully finalized its buffer.
pub async fn transcribe_upload(
    recognizer: &Recognizer,
    media: &[u8],
    mime_type: &str,
    language_code: &str,
) -> Result<String> {
    transcribe_upload_with_options(
        recognizer,
        media,
        mime_type,
        language_code,
        &PipelineOptions::default(),
    )
    .await
}

/// Transcribe an uploaded media buffer with custom options.
pub async fn transcribe_upload_with_options(
    recognizer: &Recognizer,
    media: &[u8],
    mime_type: &str,
    language_code: &str,
    options: &PipelineOptions,
) -> Result<String> {
    let audio = if is_video_mime(mime_type) {
        bounded(
            options.stage_timeout,
            Error::Transcode,
            transcode::extract_audio(media),
        )
        .await?
    } else {
        media.to_vec()
    };

    bounded(
        options.stage_timeout,
        Error::Recognition,
        recognizer.recognize(&audio, language_code),
    )
    .await
}

/// Transcribe a remote video URL with default options.
///
/// The URL is normalized and classified before any network access; anything
/// that is not a single playable video fails with [`Error::InvalidUrl`].
pub async fn transcribe_url(
    recognizer: &Recognizer,
    url: &str,
    language_code: &str,
) -> Result<String> {
    transcribe_url_with_options(recognizer, url, language_code, &PipelineOptions::default()).await
}

/// Transcribe a remote video URL with custom options.
pub async fn transcribe_url_with_options(
    recognizer: &Recognizer,
    url: &str,
    language_code: &str,
    options: &PipelineOptions,
) -> Result<String> {
    let url = source::normalize_url(url);

    if !source::classify(&url).is_video() {
        return Err(Error::InvalidUrl(url));
    }

    let audio = bounded(
        options.stage_timeout,
        Error::FetchStream,
        fetch::fetch_audio(&url),
    )
    .await?;

    bounded(
        options.stage_timeout,
        Error::Recognition,
        recognizer.recognize(&audio, language_code),
    )
    .await
}
