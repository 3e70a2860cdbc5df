/// All errors that can occur in hearsay.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid video URL: {0}")]
    InvalidUrl(String),

    #[error("audio transcoding error: {0}")]
    Transcode(String),

    #[error("failed to open media stream: {0}")]
    Session(String),

    #[error("yt-dlp not found — install with: pip install yt-dlp")]
    YtDlpNotFound,

    #[error("media stream error: {0}")]
    FetchStream(String),

    #[error("recognition error: {0}")]
    Recognition(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
