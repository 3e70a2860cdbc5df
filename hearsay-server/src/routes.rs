use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use hearsay::{normalize_lang_code, Error, PipelineOptions, Recognizer, DEFAULT_LANGUAGE};

/// Maximum accepted upload size (50 MB).
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Shared per-process state: the recognition client handle plus pipeline
/// policy. Each request builds its own request values, so one handle serves
/// all concurrent requests.
pub struct AppState {
    pub recognizer: Recognizer,
    pub options: PipelineOptions,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/transcribe", post(transcribe_handler))
        .route("/transcribe-youtube", post(transcribe_youtube_handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[derive(Serialize)]
struct TranscriptResponse {
    transcript: String,
}

#[derive(Deserialize)]
pub struct YoutubeRequest {
    url: Option<String>,
    #[serde(rename = "langCode")]
    lang_code: Option<String>,
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

#[tracing::instrument(skip_all)]
async fn transcribe_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Response {
    let mut media: Option<(Vec<u8>, String)> = None;
    let mut lang_code: Option<String> = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        match field.name() {
            Some("audio") => {
                let mime = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                if let Ok(bytes) = field.bytes().await {
                    if !bytes.is_empty() {
                        media = Some((bytes.to_vec(), mime));
                    }
                }
            }
            Some("langCode") => {
                lang_code = field.text().await.ok();
            }
            _ => {}
        }
    }

    let Some((bytes, mime)) = media else {
        tracing::warn!("transcribe request without media payload");
        return (StatusCode::BAD_REQUEST, "No audio or video file uploaded.").into_response();
    };

    let language = resolve_language(lang_code.as_deref());
    tracing::debug!(bytes = bytes.len(), mime = %mime, language = %language, "media upload received");

    match hearsay::transcribe_upload_with_options(
        &state.recognizer,
        &bytes,
        &mime,
        &language,
        &state.options,
    )
    .await
    {
        Ok(transcript) => (StatusCode::OK, Json(TranscriptResponse { transcript })).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "upload transcription failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Transcription failed.").into_response()
        }
    }
}

#[tracing::instrument(skip_all)]
async fn transcribe_youtube_handler(
    State(state): State<Arc<AppState>>,
    request: Result<Json<YoutubeRequest>, JsonRejection>,
) -> Response {
    // A missing or malformed body counts as no URL at all.
    let Ok(Json(request)) = request else {
        return (StatusCode::BAD_REQUEST, "No YouTube URL provided.").into_response();
    };

    let url = request.url.unwrap_or_default();
    let url = url.trim();
    if url.is_empty() {
        return (StatusCode::BAD_REQUEST, "No YouTube URL provided.").into_response();
    }

    let language = resolve_language(request.lang_code.as_deref());
    tracing::debug!(%url, language = %language, "youtube transcription requested");

    match hearsay::transcribe_url_with_options(&state.recognizer, url, &language, &state.options)
        .await
    {
        Ok(transcript) => (StatusCode::OK, Json(TranscriptResponse { transcript })).into_response(),
        Err(Error::InvalidUrl(rejected)) => {
            tracing::warn!(url = %rejected, "rejected invalid video URL");
            (StatusCode::BAD_REQUEST, "Invalid YouTube URL.").into_response()
        }
        Err(e @ (Error::Session(_) | Error::YtDlpNotFound)) => {
            tracing::error!(error = %e, "failed to open media stream");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error processing YouTube link.",
            )
                .into_response()
        }
        Err(e @ Error::FetchStream(_)) => {
            tracing::error!(error = %e, "media stream failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error fetching YouTube audio.",
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "youtube transcription failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error transcribing YouTube audio.",
            )
                .into_response()
        }
    }
}

fn resolve_language(lang_code: Option<&str>) -> String {
    let lang = lang_code
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or(DEFAULT_LANGUAGE);
    normalize_lang_code(lang)
}
