use std::process::Stdio;

use futures_util::StreamExt;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::pipeline::CompletionSlot;
use crate::recognize::ENCODING_PROFILE;

/// Strip the video track from an uploaded buffer and re-encode the audio to
/// the fixed recognition profile (opus in webm, 48kHz stereo).
///
/// ffmpeg runs with piped stdin/stdout: a spawned task pushes the input while
/// this task drains output chunks, so neither side can deadlock on a full
/// pipe. The accumulated buffer is only handed back after the process exits
/// cleanly — a failing transcode never yields partial output.
pub async fn extract_audio(input: &[u8]) -> Result<Vec<u8>> {
    info!(bytes = input.len(), "extracting audio track");

    let mut child = Command::new("ffmpeg")
        .args([
            "-hide_banner",
            "-loglevel",
            "error",
            "-i",
            "pipe:0",
            "-vn",
            "-acodec",
            "libopus",
            "-ar",
            &ENCODING_PROFILE.sample_rate_hz.to_string(),
            "-ac",
            &ENCODING_PROFILE.channels.to_string(),
            "-f",
            "webm",
            "pipe:1",
        ])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Transcode("ffmpeg not found — install with: apt install ffmpeg".into())
            } else {
                Error::Transcode(format!("failed to run ffmpeg: {e}"))
            }
        })?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| Error::Transcode("ffmpeg stdin not captured".into()))?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| Error::Transcode("ffmpeg stdout not captured".into()))?;
    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| Error::Transcode("ffmpeg stderr not captured".into()))?;

    // Push the input from its own task. A write error (ffmpeg died early)
    // is not terminal by itself — the exit status is authoritative.
    let input_owned = input.to_vec();
    let writer = tokio::spawn(async move {
        let result = stdin.write_all(&input_owned).await;
        drop(stdin);
        result
    });

    // Drain stderr concurrently so ffmpeg can never block on a full pipe.
    let stderr_task = tokio::spawn(async move {
        let mut text = String::new();
        let _ = stderr.read_to_string(&mut text).await;
        text
    });

    let outcome: CompletionSlot<Error> = CompletionSlot::new();
    let mut audio = Vec::new();
    let mut chunks = ReaderStream::new(stdout);

    while let Some(chunk) = chunks.next().await {
        match chunk {
            Ok(bytes) => audio.extend_from_slice(&bytes),
            Err(e) => {
                outcome.try_complete(Error::Transcode(format!("output stream failed: {e}")));
                break;
            }
        }
    }

    // Close our end of the pipe before waiting so a child still writing
    // after a read failure cannot block on a full pipe.
    drop(chunks);

    let status = child
        .wait()
        .await
        .map_err(|e| Error::Transcode(format!("failed to wait for ffmpeg: {e}")))?;
    let _ = writer.await;
    let stderr_text = stderr_task.await.unwrap_or_default();

    if !status.success() {
        outcome.try_complete(Error::Transcode(format!(
            "ffmpeg failed: {}",
            truncate(&stderr_text, 1000)
        )));
    }

    if audio.is_empty() {
        outcome.try_complete(Error::Transcode("ffmpeg produced no output".into()));
    }

    if let Some(error) = outcome.take() {
        return Err(error);
    }

    debug!(bytes = audio.len(), "audio track extracted");
    Ok(audio)
}

pub(crate) fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
