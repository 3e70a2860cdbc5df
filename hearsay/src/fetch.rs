use std::process::Stdio;

use futures_util::StreamExt;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::pipeline::CompletionSlot;
use crate::transcode::truncate;

/// Stream the audio track of a validated video URL into memory via yt-dlp.
///
/// yt-dlp writes the best audio stream to stdout (`-o -`); chunks are
/// accumulated in arrival order and nothing ever touches disk. Three
/// terminal outcomes are distinguished:
/// - normal completion: the finalized buffer is returned,
/// - mid-stream failure (process died after the first byte): `FetchStream`,
/// - session-establishment failure (spawn error, missing binary, or exit
///   before any byte was produced): `Session` / `YtDlpNotFound`.
///
/// # Security
/// The URL must already have passed `source::classify`; it is handed to
/// yt-dlp via `.arg()` (no shell expansion) and `--no-exec` prevents any
/// post-processing commands.
pub async fn fetch_audio(url: &str) -> Result<Vec<u8>> {
    info!(%url, "opening remote audio stream");

    let mut child = Command::new("yt-dlp")
        .args([
            "-f",
            "bestaudio",
            "--no-playlist",
            "--no-exec",
            "--quiet",
            "--no-progress",
            "-o",
            "-",
        ])
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::YtDlpNotFound
            } else {
                Error::Session(format!("failed to start yt-dlp: {e}"))
            }
        })?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| Error::Session("yt-dlp stdout not captured".into()))?;
    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| Error::Session("yt-dlp stderr not captured".into()))?;

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
                outcome.try_complete(Error::FetchStream(format!("stream read failed: {e}")));
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
        .map_err(|e| Error::Session(format!("failed to wait for yt-dlp: {e}")))?;
    let stderr_text = stderr_task.await.unwrap_or_default();

    if !status.success() {
        let detail = truncate(&stderr_text, 1000);
        if audio.is_empty() {
            outcome.try_complete(Error::Session(format!(
                "yt-dlp failed before streaming: {detail}"
            )));
        } else {
            outcome.try_complete(Error::FetchStream(format!(
                "yt-dlp failed mid-stream: {detail}"
            )));
        }
    }

    if audio.is_empty() {
        outcome.try_complete(Error::Session("no audio data received".into()));
    }

    if let Some(error) = outcome.take() {
        return Err(error);
    }

    debug!(bytes = audio.len(), "remote audio stream complete");
    Ok(audio)
}
