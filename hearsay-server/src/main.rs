use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;

use hearsay::{PipelineOptions, Recognizer};
use hearsay_server::{create_router, AppState};

#[derive(Parser)]
#[command(name = "hearsay-server", about = "Speech transcription HTTP service")]
struct Cli {
    /// Port to listen on.
    #[arg(long, env = "PORT", default_value = "3000")]
    port: u16,

    /// API key for the speech recognition backend.
    #[arg(long, env = "GOOGLE_SPEECH_API_KEY")]
    api_key: String,

    /// Override the recognition backend base URL (testing/proxies).
    #[arg(long, env = "SPEECH_ENDPOINT")]
    speech_endpoint: Option<String>,

    /// Per-stage timeout in seconds (no timeout if unset).
    #[arg(long, env = "STAGE_TIMEOUT_SECS")]
    stage_timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new("info,hearsay=debug,tower_http=debug")
                }),
        )
        .with_writer(std::io::stderr)
        .init();

    let recognizer = match &cli.speech_endpoint {
        Some(endpoint) => Recognizer::with_base_url(&cli.api_key, endpoint),
        None => Recognizer::new(&cli.api_key),
    };

    let mut options = PipelineOptions::new();
    if let Some(secs) = cli.stage_timeout_secs {
        options = options.stage_timeout(Duration::from_secs(secs));
    }

    let state = Arc::new(AppState {
        recognizer,
        options,
    });
    let router = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, router).await?;

    Ok(())
}
