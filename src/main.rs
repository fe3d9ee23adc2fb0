use anyhow::{Context, Result};
use clap::Parser;
use livecap_core::{AppConfig, SessionIdentity};
use livecap_grpc::GrpcTransport;
use livecap_stream::TranscribeSession;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "livecap",
    about = "Streams a local audio file to Cloud Speech-to-Text and prints final transcripts"
)]
struct Cli {
    /// Google Cloud project that owns the recognizer
    project_id: String,

    /// Path to a local audio file: raw 16-bit signed little-endian PCM,
    /// 16 kHz sample rate, mono
    audio_file: PathBuf,

    /// Path to an optional configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from_file(path)
            .with_context(|| format!("failed to load config from {path:?}"))?,
        None => AppConfig::default(),
    };

    let env_filter =
        EnvFilter::try_new(&config.general.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let identity = SessionIdentity::new(&cli.project_id);
    let settings = config.recognition.settings();
    let policy = config.stream.pump_policy();

    let token = config
        .auth
        .access_token
        .clone()
        .or_else(|| std::env::var("GOOGLE_ACCESS_TOKEN").ok())
        .unwrap_or_default();
    let transport = GrpcTransport::new(&config.stream.endpoint, &token)
        .context("failed to set up speech transport")?;

    let source = tokio::fs::File::open(&cli.audio_file)
        .await
        .with_context(|| format!("failed to open audio file {:?}", cli.audio_file))?;

    let mut session = TranscribeSession::new(identity, settings, policy);
    let mut results = session
        .take_result_receiver()
        .expect("fresh session has a result receiver");

    let printer = tokio::spawn(async move {
        while let Some(transcript) = results.recv().await {
            println!("{} (final: {})", transcript.text, transcript.is_final);
        }
    });

    tracing::info!(recognizer = %session.identity().recognizer(), "starting streaming recognition");
    let summary = session
        .run(&transport, source)
        .await
        .context("streaming recognition failed")?;

    // Closing the session drops the transcript sender so the printer drains.
    drop(session);
    printer.await.context("transcript printer task failed")?;

    tracing::info!(
        frames = summary.frames_sent,
        bytes = summary.bytes_sent,
        finals = summary.finals_emitted,
        "session complete",
    );
    Ok(())
}
