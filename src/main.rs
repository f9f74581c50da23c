use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "audiomatch",
    about = "Audio upload transcription and expected-text matching service"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Override the configured bind address
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = audiomatch_core::AppConfig::load_from_file(&cli.config)
        .with_context(|| format!("failed to load config from {:?}", cli.config))?;

    let env_filter = EnvFilter::try_new(&config.general.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::Registry::default().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(false),
    );

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    tracing::info!("audiomatch starting");

    let registry = audiomatch_engine::PluginRegistry::new();
    let mut engine = registry
        .create(&config.recognizer.engine)
        .with_context(|| format!("unknown recognizer engine '{}'", config.recognizer.engine))?;

    let engine_config = match config.recognizer.engine.as_str() {
        "google" => toml::Value::try_from(config.recognizer.google.clone().unwrap_or_default())
            .context("failed to serialize google recognizer config")?,
        _ => toml::Value::Table(Default::default()),
    };
    engine
        .initialize(engine_config)
        .await
        .with_context(|| format!("failed to initialize engine '{}'", config.recognizer.engine))?;
    let engine_name = engine.name().to_string();
    tracing::info!(
        "recognizer engine '{engine_name}' active (language: {})",
        config.recognizer.language,
    );

    let scratch_dir = config.storage.effective_scratch_dir();
    let service = audiomatch_server::AudioMatchService::new(
        scratch_dir.clone(),
        Arc::from(engine),
        config.recognizer.language.clone(),
        Duration::from_secs(config.recognizer.timeout_secs),
    )
    .with_context(|| format!("failed to create scratch dir {}", scratch_dir.display()))?;
    tracing::info!("scratch dir: {}", scratch_dir.display());

    let state = audiomatch_server::AppState {
        service: Arc::new(service),
        engine_name,
    };
    let app = audiomatch_server::router(state, config.server.max_upload_bytes);

    let bind_addr = cli.bind.unwrap_or_else(|| config.server.bind_addr.clone());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!("listening on {bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await
        .context("server error")?;

    Ok(())
}
