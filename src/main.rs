use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use study_mate::{
    create_router, AppState, Config, JsonLogStore, NatsClient, NatsNotifier, Notifier,
    StudyHall, TracingNotifier,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "study-mate", about = "Study session tracker for chat communities")]
struct Args {
    /// Config file, without extension
    #[arg(short, long, default_value = "config/study-mate")]
    config: String,

    /// Override the study log location
    #[arg(long)]
    log_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut cfg = Config::load(&args.config)?;
    if let Some(path) = args.log_path {
        cfg.study.log_path = path;
    }

    info!("Study Mate v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded config: {}", cfg.service.name);

    let log = Arc::new(JsonLogStore::new(cfg.study.log_path.clone()));

    let (hall, voice_listener) = if cfg.nats.enabled {
        let notifier = Arc::new(NatsNotifier::new(NatsClient::connect(&cfg.nats.url).await?));
        let hall = StudyHall::new(&cfg.study, log, notifier.clone() as Arc<dyn Notifier>)?;
        let listener = notifier.client().spawn_voice_listener(hall.clone()).await?;
        (hall, Some(listener))
    } else {
        info!("NATS disabled, notifications go to the log");
        let hall = StudyHall::new(&cfg.study, log, Arc::new(TracingNotifier))?;
        (hall, None)
    };

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, create_router(AppState::new(hall.clone())))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutdown requested");
        })
        .await
        .context("HTTP server failed")?;

    hall.shutdown();
    if let Some(listener) = voice_listener {
        listener.abort();
    }

    Ok(())
}
