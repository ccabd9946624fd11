//! Combat server entry point.
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use combat_runtime::{CombatRecords, SessionBuilder, SessionRegistry};
use combat_server::{ServerConfig, Transport, World};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = ServerConfig::from_env();
    let _guard = setup_logging(config.resolved_log_dir().as_deref())?;

    let world = match &config.fixtures {
        Some(path) => World::load(path)
            .with_context(|| format!("failed to load fixtures from {}", path.display()))?,
        None => World::demo().context("failed to load the bundled demo world")?,
    };
    let world = Arc::new(world);

    let registry = SessionRegistry::new();
    let builder = SessionBuilder::new(registry.clone())
        .config(config.combat.clone())
        .types(world.types())
        .records(Arc::clone(&world) as Arc<dyn CombatRecords>);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    Transport::new(builder, world, config.join_timeout)
        .serve(listener, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("transport failed")?;

    let closed = registry.close_all();
    info!(closed, metrics = ?registry.metrics().snapshot(), "server shutting down");

    Ok(())
}

/// Setup logging to stderr and, when a directory is available, to a file.
fn setup_logging(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create log directory {}", dir.display()))?;
            let file_appender = tracing_appender::rolling::daily(dir, "combat-server.log");
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking_file)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    if let Some(dir) = log_dir {
        info!("Log file: {}/combat-server.log", dir.display());
    }

    Ok(guard)
}
