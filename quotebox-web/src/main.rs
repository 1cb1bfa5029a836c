//! quotebox-web - Quote service
//!
//! Serves weighted random quotes, votes, rankings and the submission form
//! over HTTP, backed by a single SQLite database.

use anyhow::{Context, Result};
use clap::Parser;
use quotebox_common::config::{
    CliOverrides, ServiceConfig, ENV_BIND, ENV_CONFIG, ENV_DATABASE, ENV_STAFF_PASSWORD,
};
use quotebox_common::db::init_database;
use quotebox_web::{build_router, AppState};
use std::path::PathBuf;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "quotebox-web")]
#[command(about = "Random quotes with votes and rankings")]
#[command(version)]
struct Args {
    /// Path to config.toml
    #[arg(short, long, env = ENV_CONFIG)]
    config: Option<PathBuf>,

    /// SQLite database file
    #[arg(short, long, env = ENV_DATABASE)]
    database: Option<PathBuf>,

    /// Address to listen on, e.g. 127.0.0.1:8000
    #[arg(short, long, env = ENV_BIND)]
    bind: Option<String>,

    /// Password for the staff login (staff access disabled when unset)
    #[arg(long, env = ENV_STAFF_PASSWORD, hide_env_values = true)]
    staff_password: Option<String>,
}

impl Args {
    fn overrides(self) -> CliOverrides {
        CliOverrides {
            config: self.config,
            database: self.database,
            bind: self.bind,
            staff_password: self.staff_password,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let (config, config_file) = ServiceConfig::resolve(&args.overrides());

    let default_filter = format!(
        "quotebox_web={level},quotebox_common={level},tower_http={level}",
        level = config.log_level
    );
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Build identification first, before any database delay
    info!(
        "Starting quotebox-web v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    config_file.log();
    info!("Database path: {}", config.database_path.display());
    if config.staff_password.is_none() {
        warn!("No staff password configured; staff login and /api/settings are disabled");
    }

    let pool = init_database(&config.database_path)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_path.display()))?;

    let state = AppState::new(pool, config.staff_password, config.public_base_url);
    let settings = state
        .settings
        .reload(&state.db)
        .await
        .context("Failed to load settings")?;
    info!("Submission mode: {}", settings.current_mode());

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("quotebox-web listening on http://{}", config.bind_addr);
    info!("Health check: http://{}/health", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("quotebox-web stopped");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
