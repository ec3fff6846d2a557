//! OpalDB server daemon.
//!
//! Starts the database, replays the statement log, and serves the
//! PostgreSQL wire protocol over TCP.
//!
//! # Usage
//!
//! ```bash
//! # Defaults: 127.0.0.1:5432, replay log at ./data.db
//! opald
//!
//! # Custom address and data file
//! opald --host 0.0.0.0 --port 5433 --data-path /var/lib/opaldb/data.db
//!
//! # No persistence
//! opald --memory
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use opal_server::config::ServerConfig;
use opal_server::database::Database;
use opal_server::server::Server;

/// OpalDB server daemon
#[derive(Parser, Debug)]
#[command(
    name = "opald",
    version,
    about = "OpalDB database server",
    long_about = "OpalDB is a small in-memory SQL database speaking a subset of the\n\
                  PostgreSQL wire protocol. State is rebuilt at startup by replaying\n\
                  the statement log."
)]
struct Args {
    /// Host address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1", env = "DBMS_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short = 'p', long, default_value_t = 5432, env = "DBMS_PORT")]
    port: u16,

    /// Replay log path
    #[arg(short = 'd', long, default_value = "data.db", env = "DBMS_DATA_PATH")]
    data_path: PathBuf,

    /// Run without persistence (no replay log)
    #[arg(long)]
    memory: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", env = "DBMS_LOG_LEVEL")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let mut config = ServerConfig::new()
        .with_host(args.host)
        .with_port(args.port)
        .with_data_path(args.data_path);
    if args.memory {
        config = config.in_memory();
    }

    let db = Database::open(&config).context("failed to open database")?;
    let db = Arc::new(db);

    match &config.data_path {
        Some(path) => info!(path = %path.display(), "persistence enabled"),
        None => info!("running in memory-only mode"),
    }

    let server = Server::new(config, db);

    tokio::select! {
        result = server.serve() => {
            result.context("server error")?;
        }
        _ = shutdown_signal() => {
            info!("shutdown signal received");
        }
    }

    info!("server stopped");
    Ok(())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(format!("opal_server={level},opal_sql={level}"))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
