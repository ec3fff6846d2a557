//! TCP server.
//!
//! One tokio task per connection; within a connection, statements are
//! serialized by the blocking read loop, and across connections by the
//! database's catalog mutex.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::connection::handle_connection;
use crate::database::Database;

/// The OpalDB TCP server.
pub struct Server {
    config: ServerConfig,
    db: Arc<Database>,
}

impl Server {
    /// Creates a server over an already-opened database.
    pub fn new(config: ServerConfig, db: Arc<Database>) -> Self {
        Self { config, db }
    }

    /// Binds the configured address and serves until the task is aborted.
    pub async fn serve(&self) -> std::io::Result<()> {
        let listener = TcpListener::bind(self.config.socket_addr()).await?;
        info!(addr = %self.config.socket_addr(), "listening");
        Self::run(listener, self.db.clone()).await
    }

    /// Accept loop over an existing listener.
    pub async fn run(listener: TcpListener, db: Arc<Database>) -> std::io::Result<()> {
        loop {
            let (stream, peer) = listener.accept().await?;
            let db = db.clone();
            tokio::spawn(async move {
                debug!(%peer, "connection opened");
                if let Err(e) = handle_connection(stream, db).await {
                    warn!(%peer, error = %e, "connection error");
                }
                debug!(%peer, "connection closed");
            });
        }
    }
}
