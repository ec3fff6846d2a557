//! Server configuration.

use std::env;
use std::path::PathBuf;

/// Default listen host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default listen port.
pub const DEFAULT_PORT: u16 = 5432;

/// Default replay log path.
pub const DEFAULT_DATA_PATH: &str = "data.db";

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Replay log path; `None` disables persistence.
    pub data_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            data_path: Some(PathBuf::from(DEFAULT_DATA_PATH)),
        }
    }
}

impl ServerConfig {
    /// Creates a default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a configuration from the `DBMS_HOST`, `DBMS_PORT`, and
    /// `DBMS_DATA_PATH` environment variables, defaulting where unset.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(host) = env::var("DBMS_HOST") {
            if !host.is_empty() {
                config.host = host;
            }
        }
        if let Ok(port) = env::var("DBMS_PORT") {
            if let Ok(port) = port.parse() {
                config.port = port;
            }
        }
        if let Ok(path) = env::var("DBMS_DATA_PATH") {
            if !path.is_empty() {
                config.data_path = Some(PathBuf::from(path));
            }
        }
        config
    }

    /// Sets the host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the replay log path.
    pub fn with_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = Some(path.into());
        self
    }

    /// Disables persistence.
    pub fn in_memory(mut self) -> Self {
        self.data_path = None;
        self
    }

    /// Returns the socket address string.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 5432);
        assert_eq!(config.data_path, Some(PathBuf::from("data.db")));
    }

    #[test]
    fn test_builders() {
        let config = ServerConfig::new()
            .with_host("0.0.0.0")
            .with_port(5433)
            .in_memory();
        assert_eq!(config.socket_addr(), "0.0.0.0:5433");
        assert!(config.data_path.is_none());
    }
}
