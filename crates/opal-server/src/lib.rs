//! # opal-server
//!
//! The OpalDB server: the database engine (catalog behind one mutex plus an
//! append-only replay log), a subset of the PostgreSQL v3 wire protocol, and
//! the TCP listener that serves it.
//!
//! The `opald` binary in `src/bin` wires these together with configuration
//! from flags and `DBMS_*` environment variables.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Server configuration
pub mod config;

/// Database engine: catalog, execution, replay
pub mod database;

/// PostgreSQL wire protocol framing
pub mod protocol;

/// Append-only statement replay log
pub mod replay;

/// TCP listener and per-connection handling
pub mod server;

mod connection;
