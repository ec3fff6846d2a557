//! The database engine.
//!
//! [`Database`] owns the catalog behind a single mutex (every statement
//! executes under it, serializing concurrent connections) and the optional
//! replay log. On open, the log is replayed to rebuild the catalog.

use std::path::Path;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{info, warn};

use opal_sql::executor::ResultSet;
use opal_sql::parser::Parser;
use opal_sql::plan::build_plan;
use opal_sql::storage::Catalog;
use opal_sql::SqlError;

use crate::config::ServerConfig;
use crate::replay::ReplayLog;

/// Errors surfaced by the database engine.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Compilation or evaluation failed.
    #[error(transparent)]
    Sql(#[from] SqlError),

    /// The replay log could not be read or written.
    #[error("replay log error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of one executed statement.
#[derive(Debug)]
pub enum StatementOutcome {
    /// A statement that produced a result table.
    Query(ResultSet),
    /// A DDL/DML statement that completed without a result table.
    Command,
}

/// The in-memory database with optional write-ahead persistence.
pub struct Database {
    catalog: Mutex<Catalog>,
    replay: Option<Mutex<ReplayLog>>,
}

impl Database {
    /// Opens a database, replaying the statement log when the configuration
    /// names one. Unreplayable statements are logged and skipped so a
    /// damaged log never prevents startup.
    pub fn open(config: &ServerConfig) -> Result<Self, DatabaseError> {
        let mut catalog = Catalog::new();

        let replay = match &config.data_path {
            Some(path) => {
                let log = ReplayLog::open(path);
                replay_into(&mut catalog, &log, path)?;
                Some(Mutex::new(log))
            }
            None => None,
        };

        Ok(Self {
            catalog: Mutex::new(catalog),
            replay,
        })
    }

    /// Opens a database with no persistence.
    pub fn in_memory() -> Self {
        Self {
            catalog: Mutex::new(Catalog::new()),
            replay: None,
        }
    }

    /// Executes SQL text, which may contain several `;`-separated
    /// statements. Statements run in order under the catalog lock; the
    /// first error aborts the remainder. When every statement succeeded and
    /// at least one was a write, the raw text is appended to the replay
    /// log.
    pub fn execute(&self, sql: &str) -> Result<Vec<StatementOutcome>, DatabaseError> {
        let statements = Parser::parse(sql).map_err(SqlError::from)?;

        let mut outcomes = Vec::with_capacity(statements.len());
        let mut wrote = false;
        {
            let mut catalog = self.catalog.lock();
            for statement in &statements {
                let plan = build_plan(statement)?;
                match plan.eval(&mut catalog)? {
                    Some(table) => outcomes.push(StatementOutcome::Query(ResultSet::from_table(
                        &table,
                    ))),
                    None => outcomes.push(StatementOutcome::Command),
                }
                if statement.is_write() {
                    wrote = true;
                }
            }
        }

        if wrote {
            if let Some(replay) = &self.replay {
                replay.lock().append(sql)?;
            }
        }

        Ok(outcomes)
    }

    /// Lists the catalog's table names, sorted.
    pub fn table_names(&self) -> Vec<String> {
        self.catalog.lock().table_names()
    }

    /// Describes a table as `(column name, declared type)` pairs.
    pub fn describe(&self, table: &str) -> Result<Vec<(String, String)>, DatabaseError> {
        let catalog = self.catalog.lock();
        let table = catalog.table(table)?;
        Ok(table
            .defs()
            .iter()
            .map(|def| (def.name.name.clone(), def.data_type.to_string()))
            .collect())
    }
}

/// Replays the statement log into a fresh catalog.
fn replay_into(catalog: &mut Catalog, log: &ReplayLog, path: &Path) -> Result<(), DatabaseError> {
    let statements = log.statements()?;
    if statements.is_empty() {
        return Ok(());
    }

    info!(count = statements.len(), path = %path.display(), "replaying statement log");
    for sql in &statements {
        let result = Parser::parse_one(sql)
            .map_err(SqlError::from)
            .and_then(|statement| build_plan(&statement)?.eval(catalog).map(|_| ()));
        if let Err(e) = result {
            warn!(error = %e, statement = %sql, "skipping unreplayable statement");
        }
    }
    Ok(())
}
