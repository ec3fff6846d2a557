//! Error types shared across the compilation and evaluation pipeline.

use thiserror::Error;

use crate::parser::ParseError;

/// Errors produced while compiling or evaluating a statement.
///
/// The first error aborts the current statement. Mutating plan nodes
/// validate their inputs before touching the catalog, so a failed statement
/// never leaves a table half-written.
#[derive(Debug, Error)]
pub enum SqlError {
    /// CREATE TABLE with a name already present in the catalog.
    #[error("relation \"{0}\" already exists")]
    TableAlreadyExists(String),

    /// A statement referenced a table the catalog does not contain.
    #[error("relation \"{0}\" does not exist")]
    TableNotFound(String),

    /// An expression or target list referenced an unknown column.
    #[error("column \"{0}\" does not exist")]
    ColumnNotFound(String),

    /// The same table name appeared twice in one FROM clause.
    #[error("table name \"{0}\" specified more than once")]
    TableSpecifiedTwice(String),

    /// A VALUES list does not match the insert column list.
    #[error("INSERT value list does not match target columns")]
    InvalidInsertArity,

    /// The statement parses but uses a feature outside the subset.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// The statement text could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Expression evaluation failed.
    #[error("{0}")]
    Eval(String),
}

impl SqlError {
    /// Shorthand for an evaluation error with a formatted message.
    pub fn eval(msg: impl Into<String>) -> Self {
        SqlError::Eval(msg.into())
    }
}

/// Result type for compilation and evaluation.
pub type SqlResult<T> = Result<T, SqlError>;
