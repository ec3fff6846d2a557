//! SQL front-end.
//!
//! Parsing is delegated to the `sqlparser` crate (PostgreSQL dialect); this
//! module converts its AST into the internal statement set the planner
//! compiles. Identifiers are folded to lower case during conversion; string
//! literals are preserved verbatim.
//!
//! # Usage
//!
//! ```
//! use opal_sql::parser::{Parser, Statement};
//!
//! let statements = Parser::parse("SELECT id FROM users; SELECT 1").unwrap();
//! assert_eq!(statements.len(), 2);
//! assert!(statements[0].is_select());
//! ```

use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser as SqlParser;
use thiserror::Error;

mod expr;
mod statement;
mod types;

pub use expr::{BinaryOperator, Expr, OrderByExpr, UnaryOperator};
pub use statement::{
    Assignment, ColumnDefStatement, CreateTableStatement, DeleteStatement, DropTableStatement,
    FromItem, InsertStatement, SelectItem, SelectStatement, Statement, UpdateStatement,
};
pub use types::{Literal, OrderDirection};

/// Errors that can occur while parsing SQL text.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Error from the underlying sqlparser crate.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// The statement parses but uses an unsupported feature.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// A literal could not be converted.
    #[error("invalid literal: {0}")]
    InvalidLiteral(String),

    /// LIMIT with a non-constant argument.
    #[error("argument of LIMIT must be a constant integer, got {0}")]
    InvalidLimit(String),

    /// Empty query text.
    #[error("empty query")]
    EmptyQuery,
}

impl From<sqlparser::parser::ParserError> for ParseError {
    fn from(err: sqlparser::parser::ParserError) -> Self {
        ParseError::Syntax(err.to_string())
    }
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// SQL parser using the PostgreSQL dialect.
pub struct Parser;

impl Parser {
    /// Parses a SQL string into a list of statements.
    pub fn parse(sql: &str) -> ParseResult<Vec<Statement>> {
        if sql.trim().is_empty() {
            return Err(ParseError::EmptyQuery);
        }

        let dialect = PostgreSqlDialect {};
        let ast = SqlParser::parse_sql(&dialect, sql)?;

        if ast.is_empty() {
            return Err(ParseError::EmptyQuery);
        }

        ast.into_iter().map(Statement::from_sql_ast).collect()
    }

    /// Parses a single SQL statement.
    pub fn parse_one(sql: &str) -> ParseResult<Statement> {
        let mut statements = Self::parse(sql)?;
        if statements.len() != 1 {
            return Err(ParseError::Syntax(format!(
                "expected 1 statement, got {}",
                statements.len()
            )));
        }
        Ok(statements.remove(0))
    }
}
