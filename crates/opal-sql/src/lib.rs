//! # opal-sql
//!
//! SQL compiler and evaluator for OpalDB.
//!
//! This crate implements:
//! - SQL parsing (PostgreSQL-compatible, via `sqlparser`)
//! - Compilation into a relational-algebra plan
//! - Plan and expression evaluation against an in-memory catalog
//! - The value, row, table, and catalog model
//!
//! The pipeline is `parser` → `plan::build_plan` → `Plan::eval`:
//!
//! ```
//! use opal_sql::parser::Parser;
//! use opal_sql::plan::build_plan;
//! use opal_sql::storage::Catalog;
//!
//! let mut catalog = Catalog::new();
//! for sql in [
//!     "CREATE TABLE users (id int, name varchar(255))",
//!     "INSERT INTO users VALUES (1, 'alice')",
//! ] {
//!     let stmt = Parser::parse_one(sql).unwrap();
//!     build_plan(&stmt).unwrap().eval(&mut catalog).unwrap();
//! }
//!
//! let stmt = Parser::parse_one("SELECT * FROM users").unwrap();
//! let table = build_plan(&stmt).unwrap().eval(&mut catalog).unwrap();
//! assert_eq!(table.unwrap().rows().len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// SQL front-end over `sqlparser`
pub mod parser;

/// Relational-algebra plan and compiled expressions
pub mod plan;

/// Value model, expression evaluator, result shaping
pub mod executor;

/// In-memory tables and the catalog
pub mod storage;

/// Column names and column definitions
pub mod schema;

mod error;

pub use error::{SqlError, SqlResult};
