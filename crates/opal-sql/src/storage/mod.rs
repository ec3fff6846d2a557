//! In-memory storage: tables and the catalog.
//!
//! The catalog owns base tables. Plan evaluation derives working tables by
//! cloning, so read-only operators never alias catalog state; only the DML
//! nodes mutate the catalog's own tables.

mod catalog;
mod table;

pub use catalog::Catalog;
pub use table::Table;
