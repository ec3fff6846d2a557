//! Table catalog.
//!
//! The catalog is the process-local registry of named tables and the only
//! shared mutable state in the system. It carries no interior locking; the
//! server serializes access with a single mutex.

use std::collections::HashMap;

use super::table::Table;
use crate::error::{SqlError, SqlResult};
use crate::schema::ColumnDef;

/// Registry mapping lower-cased table names to tables.
#[derive(Debug, Default)]
pub struct Catalog {
    tables: HashMap<String, Table>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty table.
    pub fn create_table(&mut self, name: &str, defs: Vec<ColumnDef>) -> SqlResult<()> {
        if self.tables.contains_key(name) {
            return Err(SqlError::TableAlreadyExists(name.to_string()));
        }
        self.tables.insert(name.to_string(), Table::new(name, defs));
        Ok(())
    }

    /// Removes a table, returning it.
    pub fn drop_table(&mut self, name: &str) -> SqlResult<Table> {
        self.tables
            .remove(name)
            .ok_or_else(|| SqlError::TableNotFound(name.to_string()))
    }

    /// Returns a table by name.
    pub fn table(&self, name: &str) -> SqlResult<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| SqlError::TableNotFound(name.to_string()))
    }

    /// Returns a mutable table by name.
    pub fn table_mut(&mut self, name: &str) -> SqlResult<&mut Table> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| SqlError::TableNotFound(name.to_string()))
    }

    /// Checks whether a table exists.
    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Lists all table names, sorted.
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.keys().cloned().collect();
        names.sort();
        names
    }

    /// Returns the number of tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns true if the catalog holds no tables.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
