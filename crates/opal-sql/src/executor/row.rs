//! Row representation.
//!
//! A row carries its own column names alongside its values, kept aligned at
//! all times. Rows travel between operators by value; read-only operators
//! work on deep copies so the catalog is never aliased.

use std::fmt;

use super::Value;
use crate::schema::ColumnName;

/// A single row: aligned column-name and value vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Vec<ColumnName>,
    values: Vec<Value>,
}

impl Row {
    /// Creates a new row. The two vectors must have equal length.
    pub fn new(columns: Vec<ColumnName>, values: Vec<Value>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    /// Creates an empty row, used to evaluate constant expressions.
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Creates a row of the given width filled with NULLs.
    pub fn nulls(columns: Vec<ColumnName>) -> Self {
        let values = vec![Value::Null; columns.len()];
        Self { columns, values }
    }

    /// Returns the number of columns.
    pub fn num_columns(&self) -> usize {
        self.values.len()
    }

    /// Returns the column names.
    pub fn columns(&self) -> &[ColumnName] {
        &self.columns
    }

    /// Returns the values.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Consumes the row and returns the values.
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Returns the value at the given position.
    pub fn value_at(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Sets the value at the given position.
    pub fn set_value_at(&mut self, index: usize, value: Value) {
        if index < self.values.len() {
            self.values[index] = value;
        }
    }

    /// Looks up a value by column name.
    ///
    /// Scans left to right and returns the first column the lookup resolves
    /// to under the uniform match policy (qualified lookups require the
    /// table part to match, unqualified lookups match by name alone).
    pub fn get(&self, name: &ColumnName) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| name.resolves_to(c))
            .and_then(|i| self.values.get(i))
    }

    /// Rewrites every position the lookup resolves to.
    pub fn update_value(&mut self, name: &ColumnName, value: Value) {
        for (i, column) in self.columns.iter().enumerate() {
            if name.resolves_to(column) {
                self.values[i] = value.clone();
            }
        }
    }

    /// Replaces the column names and values wholesale.
    pub fn replace(&mut self, columns: Vec<ColumnName>, values: Vec<Value>) {
        debug_assert_eq!(columns.len(), values.len());
        self.columns = columns;
        self.values = values;
    }

    /// Rewrites the table part of every column name.
    pub fn set_table_name(&mut self, table: &str) {
        for column in &mut self.columns {
            column.table = Some(table.to_string());
        }
    }

    /// Concatenates this row with another, for the cross product.
    pub fn concat(&self, other: &Row) -> Row {
        let mut columns = self.columns.clone();
        columns.extend(other.columns.iter().cloned());
        let mut values = self.values.clone();
        values.extend(other.values.iter().cloned());
        Row { columns, values }
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", value)?;
        }
        write!(f, ")")
    }
}
