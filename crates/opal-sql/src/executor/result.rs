//! Result shaping.
//!
//! Converts the table produced by a query plan into the flat column-label +
//! record-list form the transport and the REPL consume.

use super::Value;
use crate::storage::Table;

/// A shaped query result: column labels plus value rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    /// Unqualified column labels. Empty string for unaliased expressions.
    pub columns: Vec<String>,
    /// One vector of values per row.
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    /// Shapes a result table: each column label is the unqualified name
    /// part; values pass through unchanged (the transport stringifies
    /// non-null values and encodes NULL as the wire null marker).
    pub fn from_table(table: &Table) -> Self {
        let columns = table.columns().iter().map(|c| c.name.clone()).collect();
        let rows = table
            .rows()
            .iter()
            .map(|row| row.values().to_vec())
            .collect();
        Self { columns, rows }
    }

    /// Returns the number of rows.
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the result holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnDef, ColumnName, ColumnType};
    use crate::storage::Table;

    #[test]
    fn test_from_table_unqualifies_names() {
        let mut table = Table::new(
            "hoge",
            vec![
                ColumnDef::new(ColumnName::qualified("hoge", "id"), ColumnType::Integer),
                ColumnDef::new(ColumnName::qualified("hoge", "name"), ColumnType::VarChar),
            ],
        );
        table
            .insert(&[], &[vec![Value::integer(1), Value::text("taro")]])
            .unwrap();

        let result = ResultSet::from_table(&table);
        assert_eq!(result.columns, vec!["id", "name"]);
        assert_eq!(result.rows, vec![vec![Value::integer(1), Value::text("taro")]]);
        assert_eq!(result.num_rows(), 1);
    }

    #[test]
    fn test_empty_table() {
        let table = Table::new("t", Vec::new());
        let result = ResultSet::from_table(&table);
        assert!(result.is_empty());
        assert!(result.columns.is_empty());
    }
}
