//! Column names and column definitions.
//!
//! A [`ColumnName`] is an optionally table-qualified identifier. Both parts
//! are folded to lower case by the parser; string literals are never folded.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A column identifier with an optional table qualifier.
///
/// `table` is `None` for unqualified references and for columns produced by
/// expressions. The special name `*` is the star sentinel used only in
/// select lists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnName {
    /// Optional table or alias qualifier.
    pub table: Option<String>,
    /// Column name.
    pub name: String,
}

impl ColumnName {
    /// Creates an unqualified column name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            table: None,
            name: name.into(),
        }
    }

    /// Creates a table-qualified column name.
    pub fn qualified(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            name: name.into(),
        }
    }

    /// Creates the star sentinel (`*`).
    pub fn wildcard() -> Self {
        Self::new("*")
    }

    /// Creates the anonymous name used for expression targets.
    pub fn anonymous() -> Self {
        Self::new("")
    }

    /// Returns true if this is the star sentinel.
    pub fn is_wildcard(&self) -> bool {
        self.name == "*"
    }

    /// Returns true if this is an anonymous (expression) name.
    pub fn is_anonymous(&self) -> bool {
        self.name.is_empty()
    }

    /// Returns true if this column has a table qualifier.
    pub fn is_qualified(&self) -> bool {
        self.table.is_some()
    }

    /// Returns the fully qualified name.
    pub fn qualified_name(&self) -> String {
        match &self.table {
            Some(t) => format!("{}.{}", t, self.name),
            None => self.name.clone(),
        }
    }

    /// Returns true if this stored column matches the given lookup.
    ///
    /// A lookup with a table part matches only columns carrying the same
    /// table part; an unqualified lookup matches by name alone. This single
    /// policy drives row access, row update, projection validation, and
    /// ORDER BY key validation.
    pub fn matches(&self, table: Option<&str>, name: &str) -> bool {
        if self.name != name {
            return false;
        }
        match (table, &self.table) {
            (Some(q), Some(t)) => q == t,
            (None, _) => true,
            (Some(_), None) => false,
        }
    }

    /// Returns true if this lookup resolves to the given stored column.
    pub fn resolves_to(&self, column: &ColumnName) -> bool {
        column.matches(self.table.as_deref(), &self.name)
    }
}

impl fmt::Display for ColumnName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualified_name())
    }
}

/// Declared column type.
///
/// Stored in the catalog and surfaced by the CLI, never enforced against
/// inserted values. Unknown declared types map to `Integer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    /// Integer type (INT, INTEGER, BIGINT, SMALLINT).
    Integer,
    /// Character type (VARCHAR, CHAR, TEXT).
    VarChar,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Integer => write!(f, "integer"),
            ColumnType::VarChar => write!(f, "varchar"),
        }
    }
}

/// A column definition: qualified name plus declared type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Qualified column name.
    pub name: ColumnName,
    /// Declared type.
    pub data_type: ColumnType,
}

impl ColumnDef {
    /// Creates a new column definition.
    pub fn new(name: ColumnName, data_type: ColumnType) -> Self {
        Self { name, data_type }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_name() {
        let col = ColumnName::new("id");
        assert_eq!(col.qualified_name(), "id");
        assert!(!col.is_qualified());

        let qcol = ColumnName::qualified("users", "id");
        assert_eq!(qcol.qualified_name(), "users.id");
        assert!(qcol.is_qualified());
    }

    #[test]
    fn test_column_matches() {
        let col = ColumnName::qualified("users", "id");
        assert!(col.matches(Some("users"), "id"));
        assert!(col.matches(None, "id"));
        assert!(!col.matches(Some("orders"), "id"));
        assert!(!col.matches(None, "name"));

        let unqualified = ColumnName::new("id");
        assert!(unqualified.matches(None, "id"));
        assert!(!unqualified.matches(Some("users"), "id"));
    }

    #[test]
    fn test_resolves_to() {
        let stored = ColumnName::qualified("hoge", "name");
        assert!(ColumnName::new("name").resolves_to(&stored));
        assert!(ColumnName::qualified("hoge", "name").resolves_to(&stored));
        assert!(!ColumnName::qualified("fuga", "name").resolves_to(&stored));
    }

    #[test]
    fn test_wildcard_sentinel() {
        assert!(ColumnName::wildcard().is_wildcard());
        assert!(!ColumnName::new("star").is_wildcard());
        assert!(ColumnName::anonymous().is_anonymous());
    }

    #[test]
    fn test_display() {
        assert_eq!(ColumnName::qualified("t", "c").to_string(), "t.c");
        assert_eq!(ColumnName::new("c").to_string(), "c");
        assert_eq!(ColumnType::Integer.to_string(), "integer");
    }
}
