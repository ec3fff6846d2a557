//! In-memory tables and the relational operators that act on them.
//!
//! A [`Table`] owns its rows. Read-only plan nodes work on clones pulled out
//! of the catalog, so the operators here are free to mutate in place; the
//! DML operators run against the catalog's own table but stage their changes
//! and swap them in only after every evaluation has succeeded.

use std::cmp::Ordering;

use crate::error::{SqlError, SqlResult};
use crate::executor::{evaluate_expr, Row, Value};
use crate::parser::OrderDirection;
use crate::plan::{ProjectTarget, ScalarExpr};
use crate::schema::{ColumnDef, ColumnName, ColumnType};

/// An in-memory table.
///
/// Invariants: every row's columns equal the table's columns (projection
/// restores this before returning), and `defs` stays aligned with `columns`.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Table name; `None` for derived tables such as a cross product.
    name: Option<String>,
    /// Column names, qualified with the table name for base tables.
    columns: Vec<ColumnName>,
    /// Declared column definitions. Stored, never enforced.
    defs: Vec<ColumnDef>,
    /// Row storage.
    rows: Vec<Row>,
}

impl Table {
    /// Creates an empty base table from its column definitions.
    pub fn new(name: impl Into<String>, defs: Vec<ColumnDef>) -> Self {
        let columns: Vec<ColumnName> = defs.iter().map(|d| d.name.clone()).collect();
        Self {
            name: Some(name.into()),
            columns,
            defs,
            rows: Vec::new(),
        }
    }

    /// Creates a derived (anonymous) table.
    pub fn derived(columns: Vec<ColumnName>, defs: Vec<ColumnDef>, rows: Vec<Row>) -> Self {
        Self {
            name: None,
            columns,
            defs,
            rows,
        }
    }

    /// Returns the table name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the column names.
    pub fn columns(&self) -> &[ColumnName] {
        &self.columns
    }

    /// Returns the column definitions.
    pub fn defs(&self) -> &[ColumnDef] {
        &self.defs
    }

    /// Returns the rows.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Returns the number of rows.
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Renames the table, propagating the new name into every qualified
    /// column name in the schema and in every row.
    pub fn rename(&mut self, alias: &str) {
        self.name = Some(alias.to_string());
        for column in &mut self.columns {
            column.table = Some(alias.to_string());
        }
        for def in &mut self.defs {
            def.name.table = Some(alias.to_string());
        }
        for row in &mut self.rows {
            row.set_table_name(alias);
        }
    }

    /// Builds the cross product with another table.
    ///
    /// Columns and defs are concatenated left-then-right; rows are emitted
    /// left-major (outer loop over the left rows). The result is anonymous.
    pub fn cross_join(&self, other: &Table) -> Table {
        let mut columns = self.columns.clone();
        columns.extend(other.columns.iter().cloned());
        let mut defs = self.defs.clone();
        defs.extend(other.defs.iter().cloned());

        let mut rows = Vec::with_capacity(self.rows.len() * other.rows.len());
        for left in &self.rows {
            for right in &other.rows {
                rows.push(left.concat(right));
            }
        }

        Table::derived(columns, defs, rows)
    }

    /// Keeps exactly the rows for which the predicate evaluates to True.
    ///
    /// False and NULL both drop the row. The first evaluation error aborts
    /// with the table unchanged.
    pub fn filter(&mut self, predicate: &ScalarExpr) -> SqlResult<()> {
        let mut kept = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            if evaluate_expr(predicate, row)?.as_bool() == Some(true) {
                kept.push(row.clone());
            }
        }
        self.rows = kept;
        Ok(())
    }

    /// Projects the table onto a target list.
    ///
    /// Wildcard targets splice in every value of the row and every column of
    /// the table at that position; scalar targets append their value under
    /// the target's output name. The table's columns become the expanded
    /// name list even when there are no rows.
    pub fn project(&mut self, targets: &[ProjectTarget]) -> SqlResult<()> {
        self.validate_projection(targets)?;

        let (new_columns, new_defs) = self.projected_schema(targets);

        let mut new_rows = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let mut values = Vec::new();
            for target in targets {
                let value = evaluate_expr(&target.expr, row)?;
                if value.is_wildcard() {
                    values.extend(row.values().iter().cloned());
                } else {
                    values.push(value);
                }
            }
            let mut row = row.clone();
            row.replace(new_columns.clone(), values);
            new_rows.push(row);
        }

        self.columns = new_columns;
        self.defs = new_defs;
        self.rows = new_rows;
        Ok(())
    }

    /// Every column-reference target must resolve against this table.
    /// Wildcards and expressions are exempt.
    fn validate_projection(&self, targets: &[ProjectTarget]) -> SqlResult<()> {
        for target in targets {
            if let ScalarExpr::Column(name) = &target.expr {
                if !self.columns.iter().any(|c| name.resolves_to(c)) {
                    return Err(SqlError::ColumnNotFound(name.qualified_name()));
                }
            }
        }
        Ok(())
    }

    /// Computes the output schema of a projection, expanding wildcards.
    fn projected_schema(&self, targets: &[ProjectTarget]) -> (Vec<ColumnName>, Vec<ColumnDef>) {
        let mut columns = Vec::new();
        let mut defs = Vec::new();
        for target in targets {
            if target.name.is_wildcard() {
                columns.extend(self.columns.iter().cloned());
                defs.extend(self.defs.iter().cloned());
            } else {
                let def = self
                    .resolve(&target.name)
                    .map(|i| self.defs[i].clone())
                    .unwrap_or_else(|| {
                        ColumnDef::new(target.name.clone(), ColumnType::VarChar)
                    });
                columns.push(target.name.clone());
                defs.push(def);
            }
        }
        (columns, defs)
    }

    /// Stable sort by a single key; NULL sorts first in both directions.
    pub fn order_by(&mut self, key: &ColumnName, direction: OrderDirection) -> SqlResult<()> {
        if self.resolve(key).is_none() {
            return Err(SqlError::ColumnNotFound(key.qualified_name()));
        }

        self.rows.sort_by(|a, b| {
            let l = a.get(key).cloned().unwrap_or(Value::Null);
            let r = b.get(key).cloned().unwrap_or(Value::Null);
            match (l.is_null(), r.is_null()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                (false, false) => match direction {
                    OrderDirection::Asc => l.sort_cmp(&r),
                    OrderDirection::Desc => l.sort_cmp(&r).reverse(),
                },
            }
        });
        Ok(())
    }

    /// Keeps at most the first `count` rows.
    pub fn truncate(&mut self, count: usize) {
        if count < self.rows.len() {
            self.rows.truncate(count);
        }
    }

    /// Inserts one row per values list.
    ///
    /// An empty column list targets every column in declaration order. Every
    /// list's arity and every target column are validated before any row is
    /// appended; unmentioned positions default to NULL.
    pub fn insert(&mut self, columns: &[ColumnName], values_lists: &[Vec<Value>]) -> SqlResult<()> {
        let indexes = if columns.is_empty() {
            (0..self.columns.len()).collect::<Vec<_>>()
        } else {
            columns
                .iter()
                .map(|name| {
                    self.resolve(name)
                        .ok_or_else(|| SqlError::ColumnNotFound(name.qualified_name()))
                })
                .collect::<SqlResult<Vec<_>>>()?
        };

        for values in values_lists {
            if values.len() != indexes.len() {
                return Err(SqlError::InvalidInsertArity);
            }
        }

        for values in values_lists {
            let mut row = Row::nulls(self.columns.clone());
            for (value, &index) in values.iter().zip(&indexes) {
                row.set_value_at(index, value.clone());
            }
            self.rows.push(row);
        }
        Ok(())
    }

    /// Updates rows matching the predicate (absent ≡ all rows).
    ///
    /// Assignments apply left to right against the row as it mutates. All
    /// rows are computed before the table is swapped, so an evaluation error
    /// never leaves partial writes.
    pub fn update(
        &mut self,
        columns: &[ColumnName],
        predicate: Option<&ScalarExpr>,
        assignments: &[ScalarExpr],
    ) -> SqlResult<()> {
        for name in columns {
            if self.resolve(name).is_none() {
                return Err(SqlError::ColumnNotFound(name.qualified_name()));
            }
        }

        let mut new_rows = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let matched = match predicate {
                Some(p) => evaluate_expr(p, row)?.as_bool() == Some(true),
                None => true,
            };
            let mut row = row.clone();
            if matched {
                for (name, assignment) in columns.iter().zip(assignments) {
                    let value = evaluate_expr(assignment, &row)?;
                    row.update_value(name, value);
                }
            }
            new_rows.push(row);
        }
        self.rows = new_rows;
        Ok(())
    }

    /// Deletes rows matching the predicate (absent ≡ all rows).
    ///
    /// Every predicate evaluation completes before the table is swapped.
    pub fn delete(&mut self, predicate: Option<&ScalarExpr>) -> SqlResult<()> {
        let mut kept = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let matched = match predicate {
                Some(p) => evaluate_expr(p, row)?.as_bool() == Some(true),
                None => true,
            };
            if !matched {
                kept.push(row.clone());
            }
        }
        self.rows = kept;
        Ok(())
    }

    /// Resolves a lookup to a column index under the uniform match policy.
    fn resolve(&self, name: &ColumnName) -> Option<usize> {
        self.columns.iter().position(|c| name.resolves_to(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::BinaryOp;

    fn defs(table: &str, names: &[&str]) -> Vec<ColumnDef> {
        names
            .iter()
            .map(|n| ColumnDef::new(ColumnName::qualified(table, *n), ColumnType::Integer))
            .collect()
    }

    fn sample_table() -> Table {
        let mut t = Table::new("hoge", defs("hoge", &["id", "cid"]));
        t.insert(
            &[],
            &[
                vec![Value::integer(1), Value::integer(10)],
                vec![Value::integer(2), Value::Null],
                vec![Value::integer(3), Value::integer(30)],
            ],
        )
        .unwrap();
        t
    }

    fn col(name: &str) -> ScalarExpr {
        ScalarExpr::column(ColumnName::new(name))
    }

    #[test]
    fn test_insert_full_row() {
        let t = sample_table();
        assert_eq!(t.num_rows(), 3);
        assert_eq!(t.rows()[0].values()[0], Value::integer(1));
    }

    #[test]
    fn test_insert_partial_columns_defaults_null() {
        let mut t = Table::new("hoge", defs("hoge", &["id", "cid"]));
        t.insert(
            &[ColumnName::qualified("hoge", "cid")],
            &[vec![Value::integer(7)]],
        )
        .unwrap();
        assert_eq!(t.rows()[0].values(), &[Value::Null, Value::integer(7)]);
    }

    #[test]
    fn test_insert_arity_mismatch() {
        let mut t = Table::new("hoge", defs("hoge", &["id", "cid"]));
        let err = t
            .insert(
                &[ColumnName::qualified("hoge", "id")],
                &[vec![Value::integer(1), Value::integer(2)]],
            )
            .unwrap_err();
        assert!(matches!(err, SqlError::InvalidInsertArity));
        // Validation happens before any mutation.
        assert_eq!(t.num_rows(), 0);
    }

    #[test]
    fn test_insert_unknown_column() {
        let mut t = Table::new("hoge", defs("hoge", &["id"]));
        let err = t
            .insert(&[ColumnName::new("nope")], &[vec![Value::integer(1)]])
            .unwrap_err();
        assert!(matches!(err, SqlError::ColumnNotFound(_)));
    }

    #[test]
    fn test_filter_drops_false_and_null() {
        let mut t = sample_table();
        // cid > 5: row 2 has NULL cid, which must drop.
        let predicate = ScalarExpr::binary(col("cid"), BinaryOp::Gt, ScalarExpr::integer(5));
        t.filter(&predicate).unwrap();
        assert_eq!(t.num_rows(), 2);
    }

    #[test]
    fn test_filter_true_is_identity() {
        let mut t = sample_table();
        let before = t.rows().to_vec();
        t.filter(&ScalarExpr::Literal(Value::boolean(true))).unwrap();
        assert_eq!(t.rows(), &before[..]);
    }

    #[test]
    fn test_filter_error_leaves_table_unchanged() {
        let mut t = sample_table();
        let predicate = ScalarExpr::binary(col("nope"), BinaryOp::Gt, ScalarExpr::integer(5));
        assert!(t.filter(&predicate).is_err());
        assert_eq!(t.num_rows(), 3);
    }

    #[test]
    fn test_rename_propagates() {
        let mut t = sample_table();
        t.rename("h");
        assert_eq!(t.name(), Some("h"));
        assert!(t.columns().iter().all(|c| c.table.as_deref() == Some("h")));
        assert!(t.defs().iter().all(|d| d.name.table.as_deref() == Some("h")));
        assert_eq!(
            t.rows()[0].get(&ColumnName::qualified("h", "id")),
            Some(&Value::integer(1))
        );
    }

    #[test]
    fn test_cross_join_left_major() {
        let mut left = Table::new("a", defs("a", &["x"]));
        left.insert(&[], &[vec![Value::integer(1)], vec![Value::integer(2)]])
            .unwrap();
        let mut right = Table::new("b", defs("b", &["y"]));
        right
            .insert(&[], &[vec![Value::integer(10)], vec![Value::integer(20)]])
            .unwrap();

        let product = left.cross_join(&right);
        assert_eq!(product.name(), None);
        assert_eq!(product.columns().len(), 2);
        assert_eq!(product.defs().len(), 2);
        let firsts: Vec<_> = product
            .rows()
            .iter()
            .map(|r| r.values()[0].clone())
            .collect();
        assert_eq!(
            firsts,
            vec![
                Value::integer(1),
                Value::integer(1),
                Value::integer(2),
                Value::integer(2)
            ]
        );
    }

    #[test]
    fn test_project_star_is_identity() {
        let mut t = sample_table();
        let before = t.clone();
        t.project(&[ProjectTarget::wildcard()]).unwrap();
        assert_eq!(t.columns(), before.columns());
        assert_eq!(t.rows(), before.rows());
    }

    #[test]
    fn test_project_single_column() {
        let mut t = sample_table();
        t.project(&[ProjectTarget::new(col("cid"), ColumnName::new("cid"))])
            .unwrap();
        assert_eq!(t.columns().len(), 1);
        assert_eq!(t.defs().len(), 1);
        assert_eq!(t.rows()[1].values(), &[Value::Null]);
    }

    #[test]
    fn test_project_unknown_column() {
        let mut t = sample_table();
        let err = t
            .project(&[ProjectTarget::new(col("nope"), ColumnName::new("nope"))])
            .unwrap_err();
        assert!(matches!(err, SqlError::ColumnNotFound(_)));
    }

    #[test]
    fn test_project_empty_table_keeps_target_schema() {
        let mut t = Table::new("hoge", defs("hoge", &["id", "cid"]));
        t.project(&[ProjectTarget::new(col("id"), ColumnName::new("id"))])
            .unwrap();
        assert_eq!(t.columns().len(), 1);
        assert_eq!(t.num_rows(), 0);
    }

    #[test]
    fn test_order_by_nulls_first_both_directions() {
        for direction in [OrderDirection::Asc, OrderDirection::Desc] {
            let mut t = sample_table();
            t.order_by(&ColumnName::new("cid"), direction).unwrap();
            assert!(t.rows()[0].get(&ColumnName::new("cid")).unwrap().is_null());
        }
    }

    #[test]
    fn test_order_by_desc() {
        let mut t = sample_table();
        t.order_by(&ColumnName::new("id"), OrderDirection::Desc)
            .unwrap();
        let ids: Vec<_> = t.rows().iter().map(|r| r.values()[0].clone()).collect();
        assert_eq!(
            ids,
            vec![Value::integer(3), Value::integer(2), Value::integer(1)]
        );
    }

    #[test]
    fn test_order_by_is_stable() {
        let mut t = Table::new("t", defs("t", &["k", "v"]));
        t.insert(
            &[],
            &[
                vec![Value::integer(1), Value::integer(100)],
                vec![Value::integer(1), Value::integer(200)],
                vec![Value::integer(1), Value::integer(300)],
            ],
        )
        .unwrap();
        t.order_by(&ColumnName::new("k"), OrderDirection::Asc)
            .unwrap();
        let vs: Vec<_> = t.rows().iter().map(|r| r.values()[1].clone()).collect();
        assert_eq!(
            vs,
            vec![Value::integer(100), Value::integer(200), Value::integer(300)]
        );
    }

    #[test]
    fn test_order_by_unknown_key() {
        let mut t = sample_table();
        assert!(t
            .order_by(&ColumnName::new("nope"), OrderDirection::Asc)
            .is_err());
    }

    #[test]
    fn test_truncate() {
        let mut t = sample_table();
        t.truncate(10);
        assert_eq!(t.num_rows(), 3);
        t.truncate(1);
        assert_eq!(t.num_rows(), 1);
        t.truncate(0);
        assert_eq!(t.num_rows(), 0);
    }

    #[test]
    fn test_update_with_predicate() {
        let mut t = sample_table();
        let predicate = col("id").eq(ScalarExpr::integer(1));
        t.update(
            &[ColumnName::new("cid")],
            Some(&predicate),
            &[ScalarExpr::integer(99)],
        )
        .unwrap();
        assert_eq!(t.rows()[0].values()[1], Value::integer(99));
        assert_eq!(t.rows()[1].values()[1], Value::Null);
    }

    #[test]
    fn test_update_without_predicate_hits_all() {
        let mut t = sample_table();
        t.update(&[ColumnName::new("cid")], None, &[ScalarExpr::integer(0)])
            .unwrap();
        assert!(t
            .rows()
            .iter()
            .all(|r| r.values()[1] == Value::integer(0)));
    }

    #[test]
    fn test_update_sees_earlier_assignments() {
        let mut t = sample_table();
        // SET id = 100, cid = id: the second assignment reads the new id.
        t.update(
            &[ColumnName::new("id"), ColumnName::new("cid")],
            None,
            &[ScalarExpr::integer(100), col("id")],
        )
        .unwrap();
        assert_eq!(t.rows()[0].values()[1], Value::integer(100));
    }

    #[test]
    fn test_update_unknown_column() {
        let mut t = sample_table();
        let err = t
            .update(&[ColumnName::new("nope")], None, &[ScalarExpr::integer(1)])
            .unwrap_err();
        assert!(matches!(err, SqlError::ColumnNotFound(_)));
    }

    #[test]
    fn test_delete_with_predicate() {
        let mut t = sample_table();
        let predicate = col("id").eq(ScalarExpr::integer(2));
        t.delete(Some(&predicate)).unwrap();
        assert_eq!(t.num_rows(), 2);
    }

    #[test]
    fn test_delete_null_predicate_keeps_row() {
        let mut t = sample_table();
        // cid = 10 is NULL for the row with NULL cid; NULL does not delete.
        let predicate = col("cid").eq(ScalarExpr::integer(10));
        t.delete(Some(&predicate)).unwrap();
        assert_eq!(t.num_rows(), 2);
    }

    #[test]
    fn test_delete_all() {
        let mut t = sample_table();
        t.delete(None).unwrap();
        assert_eq!(t.num_rows(), 0);
    }
}
