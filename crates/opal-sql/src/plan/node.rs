//! Relational-algebra plan nodes and their evaluation.
//!
//! [`Plan`] is the closed set of operators the builder emits. Evaluation is
//! a single pass over the tree; nodes carry no state between calls, and the
//! catalog is the only mutable shared state. `Ok(None)` means the statement
//! produced no result table (DDL/DML success).

use std::collections::HashSet;

use super::expr::{ProjectTarget, ScalarExpr};
use crate::error::{SqlError, SqlResult};
use crate::executor::{evaluate_expr, Row, Value};
use crate::parser::OrderDirection;
use crate::schema::{ColumnDef, ColumnName, ColumnType};
use crate::storage::{Catalog, Table};

/// A relational-algebra plan node.
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    /// Reads a base table out of the catalog (by clone).
    Scan {
        /// Table name, lower-cased.
        table: String,
    },
    /// Renames the child's table, rewriting every qualified name.
    Alias {
        /// The new table name.
        alias: String,
        /// Child producing the table to rename.
        input: Box<Plan>,
    },
    /// Cartesian product of the children, folded left. Zero children
    /// evaluate to no table at all (SELECT without FROM).
    CrossJoin {
        /// FROM clause items.
        inputs: Vec<Plan>,
    },
    /// Keeps rows whose predicate evaluates to True.
    Filter {
        /// Predicate; absent means pass-through.
        predicate: Option<ScalarExpr>,
        /// Child node.
        input: Box<Plan>,
    },
    /// Stable sort by the leftmost ORDER BY key.
    Sort {
        /// Sort key column.
        key: ColumnName,
        /// Sort direction.
        direction: OrderDirection,
        /// Child node.
        input: Box<Plan>,
    },
    /// Keeps at most `count` rows.
    Limit {
        /// Row cap.
        count: usize,
        /// Child node.
        input: Box<Plan>,
    },
    /// Projects onto a target list; the outermost node of every SELECT.
    Project {
        /// Projection targets.
        targets: Vec<ProjectTarget>,
        /// Child node.
        input: Box<Plan>,
    },
    /// Creates an empty table.
    CreateTable {
        /// Table name.
        name: String,
        /// Column definitions, qualified with the table name.
        defs: Vec<ColumnDef>,
    },
    /// Drops tables, failing on the first missing name.
    DropTable {
        /// Table names.
        names: Vec<String>,
    },
    /// Inserts constant rows.
    Insert {
        /// Target table.
        table: String,
        /// Target columns; empty means every column in declaration order.
        columns: Vec<ColumnName>,
        /// Constant value lists, folded at compile time.
        values: Vec<Vec<Value>>,
    },
    /// Updates rows in place.
    Update {
        /// Target table.
        table: String,
        /// Row predicate; absent means every row.
        predicate: Option<ScalarExpr>,
        /// Assigned columns.
        columns: Vec<ColumnName>,
        /// Assigned value expressions, aligned with `columns`.
        assignments: Vec<ScalarExpr>,
    },
    /// Deletes rows.
    Delete {
        /// Target table.
        table: String,
        /// Row predicate; absent means every row.
        predicate: Option<ScalarExpr>,
    },
}

impl Plan {
    /// Evaluates this node against the catalog.
    pub fn eval(&self, catalog: &mut Catalog) -> SqlResult<Option<Table>> {
        match self {
            Plan::Scan { table } => Ok(Some(catalog.table(table)?.clone())),

            Plan::Alias { alias, input } => {
                let mut table = input
                    .eval(catalog)?
                    .ok_or_else(|| SqlError::eval("alias target produced no table"))?;
                table.rename(alias);
                Ok(Some(table))
            }

            Plan::CrossJoin { inputs } => {
                let mut tables = Vec::with_capacity(inputs.len());
                for input in inputs {
                    let table = input
                        .eval(catalog)?
                        .ok_or_else(|| SqlError::eval("FROM item produced no table"))?;
                    tables.push(table);
                }

                validate_distinct_names(&tables)?;

                let mut iter = tables.into_iter();
                let Some(first) = iter.next() else {
                    return Ok(None);
                };
                let product = iter.fold(first, |acc, next| acc.cross_join(&next));
                Ok(Some(product))
            }

            Plan::Filter { predicate, input } => {
                let Some(mut table) = input.eval(catalog)? else {
                    return Ok(None);
                };
                if let Some(predicate) = predicate {
                    table.filter(predicate)?;
                }
                Ok(Some(table))
            }

            Plan::Sort {
                key,
                direction,
                input,
            } => {
                let Some(mut table) = input.eval(catalog)? else {
                    return Ok(None);
                };
                table.order_by(key, *direction)?;
                Ok(Some(table))
            }

            Plan::Limit { count, input } => {
                let Some(mut table) = input.eval(catalog)? else {
                    return Ok(None);
                };
                table.truncate(*count);
                Ok(Some(table))
            }

            Plan::Project { targets, input } => match input.eval(catalog)? {
                Some(mut table) => {
                    table.project(targets)?;
                    Ok(Some(table))
                }
                None => Ok(Some(project_without_input(targets)?)),
            },

            Plan::CreateTable { name, defs } => {
                catalog.create_table(name, defs.clone())?;
                Ok(None)
            }

            Plan::DropTable { names } => {
                for name in names {
                    catalog.drop_table(name)?;
                }
                Ok(None)
            }

            Plan::Insert {
                table,
                columns,
                values,
            } => {
                catalog.table_mut(table)?.insert(columns, values)?;
                Ok(None)
            }

            Plan::Update {
                table,
                predicate,
                columns,
                assignments,
            } => {
                catalog
                    .table_mut(table)?
                    .update(columns, predicate.as_ref(), assignments)?;
                Ok(None)
            }

            Plan::Delete { table, predicate } => {
                catalog.table_mut(table)?.delete(predicate.as_ref())?;
                Ok(None)
            }
        }
    }
}

/// The same concrete table name may not appear twice in one FROM clause.
/// Anonymous derived tables are exempt.
fn validate_distinct_names(tables: &[Table]) -> SqlResult<()> {
    let mut seen = HashSet::new();
    for table in tables {
        if let Some(name) = table.name() {
            if !seen.insert(name.to_string()) {
                return Err(SqlError::TableSpecifiedTwice(name.to_string()));
            }
        }
    }
    Ok(())
}

/// Evaluates a target list with no FROM clause: every target runs against a
/// synthetic empty row and the result is a single-row table
/// (`SELECT 1 + 1`).
fn project_without_input(targets: &[ProjectTarget]) -> SqlResult<Table> {
    let empty = Row::empty();
    let mut columns = Vec::with_capacity(targets.len());
    let mut defs = Vec::with_capacity(targets.len());
    let mut values = Vec::with_capacity(targets.len());

    for target in targets {
        values.push(evaluate_expr(&target.expr, &empty)?);
        columns.push(target.name.clone());
        defs.push(ColumnDef::new(target.name.clone(), ColumnType::VarChar));
    }

    let row = Row::new(columns.clone(), values);
    Ok(Table::derived(columns, defs, vec![row]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::BinaryOp;

    fn catalog_with_hoge() -> Catalog {
        let mut catalog = Catalog::new();
        catalog
            .create_table(
                "hoge",
                vec![
                    ColumnDef::new(ColumnName::qualified("hoge", "id"), ColumnType::Integer),
                    ColumnDef::new(ColumnName::qualified("hoge", "name"), ColumnType::VarChar),
                ],
            )
            .unwrap();
        catalog
            .table_mut("hoge")
            .unwrap()
            .insert(
                &[],
                &[
                    vec![Value::integer(1), Value::text("taro")],
                    vec![Value::integer(2), Value::text("hanako")],
                ],
            )
            .unwrap();
        catalog
    }

    fn scan(table: &str) -> Plan {
        Plan::Scan {
            table: table.to_string(),
        }
    }

    #[test]
    fn test_scan_clones_catalog_table() {
        let mut catalog = catalog_with_hoge();
        let mut table = scan("hoge").eval(&mut catalog).unwrap().unwrap();
        table.truncate(0);
        // Catalog table untouched by mutating the scanned copy.
        assert_eq!(catalog.table("hoge").unwrap().num_rows(), 2);
    }

    #[test]
    fn test_scan_missing_table() {
        let mut catalog = Catalog::new();
        let err = scan("ghost").eval(&mut catalog).unwrap_err();
        assert!(matches!(err, SqlError::TableNotFound(_)));
    }

    #[test]
    fn test_alias_renames() {
        let mut catalog = catalog_with_hoge();
        let plan = Plan::Alias {
            alias: "h".to_string(),
            input: Box::new(scan("hoge")),
        };
        let table = plan.eval(&mut catalog).unwrap().unwrap();
        assert_eq!(table.name(), Some("h"));
        assert!(table
            .rows()[0]
            .get(&ColumnName::qualified("h", "id"))
            .is_some());
    }

    #[test]
    fn test_cross_join_zero_children() {
        let mut catalog = Catalog::new();
        let plan = Plan::CrossJoin { inputs: vec![] };
        assert!(plan.eval(&mut catalog).unwrap().is_none());
    }

    #[test]
    fn test_cross_join_single_child_passthrough() {
        let mut catalog = catalog_with_hoge();
        let plan = Plan::CrossJoin {
            inputs: vec![scan("hoge")],
        };
        let table = plan.eval(&mut catalog).unwrap().unwrap();
        assert_eq!(table.name(), Some("hoge"));
        assert_eq!(table.num_rows(), 2);
    }

    #[test]
    fn test_cross_join_duplicate_table() {
        let mut catalog = catalog_with_hoge();
        let plan = Plan::CrossJoin {
            inputs: vec![scan("hoge"), scan("hoge")],
        };
        let err = plan.eval(&mut catalog).unwrap_err();
        assert!(matches!(err, SqlError::TableSpecifiedTwice(_)));
    }

    #[test]
    fn test_cross_join_aliased_self_join() {
        let mut catalog = catalog_with_hoge();
        let plan = Plan::CrossJoin {
            inputs: vec![
                scan("hoge"),
                Plan::Alias {
                    alias: "h2".to_string(),
                    input: Box::new(scan("hoge")),
                },
            ],
        };
        let table = plan.eval(&mut catalog).unwrap().unwrap();
        assert_eq!(table.num_rows(), 4);
        assert_eq!(table.columns().len(), 4);
    }

    #[test]
    fn test_filter_absent_predicate() {
        let mut catalog = catalog_with_hoge();
        let plan = Plan::Filter {
            predicate: None,
            input: Box::new(scan("hoge")),
        };
        assert_eq!(plan.eval(&mut catalog).unwrap().unwrap().num_rows(), 2);
    }

    #[test]
    fn test_filter_on_absent_child() {
        let mut catalog = Catalog::new();
        let plan = Plan::Filter {
            predicate: None,
            input: Box::new(Plan::CrossJoin { inputs: vec![] }),
        };
        assert!(plan.eval(&mut catalog).unwrap().is_none());
    }

    #[test]
    fn test_project_without_from() {
        let mut catalog = Catalog::new();
        let plan = Plan::Project {
            targets: vec![ProjectTarget::new(
                ScalarExpr::binary(
                    ScalarExpr::integer(1),
                    BinaryOp::Plus,
                    ScalarExpr::integer(1),
                ),
                ColumnName::anonymous(),
            )],
            input: Box::new(Plan::CrossJoin { inputs: vec![] }),
        };
        let table = plan.eval(&mut catalog).unwrap().unwrap();
        assert_eq!(table.num_rows(), 1);
        assert_eq!(table.rows()[0].values(), &[Value::integer(2)]);
    }

    #[test]
    fn test_create_insert_update_delete_return_no_table() {
        let mut catalog = Catalog::new();

        let create = Plan::CreateTable {
            name: "t".to_string(),
            defs: vec![ColumnDef::new(
                ColumnName::qualified("t", "x"),
                ColumnType::Integer,
            )],
        };
        assert!(create.eval(&mut catalog).unwrap().is_none());

        let insert = Plan::Insert {
            table: "t".to_string(),
            columns: vec![],
            values: vec![vec![Value::integer(1)]],
        };
        assert!(insert.eval(&mut catalog).unwrap().is_none());
        assert_eq!(catalog.table("t").unwrap().num_rows(), 1);

        let update = Plan::Update {
            table: "t".to_string(),
            predicate: None,
            columns: vec![ColumnName::new("x")],
            assignments: vec![ScalarExpr::integer(9)],
        };
        assert!(update.eval(&mut catalog).unwrap().is_none());
        assert_eq!(
            catalog.table("t").unwrap().rows()[0].values()[0],
            Value::integer(9)
        );

        let delete = Plan::Delete {
            table: "t".to_string(),
            predicate: None,
        };
        assert!(delete.eval(&mut catalog).unwrap().is_none());
        assert_eq!(catalog.table("t").unwrap().num_rows(), 0);

        let drop = Plan::DropTable {
            names: vec!["t".to_string()],
        };
        assert!(drop.eval(&mut catalog).unwrap().is_none());
        assert!(!catalog.contains("t"));
    }

    #[test]
    fn test_drop_fails_on_first_missing() {
        let mut catalog = catalog_with_hoge();
        let drop = Plan::DropTable {
            names: vec!["ghost".to_string(), "hoge".to_string()],
        };
        assert!(drop.eval(&mut catalog).is_err());
        // hoge survives because the failure came first.
        assert!(catalog.contains("hoge"));
    }
}
