//! Plan builder.
//!
//! Compiles parsed statements into relational-algebra plans and parsed
//! expressions into [`ScalarExpr`] trees. Name resolution happens at
//! evaluation time; the builder's job is shape: every SELECT becomes
//! `Project(Limit?(Sort?(Filter(CrossJoin[from...]))))`, CASE-with-operand
//! desugars into equality branches, and VALUES lists fold to constants.

use super::expr::{BinaryOp, ProjectTarget, ScalarExpr};
use super::node::Plan;
use crate::error::{SqlError, SqlResult};
use crate::executor::{evaluate_expr, Row, Value};
use crate::parser::{
    BinaryOperator, Expr, FromItem, InsertStatement, SelectItem, SelectStatement, Statement,
    UnaryOperator, UpdateStatement,
};
use crate::schema::{ColumnDef, ColumnName};

/// Compiles a statement into a plan.
pub fn build_plan(statement: &Statement) -> SqlResult<Plan> {
    match statement {
        Statement::Select(select) => build_select(select),

        Statement::Insert(insert) => build_insert(insert),

        Statement::Update(update) => build_update(update),

        Statement::Delete(delete) => Ok(Plan::Delete {
            table: delete.table.clone(),
            predicate: delete
                .where_clause
                .as_ref()
                .map(build_scalar_expr)
                .transpose()?,
        }),

        Statement::CreateTable(create) => {
            let defs = create
                .columns
                .iter()
                .map(|col| {
                    ColumnDef::new(
                        ColumnName::qualified(create.name.clone(), col.name.clone()),
                        col.data_type,
                    )
                })
                .collect();
            Ok(Plan::CreateTable {
                name: create.name.clone(),
                defs,
            })
        }

        Statement::DropTable(drop) => Ok(Plan::DropTable {
            names: drop.names.clone(),
        }),
    }
}

/// Builds the SELECT pipeline.
fn build_select(select: &SelectStatement) -> SqlResult<Plan> {
    let inputs = select
        .from
        .iter()
        .map(build_from_item)
        .collect::<SqlResult<Vec<_>>>()?;

    let mut plan = Plan::Filter {
        predicate: select
            .where_clause
            .as_ref()
            .map(build_scalar_expr)
            .transpose()?,
        input: Box::new(Plan::CrossJoin { inputs }),
    };

    // Only the leftmost ORDER BY key is honored.
    if let Some(order) = select.order_by.first() {
        let Expr::Column(key) = &order.expr else {
            return Err(SqlError::Unsupported(
                "ORDER BY expression (only column keys are supported)".to_string(),
            ));
        };
        plan = Plan::Sort {
            key: key.clone(),
            direction: order.direction,
            input: Box::new(plan),
        };
    }

    if let Some(count) = select.limit {
        plan = Plan::Limit {
            count: count as usize,
            input: Box::new(plan),
        };
    }

    let targets = select
        .columns
        .iter()
        .map(build_project_target)
        .collect::<SqlResult<Vec<_>>>()?;

    Ok(Plan::Project {
        targets,
        input: Box::new(plan),
    })
}

/// Compiles one select-list item.
///
/// The output name is the star sentinel for `*`, the alias when one was
/// given, the referenced column for plain column targets, and the anonymous
/// name for bare expressions.
fn build_project_target(item: &SelectItem) -> SqlResult<ProjectTarget> {
    if matches!(item.expr, Expr::Wildcard) {
        return Ok(ProjectTarget::wildcard());
    }

    let expr = build_scalar_expr(&item.expr)?;
    let name = match (&item.alias, &expr) {
        (Some(alias), _) => ColumnName::new(alias.clone()),
        (None, ScalarExpr::Column(column)) => column.clone(),
        (None, _) => ColumnName::anonymous(),
    };
    Ok(ProjectTarget::new(expr, name))
}

/// Compiles one FROM item.
fn build_from_item(item: &FromItem) -> SqlResult<Plan> {
    match item {
        FromItem::Table { name, alias } => {
            let scan = Plan::Scan {
                table: name.clone(),
            };
            Ok(match alias {
                Some(alias) => Plan::Alias {
                    alias: alias.clone(),
                    input: Box::new(scan),
                },
                None => scan,
            })
        }
        FromItem::Subquery { query, alias } => Ok(Plan::Alias {
            alias: alias.clone(),
            input: Box::new(build_select(query)?),
        }),
    }
}

/// Compiles an INSERT, folding every VALUES expression to a constant.
fn build_insert(insert: &InsertStatement) -> SqlResult<Plan> {
    let columns = insert
        .columns
        .iter()
        .map(|name| ColumnName::qualified(insert.table.clone(), name.clone()))
        .collect();

    let mut values = Vec::with_capacity(insert.values.len());
    for row in &insert.values {
        let mut constants = Vec::with_capacity(row.len());
        for expr in row {
            constants.push(fold_constant(expr)?);
        }
        values.push(constants);
    }

    Ok(Plan::Insert {
        table: insert.table.clone(),
        columns,
        values,
    })
}

/// Compiles an UPDATE.
fn build_update(update: &UpdateStatement) -> SqlResult<Plan> {
    let mut columns = Vec::with_capacity(update.assignments.len());
    let mut assignments = Vec::with_capacity(update.assignments.len());
    for assignment in &update.assignments {
        columns.push(assignment.column.clone());
        assignments.push(build_scalar_expr(&assignment.value)?);
    }

    Ok(Plan::Update {
        table: update.table.clone(),
        predicate: update
            .where_clause
            .as_ref()
            .map(build_scalar_expr)
            .transpose()?,
        columns,
        assignments,
    })
}

/// Evaluates a compiled expression against an empty row, yielding the
/// constant it denotes. Column references fail here with `ColumnNotFound`.
fn fold_constant(expr: &Expr) -> SqlResult<Value> {
    let compiled = build_scalar_expr(expr)?;
    evaluate_expr(&compiled, &Row::empty())
}

/// Compiles a parsed expression into a scalar expression tree.
pub fn build_scalar_expr(expr: &Expr) -> SqlResult<ScalarExpr> {
    match expr {
        Expr::Column(name) => Ok(ScalarExpr::Column(name.clone())),

        Expr::Literal(lit) => Ok(ScalarExpr::Literal(Value::from_literal(lit))),

        Expr::Wildcard => Ok(ScalarExpr::Wildcard),

        Expr::BinaryOp { left, op, right } => {
            let l = build_scalar_expr(left)?;
            let r = build_scalar_expr(right)?;
            Ok(match op {
                BinaryOperator::And => l.and(r),
                BinaryOperator::Or => l.or(r),
                other => ScalarExpr::binary(l, map_binary_op(*other), r),
            })
        }

        Expr::UnaryOp { op, expr } => match op {
            UnaryOperator::Not => Ok(ScalarExpr::Not(Box::new(build_scalar_expr(expr)?))),
            UnaryOperator::Plus => build_scalar_expr(expr),
            UnaryOperator::Minus => match build_scalar_expr(expr)? {
                ScalarExpr::Literal(Value::Integer(i)) => {
                    Ok(ScalarExpr::Literal(Value::Integer(-i)))
                }
                ScalarExpr::Literal(Value::Float(f)) => Ok(ScalarExpr::Literal(Value::Float(-f))),
                _ => Err(SqlError::Unsupported(
                    "unary minus on a non-numeric expression".to_string(),
                )),
            },
        },

        Expr::IsNull(inner) => Ok(ScalarExpr::IsNull {
            expr: Box::new(build_scalar_expr(inner)?),
            negated: false,
        }),

        Expr::IsNotNull(inner) => Ok(ScalarExpr::IsNull {
            expr: Box::new(build_scalar_expr(inner)?),
            negated: true,
        }),

        Expr::Case {
            operand,
            when_clauses,
            else_clause,
        } => {
            // CASE <arg> WHEN v ... desugars to CASE WHEN <arg> = v ...
            let operand = operand.as_ref().map(|e| build_scalar_expr(e)).transpose()?;

            let mut branches = Vec::with_capacity(when_clauses.len());
            for (when, then) in when_clauses {
                let condition = match &operand {
                    Some(arg) => arg.clone().eq(build_scalar_expr(when)?),
                    None => build_scalar_expr(when)?,
                };
                branches.push((condition, build_scalar_expr(then)?));
            }

            let else_result = else_clause
                .as_ref()
                .map(|e| build_scalar_expr(e))
                .transpose()?
                .map(Box::new);

            Ok(ScalarExpr::Case {
                branches,
                else_result,
            })
        }
    }
}

fn map_binary_op(op: BinaryOperator) -> BinaryOp {
    match op {
        BinaryOperator::Eq => BinaryOp::Eq,
        BinaryOperator::NotEq => BinaryOp::NotEq,
        BinaryOperator::Lt => BinaryOp::Lt,
        BinaryOperator::LtEq => BinaryOp::LtEq,
        BinaryOperator::Gt => BinaryOp::Gt,
        BinaryOperator::GtEq => BinaryOp::GtEq,
        BinaryOperator::Plus => BinaryOp::Plus,
        BinaryOperator::Minus => BinaryOp::Minus,
        BinaryOperator::Multiply => BinaryOp::Multiply,
        BinaryOperator::Divide => BinaryOp::Divide,
        BinaryOperator::Concat => BinaryOp::Concat,
        // AND/OR are handled before mapping.
        BinaryOperator::And | BinaryOperator::Or => unreachable!("logical op mapped as binary"),
    }
}
