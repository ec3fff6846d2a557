//! Statement parsing and representation.
//!
//! The internal statement set covers exactly what the planner compiles:
//! SELECT (projection, FROM with aliases and derived tables, WHERE, ORDER
//! BY, LIMIT), INSERT ... VALUES, UPDATE, DELETE, CREATE TABLE, DROP TABLE.
//! Everything else is rejected here with a precise message rather than
//! failing obscurely later.

use serde::{Deserialize, Serialize};
use sqlparser::ast as sql_ast;

use super::types::column_type_from_sql_ast;
use super::{Expr, OrderByExpr, ParseError, ParseResult};
use crate::schema::{ColumnName, ColumnType};

/// A parsed SQL statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    /// SELECT query.
    Select(SelectStatement),
    /// INSERT statement.
    Insert(InsertStatement),
    /// UPDATE statement.
    Update(UpdateStatement),
    /// DELETE statement.
    Delete(DeleteStatement),
    /// CREATE TABLE statement.
    CreateTable(CreateTableStatement),
    /// DROP TABLE statement.
    DropTable(DropTableStatement),
}

impl Statement {
    /// Converts from sqlparser's Statement.
    pub fn from_sql_ast(stmt: sql_ast::Statement) -> ParseResult<Self> {
        match stmt {
            sql_ast::Statement::Query(query) => {
                Ok(Statement::Select(SelectStatement::from_sql_ast(*query)?))
            }
            sql_ast::Statement::Insert {
                table_name,
                columns,
                source,
                ..
            } => Ok(Statement::Insert(InsertStatement::from_parts(
                table_name, columns, source,
            )?)),
            sql_ast::Statement::Update {
                table,
                assignments,
                from,
                selection,
                ..
            } => {
                if from.is_some() {
                    return Err(ParseError::Unsupported("UPDATE ... FROM".to_string()));
                }
                Ok(Statement::Update(UpdateStatement::from_parts(
                    table, assignments, selection,
                )?))
            }
            sql_ast::Statement::Delete {
                from, selection, ..
            } => Ok(Statement::Delete(DeleteStatement::from_parts(
                from, selection,
            )?)),
            sql_ast::Statement::CreateTable {
                name,
                columns,
                if_not_exists,
                ..
            } => {
                if if_not_exists {
                    return Err(ParseError::Unsupported("IF NOT EXISTS".to_string()));
                }
                Ok(Statement::CreateTable(CreateTableStatement::from_parts(
                    name, columns,
                )?))
            }
            sql_ast::Statement::Drop {
                object_type: sql_ast::ObjectType::Table,
                if_exists,
                names,
                ..
            } => {
                if if_exists {
                    return Err(ParseError::Unsupported("IF EXISTS".to_string()));
                }
                let names = names
                    .iter()
                    .map(table_name_from_object_name)
                    .collect::<ParseResult<Vec<_>>>()?;
                Ok(Statement::DropTable(DropTableStatement { names }))
            }
            other => Err(ParseError::Unsupported(format!(
                "statement: {}",
                statement_keyword(&other)
            ))),
        }
    }

    /// Returns true for statements that produce a result table.
    pub fn is_select(&self) -> bool {
        matches!(self, Statement::Select(_))
    }

    /// Returns true for statements that mutate the catalog.
    pub fn is_write(&self) -> bool {
        !self.is_select()
    }
}

/// First keyword of an unsupported statement, for error messages.
fn statement_keyword(stmt: &sql_ast::Statement) -> String {
    format!("{:?}", stmt)
        .split(|c: char| !c.is_ascii_alphanumeric())
        .next()
        .unwrap_or("unknown")
        .to_string()
}

/// SELECT statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectStatement {
    /// Select-list items.
    pub columns: Vec<SelectItem>,
    /// FROM clause items, cross-joined.
    pub from: Vec<FromItem>,
    /// WHERE clause.
    pub where_clause: Option<Expr>,
    /// ORDER BY clauses.
    pub order_by: Vec<OrderByExpr>,
    /// LIMIT clause.
    pub limit: Option<u64>,
}

impl SelectStatement {
    /// Converts from sqlparser's Query.
    pub fn from_sql_ast(query: sql_ast::Query) -> ParseResult<Self> {
        if query.with.is_some() {
            return Err(ParseError::Unsupported("WITH".to_string()));
        }
        if query.offset.is_some() {
            return Err(ParseError::Unsupported("OFFSET".to_string()));
        }

        let limit = match query.limit {
            None => None,
            Some(expr) => Some(
                extract_limit(&expr)
                    .ok_or_else(|| ParseError::InvalidLimit(expr.to_string()))?,
            ),
        };

        let order_by: ParseResult<Vec<_>> = query
            .order_by
            .into_iter()
            .map(OrderByExpr::from_sql_ast)
            .collect();

        match *query.body {
            sql_ast::SetExpr::Select(select) => {
                if select.distinct.is_some() {
                    return Err(ParseError::Unsupported("DISTINCT".to_string()));
                }
                if !matches!(
                    &select.group_by,
                    sql_ast::GroupByExpr::Expressions(exprs) if exprs.is_empty()
                ) {
                    return Err(ParseError::Unsupported("GROUP BY".to_string()));
                }
                if select.having.is_some() {
                    return Err(ParseError::Unsupported("HAVING".to_string()));
                }

                let columns: ParseResult<Vec<_>> = select
                    .projection
                    .into_iter()
                    .map(SelectItem::from_sql_ast)
                    .collect();

                let from: ParseResult<Vec<_>> = select
                    .from
                    .into_iter()
                    .map(FromItem::from_sql_ast)
                    .collect();

                let where_clause = select.selection.map(Expr::from_sql_ast).transpose()?;

                Ok(Self {
                    columns: columns?,
                    from: from?,
                    where_clause,
                    order_by: order_by?,
                    limit,
                })
            }
            _ => Err(ParseError::Unsupported(
                "set operations (UNION/INTERSECT/EXCEPT)".to_string(),
            )),
        }
    }
}

/// A select-list item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectItem {
    /// The expression; `Expr::Wildcard` for `*`.
    pub expr: Expr,
    /// Optional alias, folded to lower case.
    pub alias: Option<String>,
}

impl SelectItem {
    /// Converts from sqlparser's SelectItem.
    pub fn from_sql_ast(item: sql_ast::SelectItem) -> ParseResult<Self> {
        match item {
            sql_ast::SelectItem::UnnamedExpr(expr) => Ok(Self {
                expr: Expr::from_sql_ast(expr)?,
                alias: None,
            }),
            sql_ast::SelectItem::ExprWithAlias { expr, alias } => Ok(Self {
                expr: Expr::from_sql_ast(expr)?,
                alias: Some(alias.value.to_lowercase()),
            }),
            sql_ast::SelectItem::Wildcard(_) => Ok(Self {
                expr: Expr::Wildcard,
                alias: None,
            }),
            sql_ast::SelectItem::QualifiedWildcard(name, _) => Err(ParseError::Unsupported(
                format!("qualified wildcard: {}.*", name),
            )),
        }
    }
}

/// A FROM clause item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FromItem {
    /// A base table, optionally aliased.
    Table {
        /// Table name.
        name: String,
        /// Optional alias.
        alias: Option<String>,
    },
    /// A derived table. The alias is mandatory.
    Subquery {
        /// The subquery.
        query: Box<SelectStatement>,
        /// Alias naming the derived table.
        alias: String,
    },
}

impl FromItem {
    /// Converts from sqlparser's TableWithJoins.
    pub fn from_sql_ast(table: sql_ast::TableWithJoins) -> ParseResult<Self> {
        if !table.joins.is_empty() {
            return Err(ParseError::Unsupported(
                "JOIN syntax (use cross joins via FROM lists)".to_string(),
            ));
        }
        match table.relation {
            sql_ast::TableFactor::Table { name, alias, .. } => Ok(FromItem::Table {
                name: table_name_from_object_name(&name)?,
                alias: alias.map(|a| a.name.value.to_lowercase()),
            }),
            sql_ast::TableFactor::Derived {
                subquery, alias, ..
            } => {
                let alias = alias
                    .ok_or_else(|| {
                        ParseError::Syntax("subquery in FROM requires an alias".to_string())
                    })?
                    .name
                    .value
                    .to_lowercase();
                Ok(FromItem::Subquery {
                    query: Box::new(SelectStatement::from_sql_ast(*subquery)?),
                    alias,
                })
            }
            other => Err(ParseError::Unsupported(format!(
                "table factor: {:?}",
                other
            ))),
        }
    }
}

/// INSERT statement. Only the VALUES form is supported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertStatement {
    /// Target table.
    pub table: String,
    /// Target columns; empty means every column in declaration order.
    pub columns: Vec<String>,
    /// One expression list per row.
    pub values: Vec<Vec<Expr>>,
}

impl InsertStatement {
    /// Converts from sqlparser's Insert parts.
    fn from_parts(
        table_name: sql_ast::ObjectName,
        columns: Vec<sql_ast::Ident>,
        source: Option<Box<sql_ast::Query>>,
    ) -> ParseResult<Self> {
        let table = table_name_from_object_name(&table_name)?;
        let columns: Vec<String> = columns.into_iter().map(|c| c.value.to_lowercase()).collect();

        let source =
            source.ok_or_else(|| ParseError::Unsupported("INSERT DEFAULT VALUES".to_string()))?;
        let values = match *source.body {
            sql_ast::SetExpr::Values(values) => {
                let rows: ParseResult<Vec<Vec<Expr>>> = values
                    .rows
                    .into_iter()
                    .map(|row| row.into_iter().map(Expr::from_sql_ast).collect())
                    .collect();
                rows?
            }
            _ => {
                return Err(ParseError::Unsupported(
                    "INSERT from SELECT".to_string(),
                ))
            }
        };

        Ok(Self {
            table,
            columns,
            values,
        })
    }
}

/// An assignment in an UPDATE statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// Column being assigned; may carry a table qualifier.
    pub column: ColumnName,
    /// Value expression.
    pub value: Expr,
}

impl Assignment {
    /// Converts from sqlparser's Assignment.
    pub fn from_sql_ast(assign: sql_ast::Assignment) -> ParseResult<Self> {
        let column = match assign.id.len() {
            1 => ColumnName::new(assign.id[0].value.to_lowercase()),
            2 => ColumnName::qualified(
                assign.id[0].value.to_lowercase(),
                assign.id[1].value.to_lowercase(),
            ),
            _ => return Err(ParseError::Syntax("invalid assignment target".to_string())),
        };

        Ok(Self {
            column,
            value: Expr::from_sql_ast(assign.value)?,
        })
    }
}

/// UPDATE statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateStatement {
    /// Target table.
    pub table: String,
    /// SET assignments.
    pub assignments: Vec<Assignment>,
    /// WHERE clause.
    pub where_clause: Option<Expr>,
}

impl UpdateStatement {
    fn from_parts(
        table: sql_ast::TableWithJoins,
        assignments: Vec<sql_ast::Assignment>,
        selection: Option<sql_ast::Expr>,
    ) -> ParseResult<Self> {
        let table = match FromItem::from_sql_ast(table)? {
            FromItem::Table { name, alias: None } => name,
            _ => {
                return Err(ParseError::Syntax(
                    "UPDATE requires a plain table name".to_string(),
                ))
            }
        };

        let assignments: ParseResult<Vec<_>> = assignments
            .into_iter()
            .map(Assignment::from_sql_ast)
            .collect();

        Ok(Self {
            table,
            assignments: assignments?,
            where_clause: selection.map(Expr::from_sql_ast).transpose()?,
        })
    }
}

/// DELETE statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteStatement {
    /// Target table.
    pub table: String,
    /// WHERE clause.
    pub where_clause: Option<Expr>,
}

impl DeleteStatement {
    fn from_parts(
        from: Vec<sql_ast::TableWithJoins>,
        selection: Option<sql_ast::Expr>,
    ) -> ParseResult<Self> {
        let table = from
            .into_iter()
            .next()
            .ok_or_else(|| ParseError::Syntax("DELETE requires FROM".to_string()))?;

        let table = match FromItem::from_sql_ast(table)? {
            FromItem::Table { name, alias: None } => name,
            _ => {
                return Err(ParseError::Syntax(
                    "DELETE requires a plain table name".to_string(),
                ))
            }
        };

        Ok(Self {
            table,
            where_clause: selection.map(Expr::from_sql_ast).transpose()?,
        })
    }
}

/// A column definition in CREATE TABLE.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefStatement {
    /// Column name, folded to lower case.
    pub name: String,
    /// Declared type. Stored, never enforced; constraints are ignored.
    pub data_type: ColumnType,
}

/// CREATE TABLE statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTableStatement {
    /// Table name.
    pub name: String,
    /// Column definitions.
    pub columns: Vec<ColumnDefStatement>,
}

impl CreateTableStatement {
    fn from_parts(
        name: sql_ast::ObjectName,
        columns: Vec<sql_ast::ColumnDef>,
    ) -> ParseResult<Self> {
        let columns = columns
            .into_iter()
            .map(|col| ColumnDefStatement {
                name: col.name.value.to_lowercase(),
                data_type: column_type_from_sql_ast(&col.data_type),
            })
            .collect();

        Ok(Self {
            name: table_name_from_object_name(&name)?,
            columns,
        })
    }
}

/// DROP TABLE statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropTableStatement {
    /// Table names, dropped in order.
    pub names: Vec<String>,
}

/// Extracts an unqualified, lower-cased table name.
fn table_name_from_object_name(name: &sql_ast::ObjectName) -> ParseResult<String> {
    match name.0.as_slice() {
        [ident] => Ok(ident.value.to_lowercase()),
        _ => Err(ParseError::Unsupported(format!(
            "schema-qualified table name: {}",
            name
        ))),
    }
}

/// Extracts a constant row count from a LIMIT expression.
fn extract_limit(expr: &sql_ast::Expr) -> Option<u64> {
    match expr {
        sql_ast::Expr::Value(sql_ast::Value::Number(n, _)) => n.parse().ok(),
        _ => None,
    }
}
