//! Expression parsing and representation.
//!
//! Converts `sqlparser` expressions into the internal [`Expr`] set, which
//! covers exactly the subset the evaluator supports. Identifiers are folded
//! to lower case here; string literals are preserved verbatim.

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlparser::ast as sql_ast;

use super::{Literal, OrderDirection, ParseError, ParseResult};
use crate::schema::ColumnName;

/// A SQL expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// A column reference.
    Column(ColumnName),
    /// A literal value.
    Literal(Literal),
    /// A binary operation.
    BinaryOp {
        /// Left operand.
        left: Box<Expr>,
        /// Operator.
        op: BinaryOperator,
        /// Right operand.
        right: Box<Expr>,
    },
    /// A unary operation.
    UnaryOp {
        /// Operator.
        op: UnaryOperator,
        /// Operand.
        expr: Box<Expr>,
    },
    /// IS NULL check.
    IsNull(Box<Expr>),
    /// IS NOT NULL check.
    IsNotNull(Box<Expr>),
    /// A CASE expression.
    Case {
        /// The operand, for `CASE <expr> WHEN ...`.
        operand: Option<Box<Expr>>,
        /// `(condition, result)` branches.
        when_clauses: Vec<(Expr, Expr)>,
        /// ELSE branch.
        else_clause: Option<Box<Expr>>,
    },
    /// `*` in a select list.
    Wildcard,
}

impl Expr {
    /// Converts from sqlparser's Expr.
    pub fn from_sql_ast(expr: sql_ast::Expr) -> ParseResult<Self> {
        match expr {
            sql_ast::Expr::Identifier(ident) => {
                Ok(Expr::Column(ColumnName::new(fold(&ident))))
            }
            sql_ast::Expr::CompoundIdentifier(idents) => match idents.len() {
                1 => Ok(Expr::Column(ColumnName::new(fold(&idents[0])))),
                2 => Ok(Expr::Column(ColumnName::qualified(
                    fold(&idents[0]),
                    fold(&idents[1]),
                ))),
                _ => Err(ParseError::Unsupported(
                    "compound identifier with more than 2 parts".to_string(),
                )),
            },
            sql_ast::Expr::Value(value) => Ok(Expr::Literal(Literal::from_sql_ast(&value)?)),
            sql_ast::Expr::BinaryOp { left, op, right } => Ok(Expr::BinaryOp {
                left: Box::new(Expr::from_sql_ast(*left)?),
                op: BinaryOperator::from_sql_ast(&op)?,
                right: Box::new(Expr::from_sql_ast(*right)?),
            }),
            sql_ast::Expr::UnaryOp { op, expr } => Ok(Expr::UnaryOp {
                op: UnaryOperator::from_sql_ast(&op)?,
                expr: Box::new(Expr::from_sql_ast(*expr)?),
            }),
            sql_ast::Expr::IsNull(expr) => Ok(Expr::IsNull(Box::new(Expr::from_sql_ast(*expr)?))),
            sql_ast::Expr::IsNotNull(expr) => {
                Ok(Expr::IsNotNull(Box::new(Expr::from_sql_ast(*expr)?)))
            }
            sql_ast::Expr::Case {
                operand,
                conditions,
                results,
                else_result,
            } => {
                let operand = operand
                    .map(|e| Expr::from_sql_ast(*e))
                    .transpose()?
                    .map(Box::new);

                let when_clauses: ParseResult<Vec<_>> = conditions
                    .into_iter()
                    .zip(results)
                    .map(|(cond, result)| {
                        Ok((Expr::from_sql_ast(cond)?, Expr::from_sql_ast(result)?))
                    })
                    .collect();

                let else_clause = else_result
                    .map(|e| Expr::from_sql_ast(*e))
                    .transpose()?
                    .map(Box::new);

                Ok(Expr::Case {
                    operand,
                    when_clauses: when_clauses?,
                    else_clause,
                })
            }
            sql_ast::Expr::Nested(expr) => Expr::from_sql_ast(*expr),
            _ => Err(ParseError::Unsupported(format!("expression: {:?}", expr))),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Column(col) => write!(f, "{}", col),
            Expr::Literal(lit) => write!(f, "{}", lit),
            Expr::BinaryOp { left, op, right } => write!(f, "({} {} {})", left, op, right),
            Expr::UnaryOp { op, expr } => write!(f, "{} {}", op, expr),
            Expr::IsNull(expr) => write!(f, "{} IS NULL", expr),
            Expr::IsNotNull(expr) => write!(f, "{} IS NOT NULL", expr),
            Expr::Case {
                operand,
                when_clauses,
                else_clause,
            } => {
                write!(f, "CASE")?;
                if let Some(op) = operand {
                    write!(f, " {}", op)?;
                }
                for (when, then) in when_clauses {
                    write!(f, " WHEN {} THEN {}", when, then)?;
                }
                if let Some(else_expr) = else_clause {
                    write!(f, " ELSE {}", else_expr)?;
                }
                write!(f, " END")
            }
            Expr::Wildcard => write!(f, "*"),
        }
    }
}

/// Folds an identifier to lower case.
fn fold(ident: &sql_ast::Ident) -> String {
    ident.value.to_lowercase()
}

/// Binary operators in the supported subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOperator {
    /// Equal.
    Eq,
    /// Not equal.
    NotEq,
    /// Less than.
    Lt,
    /// Less than or equal.
    LtEq,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    GtEq,
    /// Addition.
    Plus,
    /// Subtraction.
    Minus,
    /// Multiplication.
    Multiply,
    /// Division.
    Divide,
    /// Logical AND.
    And,
    /// Logical OR.
    Or,
    /// String concatenation.
    Concat,
}

impl BinaryOperator {
    /// Converts from sqlparser's BinaryOperator.
    pub fn from_sql_ast(op: &sql_ast::BinaryOperator) -> ParseResult<Self> {
        match op {
            sql_ast::BinaryOperator::Eq => Ok(BinaryOperator::Eq),
            sql_ast::BinaryOperator::NotEq => Ok(BinaryOperator::NotEq),
            sql_ast::BinaryOperator::Lt => Ok(BinaryOperator::Lt),
            sql_ast::BinaryOperator::LtEq => Ok(BinaryOperator::LtEq),
            sql_ast::BinaryOperator::Gt => Ok(BinaryOperator::Gt),
            sql_ast::BinaryOperator::GtEq => Ok(BinaryOperator::GtEq),
            sql_ast::BinaryOperator::Plus => Ok(BinaryOperator::Plus),
            sql_ast::BinaryOperator::Minus => Ok(BinaryOperator::Minus),
            sql_ast::BinaryOperator::Multiply => Ok(BinaryOperator::Multiply),
            sql_ast::BinaryOperator::Divide => Ok(BinaryOperator::Divide),
            sql_ast::BinaryOperator::And => Ok(BinaryOperator::And),
            sql_ast::BinaryOperator::Or => Ok(BinaryOperator::Or),
            sql_ast::BinaryOperator::StringConcat => Ok(BinaryOperator::Concat),
            _ => Err(ParseError::Unsupported(format!("operator: {:?}", op))),
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOperator::Eq => "=",
            BinaryOperator::NotEq => "<>",
            BinaryOperator::Lt => "<",
            BinaryOperator::LtEq => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::GtEq => ">=",
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::And => "AND",
            BinaryOperator::Or => "OR",
            BinaryOperator::Concat => "||",
        };
        write!(f, "{}", s)
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOperator {
    /// Logical NOT.
    Not,
    /// Numeric negation.
    Minus,
    /// Numeric plus (no-op).
    Plus,
}

impl UnaryOperator {
    /// Converts from sqlparser's UnaryOperator.
    pub fn from_sql_ast(op: &sql_ast::UnaryOperator) -> ParseResult<Self> {
        match op {
            sql_ast::UnaryOperator::Not => Ok(UnaryOperator::Not),
            sql_ast::UnaryOperator::Minus => Ok(UnaryOperator::Minus),
            sql_ast::UnaryOperator::Plus => Ok(UnaryOperator::Plus),
            _ => Err(ParseError::Unsupported(format!("unary operator: {:?}", op))),
        }
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOperator::Not => write!(f, "NOT"),
            UnaryOperator::Minus => write!(f, "-"),
            UnaryOperator::Plus => write!(f, "+"),
        }
    }
}

/// ORDER BY expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderByExpr {
    /// Expression to order by.
    pub expr: Expr,
    /// Sort direction.
    pub direction: OrderDirection,
}

impl OrderByExpr {
    /// Converts from sqlparser's OrderByExpr.
    pub fn from_sql_ast(order: sql_ast::OrderByExpr) -> ParseResult<Self> {
        let direction = if order.asc.unwrap_or(true) {
            OrderDirection::Asc
        } else {
            OrderDirection::Desc
        };

        Ok(Self {
            expr: Expr::from_sql_ast(order.expr)?,
            direction,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::parser::Statement;

    fn where_clause(sql: &str) -> Expr {
        match Parser::parse_one(sql).unwrap() {
            Statement::Select(select) => select.where_clause.unwrap(),
            _ => panic!("expected SELECT"),
        }
    }

    #[test]
    fn test_identifiers_are_folded() {
        let expr = where_clause("SELECT * FROM t WHERE Hoge.Name = 'Taro'");
        match expr {
            Expr::BinaryOp { left, right, .. } => {
                assert_eq!(
                    *left,
                    Expr::Column(ColumnName::qualified("hoge", "name"))
                );
                // String literals keep their case.
                assert_eq!(*right, Expr::Literal(Literal::String("Taro".to_string())));
            }
            other => panic!("expected binary op, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_parens_unwrap() {
        let expr = where_clause("SELECT * FROM t WHERE (a = 1)");
        assert!(matches!(expr, Expr::BinaryOp { .. }));
    }

    #[test]
    fn test_is_null() {
        let expr = where_clause("SELECT * FROM t WHERE a IS NULL");
        assert!(matches!(expr, Expr::IsNull(_)));

        let expr = where_clause("SELECT * FROM t WHERE a IS NOT NULL");
        assert!(matches!(expr, Expr::IsNotNull(_)));
    }

    #[test]
    fn test_case_expression() {
        let stmt =
            Parser::parse_one("SELECT CASE WHEN a = 1 THEN 'one' ELSE 'other' END FROM t").unwrap();
        let Statement::Select(select) = stmt else {
            panic!("expected SELECT");
        };
        match &select.columns[0].expr {
            Expr::Case {
                operand,
                when_clauses,
                else_clause,
            } => {
                assert!(operand.is_none());
                assert_eq!(when_clauses.len(), 1);
                assert!(else_clause.is_some());
            }
            other => panic!("expected CASE, got {:?}", other),
        }
    }

    #[test]
    fn test_concat_operator() {
        let expr = where_clause("SELECT * FROM t WHERE a || b = 'ab'");
        let Expr::BinaryOp { left, .. } = expr else {
            panic!("expected binary op");
        };
        assert!(matches!(
            *left,
            Expr::BinaryOp {
                op: BinaryOperator::Concat,
                ..
            }
        ));
    }

    #[test]
    fn test_display() {
        let expr = where_clause("SELECT * FROM t WHERE a = 1 AND b < 2");
        assert_eq!(expr.to_string(), "((a = 1) AND (b < 2))");
    }
}
