//! Compiled scalar expressions.
//!
//! [`ScalarExpr`] is the closed set of expression nodes the plan builder
//! emits. Every node is a pure function of one row; evaluation lives in
//! [`crate::executor::evaluate_expr`].

use std::fmt;

use crate::executor::Value;
use crate::schema::ColumnName;

/// A scalar expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarExpr {
    /// A literal value (including NULL and the boolean constants).
    Literal(Value),
    /// A column reference, resolved against the row at evaluation time.
    Column(ColumnName),
    /// `*` in a select list. Evaluates to the wildcard sentinel; only the
    /// projection operator interprets it.
    Wildcard,
    /// Logical NOT.
    Not(Box<ScalarExpr>),
    /// Logical AND (three-valued).
    And(Box<ScalarExpr>, Box<ScalarExpr>),
    /// Logical OR (three-valued).
    Or(Box<ScalarExpr>, Box<ScalarExpr>),
    /// `IS NULL` / `IS NOT NULL`. Always returns True or False.
    IsNull {
        /// The tested expression.
        expr: Box<ScalarExpr>,
        /// True for `IS NOT NULL`.
        negated: bool,
    },
    /// A searched CASE expression. `CASE <arg> WHEN ...` is desugared by the
    /// builder into equality conditions.
    Case {
        /// `(condition, result)` branches, tried in order.
        branches: Vec<(ScalarExpr, ScalarExpr)>,
        /// ELSE branch; NULL when unspecified.
        else_result: Option<Box<ScalarExpr>>,
    },
    /// A binary operation.
    BinaryOp {
        /// Operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<ScalarExpr>,
        /// Right operand.
        right: Box<ScalarExpr>,
    },
}

impl ScalarExpr {
    /// Creates a column reference.
    pub fn column(name: ColumnName) -> Self {
        ScalarExpr::Column(name)
    }

    /// Creates an integer literal.
    pub fn integer(v: i64) -> Self {
        ScalarExpr::Literal(Value::Integer(v))
    }

    /// Creates a text literal.
    pub fn text(v: impl Into<String>) -> Self {
        ScalarExpr::Literal(Value::Text(v.into()))
    }

    /// Creates a NULL literal.
    pub fn null() -> Self {
        ScalarExpr::Literal(Value::Null)
    }

    /// Combines two expressions with a binary operator.
    pub fn binary(left: ScalarExpr, op: BinaryOp, right: ScalarExpr) -> Self {
        ScalarExpr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Creates `self = other`.
    pub fn eq(self, other: ScalarExpr) -> Self {
        ScalarExpr::binary(self, BinaryOp::Eq, other)
    }

    /// Creates `self AND other`.
    pub fn and(self, other: ScalarExpr) -> Self {
        ScalarExpr::And(Box::new(self), Box::new(other))
    }

    /// Creates `self OR other`.
    pub fn or(self, other: ScalarExpr) -> Self {
        ScalarExpr::Or(Box::new(self), Box::new(other))
    }
}

impl fmt::Display for ScalarExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarExpr::Literal(v) => write!(f, "{}", v),
            ScalarExpr::Column(c) => write!(f, "{}", c),
            ScalarExpr::Wildcard => write!(f, "*"),
            ScalarExpr::Not(e) => write!(f, "NOT {}", e),
            ScalarExpr::And(l, r) => write!(f, "({} AND {})", l, r),
            ScalarExpr::Or(l, r) => write!(f, "({} OR {})", l, r),
            ScalarExpr::IsNull { expr, negated } => {
                if *negated {
                    write!(f, "{} IS NOT NULL", expr)
                } else {
                    write!(f, "{} IS NULL", expr)
                }
            }
            ScalarExpr::Case {
                branches,
                else_result,
            } => {
                write!(f, "CASE")?;
                for (when, then) in branches {
                    write!(f, " WHEN {} THEN {}", when, then)?;
                }
                if let Some(e) = else_result {
                    write!(f, " ELSE {}", e)?;
                }
                write!(f, " END")
            }
            ScalarExpr::BinaryOp { op, left, right } => {
                write!(f, "({} {} {})", left, op, right)
            }
        }
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
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
    /// String concatenation (`||`).
    Concat,
}

impl BinaryOp {
    /// Returns true for the ordered comparison operators.
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq
        )
    }

    /// Returns true for the arithmetic operators.
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOp::Plus | BinaryOp::Minus | BinaryOp::Multiply | BinaryOp::Divide
        )
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::Eq => "=",
            BinaryOp::NotEq => "<>",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::Plus => "+",
            BinaryOp::Minus => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Concat => "||",
        };
        write!(f, "{}", s)
    }
}

/// One entry of a projection target list.
///
/// `name` is the output column: the referenced column for plain column
/// targets, the star sentinel for `*`, the (lower-cased) alias when one was
/// given, and the anonymous name for bare expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectTarget {
    /// The compiled expression.
    pub expr: ScalarExpr,
    /// The output column name.
    pub name: ColumnName,
}

impl ProjectTarget {
    /// Creates a projection target.
    pub fn new(expr: ScalarExpr, name: ColumnName) -> Self {
        Self { expr, name }
    }

    /// Creates the `*` target.
    pub fn wildcard() -> Self {
        Self {
            expr: ScalarExpr::Wildcard,
            name: ColumnName::wildcard(),
        }
    }
}
