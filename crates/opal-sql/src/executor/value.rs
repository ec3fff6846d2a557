//! Runtime values.
//!
//! Every table cell and every expression result is a [`Value`]. SQL booleans
//! are three-valued: `Boolean(true)`, `Boolean(false)`, and `Null` are three
//! distinct truth values, and the logic operations here preserve unknowns.

use std::cmp::Ordering;
use std::fmt;

use crate::parser::Literal;

/// A runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL.
    Null,
    /// SQL boolean.
    Boolean(bool),
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit floating point.
    Float(f64),
    /// String value.
    Text(String),
    /// Sentinel produced by evaluating `*` in a select list. Only the
    /// projection operator interprets it.
    Wildcard,
}

impl Value {
    /// Creates a boolean value.
    pub fn boolean(v: bool) -> Self {
        Value::Boolean(v)
    }

    /// Creates an integer value.
    pub fn integer(v: i64) -> Self {
        Value::Integer(v)
    }

    /// Creates a float value.
    pub fn float(v: f64) -> Self {
        Value::Float(v)
    }

    /// Creates a text value.
    pub fn text(v: impl Into<String>) -> Self {
        Value::Text(v.into())
    }

    /// Creates a value from a parsed literal.
    pub fn from_literal(lit: &Literal) -> Self {
        match lit {
            Literal::Null => Value::Null,
            Literal::Boolean(b) => Value::Boolean(*b),
            Literal::Integer(i) => Value::Integer(*i),
            Literal::Float(f) => Value::Float(*f),
            Literal::String(s) => Value::Text(s.clone()),
        }
    }

    /// Returns true if this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true if this value is the wildcard sentinel.
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Value::Wildcard)
    }

    /// Returns the boolean content, or `None` for NULL and non-booleans.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns true if this value is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    /// Converts a numeric value to f64.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Three-valued NOT.
    ///
    /// Total on `{True, False, Null}`; non-boolean operands behave as NULL.
    pub fn sql_not(&self) -> Value {
        match self.as_bool() {
            Some(b) => Value::Boolean(!b),
            None => Value::Null,
        }
    }

    /// Three-valued AND: False dominates, True requires both, else NULL.
    pub fn sql_and(&self, other: &Value) -> Value {
        match (self.as_bool(), other.as_bool()) {
            (Some(false), _) | (_, Some(false)) => Value::Boolean(false),
            (Some(true), Some(true)) => Value::Boolean(true),
            _ => Value::Null,
        }
    }

    /// Three-valued OR: True dominates, False requires both, else NULL.
    pub fn sql_or(&self, other: &Value) -> Value {
        match (self.as_bool(), other.as_bool()) {
            (Some(true), _) | (_, Some(true)) => Value::Boolean(true),
            (Some(false), Some(false)) => Value::Boolean(false),
            _ => Value::Null,
        }
    }

    /// Ordering used by the sort operator.
    ///
    /// Numeric pairs compare with integer→float promotion, text compares
    /// lexicographically, booleans order false before true. Incomparable
    /// pairs fall back to comparing their display strings, so sorting never
    /// fails. NULL placement is decided by the sort operator, not here.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (a, b) => {
                if let (Some(x), Some(y)) = (a.to_f64(), b.to_f64()) {
                    x.partial_cmp(&y).unwrap_or(Ordering::Equal)
                } else {
                    a.to_string().cmp(&b.to_string())
                }
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Boolean(b) => write!(f, "{}", if *b { "true" } else { "false" }),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(s) => write!(f, "{}", s),
            Value::Wildcard => write!(f, "*"),
        }
    }
}
