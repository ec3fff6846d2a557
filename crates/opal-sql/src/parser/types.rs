//! Literals, sort directions, and declared-type mapping.

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlparser::ast as sql_ast;

use super::{ParseError, ParseResult};
use crate::schema::ColumnType;

/// A literal value in SQL text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    /// NULL.
    Null,
    /// TRUE or FALSE.
    Boolean(bool),
    /// Integer literal.
    Integer(i64),
    /// Floating point literal.
    Float(f64),
    /// String literal. Preserved verbatim; literals are never case-folded.
    String(String),
}

impl Literal {
    /// Converts from sqlparser's Value.
    pub fn from_sql_ast(value: &sql_ast::Value) -> ParseResult<Self> {
        match value {
            sql_ast::Value::Null => Ok(Literal::Null),
            sql_ast::Value::Boolean(b) => Ok(Literal::Boolean(*b)),
            sql_ast::Value::Number(n, _) => {
                if let Ok(i) = n.parse::<i64>() {
                    Ok(Literal::Integer(i))
                } else if let Ok(f) = n.parse::<f64>() {
                    Ok(Literal::Float(f))
                } else {
                    Err(ParseError::InvalidLiteral(format!("invalid number: {}", n)))
                }
            }
            sql_ast::Value::SingleQuotedString(s) | sql_ast::Value::DoubleQuotedString(s) => {
                Ok(Literal::String(s.clone()))
            }
            _ => Err(ParseError::Unsupported(format!("literal: {:?}", value))),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => write!(f, "NULL"),
            Literal::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            Literal::Integer(i) => write!(f, "{}", i),
            Literal::Float(v) => write!(f, "{}", v),
            Literal::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
        }
    }
}

/// Sort direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrderDirection {
    /// Ascending order.
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderDirection::Asc => write!(f, "ASC"),
            OrderDirection::Desc => write!(f, "DESC"),
        }
    }
}

/// Maps a declared SQL type onto the stored [`ColumnType`].
///
/// Integer-family types map to `Integer`, character-family types to
/// `VarChar`, and anything else defaults to `Integer`. Declared types are
/// stored but never enforced.
pub fn column_type_from_sql_ast(dt: &sql_ast::DataType) -> ColumnType {
    match dt {
        sql_ast::DataType::Varchar(_)
        | sql_ast::DataType::CharacterVarying(_)
        | sql_ast::DataType::Char(_)
        | sql_ast::DataType::Character(_)
        | sql_ast::DataType::Text => ColumnType::VarChar,
        _ => ColumnType::Integer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_from_number() {
        let v = sql_ast::Value::Number("42".to_string(), false);
        assert_eq!(Literal::from_sql_ast(&v).unwrap(), Literal::Integer(42));

        let v = sql_ast::Value::Number("1.5".to_string(), false);
        assert_eq!(Literal::from_sql_ast(&v).unwrap(), Literal::Float(1.5));
    }

    #[test]
    fn test_literal_string_preserved() {
        let v = sql_ast::Value::SingleQuotedString("Taro".to_string());
        assert_eq!(
            Literal::from_sql_ast(&v).unwrap(),
            Literal::String("Taro".to_string())
        );
    }

    #[test]
    fn test_literal_display() {
        assert_eq!(Literal::Null.to_string(), "NULL");
        assert_eq!(Literal::Integer(7).to_string(), "7");
        assert_eq!(Literal::String("a'b".to_string()).to_string(), "'a''b'");
    }

    #[test]
    fn test_column_type_mapping() {
        assert_eq!(
            column_type_from_sql_ast(&sql_ast::DataType::Int(None)),
            ColumnType::Integer
        );
        assert_eq!(
            column_type_from_sql_ast(&sql_ast::DataType::Varchar(None)),
            ColumnType::VarChar
        );
        assert_eq!(
            column_type_from_sql_ast(&sql_ast::DataType::Text),
            ColumnType::VarChar
        );
        // Unknown types fall back to Integer.
        assert_eq!(
            column_type_from_sql_ast(&sql_ast::DataType::Date),
            ColumnType::Integer
        );
    }
}
