//! Scalar expression evaluation.
//!
//! Evaluates a [`ScalarExpr`] against one row. Every node is a pure function
//! of the row; the only failure sources are unknown column references and
//! type errors inside binary operators.

use super::{Row, Value};
use crate::error::{SqlError, SqlResult};
use crate::plan::{BinaryOp, ScalarExpr};

/// Evaluates an expression against a row.
pub fn evaluate_expr(expr: &ScalarExpr, row: &Row) -> SqlResult<Value> {
    match expr {
        ScalarExpr::Literal(v) => Ok(v.clone()),

        ScalarExpr::Column(name) => row
            .get(name)
            .cloned()
            .ok_or_else(|| SqlError::ColumnNotFound(name.qualified_name())),

        ScalarExpr::Wildcard => Ok(Value::Wildcard),

        ScalarExpr::Not(inner) => Ok(evaluate_expr(inner, row)?.sql_not()),

        ScalarExpr::And(left, right) => {
            let l = evaluate_expr(left, row)?;
            let r = evaluate_expr(right, row)?;
            Ok(l.sql_and(&r))
        }

        ScalarExpr::Or(left, right) => {
            let l = evaluate_expr(left, row)?;
            let r = evaluate_expr(right, row)?;
            Ok(l.sql_or(&r))
        }

        ScalarExpr::IsNull { expr, negated } => {
            let v = evaluate_expr(expr, row)?;
            Ok(Value::Boolean(v.is_null() != *negated))
        }

        ScalarExpr::Case {
            branches,
            else_result,
        } => evaluate_case(branches, else_result.as_deref(), row),

        ScalarExpr::BinaryOp { op, left, right } => {
            let l = evaluate_expr(left, row)?;
            let r = evaluate_expr(right, row)?;
            evaluate_binary_op(*op, &l, &r)
        }
    }
}

/// Evaluates a searched CASE: the first branch whose condition is exactly
/// True wins; False and NULL both fall through.
fn evaluate_case(
    branches: &[(ScalarExpr, ScalarExpr)],
    else_result: Option<&ScalarExpr>,
    row: &Row,
) -> SqlResult<Value> {
    for (condition, result) in branches {
        if evaluate_expr(condition, row)?.as_bool() == Some(true) {
            return evaluate_expr(result, row);
        }
    }
    match else_result {
        Some(e) => evaluate_expr(e, row),
        None => Ok(Value::Null),
    }
}

/// Evaluates a binary operation on two values.
///
/// A NULL operand makes every operator here return NULL; only the logical
/// connectives and `IS NULL` escape that rule, and they are handled before
/// this point.
fn evaluate_binary_op(op: BinaryOp, left: &Value, right: &Value) -> SqlResult<Value> {
    if left.is_null() || right.is_null() {
        return Ok(Value::Null);
    }

    match op {
        BinaryOp::Eq => Ok(Value::Boolean(values_equal(left, right))),
        BinaryOp::NotEq => Ok(Value::Boolean(!values_equal(left, right))),

        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
            evaluate_comparison(op, left, right)
        }

        BinaryOp::Plus => evaluate_arithmetic(op, left, right, |a, b| a + b, |a, b| a + b),
        BinaryOp::Minus => evaluate_arithmetic(op, left, right, |a, b| a - b, |a, b| a - b),
        BinaryOp::Multiply => evaluate_arithmetic(op, left, right, |a, b| a * b, |a, b| a * b),
        BinaryOp::Divide => {
            if let (Value::Integer(_), Value::Integer(0)) = (left, right) {
                return Err(SqlError::eval("division by zero"));
            }
            evaluate_arithmetic(op, left, right, |a, b| a / b, |a, b| a / b)
        }

        BinaryOp::Concat => Ok(Value::Text(format!("{}{}", left, right))),
    }
}

/// SQL equality on non-null values: same tag compares by value, an
/// integer/float pair compares numerically, any other mixed pair is unequal.
fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => a == b,
        (Value::Float(a), Value::Float(b)) => a == b,
        (Value::Text(a), Value::Text(b)) => a == b,
        (Value::Boolean(a), Value::Boolean(b)) => a == b,
        (Value::Integer(a), Value::Float(b)) => (*a as f64) == *b,
        (Value::Float(a), Value::Integer(b)) => *a == (*b as f64),
        _ => false,
    }
}

/// Ordered comparison: numeric pairs promote to float, text compares
/// lexicographically, anything else is a type error.
fn evaluate_comparison(op: BinaryOp, left: &Value, right: &Value) -> SqlResult<Value> {
    if left.is_numeric() && right.is_numeric() {
        // Infallible for numeric values.
        let l = left.to_f64().unwrap_or_default();
        let r = right.to_f64().unwrap_or_default();
        let truth = match op {
            BinaryOp::Lt => l < r,
            BinaryOp::LtEq => l <= r,
            BinaryOp::Gt => l > r,
            BinaryOp::GtEq => l >= r,
            _ => unreachable!("not an ordering operator: {op}"),
        };
        return Ok(Value::Boolean(truth));
    }

    if let (Value::Text(l), Value::Text(r)) = (left, right) {
        let truth = match op {
            BinaryOp::Lt => l < r,
            BinaryOp::LtEq => l <= r,
            BinaryOp::Gt => l > r,
            BinaryOp::GtEq => l >= r,
            _ => unreachable!("not an ordering operator: {op}"),
        };
        return Ok(Value::Boolean(truth));
    }

    Err(SqlError::eval(format!(
        "operator {} is not defined for {} and {}",
        op,
        type_name(left),
        type_name(right)
    )))
}

/// Arithmetic with integer→float promotion: `int op int → int`, any float
/// operand promotes the result to float. Text arithmetic is a type error.
fn evaluate_arithmetic<F, G>(
    op: BinaryOp,
    left: &Value,
    right: &Value,
    int_op: F,
    float_op: G,
) -> SqlResult<Value>
where
    F: Fn(i64, i64) -> i64,
    G: Fn(f64, f64) -> f64,
{
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer(int_op(*a, *b))),
        (Value::Float(_), _) | (_, Value::Float(_)) => {
            let l = left
                .to_f64()
                .ok_or_else(|| arithmetic_type_error(op, left, right))?;
            let r = right
                .to_f64()
                .ok_or_else(|| arithmetic_type_error(op, left, right))?;
            Ok(Value::Float(float_op(l, r)))
        }
        _ => Err(arithmetic_type_error(op, left, right)),
    }
}

fn arithmetic_type_error(op: BinaryOp, left: &Value, right: &Value) -> SqlError {
    SqlError::eval(format!(
        "operator {} is not defined for {} and {}",
        op,
        type_name(left),
        type_name(right)
    ))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Boolean(_) => "boolean",
        Value::Integer(_) => "integer",
        Value::Float(_) => "float",
        Value::Text(_) => "text",
        Value::Wildcard => "wildcard",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnName;

    fn sample_row() -> Row {
        Row::new(
            vec![
                ColumnName::qualified("hoge", "id"),
                ColumnName::qualified("hoge", "name"),
                ColumnName::qualified("hoge", "cid"),
            ],
            vec![Value::integer(123), Value::text("taro"), Value::Null],
        )
    }

    fn col(name: &str) -> ScalarExpr {
        ScalarExpr::column(ColumnName::new(name))
    }

    #[test]
    fn test_column_lookup() {
        let row = sample_row();
        assert_eq!(
            evaluate_expr(&col("id"), &row).unwrap(),
            Value::integer(123)
        );
        assert_eq!(
            evaluate_expr(&ScalarExpr::column(ColumnName::qualified("hoge", "name")), &row)
                .unwrap(),
            Value::text("taro")
        );
    }

    #[test]
    fn test_missing_column() {
        let row = sample_row();
        let err = evaluate_expr(&col("nope"), &row).unwrap_err();
        assert!(matches!(err, SqlError::ColumnNotFound(_)));
    }

    #[test]
    fn test_null_equals_null_is_null() {
        let row = sample_row();
        let e = ScalarExpr::null().eq(ScalarExpr::null());
        assert_eq!(evaluate_expr(&e, &row).unwrap(), Value::Null);
    }

    #[test]
    fn test_null_is_null_is_true() {
        let row = sample_row();
        let e = ScalarExpr::IsNull {
            expr: Box::new(ScalarExpr::null()),
            negated: false,
        };
        assert_eq!(evaluate_expr(&e, &row).unwrap(), Value::boolean(true));

        let e = ScalarExpr::IsNull {
            expr: Box::new(col("cid")),
            negated: true,
        };
        assert_eq!(evaluate_expr(&e, &row).unwrap(), Value::boolean(false));
    }

    #[test]
    fn test_integer_float_mixing() {
        let row = Row::empty();
        let e = ScalarExpr::binary(
            ScalarExpr::integer(1),
            BinaryOp::Plus,
            ScalarExpr::Literal(Value::float(0.5)),
        );
        assert_eq!(evaluate_expr(&e, &row).unwrap(), Value::float(1.5));

        let e = ScalarExpr::integer(1).eq(ScalarExpr::Literal(Value::float(1.0)));
        assert_eq!(evaluate_expr(&e, &row).unwrap(), Value::boolean(true));
    }

    #[test]
    fn test_integer_arithmetic_stays_integer() {
        let row = Row::empty();
        let e = ScalarExpr::binary(
            ScalarExpr::integer(7),
            BinaryOp::Divide,
            ScalarExpr::integer(2),
        );
        assert_eq!(evaluate_expr(&e, &row).unwrap(), Value::integer(3));
    }

    #[test]
    fn test_division_by_zero() {
        let row = Row::empty();
        let e = ScalarExpr::binary(
            ScalarExpr::integer(1),
            BinaryOp::Divide,
            ScalarExpr::integer(0),
        );
        assert!(evaluate_expr(&e, &row).is_err());
    }

    #[test]
    fn test_text_ordering() {
        let row = Row::empty();
        let e = ScalarExpr::binary(ScalarExpr::text("abc"), BinaryOp::Lt, ScalarExpr::text("abd"));
        assert_eq!(evaluate_expr(&e, &row).unwrap(), Value::boolean(true));
    }

    #[test]
    fn test_text_plus_is_an_error() {
        let row = Row::empty();
        let e = ScalarExpr::binary(ScalarExpr::text("a"), BinaryOp::Plus, ScalarExpr::text("b"));
        assert!(evaluate_expr(&e, &row).is_err());
    }

    #[test]
    fn test_concat_stringifies() {
        let row = Row::empty();
        let e = ScalarExpr::binary(ScalarExpr::text("a"), BinaryOp::Concat, ScalarExpr::integer(1));
        assert_eq!(evaluate_expr(&e, &row).unwrap(), Value::text("a1"));
    }

    #[test]
    fn test_null_propagates_through_operators() {
        let row = Row::empty();
        for op in [BinaryOp::Eq, BinaryOp::Lt, BinaryOp::Plus, BinaryOp::Concat] {
            let e = ScalarExpr::binary(ScalarExpr::null(), op, ScalarExpr::integer(1));
            assert_eq!(evaluate_expr(&e, &row).unwrap(), Value::Null, "{op}");
        }
    }

    #[test]
    fn test_mixed_tags_are_unequal() {
        let row = Row::empty();
        let e = ScalarExpr::text("1").eq(ScalarExpr::integer(1));
        assert_eq!(evaluate_expr(&e, &row).unwrap(), Value::boolean(false));
    }

    #[test]
    fn test_case_first_true_branch_wins() {
        let row = sample_row();
        let e = ScalarExpr::Case {
            branches: vec![
                (
                    col("name").eq(ScalarExpr::text("jiro")),
                    ScalarExpr::text("JIRO"),
                ),
                (
                    col("name").eq(ScalarExpr::text("taro")),
                    ScalarExpr::text("TARO"),
                ),
            ],
            else_result: Some(Box::new(ScalarExpr::text("OTHER"))),
        };
        assert_eq!(evaluate_expr(&e, &row).unwrap(), Value::text("TARO"));
    }

    #[test]
    fn test_case_null_condition_falls_through() {
        let row = sample_row();
        // cid is NULL, so `cid = 1` is NULL, not a match.
        let e = ScalarExpr::Case {
            branches: vec![(col("cid").eq(ScalarExpr::integer(1)), ScalarExpr::text("yes"))],
            else_result: None,
        };
        assert_eq!(evaluate_expr(&e, &row).unwrap(), Value::Null);
    }

    #[test]
    fn test_three_valued_connectives() {
        let row = Row::empty();
        let null = ScalarExpr::null();
        let tru = ScalarExpr::Literal(Value::boolean(true));
        let fls = ScalarExpr::Literal(Value::boolean(false));

        let cases = [
            (null.clone().and(null.clone()), Value::Null),
            (tru.clone().and(null.clone()), Value::Null),
            (fls.clone().and(null.clone()), Value::boolean(false)),
            (tru.clone().or(null.clone()), Value::boolean(true)),
            (fls.clone().or(null.clone()), Value::Null),
            (ScalarExpr::Not(Box::new(null)), Value::Null),
        ];
        for (expr, expected) in cases {
            assert_eq!(evaluate_expr(&expr, &row).unwrap(), expected);
        }
    }
}
