//! Expression evaluator.
//!
//! Evaluates an expression AST against the variables of an [`ExpressionRoot`].

use std::cmp::Ordering;
use std::fmt;

use super::ast::{BinaryOp, Expression, UnaryOp};
use super::root::ExpressionRoot;
use super::{ElExpression, ParseError};
use crate::directory::Value;

/// Error type for expression evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    /// Root identifier not bound in the context
    UnknownIdentifier(String),
    /// Operands an operator cannot work with
    TypeMismatch {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },
    /// A value that cannot be coerced to a boolean
    NotBoolean(&'static str),
    /// Property access on a value without properties
    InvalidMember { name: String, target: &'static str },
    /// Bracket access with an unusable target or index
    InvalidIndex {
        target: &'static str,
        index: &'static str,
    },
}

impl fmt::Display for EvaluationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationError::UnknownIdentifier(name) => {
                write!(f, "unknown identifier: '{}'", name)
            }
            EvaluationError::TypeMismatch { op, left, right } => {
                write!(f, "cannot apply '{}' to {} and {}", op, left, right)
            }
            EvaluationError::NotBoolean(found) => {
                write!(f, "cannot coerce {} to boolean", found)
            }
            EvaluationError::InvalidMember { name, target } => {
                write!(f, "no property '{}' on {}", name, target)
            }
            EvaluationError::InvalidIndex { target, index } => {
                write!(f, "cannot index {} with {}", target, index)
            }
        }
    }
}

impl std::error::Error for EvaluationError {}

/// Evaluates expressions.
///
/// Evaluation is side-effect free. Absent attributes evaluate to `null`,
/// and any comparison involving `null` is false, so expressions over
/// missing data fail closed.
///
/// # Example
/// ```
/// use computed_groups_core::directory::Value;
/// use computed_groups_core::security::expression::{ExpressionContext, ExpressionEvaluator};
///
/// let evaluator = ExpressionEvaluator::new();
/// let mut context = ExpressionContext::new();
/// context.bind("hello", vec!["hello", "world"]);
///
/// let value = evaluator.evaluate_str("${hello[1]}", &context).unwrap();
/// assert_eq!(value, Value::from("world"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExpressionEvaluator;

impl ExpressionEvaluator {
    /// Creates a new evaluator.
    pub fn new() -> Self {
        ExpressionEvaluator
    }

    /// Evaluates an expression to a value.
    pub fn evaluate(
        &self,
        expr: &Expression,
        root: &dyn ExpressionRoot,
    ) -> Result<Value, EvaluationError> {
        match expr {
            Expression::Literal(value) => Ok(value.clone()),

            Expression::Identifier(name) => root
                .resolve_variable(name)
                .ok_or_else(|| EvaluationError::UnknownIdentifier(name.clone())),

            Expression::Member { target, name } => {
                let target = self.evaluate(target, root)?;
                member(&target, name)
            }

            Expression::Index { target, index } => {
                let target = self.evaluate(target, root)?;
                let index = self.evaluate(index, root)?;
                index_into(&target, &index)
            }

            Expression::Binary { left, op, right } => match op {
                BinaryOp::And => {
                    // Short-circuit: if left is false, don't evaluate right
                    if !coerce_bool(&self.evaluate(left, root)?)? {
                        return Ok(Value::Bool(false));
                    }
                    Ok(Value::Bool(coerce_bool(&self.evaluate(right, root)?)?))
                }
                BinaryOp::Or => {
                    // Short-circuit: if left is true, don't evaluate right
                    if coerce_bool(&self.evaluate(left, root)?)? {
                        return Ok(Value::Bool(true));
                    }
                    Ok(Value::Bool(coerce_bool(&self.evaluate(right, root)?)?))
                }
                _ => {
                    let left = self.evaluate(left, root)?;
                    let right = self.evaluate(right, root)?;
                    compare(*op, &left, &right).map(Value::Bool)
                }
            },

            Expression::Unary { op, expr } => {
                let value = self.evaluate(expr, root)?;
                match op {
                    UnaryOp::Not => Ok(Value::Bool(!coerce_bool(&value)?)),
                    UnaryOp::Empty => Ok(Value::Bool(value.is_empty())),
                    UnaryOp::Neg => negate(&value),
                }
            }

            Expression::Group(inner) => self.evaluate(inner, root),
        }
    }

    /// Evaluates an expression and coerces the result to a boolean.
    pub fn evaluate_bool(
        &self,
        expr: &Expression,
        root: &dyn ExpressionRoot,
    ) -> Result<bool, EvaluationError> {
        coerce_bool(&self.evaluate(expr, root)?)
    }

    /// Parses and evaluates an expression string.
    pub fn evaluate_str(
        &self,
        expr: &str,
        root: &dyn ExpressionRoot,
    ) -> Result<Value, ExpressionError> {
        let parsed = ElExpression::parse(expr)?;
        self.evaluate(parsed.ast(), root)
            .map_err(ExpressionError::Evaluation)
    }

    /// Parses and evaluates an expression string to a boolean.
    pub fn evaluate_str_bool(
        &self,
        expr: &str,
        root: &dyn ExpressionRoot,
    ) -> Result<bool, ExpressionError> {
        let parsed = ElExpression::parse(expr)?;
        self.evaluate_bool(parsed.ast(), root)
            .map_err(ExpressionError::Evaluation)
    }
}

/// Boolean coercion: `null` is false, strings are true only for "true".
pub fn coerce_bool(value: &Value) -> Result<bool, EvaluationError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Null => Ok(false),
        Value::String(s) => Ok(s.eq_ignore_ascii_case("true")),
        other => Err(EvaluationError::NotBoolean(other.type_name())),
    }
}

fn member(target: &Value, name: &str) -> Result<Value, EvaluationError> {
    match target {
        Value::Null => Ok(Value::Null),
        Value::Record(record) => Ok(record.member(name)),
        other => Err(EvaluationError::InvalidMember {
            name: name.to_string(),
            target: other.type_name(),
        }),
    }
}

fn index_into(target: &Value, index: &Value) -> Result<Value, EvaluationError> {
    let invalid = || EvaluationError::InvalidIndex {
        target: target.type_name(),
        index: index.type_name(),
    };

    match (target, index) {
        (Value::Null, _) | (_, Value::Null) => Ok(Value::Null),
        (Value::List(items), Value::Integer(i)) => Ok(usize::try_from(*i)
            .ok()
            .and_then(|i| items.get(i))
            .cloned()
            .unwrap_or(Value::Null)),
        (Value::List(items), Value::String(s)) => {
            let i: usize = s.trim().parse().map_err(|_| invalid())?;
            Ok(items.get(i).cloned().unwrap_or(Value::Null))
        }
        (Value::Record(record), Value::String(key)) => Ok(record.member(key)),
        _ => Err(invalid()),
    }
}

fn negate(value: &Value) -> Result<Value, EvaluationError> {
    let mismatch = || EvaluationError::TypeMismatch {
        op: "-",
        left: value.type_name(),
        right: value.type_name(),
    };

    match value {
        Value::Null => Ok(Value::Null),
        Value::Integer(i) => i.checked_neg().map(Value::Integer).ok_or_else(mismatch),
        Value::Float(x) => Ok(Value::Float(-x)),
        _ => Err(mismatch()),
    }
}

/// Applies a comparison operator.
///
/// Any comparison against `null` is false, `!=` included.
fn compare(op: BinaryOp, left: &Value, right: &Value) -> Result<bool, EvaluationError> {
    if left.is_null() || right.is_null() {
        return Ok(false);
    }

    let mismatch = || EvaluationError::TypeMismatch {
        op: op.symbol(),
        left: left.type_name(),
        right: right.type_name(),
    };

    match op {
        BinaryOp::Eq => equals(left, right).ok_or_else(mismatch),
        BinaryOp::Ne => equals(left, right).map(|eq| !eq).ok_or_else(mismatch),
        BinaryOp::Lt => ordering(left, right)
            .map(|o| o == Ordering::Less)
            .ok_or_else(mismatch),
        BinaryOp::Le => ordering(left, right)
            .map(|o| o != Ordering::Greater)
            .ok_or_else(mismatch),
        BinaryOp::Gt => ordering(left, right)
            .map(|o| o == Ordering::Greater)
            .ok_or_else(mismatch),
        BinaryOp::Ge => ordering(left, right)
            .map(|o| o != Ordering::Less)
            .ok_or_else(mismatch),
        BinaryOp::And | BinaryOp::Or => Err(mismatch()),
    }
}

/// Equality with EL-style coercions. `None` when the types do not mix.
fn equals(left: &Value, right: &Value) -> Option<bool> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Some(a == b),
        (Value::String(a), Value::String(b)) => Some(a == b),
        (Value::Bool(a), Value::Bool(b)) => Some(a == b),
        (Value::Bool(b), Value::String(s)) | (Value::String(s), Value::Bool(b)) => {
            parse_bool(s).map(|parsed| parsed == *b)
        }
        (Value::List(a), Value::List(b)) => Some(a == b),
        (Value::Record(a), Value::Record(b)) => Some(a == b),
        _ => {
            let (a, b) = (as_number(left)?, as_number(right)?);
            Some(a == b)
        }
    }
}

fn ordering(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => as_number(left)?.partial_cmp(&as_number(right)?),
    }
}

/// Numeric view of a value; strings count if they parse.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Integer(i) => Some(*i as f64),
        Value::Float(x) => Some(*x),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Combined error type for parsing and evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpressionError {
    /// Parse error
    Parse(ParseError),
    /// Evaluation error
    Evaluation(EvaluationError),
}

impl fmt::Display for ExpressionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpressionError::Parse(e) => write!(f, "parse error: {}", e),
            ExpressionError::Evaluation(e) => write!(f, "evaluation error: {}", e),
        }
    }
}

impl std::error::Error for ExpressionError {}

impl From<ParseError> for ExpressionError {
    fn from(err: ParseError) -> Self {
        ExpressionError::Parse(err)
    }
}

impl From<EvaluationError> for ExpressionError {
    fn from(err: EvaluationError) -> Self {
        ExpressionError::Evaluation(err)
    }
}
