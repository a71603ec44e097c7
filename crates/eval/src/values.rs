//! Value kinds and runtime values.
//!
//! Every variable is declared with a [`ValueKind`]; the raw value a
//! provider returns is cast into that kind before any operator runs.
//! A raw value whose shape does not match the kind's constructor rule
//! is an `InvalidValue` error.

use std::fmt;

use arbiter_core::Literal;
use rust_decimal::Decimal;

use crate::error::EvalError;

/// Numeric comparisons treat values within this absolute distance as equal.
pub const EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 6); // 0.000001

// ──────────────────────────────────────────────
// Kinds
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Numeric,
    Boolean,
    Select,
    SelectMultiple,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Text => "text",
            ValueKind::Numeric => "numeric",
            ValueKind::Boolean => "boolean",
            ValueKind::Select => "select",
            ValueKind::SelectMultiple => "select_multiple",
        };
        write!(f, "{}", name)
    }
}

// ──────────────────────────────────────────────
// Values
// ──────────────────────────────────────────────

/// A raw value cast into its declared kind. Select containers keep
/// their elements as plain JSON scalars — the container is typed, the
/// elements are not.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Numeric(Decimal),
    Boolean(bool),
    Select(Vec<serde_json::Value>),
    SelectMultiple(Vec<serde_json::Value>),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Text(_) => ValueKind::Text,
            Value::Numeric(_) => ValueKind::Numeric,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Select(_) => ValueKind::Select,
            Value::SelectMultiple(_) => ValueKind::SelectMultiple,
        }
    }

    pub fn as_text(&self) -> Result<&str, EvalError> {
        match self {
            Value::Text(s) => Ok(s),
            other => Err(EvalError::invalid_value(format!(
                "expected a text value, got {}",
                other.kind()
            ))),
        }
    }

    pub fn as_numeric(&self) -> Result<Decimal, EvalError> {
        match self {
            Value::Numeric(d) => Ok(*d),
            other => Err(EvalError::invalid_value(format!(
                "expected a numeric value, got {}",
                other.kind()
            ))),
        }
    }

    pub fn as_boolean(&self) -> Result<bool, EvalError> {
        match self {
            Value::Boolean(b) => Ok(*b),
            other => Err(EvalError::invalid_value(format!(
                "expected a boolean value, got {}",
                other.kind()
            ))),
        }
    }

    pub fn as_elements(&self) -> Result<&[serde_json::Value], EvalError> {
        match self {
            Value::Select(items) | Value::SelectMultiple(items) => Ok(items),
            other => Err(EvalError::invalid_value(format!(
                "expected a select value, got {}",
                other.kind()
            ))),
        }
    }
}

// ──────────────────────────────────────────────
// Casting
// ──────────────────────────────────────────────

/// Cast a provider-supplied raw value into the declared kind.
///
/// Text accepts null (absent values become the empty string); Numeric
/// accepts integers and floats; Boolean accepts strictly true/false;
/// the select kinds accept arrays.
pub fn cast(kind: ValueKind, raw: &serde_json::Value) -> Result<Value, EvalError> {
    match kind {
        ValueKind::Text => match raw {
            serde_json::Value::Null => Ok(Value::Text(String::new())),
            serde_json::Value::String(s) => Ok(Value::Text(s.clone())),
            other => Err(EvalError::invalid_value(format!(
                "{} is not a valid text value",
                other
            ))),
        },
        ValueKind::Numeric => match raw {
            serde_json::Value::Number(n) => Ok(Value::Numeric(number_to_decimal(n)?)),
            other => Err(EvalError::invalid_value(format!(
                "{} is not a valid numeric value",
                other
            ))),
        },
        ValueKind::Boolean => match raw {
            serde_json::Value::Bool(b) => Ok(Value::Boolean(*b)),
            other => Err(EvalError::invalid_value(format!(
                "{} is not a valid boolean value",
                other
            ))),
        },
        ValueKind::Select => match raw {
            serde_json::Value::Array(items) => Ok(Value::Select(items.clone())),
            other => Err(EvalError::invalid_value(format!(
                "{} is not a valid select value",
                other
            ))),
        },
        ValueKind::SelectMultiple => match raw {
            serde_json::Value::Array(items) => Ok(Value::SelectMultiple(items.clone())),
            other => Err(EvalError::invalid_value(format!(
                "{} is not a valid select_multiple value",
                other
            ))),
        },
    }
}

/// Cast a comparison literal against the field's kind (operator
/// argument coercion). Same constructor rules as [`cast`], over the
/// normalized literal shapes.
pub fn cast_literal(kind: ValueKind, literal: &Literal) -> Result<Value, EvalError> {
    match kind {
        ValueKind::Text => match literal {
            Literal::Str(s) => Ok(Value::Text(s.clone())),
            other => Err(EvalError::invalid_value(format!(
                "{} literal is not a valid text argument",
                other.shape()
            ))),
        },
        ValueKind::Numeric => match literal {
            Literal::Int(n) => Ok(Value::Numeric(Decimal::from(*n))),
            Literal::Decimal(d) => Ok(Value::Numeric(*d)),
            other => Err(EvalError::invalid_value(format!(
                "{} literal is not a valid numeric argument",
                other.shape()
            ))),
        },
        ValueKind::Boolean => match literal {
            Literal::Bool(b) => Ok(Value::Boolean(*b)),
            other => Err(EvalError::invalid_value(format!(
                "{} literal is not a valid boolean argument",
                other.shape()
            ))),
        },
        ValueKind::Select | ValueKind::SelectMultiple => match literal {
            Literal::List(items) => {
                let elements = items.iter().map(Literal::to_json).collect();
                Ok(match kind {
                    ValueKind::Select => Value::Select(elements),
                    _ => Value::SelectMultiple(elements),
                })
            }
            other => Err(EvalError::invalid_value(format!(
                "{} literal is not a valid {} argument",
                other.shape(),
                kind
            ))),
        },
    }
}

fn number_to_decimal(n: &serde_json::Number) -> Result<Decimal, EvalError> {
    if let Some(i) = n.as_i64() {
        return Ok(Decimal::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Ok(Decimal::from(u));
    }
    let f = n
        .as_f64()
        .ok_or_else(|| EvalError::invalid_value(format!("{} is not a valid number", n)))?;
    Decimal::try_from(f)
        .map_err(|_| EvalError::invalid_value(format!("{} is not representable as a decimal", n)))
}

// ──────────────────────────────────────────────
// Scalar comparison
// ──────────────────────────────────────────────

/// Element equality for select containers: case-insensitive when both
/// sides are text, numeric across integer/float representations, exact
/// equality otherwise.
pub fn scalar_eq(a: &serde_json::Value, b: &serde_json::Value) -> bool {
    match (a, b) {
        (serde_json::Value::String(x), serde_json::Value::String(y)) => {
            x.to_lowercase() == y.to_lowercase()
        }
        (serde_json::Value::Number(x), serde_json::Value::Number(y)) => {
            match (x.as_f64(), y.as_f64()) {
                (Some(fx), Some(fy)) => fx == fy,
                _ => x == y,
            }
        }
        _ => a == b,
    }
}

/// Membership test over a select container's elements.
pub fn scalar_in(elements: &[serde_json::Value], needle: &serde_json::Value) -> bool {
    elements.iter().any(|el| scalar_eq(el, needle))
}
