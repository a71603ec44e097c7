//! Static operator registry, one table per value kind.
//!
//! Each entry carries the operator's metadata (symbolic token, input
//! shape, constrained keyword value, argument-coercion flag) and a
//! handler function. The tables are plain consts built at compile
//! time — nothing is discovered at runtime.
//!
//! When an entry's `coerce_args` flag is set, the comparison literal is
//! cast against the field's own kind before the handler runs; a
//! mismatched literal is an `InvalidValue` error, which is distinct
//! from `UnknownOperator`.

use arbiter_core::Literal;
use regex::Regex;

use crate::error::EvalError;
use crate::values::{cast_literal, scalar_in, Value, ValueKind, EPSILON};

// ──────────────────────────────────────────────
// Registry types
// ──────────────────────────────────────────────

/// How many comparison values an operator takes, and of what shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputShape {
    /// No comparison value (e.g. `is notblank`).
    None,
    Text,
    Numeric,
    Select,
    SelectMultiple,
}

impl InputShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputShape::None => "none",
            InputShape::Text => "text",
            InputShape::Numeric => "numeric",
            InputShape::Select => "select",
            InputShape::SelectMultiple => "select_multiple",
        }
    }
}

/// The comparison argument as the handler sees it: coerced into the
/// field's kind, or the raw literal when the operator's coercion flag
/// is off (the select membership operators take an untyped scalar).
#[derive(Debug, Clone)]
pub enum CompArg {
    Cast(Value),
    Raw(Literal),
}

type Handler = fn(&Value, Option<&CompArg>) -> Result<bool, EvalError>;

pub struct OperatorDef {
    pub name: &'static str,
    /// Symbolic token, registry metadata only — DSL dispatch goes
    /// through the translator's token table.
    pub token: &'static str,
    pub input: InputShape,
    /// Constrained keyword literal, where one applies (`is` forms).
    pub valid_value: Option<&'static str>,
    pub coerce_args: bool,
    apply: Handler,
}

// ──────────────────────────────────────────────
// Lookup and dispatch
// ──────────────────────────────────────────────

/// All operators defined on a value kind, with their metadata.
pub fn operators_of(kind: ValueKind) -> &'static [OperatorDef] {
    match kind {
        ValueKind::Text => TEXT_OPERATORS,
        ValueKind::Numeric => NUMERIC_OPERATORS,
        ValueKind::Boolean => BOOLEAN_OPERATORS,
        ValueKind::Select => SELECT_OPERATORS,
        ValueKind::SelectMultiple => SELECT_MULTIPLE_OPERATORS,
    }
}

pub fn lookup(kind: ValueKind, name: &str) -> Option<&'static OperatorDef> {
    operators_of(kind).iter().find(|def| def.name == name)
}

/// Run an operator against a cast field value and the leaf's literal.
///
/// Input-shape None operators ignore the literal entirely; all others
/// receive it as their single comparison argument, coerced first when
/// the entry says so.
pub fn apply(
    def: &OperatorDef,
    kind: ValueKind,
    value: &Value,
    literal: &Literal,
) -> Result<bool, EvalError> {
    let arg = match def.input {
        InputShape::None => None,
        _ if def.coerce_args => Some(CompArg::Cast(cast_literal(kind, literal)?)),
        _ => Some(CompArg::Raw(literal.clone())),
    };
    (def.apply)(value, arg.as_ref())
}

/// The whole registry as JSON, for introspection and documentation.
pub fn catalog() -> serde_json::Value {
    let kinds = [
        ValueKind::Text,
        ValueKind::Numeric,
        ValueKind::Boolean,
        ValueKind::Select,
        ValueKind::SelectMultiple,
    ];
    let mut map = serde_json::Map::new();
    for kind in kinds {
        let ops: Vec<serde_json::Value> = operators_of(kind)
            .iter()
            .map(|def| {
                serde_json::json!({
                    "name": def.name,
                    "token": def.token,
                    "input": def.input.as_str(),
                    "valid_value": def.valid_value,
                    "coerce_args": def.coerce_args,
                })
            })
            .collect();
        map.insert(kind.to_string(), serde_json::Value::Array(ops));
    }
    serde_json::Value::Object(map)
}

// ──────────────────────────────────────────────
// Handler argument helpers
// ──────────────────────────────────────────────

fn cast_arg<'a>(arg: Option<&'a CompArg>) -> Result<&'a Value, EvalError> {
    match arg {
        Some(CompArg::Cast(value)) => Ok(value),
        _ => Err(EvalError::invalid_value(
            "operator requires a coerced comparison value",
        )),
    }
}

fn raw_arg<'a>(arg: Option<&'a CompArg>) -> Result<&'a Literal, EvalError> {
    match arg {
        Some(CompArg::Raw(literal)) => Ok(literal),
        _ => Err(EvalError::invalid_value(
            "operator requires a raw comparison value",
        )),
    }
}

// ──────────────────────────────────────────────
// Text
// ──────────────────────────────────────────────

pub static TEXT_OPERATORS: &[OperatorDef] = &[
    OperatorDef {
        name: "equal_to",
        token: "=",
        input: InputShape::Text,
        valid_value: None,
        coerce_args: true,
        apply: text_equal_to,
    },
    OperatorDef {
        name: "equal_to_case_insensitive",
        token: "~=",
        input: InputShape::Text,
        valid_value: None,
        coerce_args: true,
        apply: text_equal_to_case_insensitive,
    },
    OperatorDef {
        name: "starts_with",
        token: "startswith",
        input: InputShape::Text,
        valid_value: None,
        coerce_args: true,
        apply: text_starts_with,
    },
    OperatorDef {
        name: "ends_with",
        token: "endswith",
        input: InputShape::Text,
        valid_value: None,
        coerce_args: true,
        apply: text_ends_with,
    },
    OperatorDef {
        name: "contains",
        token: "in",
        input: InputShape::Text,
        valid_value: None,
        coerce_args: true,
        apply: text_contains,
    },
    OperatorDef {
        name: "matches_regex",
        token: "matches",
        input: InputShape::Text,
        valid_value: None,
        coerce_args: true,
        apply: text_matches_regex,
    },
    OperatorDef {
        name: "non_empty",
        token: "is",
        input: InputShape::None,
        valid_value: Some("notblank"),
        coerce_args: true,
        apply: text_non_empty,
    },
];

fn text_equal_to(value: &Value, arg: Option<&CompArg>) -> Result<bool, EvalError> {
    Ok(value.as_text()? == cast_arg(arg)?.as_text()?)
}

fn text_equal_to_case_insensitive(value: &Value, arg: Option<&CompArg>) -> Result<bool, EvalError> {
    Ok(value.as_text()?.to_lowercase() == cast_arg(arg)?.as_text()?.to_lowercase())
}

fn text_starts_with(value: &Value, arg: Option<&CompArg>) -> Result<bool, EvalError> {
    Ok(value.as_text()?.starts_with(cast_arg(arg)?.as_text()?))
}

fn text_ends_with(value: &Value, arg: Option<&CompArg>) -> Result<bool, EvalError> {
    Ok(value.as_text()?.ends_with(cast_arg(arg)?.as_text()?))
}

fn text_contains(value: &Value, arg: Option<&CompArg>) -> Result<bool, EvalError> {
    Ok(value.as_text()?.contains(cast_arg(arg)?.as_text()?))
}

fn text_matches_regex(value: &Value, arg: Option<&CompArg>) -> Result<bool, EvalError> {
    let pattern = cast_arg(arg)?.as_text()?;
    let re = Regex::new(pattern)
        .map_err(|e| EvalError::invalid_value(format!("invalid regex '{}': {}", pattern, e)))?;
    Ok(re.is_match(value.as_text()?))
}

fn text_non_empty(value: &Value, _arg: Option<&CompArg>) -> Result<bool, EvalError> {
    Ok(!value.as_text()?.is_empty())
}

// ──────────────────────────────────────────────
// Numeric
// ──────────────────────────────────────────────

/// The `less_than_or_equal_to` token reads `>=` in the original
/// registration and is preserved as-is; see DESIGN.md. Dispatch is by
/// operator name, so the duplicate token never affects evaluation.
pub static NUMERIC_OPERATORS: &[OperatorDef] = &[
    OperatorDef {
        name: "equal_to",
        token: "=",
        input: InputShape::Numeric,
        valid_value: None,
        coerce_args: true,
        apply: numeric_equal_to,
    },
    OperatorDef {
        name: "greater_than",
        token: ">",
        input: InputShape::Numeric,
        valid_value: None,
        coerce_args: true,
        apply: numeric_greater_than,
    },
    OperatorDef {
        name: "greater_than_or_equal_to",
        token: ">=",
        input: InputShape::Numeric,
        valid_value: None,
        coerce_args: true,
        apply: numeric_greater_than_or_equal_to,
    },
    OperatorDef {
        name: "less_than",
        token: "<",
        input: InputShape::Numeric,
        valid_value: None,
        coerce_args: true,
        apply: numeric_less_than,
    },
    OperatorDef {
        name: "less_than_or_equal_to",
        token: ">=",
        input: InputShape::Numeric,
        valid_value: None,
        coerce_args: true,
        apply: numeric_less_than_or_equal_to,
    },
];

fn numeric_equal_to(value: &Value, arg: Option<&CompArg>) -> Result<bool, EvalError> {
    let (a, b) = (value.as_numeric()?, cast_arg(arg)?.as_numeric()?);
    Ok((a - b).abs() <= EPSILON)
}

fn numeric_greater_than(value: &Value, arg: Option<&CompArg>) -> Result<bool, EvalError> {
    let (a, b) = (value.as_numeric()?, cast_arg(arg)?.as_numeric()?);
    Ok(a - b > EPSILON)
}

fn numeric_greater_than_or_equal_to(value: &Value, arg: Option<&CompArg>) -> Result<bool, EvalError> {
    Ok(numeric_greater_than(value, arg)? || numeric_equal_to(value, arg)?)
}

fn numeric_less_than(value: &Value, arg: Option<&CompArg>) -> Result<bool, EvalError> {
    let (a, b) = (value.as_numeric()?, cast_arg(arg)?.as_numeric()?);
    Ok(b - a > EPSILON)
}

fn numeric_less_than_or_equal_to(value: &Value, arg: Option<&CompArg>) -> Result<bool, EvalError> {
    Ok(numeric_less_than(value, arg)? || numeric_equal_to(value, arg)?)
}

// ──────────────────────────────────────────────
// Boolean
// ──────────────────────────────────────────────

pub static BOOLEAN_OPERATORS: &[OperatorDef] = &[
    OperatorDef {
        name: "is_true",
        token: "is",
        input: InputShape::None,
        valid_value: Some("true"),
        coerce_args: true,
        apply: boolean_is_true,
    },
    OperatorDef {
        name: "is_false",
        token: "is",
        input: InputShape::None,
        valid_value: Some("false"),
        coerce_args: true,
        apply: boolean_is_false,
    },
];

fn boolean_is_true(value: &Value, _arg: Option<&CompArg>) -> Result<bool, EvalError> {
    value.as_boolean()
}

fn boolean_is_false(value: &Value, _arg: Option<&CompArg>) -> Result<bool, EvalError> {
    Ok(!value.as_boolean()?)
}

// ──────────────────────────────────────────────
// Select
// ──────────────────────────────────────────────

/// The select membership operators compare the container against one
/// scalar; their coercion flag is off so the scalar stays untyped.
pub static SELECT_OPERATORS: &[OperatorDef] = &[
    OperatorDef {
        name: "contains",
        token: "in",
        input: InputShape::Select,
        valid_value: None,
        coerce_args: false,
        apply: select_contains,
    },
    OperatorDef {
        name: "does_not_contain",
        token: "not in",
        input: InputShape::Select,
        valid_value: None,
        coerce_args: false,
        apply: select_does_not_contain,
    },
];

fn select_contains(value: &Value, arg: Option<&CompArg>) -> Result<bool, EvalError> {
    let needle = raw_arg(arg)?.to_json();
    Ok(scalar_in(value.as_elements()?, &needle))
}

fn select_does_not_contain(value: &Value, arg: Option<&CompArg>) -> Result<bool, EvalError> {
    Ok(!select_contains(value, arg)?)
}

// ──────────────────────────────────────────────
// SelectMultiple
// ──────────────────────────────────────────────

pub static SELECT_MULTIPLE_OPERATORS: &[OperatorDef] = &[
    OperatorDef {
        name: "contains_all",
        token: "all in",
        input: InputShape::SelectMultiple,
        valid_value: None,
        coerce_args: true,
        apply: multi_contains_all,
    },
    OperatorDef {
        name: "is_contained_by",
        token: "containedby",
        input: InputShape::SelectMultiple,
        valid_value: None,
        coerce_args: true,
        apply: multi_is_contained_by,
    },
    OperatorDef {
        name: "shares_at_least_one_element_with",
        token: "one in",
        input: InputShape::SelectMultiple,
        valid_value: None,
        coerce_args: true,
        apply: multi_shares_at_least_one,
    },
    OperatorDef {
        name: "shares_exactly_one_element_with",
        token: "exactly one in",
        input: InputShape::SelectMultiple,
        valid_value: None,
        coerce_args: true,
        apply: multi_shares_exactly_one,
    },
    OperatorDef {
        name: "shares_no_elements_with",
        token: "not containedby",
        input: InputShape::SelectMultiple,
        valid_value: None,
        coerce_args: true,
        apply: multi_shares_none,
    },
];

fn multi_contains_all(value: &Value, arg: Option<&CompArg>) -> Result<bool, EvalError> {
    let field = value.as_elements()?;
    let other = cast_arg(arg)?.as_elements()?;
    Ok(other.iter().all(|el| scalar_in(field, el)))
}

fn multi_is_contained_by(value: &Value, arg: Option<&CompArg>) -> Result<bool, EvalError> {
    let field = value.as_elements()?;
    let other = cast_arg(arg)?.as_elements()?;
    Ok(field.iter().all(|el| scalar_in(other, el)))
}

fn multi_shares_at_least_one(value: &Value, arg: Option<&CompArg>) -> Result<bool, EvalError> {
    let field = value.as_elements()?;
    let other = cast_arg(arg)?.as_elements()?;
    Ok(other.iter().any(|el| scalar_in(field, el)))
}

fn multi_shares_exactly_one(value: &Value, arg: Option<&CompArg>) -> Result<bool, EvalError> {
    let field = value.as_elements()?;
    let other = cast_arg(arg)?.as_elements()?;
    let mut found_one = false;
    for el in other {
        if scalar_in(field, el) {
            if found_one {
                return Ok(false);
            }
            found_one = true;
        }
    }
    Ok(found_one)
}

fn multi_shares_none(value: &Value, arg: Option<&CompArg>) -> Result<bool, EvalError> {
    Ok(!multi_shares_at_least_one(value, arg)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use serde_json::json;

    fn run(kind: ValueKind, value: Value, op: &str, literal: Literal) -> bool {
        let def = lookup(kind, op).expect("operator should exist");
        apply(def, kind, &value, &literal).unwrap()
    }

    #[test]
    fn lookup_unknown_operator() {
        assert!(lookup(ValueKind::Numeric, "starts_with").is_none());
        assert!(lookup(ValueKind::Text, "greater_than").is_none());
    }

    #[test]
    fn text_semantics() {
        let v = Value::Text("hello world".into());
        assert!(run(ValueKind::Text, v.clone(), "equal_to", Literal::Str("hello world".into())));
        assert!(run(
            ValueKind::Text,
            Value::Text("Hello".into()),
            "equal_to_case_insensitive",
            Literal::Str("hello".into())
        ));
        assert!(run(ValueKind::Text, v.clone(), "starts_with", Literal::Str("hello".into())));
        assert!(run(ValueKind::Text, v.clone(), "ends_with", Literal::Str("world".into())));
        assert!(run(ValueKind::Text, v.clone(), "contains", Literal::Str("lo wo".into())));
        assert!(run(ValueKind::Text, v.clone(), "matches_regex", Literal::Str("w.rld".into())));
        assert!(run(ValueKind::Text, v, "non_empty", Literal::Str("notblank".into())));
        assert!(!run(
            ValueKind::Text,
            Value::Text(String::new()),
            "non_empty",
            Literal::Str("notblank".into())
        ));
    }

    #[test]
    fn regex_matches_anywhere() {
        let v = Value::Text("xx abc yy".into());
        assert!(run(ValueKind::Text, v.clone(), "matches_regex", Literal::Str("abc".into())));
        assert!(!run(ValueKind::Text, v, "matches_regex", Literal::Str("^abc$".into())));
    }

    #[test]
    fn invalid_regex_is_invalid_value() {
        let def = lookup(ValueKind::Text, "matches_regex").unwrap();
        let err = apply(
            def,
            ValueKind::Text,
            &Value::Text("x".into()),
            &Literal::Str("(".into()),
        )
        .unwrap_err();
        assert!(matches!(err, EvalError::InvalidValue { .. }));
    }

    #[test]
    fn numeric_epsilon_equality() {
        let five = Value::Numeric(Decimal::from(5));
        assert!(run(
            ValueKind::Numeric,
            Value::Numeric("5.0000001".parse().unwrap()),
            "equal_to",
            Literal::Int(5)
        ));
        assert!(!run(
            ValueKind::Numeric,
            Value::Numeric("5.1".parse().unwrap()),
            "equal_to",
            Literal::Int(5)
        ));
        // within epsilon of the boundary is equal, not greater
        assert!(!run(
            ValueKind::Numeric,
            Value::Numeric("5.0000001".parse().unwrap()),
            "greater_than",
            Literal::Int(5)
        ));
        assert!(run(ValueKind::Numeric, five.clone(), "greater_than_or_equal_to", Literal::Int(5)));
        assert!(run(ValueKind::Numeric, five.clone(), "less_than_or_equal_to", Literal::Int(5)));
        assert!(run(ValueKind::Numeric, five.clone(), "less_than", Literal::Int(6)));
        assert!(run(ValueKind::Numeric, five, "greater_than", Literal::Decimal("4.5".parse().unwrap())));
    }

    #[test]
    fn numeric_argument_coercion_rejects_text() {
        let def = lookup(ValueKind::Numeric, "greater_than").unwrap();
        let err = apply(
            def,
            ValueKind::Numeric,
            &Value::Numeric(Decimal::from(5)),
            &Literal::Str("4".into()),
        )
        .unwrap_err();
        assert!(matches!(err, EvalError::InvalidValue { .. }));
    }

    #[test]
    fn lte_token_defect_is_preserved() {
        let lte = lookup(ValueKind::Numeric, "less_than_or_equal_to").unwrap();
        let gte = lookup(ValueKind::Numeric, "greater_than_or_equal_to").unwrap();
        assert_eq!(lte.token, gte.token);
    }

    #[test]
    fn boolean_semantics() {
        assert!(run(ValueKind::Boolean, Value::Boolean(true), "is_true", Literal::Bool(true)));
        assert!(run(ValueKind::Boolean, Value::Boolean(false), "is_false", Literal::Bool(false)));
        assert!(!run(ValueKind::Boolean, Value::Boolean(false), "is_true", Literal::Bool(true)));
    }

    #[test]
    fn select_contains_is_case_insensitive_for_text() {
        let v = Value::Select(vec![json!("A"), json!("b")]);
        assert!(run(ValueKind::Select, v.clone(), "contains", Literal::Str("a".into())));
        assert!(run(ValueKind::Select, v, "does_not_contain", Literal::Str("c".into())));
    }

    #[test]
    fn select_contains_exact_for_non_text() {
        let v = Value::Select(vec![json!(1), json!(2)]);
        assert!(run(ValueKind::Select, v.clone(), "contains", Literal::Int(1)));
        assert!(!run(ValueKind::Select, v, "contains", Literal::Str("1".into())));
    }

    #[test]
    fn select_multiple_set_operators() {
        let v = Value::SelectMultiple(vec![json!(1), json!(2), json!(3)]);
        let list = |items: Vec<Literal>| Literal::List(items);

        assert!(run(
            ValueKind::SelectMultiple,
            v.clone(),
            "contains_all",
            list(vec![Literal::Int(1), Literal::Int(3)])
        ));
        assert!(!run(
            ValueKind::SelectMultiple,
            v.clone(),
            "contains_all",
            list(vec![Literal::Int(1), Literal::Int(9)])
        ));
        assert!(run(
            ValueKind::SelectMultiple,
            Value::SelectMultiple(vec![json!(1)]),
            "is_contained_by",
            list(vec![Literal::Int(1), Literal::Int(2)])
        ));
        assert!(run(
            ValueKind::SelectMultiple,
            v.clone(),
            "shares_at_least_one_element_with",
            list(vec![Literal::Int(3), Literal::Int(9)])
        ));
        // two overlaps is not "exactly one"
        assert!(!run(
            ValueKind::SelectMultiple,
            v.clone(),
            "shares_exactly_one_element_with",
            list(vec![Literal::Int(2), Literal::Int(3)])
        ));
        assert!(run(
            ValueKind::SelectMultiple,
            v.clone(),
            "shares_exactly_one_element_with",
            list(vec![Literal::Int(2), Literal::Int(9)])
        ));
        assert!(run(
            ValueKind::SelectMultiple,
            v,
            "shares_no_elements_with",
            list(vec![Literal::Int(7), Literal::Int(9)])
        ));
    }

    #[test]
    fn select_multiple_coerces_argument_shape() {
        let def = lookup(ValueKind::SelectMultiple, "contains_all").unwrap();
        let err = apply(
            def,
            ValueKind::SelectMultiple,
            &Value::SelectMultiple(vec![json!(1)]),
            &Literal::Int(1),
        )
        .unwrap_err();
        assert!(matches!(err, EvalError::InvalidValue { .. }));
    }

    #[test]
    fn catalog_is_reproducible() {
        let cat = catalog();
        assert_eq!(cat["text"].as_array().unwrap().len(), 7);
        assert_eq!(cat["numeric"].as_array().unwrap().len(), 5);
        assert_eq!(cat["boolean"].as_array().unwrap().len(), 2);
        assert_eq!(cat["select"].as_array().unwrap().len(), 2);
        assert_eq!(cat["select_multiple"].as_array().unwrap().len(), 5);
        assert_eq!(cat, catalog());
        let non_empty = &cat["text"][6];
        assert_eq!(non_empty["input"], "none");
        assert_eq!(non_empty["valid_value"], "notblank");
    }
}
