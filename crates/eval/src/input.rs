//! Normalized-rule JSON parsing.
//!
//! Callers holding already-normalized rules hand them over as plain
//! JSON — `{"name", "conditions": {"all": [...]}, "actions": [...]}` —
//! bypassing the DSL compiler. Shape violations in the condition tree
//! (zero keys, both `all` and `any`, combinator keys mixed with leaf
//! fields, empty children) are `InvalidRuleShape`; everything else that
//! does not fit the structure is `MalformedInput`.

use arbiter_core::{ActionCall, ConditionNode, Literal, Params, Rule};
use rust_decimal::Decimal;

use crate::error::EvalError;

/// Parse rules input: an object is one rule, an array is a list.
pub fn rules_from_json(v: &serde_json::Value) -> Result<Vec<Rule>, EvalError> {
    match v {
        serde_json::Value::Object(_) => Ok(vec![rule_from_json(v)?]),
        serde_json::Value::Array(items) => {
            items.iter().map(rule_from_json).collect()
        }
        other => Err(EvalError::malformed(format!(
            "rules must be text, a rule object, or a list of rule objects, got {}",
            json_type_name(other)
        ))),
    }
}

/// Parse one normalized rule object.
pub fn rule_from_json(v: &serde_json::Value) -> Result<Rule, EvalError> {
    let obj = v
        .as_object()
        .ok_or_else(|| EvalError::malformed("a rule must be a JSON object"))?;

    // Rules built ad hoc may go untitled
    let name = match obj.get("name") {
        None => String::new(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => {
            return Err(EvalError::malformed(format!(
                "rule name must be a string, got {}",
                json_type_name(other)
            )))
        }
    };

    let conditions = obj
        .get("conditions")
        .ok_or_else(|| EvalError::malformed("rule is missing 'conditions'"))?;
    let conditions = condition_from_json(conditions)?;

    let actions = match obj.get("actions") {
        None => Vec::new(),
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .map(action_from_json)
            .collect::<Result<Vec<_>, _>>()?,
        Some(other) => {
            return Err(EvalError::malformed(format!(
                "rule actions must be a list, got {}",
                json_type_name(other)
            )))
        }
    };

    Ok(Rule {
        name,
        conditions,
        actions,
    })
}

pub fn condition_from_json(v: &serde_json::Value) -> Result<ConditionNode, EvalError> {
    let obj = v
        .as_object()
        .ok_or_else(|| EvalError::shape("a condition node must be a JSON object"))?;

    if obj.is_empty() {
        return Err(EvalError::shape("condition node has no keys"));
    }

    let has_all = obj.contains_key("all");
    let has_any = obj.contains_key("any");
    if has_all && has_any {
        return Err(EvalError::shape(
            "condition node has both 'all' and 'any'",
        ));
    }

    if has_all || has_any {
        // A combinator must be the node's only key
        if obj.len() != 1 {
            return Err(EvalError::shape(
                "combinator node carries keys besides its combinator",
            ));
        }
        let key = if has_all { "all" } else { "any" };
        let children = obj[key].as_array().ok_or_else(|| {
            EvalError::shape(format!("'{}' children must be a list", key))
        })?;
        if children.is_empty() {
            return Err(EvalError::shape(format!("'{}' group has no children", key)));
        }
        let children = children
            .iter()
            .map(condition_from_json)
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(if has_all {
            ConditionNode::All(children)
        } else {
            ConditionNode::Any(children)
        });
    }

    let name = get_str(obj, "name", "condition leaf")?;
    let operator = get_str(obj, "operator", "condition leaf")?;
    let value = obj
        .get("value")
        .ok_or_else(|| EvalError::shape("condition leaf is missing 'value'"))?;
    Ok(ConditionNode::Leaf {
        name,
        operator,
        value: literal_from_json(value)?,
    })
}

fn action_from_json(v: &serde_json::Value) -> Result<ActionCall, EvalError> {
    let obj = v
        .as_object()
        .ok_or_else(|| EvalError::malformed("an action call must be a JSON object"))?;
    let name = get_str(obj, "name", "action call").map_err(|_| {
        EvalError::malformed("action call is missing a string 'name'")
    })?;
    let mut params = Params::new();
    if let Some(raw) = obj.get("params") {
        let map = raw
            .as_object()
            .ok_or_else(|| EvalError::malformed("action params must be an object"))?;
        for (key, value) in map {
            let value = value.as_str().ok_or_else(|| {
                EvalError::malformed(format!("action param '{}' must be a string", key))
            })?;
            params.insert(key, value);
        }
    }
    Ok(ActionCall { name, params })
}

fn literal_from_json(v: &serde_json::Value) -> Result<Literal, EvalError> {
    match v {
        serde_json::Value::String(s) => Ok(Literal::Str(s.clone())),
        serde_json::Value::Bool(b) => Ok(Literal::Bool(*b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(Literal::Int(i));
            }
            let f = n.as_f64().ok_or_else(|| {
                EvalError::malformed(format!("unsupported number literal {}", n))
            })?;
            let d = Decimal::try_from(f).map_err(|_| {
                EvalError::malformed(format!("number literal {} is not representable", n))
            })?;
            Ok(Literal::Decimal(d))
        }
        serde_json::Value::Array(items) => {
            let converted = items
                .iter()
                .map(|item| match item {
                    serde_json::Value::Array(_) | serde_json::Value::Object(_) => Err(
                        EvalError::malformed("list literals may only hold scalars"),
                    ),
                    scalar => literal_from_json(scalar),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Literal::List(converted))
        }
        other => Err(EvalError::malformed(format!(
            "unsupported comparison literal: {}",
            json_type_name(other)
        ))),
    }
}

fn get_str(
    obj: &serde_json::Map<String, serde_json::Value>,
    field: &str,
    context: &str,
) -> Result<String, EvalError> {
    obj.get(field)
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .ok_or_else(|| EvalError::shape(format!("{} is missing string '{}'", context, field)))
}

fn json_type_name(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "a list",
        serde_json::Value::Object(_) => "an object",
    }
}
