//! Raw expression tree → normalized condition tree.
//!
//! Comparisons are resolved through a fixed token → operator-name table
//! keyed by the literal's parsed shape (numeric, text, boolean, list);
//! the `is` token is further keyed by its keyword value. A token with
//! no entry for the literal's shape is a translation error, never a
//! silently dropped condition.

use crate::ast::{Expr, RawLiteral};
use crate::error::CompileError;
use crate::rules::{ConditionNode, Literal};

/// Resolve an operator token against the literal written next to it.
fn operator_for(op_token: &str, value: &RawLiteral) -> Option<&'static str> {
    let numeric = matches!(value, RawLiteral::Int(_) | RawLiteral::Float(_));
    let text = matches!(value, RawLiteral::Str(_));
    let list = matches!(value, RawLiteral::List(_));

    match op_token {
        "=" if numeric || text => Some("equal_to"),
        ">" if numeric => Some("greater_than"),
        "<" if numeric => Some("less_than"),
        ">=" if numeric => Some("greater_than_or_equal_to"),
        "<=" if numeric => Some("less_than_or_equal_to"),
        "startswith" if text => Some("starts_with"),
        "endswith" if text => Some("ends_with"),
        "in" if text || list => Some("contains"),
        "containedby" if list => Some("is_contained_by"),
        "matches" if text => Some("matches_regex"),
        "not in" if list => Some("does_not_contain"),
        "not containedby" if list => Some("shares_no_elements_with"),
        "all in" if list => Some("contains_all"),
        "one in" if list => Some("shares_at_least_one_element_with"),
        "exactly one in" if list => Some("shares_exactly_one_element_with"),
        "is" => match value {
            RawLiteral::Notblank => Some("non_empty"),
            RawLiteral::Bool(true) => Some("is_true"),
            RawLiteral::Bool(false) => Some("is_false"),
            _ => None,
        },
        _ => None,
    }
}

fn convert_literal(value: &RawLiteral, line: u32) -> Result<Literal, CompileError> {
    match value {
        RawLiteral::Str(s) => Ok(Literal::Str(s.clone())),
        RawLiteral::Int(n) => Ok(Literal::Int(*n)),
        RawLiteral::Float(f) => {
            let d = f
                .parse()
                .map_err(|_| CompileError::BadNumericLiteral {
                    literal: f.clone(),
                    line,
                })?;
            Ok(Literal::Decimal(d))
        }
        RawLiteral::Bool(b) => Ok(Literal::Bool(*b)),
        // The no-input leaf keeps its keyword as the stored value
        RawLiteral::Notblank => Ok(Literal::Str("notblank".to_owned())),
        RawLiteral::List(items) => {
            let converted = items
                .iter()
                .map(|item| convert_literal(item, line))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Literal::List(converted))
        }
    }
}

/// Translate a parsed expression into the normalized condition tree.
///
/// A lone comparison at the top level wraps in an ALL group — the
/// default combinator when no logic operator appears.
pub fn translate(expr: &Expr) -> Result<ConditionNode, CompileError> {
    match expr {
        Expr::Comparison { .. } => Ok(ConditionNode::All(vec![node(expr)?])),
        _ => node(expr),
    }
}

fn node(expr: &Expr) -> Result<ConditionNode, CompileError> {
    match expr {
        Expr::All(children) => Ok(ConditionNode::All(
            children.iter().map(node).collect::<Result<Vec<_>, _>>()?,
        )),
        Expr::Any(children) => Ok(ConditionNode::Any(
            children.iter().map(node).collect::<Result<Vec<_>, _>>()?,
        )),
        Expr::Comparison {
            field,
            op_token,
            value,
            line,
        } => {
            let operator =
                operator_for(op_token, value).ok_or_else(|| CompileError::UnknownOperatorToken {
                    token: op_token.clone(),
                    shape: value.shape(),
                    line: *line,
                })?;
            Ok(ConditionNode::Leaf {
                name: field.clone(),
                operator: operator.to_owned(),
                value: convert_literal(value, *line)?,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_expression;

    fn compile(src: &str) -> Result<ConditionNode, CompileError> {
        translate(&parse_expression(src)?)
    }

    #[test]
    fn lone_comparison_wraps_in_all() {
        let node = compile("age > 18").unwrap();
        assert_eq!(
            node,
            ConditionNode::All(vec![ConditionNode::Leaf {
                name: "age".into(),
                operator: "greater_than".into(),
                value: Literal::Int(18),
            }])
        );
    }

    #[test]
    fn mixed_chain_nests_groups() {
        let node = compile("a > 1 and b > 2 or c = 'x'").unwrap();
        match node {
            ConditionNode::Any(children) => {
                assert!(matches!(&children[0], ConditionNode::All(kids) if kids.len() == 2));
                assert!(
                    matches!(&children[1], ConditionNode::Leaf { operator, .. } if operator == "equal_to")
                );
            }
            other => panic!("expected Any, got {:?}", other),
        }
    }

    #[test]
    fn float_equal_to_translates() {
        let node = compile("price = 5.5").unwrap();
        match node {
            ConditionNode::All(children) => assert!(matches!(
                &children[0],
                ConditionNode::Leaf { value: Literal::Decimal(_), .. }
            )),
            other => panic!("expected All, got {:?}", other),
        }
    }

    #[test]
    fn is_keyword_dispatch() {
        for (src, expected) in [
            ("name is notblank", "non_empty"),
            ("flag is true", "is_true"),
            ("flag is false", "is_false"),
        ] {
            let node = compile(src).unwrap();
            match node {
                ConditionNode::All(children) => assert!(
                    matches!(&children[0], ConditionNode::Leaf { operator, .. } if operator == expected)
                ),
                other => panic!("expected All, got {:?}", other),
            }
        }
    }

    #[test]
    fn list_operators_resolve() {
        for (src, expected) in [
            ("xs in [1, 2]", "contains"),
            ("xs not in [1]", "does_not_contain"),
            ("xs containedby [1]", "is_contained_by"),
            ("xs not containedby [1]", "shares_no_elements_with"),
            ("xs all in [1]", "contains_all"),
            ("xs one in [1]", "shares_at_least_one_element_with"),
            ("xs exactly one in [1]", "shares_exactly_one_element_with"),
        ] {
            let node = compile(src).unwrap();
            match node {
                ConditionNode::All(children) => assert!(
                    matches!(&children[0], ConditionNode::Leaf { operator, .. } if operator == expected),
                    "wrong operator for {:?}",
                    src
                ),
                other => panic!("expected All, got {:?}", other),
            }
        }
    }

    #[test]
    fn shape_mismatch_is_error() {
        // startswith has no numeric entry
        assert!(matches!(
            compile("name startswith 5"),
            Err(CompileError::UnknownOperatorToken { .. })
        ));
        // bool literals only pair with `is`
        assert!(matches!(
            compile("flag = true"),
            Err(CompileError::UnknownOperatorToken { .. })
        ));
    }

    #[test]
    fn is_with_arbitrary_text_is_error() {
        assert!(matches!(
            compile("name is 'blank'"),
            Err(CompileError::UnknownOperatorToken { .. })
        ));
    }
}
