//! Condition-tree evaluation.
//!
//! Recursive walk with short-circuiting: ALL groups stop at the first
//! false child, ANY groups at the first true child. Empty groups are a
//! contract violation, not a vacuous result.

use arbiter_core::ConditionNode;
use tracing::trace;

use crate::error::EvalError;
use crate::operators;
use crate::providers::VariablesProvider;
use crate::values;

pub fn eval_conditions(
    node: &ConditionNode,
    variables: &dyn VariablesProvider,
) -> Result<bool, EvalError> {
    match node {
        ConditionNode::All(children) => {
            if children.is_empty() {
                return Err(EvalError::shape("ALL group with no children"));
            }
            for child in children {
                if !eval_conditions(child, variables)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        ConditionNode::Any(children) => {
            if children.is_empty() {
                return Err(EvalError::shape("ANY group with no children"));
            }
            for child in children {
                if eval_conditions(child, variables)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        ConditionNode::Leaf {
            name,
            operator,
            value,
        } => {
            let variable = variables
                .fetch(name)
                .ok_or_else(|| EvalError::UnknownVariable { name: name.clone() })?;
            let field = values::cast(variable.kind, &variable.value)?;
            let def = operators::lookup(variable.kind, operator).ok_or_else(|| {
                EvalError::UnknownOperator {
                    operator: operator.clone(),
                    kind: variable.kind,
                }
            })?;
            let result = operators::apply(def, variable.kind, &field, value)?;
            trace!(field = %name, operator = %operator, result, "condition checked");
            Ok(result)
        }
    }
}
