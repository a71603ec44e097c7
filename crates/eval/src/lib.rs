//! arbiter-eval: rule evaluator.
//!
//! Takes normalized rules (or raw DSL text, compiled on the way in),
//! a variables provider, and an actions provider; walks each rule's
//! condition tree with short-circuiting and, on a match, dispatches the
//! rule's action calls in order.
//!
//! The engine holds no state: rules, variables, and actions live only
//! for the duration of a [`run`]/[`run_all`] call, and concurrent
//! callers with their own provider instances need no synchronization.
//!
//! # Public API
//!
//! - [`run_all()`] -- evaluate a batch of rules, optionally stopping at
//!   the first trigger
//! - [`run()`] -- evaluate exactly one rule
//! - [`RulesInput`] -- the accepted rule representations
//! - [`VariablesProvider`] / [`ActionsProvider`] -- the external
//!   collaborator interfaces
//! - [`operators_of()`] / [`catalog()`] -- operator introspection

pub mod condition;
pub mod error;
pub mod input;
pub mod operators;
pub mod providers;
pub mod values;

use tracing::debug;

pub use arbiter_core::{ActionCall, CompileError, ConditionNode, Literal, Params, Rule};
pub use condition::eval_conditions;
pub use error::EvalError;
pub use operators::{catalog, lookup, operators_of, InputShape, OperatorDef};
pub use providers::{ActionError, ActionsProvider, StaticVariables, VariablesProvider, VariableValue};
pub use values::{Value, ValueKind, EPSILON};

/// The rule representations [`run`] and [`run_all`] accept: raw DSL
/// text, pre-parsed rules, or normalized-rule JSON.
#[derive(Debug, Clone)]
pub enum RulesInput {
    Text(String),
    Rule(Rule),
    Rules(Vec<Rule>),
    Json(serde_json::Value),
}

impl From<&str> for RulesInput {
    fn from(text: &str) -> Self {
        RulesInput::Text(text.to_owned())
    }
}

impl From<String> for RulesInput {
    fn from(text: String) -> Self {
        RulesInput::Text(text)
    }
}

impl From<Rule> for RulesInput {
    fn from(rule: Rule) -> Self {
        RulesInput::Rule(rule)
    }
}

impl From<Vec<Rule>> for RulesInput {
    fn from(rules: Vec<Rule>) -> Self {
        RulesInput::Rules(rules)
    }
}

impl From<serde_json::Value> for RulesInput {
    fn from(v: serde_json::Value) -> Self {
        RulesInput::Json(v)
    }
}

fn resolve(input: RulesInput) -> Result<Vec<Rule>, EvalError> {
    match input {
        RulesInput::Text(text) => Ok(arbiter_core::parse_rules(&text)?),
        RulesInput::Rule(rule) => Ok(vec![rule]),
        RulesInput::Rules(rules) => Ok(rules),
        RulesInput::Json(v) => input::rules_from_json(&v),
    }
}

/// Evaluate rules in order against the given providers.
///
/// Returns true iff at least one rule triggered. With
/// `stop_on_first_trigger`, returns at the first trigger without
/// evaluating the remaining rules. Any error aborts the whole call —
/// there is no partial-results mode.
pub fn run_all(
    rules: impl Into<RulesInput>,
    variables: &dyn VariablesProvider,
    actions: &dyn ActionsProvider,
    stop_on_first_trigger: bool,
) -> Result<bool, EvalError> {
    let rules = resolve(rules.into())?;
    debug!(rules = rules.len(), "evaluating rule set");

    let mut triggered = false;
    for rule in &rules {
        if run_rule(rule, variables, actions)? {
            triggered = true;
            if stop_on_first_trigger {
                return Ok(true);
            }
        }
    }
    Ok(triggered)
}

/// Evaluate exactly one rule: its condition tree first and, only on a
/// match, all of its actions in order.
///
/// Text input must compile to exactly one rule.
pub fn run(
    rule: impl Into<RulesInput>,
    variables: &dyn VariablesProvider,
    actions: &dyn ActionsProvider,
) -> Result<bool, EvalError> {
    let rules = resolve(rule.into())?;
    if rules.len() != 1 {
        return Err(EvalError::malformed(format!(
            "run expects exactly one rule, got {}",
            rules.len()
        )));
    }
    run_rule(&rules[0], variables, actions)
}

fn run_rule(
    rule: &Rule,
    variables: &dyn VariablesProvider,
    actions: &dyn ActionsProvider,
) -> Result<bool, EvalError> {
    if !condition::eval_conditions(&rule.conditions, variables)? {
        debug!(rule = %rule.name, "rule did not trigger");
        return Ok(false);
    }
    debug!(rule = %rule.name, "rule triggered");
    perform_actions(&rule.actions, actions)?;
    Ok(true)
}

/// Dispatch action calls in order. No rollback: the first failing call
/// aborts the sequence with its own error.
fn perform_actions(calls: &[ActionCall], actions: &dyn ActionsProvider) -> Result<(), EvalError> {
    for call in calls {
        debug!(action = %call.name, "dispatching action");
        actions.call(&call.name, &call.params).map_err(EvalError::from)?;
    }
    Ok(())
}
