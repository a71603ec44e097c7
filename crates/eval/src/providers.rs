//! Variables and actions provider traits.
//!
//! Providers are the engine's only view of the outside world: a
//! variables provider maps field names to typed raw values, an actions
//! provider maps action names to side-effecting handlers. Lookup
//! failures are explicit (`None` / `ActionError::NotFound`) so the
//! evaluator can turn them into `UnknownVariable` / `UnknownAction`.
//!
//! Everything here is synchronous — the engine has no suspension
//! points and imposes no locking; concurrent callers hand in their own
//! provider instances.

use std::collections::HashMap;

use arbiter_core::Params;

use crate::values::ValueKind;

/// A variable's declared kind plus the raw value its accessor returned.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableValue {
    pub kind: ValueKind,
    pub value: serde_json::Value,
}

impl VariableValue {
    pub fn new(kind: ValueKind, value: serde_json::Value) -> Self {
        VariableValue { kind, value }
    }
}

/// Supplies field values for condition evaluation.
///
/// One accessor per recognized field name, each tagged with a declared
/// [`ValueKind`]. `fetch` returns `None` for a name the provider does
/// not expose — the evaluator treats that as fatal.
pub trait VariablesProvider {
    fn fetch(&self, name: &str) -> Option<VariableValue>;
}

/// Errors from an actions provider.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    /// The provider exposes no action under this name.
    #[error("action '{0}' is not defined")]
    NotFound(String),
    /// The action itself failed; propagated to the caller verbatim.
    #[error(transparent)]
    Failed(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Executes matched rules' action calls.
///
/// One member per recognized action name, taking named string
/// parameters. Parameter values arrive as the raw strings written in
/// the DSL; any numeric or boolean coercion is the provider's business.
pub trait ActionsProvider {
    fn call(&self, name: &str, params: &Params) -> Result<(), ActionError>;
}

// ──────────────────────────────────────────────
// StaticVariables
// ──────────────────────────────────────────────

/// A variables provider backed by a fixed map.
///
/// Useful for testing and for callers whose variable values are all
/// known up front.
#[derive(Debug, Clone, Default)]
pub struct StaticVariables {
    vars: HashMap<String, VariableValue>,
}

impl StaticVariables {
    pub fn new() -> Self {
        StaticVariables::default()
    }

    pub fn with(mut self, name: impl Into<String>, kind: ValueKind, value: serde_json::Value) -> Self {
        self.vars.insert(name.into(), VariableValue::new(kind, value));
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, kind: ValueKind, value: serde_json::Value) {
        self.vars.insert(name.into(), VariableValue::new(kind, value));
    }
}

impl VariablesProvider for StaticVariables {
    fn fetch(&self, name: &str) -> Option<VariableValue> {
        self.vars.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn static_variables_fetch() {
        let vars = StaticVariables::new()
            .with("age", ValueKind::Numeric, json!(30))
            .with("name", ValueKind::Text, json!("Ada"));

        let age = vars.fetch("age").unwrap();
        assert_eq!(age.kind, ValueKind::Numeric);
        assert_eq!(age.value, json!(30));
        assert!(vars.fetch("missing").is_none());
    }

    #[test]
    fn action_error_display() {
        let err = ActionError::NotFound("approve".into());
        assert_eq!(err.to_string(), "action 'approve' is not defined");
    }
}
