use arbiter_core::CompileError;

use crate::providers::ActionError;
use crate::values::ValueKind;

/// All errors the evaluator can raise. Every kind is fatal at the point
/// raised: `run` aborts, and `run_all` does not catch anything a rule
/// raises — there is no partial-results mode.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    /// Rule input was not text, a rule object, or a list of rule
    /// objects — or raw text that failed to compile.
    #[error("malformed rule input: {0}")]
    Malformed(#[from] CompileError),

    /// Rule input JSON has the wrong overall shape.
    #[error("malformed rule input: {message}")]
    MalformedInput { message: String },

    /// A condition node violates the tree contract: zero keys, both
    /// `all` and `any`, combinator keys mixed with leaf fields, or an
    /// empty children list.
    #[error("invalid rule shape: {message}")]
    InvalidRuleShape { message: String },

    /// A leaf references a field the variables provider does not expose.
    #[error("variable '{name}' is not defined by the variables provider")]
    UnknownVariable { name: String },

    /// A leaf's operator name is not defined on the resolved value kind.
    #[error("operator '{operator}' does not exist for {kind} values")]
    UnknownOperator { operator: String, kind: ValueKind },

    /// A raw value (field value or comparison literal) failed its value
    /// kind's cast rule.
    #[error("invalid value: {message}")]
    InvalidValue { message: String },

    /// An action call names a member the actions provider does not expose.
    #[error("action '{name}' is not defined by the actions provider")]
    UnknownAction { name: String },

    /// An error raised by the action invocation itself, propagated
    /// verbatim.
    #[error(transparent)]
    Action(Box<dyn std::error::Error + Send + Sync>),
}

impl EvalError {
    pub fn malformed(message: impl Into<String>) -> Self {
        EvalError::MalformedInput {
            message: message.into(),
        }
    }

    pub fn shape(message: impl Into<String>) -> Self {
        EvalError::InvalidRuleShape {
            message: message.into(),
        }
    }

    pub fn invalid_value(message: impl Into<String>) -> Self {
        EvalError::InvalidValue {
            message: message.into(),
        }
    }
}

impl From<ActionError> for EvalError {
    fn from(err: ActionError) -> Self {
        match err {
            ActionError::NotFound(name) => EvalError::UnknownAction { name },
            ActionError::Failed(inner) => EvalError::Action(inner),
        }
    }
}
