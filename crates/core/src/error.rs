/// All errors that can be produced while compiling rule text into the
/// normalized rule structure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// The character scanner hit something it cannot tokenize.
    #[error("lex error at line {line}: {message}")]
    Lex { line: u32, message: String },

    /// The expression or action grammar was violated.
    #[error("parse error at line {line}: {message}")]
    Parse { line: u32, message: String },

    /// A comparison could not be mapped to an operator name — the
    /// operator token has no entry for the literal's shape.
    #[error("no operator '{token}' for a {shape} value (line {line})")]
    UnknownOperatorToken {
        token: String,
        shape: &'static str,
        line: u32,
    },

    /// A numeric literal survived tokenization but is not a valid decimal.
    #[error("invalid numeric literal '{literal}' (line {line})")]
    BadNumericLiteral { literal: String, line: u32 },

    /// Rule-file structure errors: content outside a rule block, a
    /// `rule` line with no name, a malformed action call.
    #[error("rule file error at line {line}: {message}")]
    RuleFile { line: u32, message: String },
}

impl CompileError {
    pub fn lex(line: u32, message: impl Into<String>) -> Self {
        CompileError::Lex {
            line,
            message: message.into(),
        }
    }

    pub fn parse(line: u32, message: impl Into<String>) -> Self {
        CompileError::Parse {
            line,
            message: message.into(),
        }
    }

    pub fn rule_file(line: u32, message: impl Into<String>) -> Self {
        CompileError::RuleFile {
            line,
            message: message.into(),
        }
    }
}
