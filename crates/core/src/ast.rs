//! Raw expression tree produced by the parser.
//!
//! No operator-name resolution happens here — comparisons keep their
//! source-level operator token and literal; mapping token + literal
//! shape to an operator name is the translator's job.

/// A literal as written in the DSL.
///
/// Floats keep their source text; they are parsed into `Decimal` during
/// translation so a malformed decimal is reported there, not here.
#[derive(Debug, Clone, PartialEq)]
pub enum RawLiteral {
    Str(String),
    Int(i64),
    Float(String),
    Bool(bool),
    /// The reserved keyword value for `is notblank`.
    Notblank,
    List(Vec<RawLiteral>),
}

impl RawLiteral {
    /// Human-readable shape name for translation errors.
    pub fn shape(&self) -> &'static str {
        match self {
            RawLiteral::Str(_) => "text",
            RawLiteral::Int(_) | RawLiteral::Float(_) => "numeric",
            RawLiteral::Bool(_) => "boolean",
            RawLiteral::Notblank => "notblank",
            RawLiteral::List(_) => "list",
        }
    }
}

/// Parsed condition expression.
///
/// `All`/`Any` are n-ary: a chain `a and b and c` is a single `All` of
/// three children, matching the flat groups the translator emits.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    All(Vec<Expr>),
    Any(Vec<Expr>),
    Comparison {
        field: String,
        op_token: String,
        value: RawLiteral,
        line: u32,
    },
}
