//! arbiter-core: rule DSL compiler.
//!
//! Compiles rule text of the form
//! `rule "<name>" when <conditions> then <action-calls> end` into a
//! normalized structure: a condition tree of ALL/ANY groups terminating
//! in `{name, operator, value}` leaves, plus an ordered list of action
//! calls. The evaluator crate consumes that structure; callers holding
//! already-normalized rules can skip this crate entirely.
//!
//! # Public API
//!
//! - [`parse_rules()`] -- compile rule-file text into [`Rule`]s
//! - [`parse_expression()`] / [`translate()`] -- the two pipeline
//!   stages, exposed for callers compiling a lone condition expression
//! - [`Rule`], [`ConditionNode`], [`ActionCall`], [`Params`],
//!   [`Literal`] -- the normalized model
//! - [`CompileError`] -- compilation error type

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod rulefile;
pub mod rules;
pub mod translate;

pub use ast::{Expr, RawLiteral};
pub use error::CompileError;
pub use parser::parse_expression;
pub use rulefile::parse_rules;
pub use rules::{ActionCall, ConditionNode, Literal, Params, Rule};
pub use translate::translate;
