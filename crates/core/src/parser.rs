//! Condition-expression parser.
//!
//! Recursive descent over the token stream: an expression is an OR-chain
//! of AND-chains of comparisons, left-associative, with AND binding
//! tighter than OR. Operator tokens are matched longest-sequence-first
//! so multi-word tokens (`exactly one in`, `not containedby`, ...) win
//! over their shorter prefixes.

use crate::ast::{Expr, RawLiteral};
use crate::error::CompileError;
use crate::lexer::{lex, Spanned, Token};

/// Multi-word and single-word operator tokens, longest first.
/// Symbol operators (`=`, `>`, `<`, `>=`, `<=`) are separate lexer tokens.
const OPERATOR_WORDS: &[&[&str]] = &[
    &["exactly", "one", "in"],
    &["not", "containedby"],
    &["not", "in"],
    &["all", "in"],
    &["one", "in"],
    &["startswith"],
    &["endswith"],
    &["containedby"],
    &["matches"],
    &["in"],
    &["is"],
];

/// Parse one condition expression (the joined `when` block of a rule).
pub fn parse_expression(src: &str) -> Result<Expr, CompileError> {
    let tokens = lex(src)?;
    let mut parser = Parser::new(&tokens);
    let expr = parser.parse_or_expr()?;
    if parser.peek() != &Token::Eof {
        return Err(parser.err(format!(
            "unexpected trailing input: {:?}",
            parser.peek()
        )));
    }
    Ok(expr)
}

struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Spanned]) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn cur(&self) -> &Spanned {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &Token {
        &self.cur().token
    }

    fn peek_at(&self, offset: usize) -> &Token {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx].token
    }

    fn cur_line(&self) -> u32 {
        self.cur().line
    }

    fn advance(&mut self) -> &Spanned {
        let t = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        t
    }

    fn err(&self, msg: impl Into<String>) -> CompileError {
        CompileError::parse(self.cur_line(), msg)
    }

    fn is_and(&self) -> bool {
        match self.peek() {
            Token::Amp => true,
            Token::Word(w) => w == "AND" || w == "and",
            _ => false,
        }
    }

    fn is_or(&self) -> bool {
        match self.peek() {
            Token::Pipe => true,
            Token::Word(w) => w == "OR" || w == "or",
            _ => false,
        }
    }

    // -- Expression parsing --------------------------------------

    fn parse_or_expr(&mut self) -> Result<Expr, CompileError> {
        let first = self.parse_and_expr()?;
        if !self.is_or() {
            return Ok(first);
        }
        let mut children = vec![first];
        while self.is_or() {
            self.advance();
            children.push(self.parse_and_expr()?);
        }
        Ok(Expr::Any(children))
    }

    fn parse_and_expr(&mut self) -> Result<Expr, CompileError> {
        let first = self.parse_comparison()?;
        if !self.is_and() {
            return Ok(first);
        }
        let mut children = vec![first];
        while self.is_and() {
            self.advance();
            children.push(self.parse_comparison()?);
        }
        Ok(Expr::All(children))
    }

    fn parse_comparison(&mut self) -> Result<Expr, CompileError> {
        let line = self.cur_line();
        let field = match self.peek().clone() {
            Token::Word(w) => {
                self.advance();
                w
            }
            other => return Err(self.err(format!("expected field name, got {:?}", other))),
        };
        let op_token = self.parse_operator_token()?;
        let value = self.parse_literal()?;
        Ok(Expr::Comparison {
            field,
            op_token,
            value,
            line,
        })
    }

    fn parse_operator_token(&mut self) -> Result<String, CompileError> {
        match self.peek() {
            Token::Eq => {
                self.advance();
                return Ok("=".to_owned());
            }
            Token::Gt => {
                self.advance();
                return Ok(">".to_owned());
            }
            Token::Lt => {
                self.advance();
                return Ok("<".to_owned());
            }
            Token::Gte => {
                self.advance();
                return Ok(">=".to_owned());
            }
            Token::Lte => {
                self.advance();
                return Ok("<=".to_owned());
            }
            _ => {}
        }

        // Word operators: longest sequence wins
        for seq in OPERATOR_WORDS {
            if self.matches_words(seq) {
                for _ in 0..seq.len() {
                    self.advance();
                }
                return Ok(seq.join(" "));
            }
        }
        Err(self.err(format!("expected comparison operator, got {:?}", self.peek())))
    }

    fn matches_words(&self, seq: &[&str]) -> bool {
        seq.iter().enumerate().all(|(i, w)| {
            matches!(self.peek_at(i), Token::Word(x) if x == w)
        })
    }

    // -- Literal parsing ----------------------------------------

    fn parse_literal(&mut self) -> Result<RawLiteral, CompileError> {
        match self.peek().clone() {
            Token::LBracket => {
                self.advance();
                let mut items = Vec::new();
                while self.peek() != &Token::RBracket {
                    items.push(self.parse_scalar_literal()?);
                    if self.peek() == &Token::Comma {
                        self.advance();
                    } else if self.peek() != &Token::RBracket {
                        return Err(
                            self.err(format!("expected ',' or ']', got {:?}", self.peek()))
                        );
                    }
                }
                self.advance();
                Ok(RawLiteral::List(items))
            }
            _ => self.parse_scalar_literal(),
        }
    }

    fn parse_scalar_literal(&mut self) -> Result<RawLiteral, CompileError> {
        match self.peek().clone() {
            Token::Str(s) => {
                self.advance();
                Ok(RawLiteral::Str(s))
            }
            Token::Int(n) => {
                self.advance();
                Ok(RawLiteral::Int(n))
            }
            Token::Float(f) => {
                self.advance();
                Ok(RawLiteral::Float(f))
            }
            Token::Word(w) if w.eq_ignore_ascii_case("true") => {
                self.advance();
                Ok(RawLiteral::Bool(true))
            }
            Token::Word(w) if w.eq_ignore_ascii_case("false") => {
                self.advance();
                Ok(RawLiteral::Bool(false))
            }
            Token::Word(w) if w.eq_ignore_ascii_case("notblank") => {
                self.advance();
                Ok(RawLiteral::Notblank)
            }
            other => Err(self.err(format!("expected literal value, got {:?}", other))),
        }
    }
}
