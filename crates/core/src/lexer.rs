use crate::error::CompileError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Identifiers, operator words, and keywords — distinguished in the parser
    Word(String),
    /// Single-quoted string literal (content without quotes)
    Str(String),
    /// Integer literal
    Int(i64),
    /// Decimal literal — kept as string, parsed during translation
    Float(String),
    // Punctuation
    LBracket,
    RBracket,
    Comma,
    // Comparison symbols
    Eq,  // =
    Gt,  // >
    Lt,  // <
    Gte, // >=
    Lte, // <=
    // Logical symbols
    Amp,  // &
    Pipe, // |
    // End of input
    Eof,
}

#[derive(Debug, Clone)]
pub struct Spanned {
    pub token: Token,
    pub line: u32,
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_numeric_char(c: char) -> bool {
    c.is_ascii_digit() || c == '.' || c == '-'
}

/// Tokenize a condition expression.
///
/// Numeric lexemes may carry a leading `-`; a lexeme containing `.` is a
/// Float, anything else an Int. A digit-led run that continues into word
/// characters is a Word (field names may contain digits).
pub fn lex(src: &str) -> Result<Vec<Spanned>, CompileError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = src.chars().collect();
    let mut pos = 0usize;
    let mut line: u32 = 1;

    while pos < chars.len() {
        let c = chars[pos];

        if c.is_whitespace() {
            if c == '\n' {
                line += 1;
            }
            pos += 1;
            continue;
        }

        let tok_line = line;

        // String literal
        if c == '\'' {
            pos += 1;
            let mut s = String::new();
            loop {
                if pos >= chars.len() {
                    return Err(CompileError::lex(tok_line, "unterminated string literal"));
                }
                let sc = chars[pos];
                if sc == '\'' {
                    pos += 1;
                    break;
                }
                if sc == '\n' {
                    line += 1;
                }
                s.push(sc);
                pos += 1;
            }
            tokens.push(Spanned {
                token: Token::Str(s),
                line: tok_line,
            });
            continue;
        }

        // Numeric literal: digit-led, or '-'/'.' immediately followed by a digit
        let numeric_start = c.is_ascii_digit()
            || ((c == '-' || c == '.')
                && pos + 1 < chars.len()
                && chars[pos + 1].is_ascii_digit());
        if numeric_start {
            let start = pos;
            while pos < chars.len() && is_numeric_char(chars[pos]) {
                pos += 1;
            }
            // A run like `18and` is a word, not a number followed by a word
            if pos < chars.len() && is_word_char(chars[pos]) && c.is_ascii_digit() {
                while pos < chars.len() && is_word_char(chars[pos]) {
                    pos += 1;
                }
                let w: String = chars[start..pos].iter().collect();
                tokens.push(Spanned {
                    token: Token::Word(w),
                    line: tok_line,
                });
                continue;
            }
            let lexeme: String = chars[start..pos].iter().collect();
            let token = if lexeme.contains('.') {
                Token::Float(lexeme)
            } else {
                let n = lexeme.parse::<i64>().map_err(|_| {
                    CompileError::lex(tok_line, format!("invalid integer literal '{}'", lexeme))
                })?;
                Token::Int(n)
            };
            tokens.push(Spanned {
                token,
                line: tok_line,
            });
            continue;
        }

        // Word: identifiers, operator words, keywords
        if is_word_char(c) {
            let start = pos;
            while pos < chars.len() && is_word_char(chars[pos]) {
                pos += 1;
            }
            let w: String = chars[start..pos].iter().collect();
            tokens.push(Spanned {
                token: Token::Word(w),
                line: tok_line,
            });
            continue;
        }

        // Punctuation and symbols
        let token = match c {
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            ',' => Token::Comma,
            '=' => Token::Eq,
            '&' => Token::Amp,
            '|' => Token::Pipe,
            '>' => {
                if pos + 1 < chars.len() && chars[pos + 1] == '=' {
                    pos += 1;
                    Token::Gte
                } else {
                    Token::Gt
                }
            }
            '<' => {
                if pos + 1 < chars.len() && chars[pos + 1] == '=' {
                    pos += 1;
                    Token::Lte
                } else {
                    Token::Lt
                }
            }
            other => {
                return Err(CompileError::lex(
                    tok_line,
                    format!("unexpected character '{}'", other),
                ));
            }
        };
        pos += 1;
        tokens.push(Spanned {
            token,
            line: tok_line,
        });
    }

    tokens.push(Spanned {
        token: Token::Eof,
        line,
    });
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<Token> {
        lex(src).unwrap().into_iter().map(|s| s.token).collect()
    }

    #[test]
    fn comparison_tokens() {
        assert_eq!(
            kinds("age >= 18"),
            vec![
                Token::Word("age".into()),
                Token::Gte,
                Token::Int(18),
                Token::Eof
            ]
        );
    }

    #[test]
    fn quoted_string_keeps_content() {
        assert_eq!(
            kinds("name = 'John Smith'"),
            vec![
                Token::Word("name".into()),
                Token::Eq,
                Token::Str("John Smith".into()),
                Token::Eof
            ]
        );
    }

    #[test]
    fn float_kept_as_text() {
        assert_eq!(kinds("5.5")[0], Token::Float("5.5".into()));
        assert_eq!(kinds("-0.25")[0], Token::Float("-0.25".into()));
    }

    #[test]
    fn negative_int() {
        assert_eq!(kinds("-12")[0], Token::Int(-12));
    }

    #[test]
    fn list_punctuation() {
        assert_eq!(
            kinds("['a', 2]"),
            vec![
                Token::LBracket,
                Token::Str("a".into()),
                Token::Comma,
                Token::Int(2),
                Token::RBracket,
                Token::Eof
            ]
        );
    }

    #[test]
    fn logical_symbols() {
        assert_eq!(kinds("&")[0], Token::Amp);
        assert_eq!(kinds("|")[0], Token::Pipe);
    }

    #[test]
    fn digit_led_word() {
        assert_eq!(kinds("2fast")[0], Token::Word("2fast".into()));
    }

    #[test]
    fn unterminated_string_is_error() {
        assert!(matches!(
            lex("name = 'oops"),
            Err(CompileError::Lex { .. })
        ));
    }

    #[test]
    fn unknown_character_is_error() {
        assert!(matches!(lex("a ~ b"), Err(CompileError::Lex { .. })));
    }
}
