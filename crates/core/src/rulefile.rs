//! Line-oriented rule-file reader.
//!
//! Scans raw text line by line: a line beginning with `rule`
//! (case-insensitive, whitespace-trimmed) opens a new named rule;
//! `when` / `then` / `end` switch the collector mode and are discarded;
//! every other line lands verbatim (trimmed) in whichever collector is
//! active. The condition block is joined and handed to the expression
//! parser, each action line to the call-syntax parser.

use crate::error::CompileError;
use crate::parser::parse_expression;
use crate::rules::{ActionCall, Params, Rule};
use crate::translate::translate;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    Idle,
    Conditions,
    Actions,
}

struct RuleBlock {
    name: String,
    condition_lines: Vec<String>,
    action_lines: Vec<(String, u32)>,
}

/// Compile rule-file text into normalized rules, in file order.
///
/// Empty input compiles to an empty list. A later rule with the same
/// name replaces the earlier one in place.
pub fn parse_rules(text: &str) -> Result<Vec<Rule>, CompileError> {
    let blocks = segment(text)?;
    blocks
        .into_iter()
        .map(|block| {
            let joined = block.condition_lines.join(" ");
            let conditions = translate(&parse_expression(&joined)?)?;
            let actions = block
                .action_lines
                .iter()
                .map(|(line, lineno)| parse_action_line(line, *lineno))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Rule {
                name: block.name,
                conditions,
                actions,
            })
        })
        .collect()
}

fn keyword_prefix(line: &str, keyword: &str) -> bool {
    line.get(..keyword.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(keyword))
}

fn segment(text: &str) -> Result<Vec<RuleBlock>, CompileError> {
    let mut blocks: Vec<RuleBlock> = Vec::new();
    let mut current: Option<usize> = None;
    let mut mode = Mode::Idle;

    for (idx, raw_line) in text.lines().enumerate() {
        let lineno = idx as u32 + 1;
        let line = raw_line.trim();

        if keyword_prefix(line, "rule") {
            mode = Mode::Idle;
            let name = line
                .split_once(char::is_whitespace)
                .map(|(_, rest)| rest.trim().trim_matches('"').to_owned())
                .ok_or_else(|| CompileError::rule_file(lineno, "rule line missing a name"))?;
            // A rule redefined later keeps its original position
            if let Some(pos) = blocks.iter().position(|b| b.name == name) {
                blocks[pos].condition_lines.clear();
                blocks[pos].action_lines.clear();
                current = Some(pos);
            } else {
                blocks.push(RuleBlock {
                    name,
                    condition_lines: Vec::new(),
                    action_lines: Vec::new(),
                });
                current = Some(blocks.len() - 1);
            }
            continue;
        }
        if keyword_prefix(line, "when") {
            mode = Mode::Conditions;
            continue;
        }
        if keyword_prefix(line, "then") {
            mode = Mode::Actions;
            continue;
        }
        if keyword_prefix(line, "end") {
            mode = Mode::Idle;
            continue;
        }
        if line.is_empty() {
            continue;
        }

        match mode {
            Mode::Idle => {} // content outside when/then is discarded
            Mode::Conditions => {
                let pos = current.ok_or_else(|| {
                    CompileError::rule_file(lineno, "condition line outside of a rule")
                })?;
                blocks[pos].condition_lines.push(line.to_owned());
            }
            Mode::Actions => {
                let pos = current.ok_or_else(|| {
                    CompileError::rule_file(lineno, "action line outside of a rule")
                })?;
                blocks[pos].action_lines.push((line.to_owned(), lineno));
            }
        }
    }

    Ok(blocks)
}

// ── Action-call parsing ──────────────────────────────────────────────

/// Parse one `name(param=value, ...)` line.
fn parse_action_line(line: &str, lineno: u32) -> Result<ActionCall, CompileError> {
    let line = line.trim();
    let stripped = line.trim_end_matches(')');
    if stripped.len() == line.len() {
        return Err(CompileError::rule_file(
            lineno,
            format!("action call missing closing ')': {}", line),
        ));
    }
    let (name, args) = stripped.rsplit_once('(').ok_or_else(|| {
        CompileError::rule_file(lineno, format!("action call missing '(': {}", line))
    })?;
    let name = name.trim();
    if name.is_empty() {
        return Err(CompileError::rule_file(lineno, "action call missing a name"));
    }

    let mut params = Params::new();
    for token in split_quoted(args, lineno)? {
        let token = token.trim_matches(',');
        if token.is_empty() {
            continue;
        }
        let (key, value) = token.split_once('=').ok_or_else(|| {
            CompileError::rule_file(
                lineno,
                format!("action argument '{}' is not of the form name=value", token),
            )
        })?;
        params.insert(key, value);
    }

    Ok(ActionCall {
        name: name.to_owned(),
        params,
    })
}

/// Split an argument string on whitespace, shell-style: quoted spans
/// (single or double) are kept whole with their quotes removed, so
/// embedded spaces and commas survive.
fn split_quoted(src: &str, lineno: u32) -> Result<Vec<String>, CompileError> {
    let mut tokens = Vec::new();
    let mut cur = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;

    for c in src.chars() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                } else {
                    cur.push(c);
                }
            }
            None => {
                if c == '\'' || c == '"' {
                    quote = Some(c);
                    in_token = true;
                } else if c.is_whitespace() {
                    if in_token {
                        tokens.push(std::mem::take(&mut cur));
                        in_token = false;
                    }
                } else {
                    cur.push(c);
                    in_token = true;
                }
            }
        }
    }
    if quote.is_some() {
        return Err(CompileError::rule_file(
            lineno,
            "unterminated quote in action arguments",
        ));
    }
    if in_token {
        tokens.push(cur);
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::ConditionNode;

    const BASIC: &str = r#"
        rule "r1"
        when
            age > 18
        then
            approve()
        end
    "#;

    #[test]
    fn basic_rule_compiles() {
        let rules = parse_rules(BASIC).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].name, "r1");
        assert_eq!(rules[0].actions.len(), 1);
        assert_eq!(rules[0].actions[0].name, "approve");
        assert!(rules[0].actions[0].params.is_empty());
    }

    #[test]
    fn multiline_conditions_join() {
        let text = r#"
            rule "r"
            when
                age > 18
                and age < 65
            then
                approve()
            end
        "#;
        let rules = parse_rules(text).unwrap();
        match &rules[0].conditions {
            ConditionNode::All(children) => assert_eq!(children.len(), 2),
            other => panic!("expected All, got {:?}", other),
        }
    }

    #[test]
    fn action_params_parse() {
        let text = r#"
            rule "r"
            when
                age > 18
            then
                notify(channel=ops, message='age check passed, retry', level=3)
            end
        "#;
        let rules = parse_rules(text).unwrap();
        let call = &rules[0].actions[0];
        assert_eq!(call.name, "notify");
        assert_eq!(call.params.get("channel"), Some("ops"));
        assert_eq!(call.params.get("message"), Some("age check passed, retry"));
        assert_eq!(call.params.get("level"), Some("3"));
    }

    #[test]
    fn multiple_rules_in_order() {
        let text = r#"
            rule "first"
            when
                a > 1
            then
                one()
            end
            rule "second"
            when
                b > 2
            then
                two()
            end
        "#;
        let rules = parse_rules(text).unwrap();
        let names: Vec<_> = rules.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn redefined_rule_replaces_in_place() {
        let text = r#"
            rule "r"
            when
                a > 1
            then
                one()
            end
            rule "r"
            when
                b > 2
            then
                two()
            end
        "#;
        let rules = parse_rules(text).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].actions[0].name, "two");
    }

    #[test]
    fn keywords_match_any_case() {
        let text = r#"
            RULE "r"
            WHEN
                a > 1
            THEN
                act()
            END
        "#;
        let rules = parse_rules(text).unwrap();
        assert_eq!(rules[0].name, "r");
    }

    #[test]
    fn empty_input_is_empty_list() {
        assert!(parse_rules("").unwrap().is_empty());
        assert!(parse_rules("   \n  \n").unwrap().is_empty());
    }

    #[test]
    fn condition_outside_rule_is_error() {
        let text = "when\n a > 1\nthen\n act()\nend";
        assert!(matches!(
            parse_rules(text),
            Err(CompileError::RuleFile { .. })
        ));
    }

    #[test]
    fn rule_without_name_is_error() {
        assert!(matches!(
            parse_rules("rule\nwhen\n a > 1\nthen\n act()\nend"),
            Err(CompileError::RuleFile { .. })
        ));
    }

    #[test]
    fn rule_without_conditions_is_error() {
        let text = r#"
            rule "r"
            when
            then
                act()
            end
        "#;
        assert!(matches!(parse_rules(text), Err(CompileError::Parse { .. })));
    }

    #[test]
    fn malformed_action_argument_is_error() {
        let text = r#"
            rule "r"
            when
                a > 1
            then
                act(oops)
            end
        "#;
        assert!(matches!(
            parse_rules(text),
            Err(CompileError::RuleFile { .. })
        ));
    }

    #[test]
    fn split_quoted_handles_double_quotes() {
        let tokens = split_quoted("a=\"x, y\" b=2", 1).unwrap();
        assert_eq!(tokens, vec!["a=x, y", "b=2"]);
    }
}
