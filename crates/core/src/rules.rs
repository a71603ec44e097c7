//! Normalized rule model — the translator's output and the evaluator's
//! input.
//!
//! A rule is immutable once built and carries no evaluation state; the
//! same `Rule` can be evaluated any number of times. `to_json` emits
//! the interchange shape
//! `{"name", "conditions": {"all": [...]}, "actions": [{"name", "params"}]}`
//! so parsed rules can be stored, inspected, or fed back to the
//! evaluator as plain JSON.

use rust_decimal::Decimal;

/// A comparison literal in normalized form.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Int(i64),
    Decimal(Decimal),
    Bool(bool),
    List(Vec<Literal>),
}

impl Literal {
    /// Human-readable shape name for error messages.
    pub fn shape(&self) -> &'static str {
        match self {
            Literal::Str(_) => "text",
            Literal::Int(_) | Literal::Decimal(_) => "numeric",
            Literal::Bool(_) => "boolean",
            Literal::List(_) => "list",
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Literal::Str(s) => serde_json::Value::String(s.clone()),
            Literal::Int(n) => serde_json::Value::Number((*n).into()),
            Literal::Decimal(d) => match d.to_string().parse::<serde_json::Number>() {
                Ok(n) => serde_json::Value::Number(n),
                // Out of f64 range; the textual form is still exact
                Err(_) => serde_json::Value::String(d.to_string()),
            },
            Literal::Bool(b) => serde_json::Value::Bool(*b),
            Literal::List(items) => {
                serde_json::Value::Array(items.iter().map(Literal::to_json).collect())
            }
        }
    }
}

/// A condition tree node: a combinator group or a single comparison.
///
/// Groups must have at least one child — the evaluator rejects empty
/// groups rather than letting them vacuously succeed.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionNode {
    All(Vec<ConditionNode>),
    Any(Vec<ConditionNode>),
    Leaf {
        name: String,
        operator: String,
        value: Literal,
    },
}

impl ConditionNode {
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ConditionNode::All(children) => serde_json::json!({
                "all": children.iter().map(ConditionNode::to_json).collect::<Vec<_>>(),
            }),
            ConditionNode::Any(children) => serde_json::json!({
                "any": children.iter().map(ConditionNode::to_json).collect::<Vec<_>>(),
            }),
            ConditionNode::Leaf {
                name,
                operator,
                value,
            } => serde_json::json!({
                "name": name,
                "operator": operator,
                "value": value.to_json(),
            }),
        }
    }
}

/// Action-call parameters: a string-to-string map that remembers
/// insertion order (display order; evaluation never depends on it).
/// Inserting an existing key replaces its value in place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Params {
    entries: Vec<(String, String)>,
}

impl Params {
    pub fn new() -> Self {
        Params::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for (k, v) in self.iter() {
            map.insert(k.to_owned(), serde_json::Value::String(v.to_owned()));
        }
        serde_json::Value::Object(map)
    }
}

impl FromIterator<(String, String)> for Params {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

/// One action invocation: a provider member name plus named string
/// parameters. Values stay strings; coercion, if any, belongs to the
/// actions provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionCall {
    pub name: String,
    pub params: Params,
}

impl ActionCall {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name,
            "params": self.params.to_json(),
        })
    }
}

/// A named rule: condition tree plus ordered action calls.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    /// May be empty for rules constructed ad hoc.
    pub name: String,
    pub conditions: ConditionNode,
    pub actions: Vec<ActionCall>,
}

impl Rule {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name,
            "conditions": self.conditions.to_json(),
            "actions": self.actions.iter().map(ActionCall::to_json).collect::<Vec<_>>(),
        })
    }
}
