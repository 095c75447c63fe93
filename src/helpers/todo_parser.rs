//! Best-effort extraction of todo lists from `write_todos` results
//!
//! The planning tool reports its state as freeform text whose exact shape
//! depends on the agent framework version. Strategies are tried in order and
//! the first one yielding a list wins:
//!
//! 1. `embedded`: the outermost `[...]` span inside the text, read as a
//!    Python literal, then as strict JSON
//! 2. `todos_field`: the whole text is a JSON object with a `todos` field,
//!    which may itself be a JSON-encoded string
//! 3. `json_array`: the whole text is a JSON array
//!
//! Content that is already a structured list is returned as is. Every
//! failure is swallowed; callers get `None`.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use super::literal::parse_python_literal;

type Strategy = fn(&str) -> Option<Vec<Value>>;

const STRATEGIES: &[(&str, Strategy)] = &[
    ("embedded", parse_embedded),
    ("todos_field", parse_todos_field),
    ("json_array", parse_json_array),
];

fn embedded_list_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?s)\[.*\]").expect("valid embedded list pattern"))
}

/// Extract a todo list from tool message content
pub fn parse_todos(content: &Value) -> Option<Vec<Value>> {
    match content {
        Value::Array(items) => Some(items.clone()),
        Value::String(text) => parse_todos_str(text),
        _ => None,
    }
}

/// Extract a todo list from text, trying each strategy in order
pub fn parse_todos_str(text: &str) -> Option<Vec<Value>> {
    for (name, strategy) in STRATEGIES {
        if let Some(todos) = strategy(text) {
            tracing::debug!("Parsed {} todos via '{}' strategy", todos.len(), name);
            return Some(todos);
        }
    }
    tracing::debug!("Could not extract todos from write_todos content");
    None
}

fn parse_embedded(text: &str) -> Option<Vec<Value>> {
    let span = embedded_list_pattern().find(text)?.as_str();
    match parse_python_literal(span) {
        Some(Value::Array(items)) => Some(items),
        _ => match serde_json::from_str::<Value>(span) {
            Ok(Value::Array(items)) => Some(items),
            _ => None,
        },
    }
}

fn parse_todos_field(text: &str) -> Option<Vec<Value>> {
    let Ok(Value::Object(mut object)) = serde_json::from_str::<Value>(text) else {
        return None;
    };
    match object.remove("todos")? {
        Value::Array(items) => Some(items),
        Value::String(encoded) => match serde_json::from_str::<Value>(&encoded) {
            Ok(Value::Array(items)) => Some(items),
            _ => None,
        },
        _ => None,
    }
}

fn parse_json_array(text: &str) -> Option<Vec<Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => Some(items),
        _ => None,
    }
}
