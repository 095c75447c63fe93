//! Message classification and conversion into events

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::core::{StreamEvent, ToolCall};
use crate::helpers::{parse_todos, python_repr};

/// Reflection tool whose result is surfaced as text
pub const THINK_TOOL: &str = "think_tool";

/// Planning tool whose result is surfaced as a todo list
pub const WRITE_TODOS_TOOL: &str = "write_todos";

/// Matches a tool_use block rendered by Python's `repr()` inside message text.
///
/// Coupled to the framework's textual rendering; if that changes this stops
/// matching and the raw text leaks into chunks.
const TOOL_USE_REPR: &str = r"\{'id':\s*'[^']*',\s*'input':\s*\{.*?\},\s*'name':\s*'[^']*',\s*'type':\s*'tool_use'\}";

fn tool_use_repr_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(TOOL_USE_REPR).expect("valid tool_use pattern"))
}

/// How a raw message is treated
#[derive(Debug, Clone, PartialEq)]
pub enum MessageKind<'a> {
    /// A tool result (`type == "tool"`)
    ToolResult {
        name: Option<&'a str>,
        content: &'a Value,
    },
    /// Anything else exposing `content`
    Content {
        content: &'a Value,
        tool_calls: &'a [Value],
    },
    /// No content; ignored
    Opaque,
}

impl<'a> MessageKind<'a> {
    /// Classify a raw message by its `type` tag
    pub fn classify(message: &'a Value) -> Self {
        let Some(object) = message.as_object() else {
            return MessageKind::Opaque;
        };
        let is_tool = object.get("type").and_then(Value::as_str) == Some("tool");

        match object.get("content") {
            Some(content) if is_tool => MessageKind::ToolResult {
                name: object.get("name").and_then(Value::as_str),
                content,
            },
            Some(content) => MessageKind::Content {
                content,
                tool_calls: match object.get("tool_calls") {
                    Some(Value::Array(calls)) => calls.as_slice(),
                    _ => &[],
                },
            },
            None => MessageKind::Opaque,
        }
    }
}

/// Convert the last message of a node's update into events
pub fn message_events(node: &str, message: &Value) -> Vec<StreamEvent> {
    match MessageKind::classify(message) {
        MessageKind::ToolResult {
            name: Some(THINK_TOOL),
            content,
        } => extract_reflection(content)
            .map(|reflection| vec![StreamEvent::chunk(reflection, node)])
            .unwrap_or_default(),
        MessageKind::ToolResult {
            name: Some(WRITE_TODOS_TOOL),
            content,
        } => match parse_todos(content) {
            Some(todos) if !todos.is_empty() => vec![StreamEvent::TodoList(todos)],
            _ => Vec::new(),
        },
        MessageKind::ToolResult { name, .. } => {
            tracing::trace!("Suppressing tool result from {:?}", name);
            Vec::new()
        }
        MessageKind::Content {
            content,
            tool_calls,
        } => assistant_events(node, content, tool_calls),
        MessageKind::Opaque => Vec::new(),
    }
}

fn assistant_events(node: &str, content: &Value, raw_calls: &[Value]) -> Vec<StreamEvent> {
    let mut text = content_to_text(content);
    let calls: Vec<ToolCall> = raw_calls
        .iter()
        .filter_map(normalize_tool_call)
        .filter(|call| call.name != THINK_TOOL && call.name != WRITE_TODOS_TOOL)
        .collect();

    if !raw_calls.is_empty() {
        text = strip_tool_use_reprs(&text);
    }

    let mut events = Vec::new();
    if !calls.is_empty() {
        events.push(StreamEvent::tool_calls(calls, node));
    }
    if !text.is_empty() {
        events.push(StreamEvent::chunk(text, node));
    }
    events
}

/// Flatten message content into a single string
///
/// Block lists keep each block's `text`; other blocks are rendered the way
/// the framework prints them.
pub fn content_to_text(content: &Value) -> String {
    match content {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        Value::Array(blocks) => blocks
            .iter()
            .map(|block| match block {
                Value::String(text) => text.clone(),
                Value::Object(object) => match object.get("text") {
                    Some(Value::String(text)) => text.clone(),
                    _ => python_repr(block),
                },
                other => python_repr(other),
            })
            .collect::<Vec<_>>()
            .join(""),
        other => python_repr(other),
    }
}

/// Remove rendered tool_use blocks and trim the result
pub fn strip_tool_use_reprs(text: &str) -> String {
    tool_use_repr_pattern()
        .replace_all(text, "")
        .trim()
        .to_string()
}

fn normalize_tool_call(raw: &Value) -> Option<ToolCall> {
    let call = raw.as_object()?;
    let name = call.get("name").and_then(Value::as_str)?.to_string();
    let id = call.get("id").and_then(Value::as_str).map(str::to_string);
    let args = match call.get("args") {
        Some(Value::Null) | None => Value::Object(Map::new()),
        Some(args) => args.clone(),
    };
    Some(ToolCall { id, name, args })
}

/// Pull the `reflection` out of a `think_tool` result
///
/// String content is read as JSON; text that is not JSON is the reflection.
pub fn extract_reflection(content: &Value) -> Option<String> {
    let reflection = match content {
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(object)) => reflection_field(&object),
            Ok(_) => None,
            Err(_) => Some(text.clone()),
        },
        Value::Object(object) => reflection_field(object),
        _ => None,
    };
    reflection.filter(|r| !r.is_empty())
}

fn reflection_field(object: &Map<String, Value>) -> Option<String> {
    match object.get("reflection")? {
        Value::String(text) => Some(text.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_think_tool_json_reflection() {
        let message = json!({"type": "tool", "name": "think_tool", "content": "{\"reflection\": \"done\"}"});
        assert_eq!(
            message_events("tools", &message),
            vec![StreamEvent::chunk("done", "tools")]
        );
    }

    #[test]
    fn test_think_tool_plain_text() {
        let message = json!({"type": "tool", "name": "think_tool", "content": "plain text"});
        assert_eq!(
            message_events("tools", &message),
            vec![StreamEvent::chunk("plain text", "tools")]
        );
    }

    #[test]
    fn test_think_tool_without_reflection() {
        for content in [json!("{\"other\": 1}"), json!("{\"reflection\": \"\"}"), json!("")] {
            let message = json!({"type": "tool", "name": "think_tool", "content": content});
            assert!(message_events("tools", &message).is_empty());
        }
    }

    #[test]
    fn test_write_todos() {
        let message = json!({
            "type": "tool",
            "name": "write_todos",
            "content": "Updated todo list to [{'content': 'a', 'status': 'pending'}]"
        });
        assert_eq!(
            message_events("tools", &message),
            vec![StreamEvent::TodoList(vec![json!({"content": "a", "status": "pending"})])]
        );
    }

    #[test]
    fn test_write_todos_empty_or_broken() {
        for content in [json!("Updated todo list to []"), json!("no list here")] {
            let message = json!({"type": "tool", "name": "write_todos", "content": content});
            assert!(message_events("tools", &message).is_empty());
        }
    }

    #[test]
    fn test_write_todos_deeply_nested() {
        let content = format!("Updated todo list to {}{}", "[".repeat(5000), "]".repeat(5000));
        let message = json!({"type": "tool", "name": "write_todos", "content": content});
        assert!(message_events("tools", &message).is_empty());
    }

    #[test]
    fn test_other_tool_results_suppressed() {
        let message = json!({"type": "tool", "name": "ls", "content": "a.py\nb.py"});
        assert!(message_events("tools", &message).is_empty());
    }

    #[test]
    fn test_assistant_text() {
        let message = json!({"type": "ai", "content": "Hello!"});
        assert_eq!(
            message_events("model", &message),
            vec![StreamEvent::chunk("Hello!", "model")]
        );
    }

    #[test]
    fn test_assistant_strips_tool_use_repr() {
        let message = json!({
            "type": "ai",
            "content": "Calling tool {'id': 'x', 'input': {}, 'name': 'foo', 'type': 'tool_use'} done",
            "tool_calls": [{"id": "x", "name": "foo", "args": {}}]
        });
        assert_eq!(
            message_events("model", &message),
            vec![
                StreamEvent::tool_calls(
                    vec![ToolCall {
                        id: Some("x".into()),
                        name: "foo".into(),
                        args: json!({})
                    }],
                    "model"
                ),
                StreamEvent::chunk("Calling tool  done", "model"),
            ]
        );
    }

    #[test]
    fn test_repr_kept_without_tool_calls() {
        let text = "See {'id': 'x', 'input': {}, 'name': 'foo', 'type': 'tool_use'}";
        let message = json!({"type": "ai", "content": text});
        assert_eq!(
            message_events("model", &message),
            vec![StreamEvent::chunk(text, "model")]
        );
    }

    #[test]
    fn test_block_content_with_tool_use() {
        let message = json!({
            "type": "ai",
            "content": [
                {"type": "text", "text": "Let me check."},
                {"id": "t1", "input": {"path": "/"}, "name": "ls", "type": "tool_use"}
            ],
            "tool_calls": [{"id": "t1", "name": "ls", "args": {"path": "/"}}]
        });
        assert_eq!(
            message_events("model", &message),
            vec![
                StreamEvent::tool_calls(
                    vec![ToolCall {
                        id: Some("t1".into()),
                        name: "ls".into(),
                        args: json!({"path": "/"})
                    }],
                    "model"
                ),
                StreamEvent::chunk("Let me check.", "model"),
            ]
        );
    }

    #[test]
    fn test_planning_tool_calls_filtered() {
        let message = json!({
            "type": "ai",
            "content": "",
            "tool_calls": [
                {"id": "a", "name": "write_todos", "args": {"todos": []}},
                {"id": "b", "name": "think_tool", "args": {"reflection": "hm"}}
            ]
        });
        assert!(message_events("model", &message).is_empty());
    }

    #[test]
    fn test_content_to_text() {
        assert_eq!(content_to_text(&json!(null)), "");
        assert_eq!(
            content_to_text(&json!([{"text": "a"}, "b", {"type": "image"}])),
            "ab{'type': 'image'}"
        );
    }

    #[test]
    fn test_opaque_messages_ignored() {
        assert!(message_events("model", &json!({"type": "ai"})).is_empty());
        assert!(message_events("model", &json!("raw")).is_empty());
    }

    #[test]
    fn test_human_message_has_content() {
        let message = json!({"type": "human", "content": "echo"});
        assert_eq!(
            message_events("input", &message),
            vec![StreamEvent::chunk("echo", "input")]
        );
    }
}
