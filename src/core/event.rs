//! Normalized events handed to the host extension
//!
//! The JSON shape of these types is the contract the host depends on:
//!
//! ```text
//! {"chunk": "...", "node": "model"}
//! {"tool_calls": [{"id": "...", "name": "...", "args": {}}], "node": "model"}
//! {"todo_list": [...]}
//! {"interrupt": {"action_requests": [...], "review_configs": [...]}}
//! {"status": "complete"}
//! {"error": "...", "status": "error"}
//! ```

use std::pin::Pin;

use futures::stream::Stream;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::interrupt::InterruptData;

/// A boxed, lazily pulled stream of normalized events
pub type EventStream = Pin<Box<dyn Stream<Item = StreamEvent> + Send>>;

/// A tool call the assistant requested
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: Option<String>,
    pub name: String,
    pub args: Value,
}

/// Events streamed FROM the bridge
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Text produced by a node (or a reflection from `think_tool`)
    Chunk {
        /// The text
        content: String,
        /// Graph node that produced it
        node: Option<String>,
    },

    /// Tool calls requested by an assistant message
    ToolCalls {
        /// The calls, with internal planning tools filtered out
        calls: Vec<ToolCall>,
        /// Graph node that produced them
        node: String,
    },

    /// The agent's current todo list
    TodoList(Vec<Value>),

    /// Execution paused pending approval
    Interrupt(InterruptData),

    /// The stream finished normally
    Complete,

    /// The stream failed; nothing follows
    Error(String),
}

impl StreamEvent {
    /// Create a chunk event attributed to a node
    pub fn chunk(content: impl Into<String>, node: impl Into<String>) -> Self {
        StreamEvent::Chunk {
            content: content.into(),
            node: Some(node.into()),
        }
    }

    /// Create a tool calls event
    pub fn tool_calls(calls: Vec<ToolCall>, node: impl Into<String>) -> Self {
        StreamEvent::ToolCalls {
            calls,
            node: node.into(),
        }
    }

    /// Create an error event
    pub fn error(msg: impl Into<String>) -> Self {
        StreamEvent::Error(msg.into())
    }

    /// Check if this is a terminal event
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Complete | StreamEvent::Error(_))
    }

    /// Check if this event pauses the run for approval
    pub fn is_interrupt(&self) -> bool {
        matches!(self, StreamEvent::Interrupt(_))
    }

    /// Convert to the JSON value sent to the host
    pub fn to_json(&self) -> Value {
        // Serializing plain strings and values into a map cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl Serialize for StreamEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StreamEvent::Chunk { content, node } => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("chunk", content)?;
                if let Some(node) = node {
                    map.serialize_entry("node", node)?;
                }
                map.end()
            }
            StreamEvent::ToolCalls { calls, node } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("tool_calls", calls)?;
                map.serialize_entry("node", node)?;
                map.end()
            }
            StreamEvent::TodoList(todos) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("todo_list", todos)?;
                map.end()
            }
            StreamEvent::Interrupt(data) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("interrupt", data)?;
                map.end()
            }
            StreamEvent::Complete => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("status", "complete")?;
                map.end()
            }
            StreamEvent::Error(error) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("error", error)?;
                map.serialize_entry("status", "error")?;
                map.end()
            }
        }
    }
}

/// Result of a non-streaming invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InvokeResult {
    /// `{"response": "...", "status": "success"}`
    Success { response: String },
    /// `{"error": "...", "status": "error"}`
    Error { error: String },
}

impl InvokeResult {
    /// Create a success result
    pub fn success(response: impl Into<String>) -> Self {
        InvokeResult::Success {
            response: response.into(),
        }
    }

    /// Create an error result
    pub fn error(msg: impl Into<String>) -> Self {
        InvokeResult::Error { error: msg.into() }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, InvokeResult::Success { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::interrupt::{ActionRequest, ReviewConfig};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_event_checks() {
        assert!(StreamEvent::Complete.is_terminal());
        assert!(StreamEvent::error("oops").is_terminal());
        assert!(!StreamEvent::chunk("hi", "model").is_terminal());
        assert!(StreamEvent::Interrupt(InterruptData::default()).is_interrupt());
    }

    #[test]
    fn test_chunk_shape() {
        assert_eq!(
            StreamEvent::chunk("hello", "model").to_json(),
            json!({"chunk": "hello", "node": "model"})
        );
        let bare = StreamEvent::Chunk {
            content: "hello".into(),
            node: None,
        };
        assert_eq!(bare.to_json(), json!({"chunk": "hello"}));
    }

    #[test]
    fn test_terminal_shapes() {
        assert_eq!(StreamEvent::Complete.to_json(), json!({"status": "complete"}));
        assert_eq!(
            StreamEvent::error("boom").to_json(),
            json!({"error": "boom", "status": "error"})
        );
    }

    #[test]
    fn test_tool_calls_and_interrupt_shapes() {
        let event = StreamEvent::tool_calls(
            vec![ToolCall {
                id: Some("t1".into()),
                name: "ls".into(),
                args: json!({"path": "/"}),
            }],
            "model",
        );
        assert_eq!(
            event.to_json(),
            json!({
                "tool_calls": [{"id": "t1", "name": "ls", "args": {"path": "/"}}],
                "node": "model"
            })
        );

        let event = StreamEvent::Interrupt(InterruptData {
            action_requests: vec![ActionRequest {
                tool: "ls".into(),
                tool_call_id: "call_0".into(),
                args: json!({}),
                description: Some("List files".into()),
            }],
            review_configs: vec![ReviewConfig {
                allowed_decisions: vec!["approve".into()],
            }],
        });
        assert_eq!(
            event.to_json(),
            json!({"interrupt": {
                "action_requests": [{
                    "tool": "ls", "tool_call_id": "call_0", "args": {}, "description": "List files"
                }],
                "review_configs": [{"allowed_decisions": ["approve"]}]
            }})
        );
    }

    #[test]
    fn test_todo_list_shape() {
        let event = StreamEvent::TodoList(vec![json!({"content": "a", "status": "pending"})]);
        assert_eq!(
            event.to_json(),
            json!({"todo_list": [{"content": "a", "status": "pending"}]})
        );
    }

    #[test]
    fn test_invoke_result_shape() {
        assert_eq!(
            serde_json::to_value(InvokeResult::success("hi")).unwrap(),
            json!({"response": "hi", "status": "success"})
        );
        assert_eq!(
            serde_json::to_value(InvokeResult::error("nope")).unwrap(),
            json!({"error": "nope", "status": "error"})
        );
        assert!(InvokeResult::success("").is_success());
    }
}
