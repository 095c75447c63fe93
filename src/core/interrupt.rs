//! Human-in-the-loop approval types
//!
//! When the agent pauses before running a sensitive tool, the bridge surfaces
//! an [`InterruptData`] to the host. The host answers with one [`Decision`]
//! per action request, which is forwarded verbatim on resume.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A paused execution awaiting approval
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterruptData {
    /// Proposed actions, in the order the agent requested them
    pub action_requests: Vec<ActionRequest>,
    /// Review policy for each action
    pub review_configs: Vec<ReviewConfig>,
}

impl InterruptData {
    /// Check whether the interrupt carries nothing to review
    pub fn is_empty(&self) -> bool {
        self.action_requests.is_empty() && self.review_configs.is_empty()
    }
}

/// A single tool call the agent wants approved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    /// Tool name
    pub tool: String,
    /// ID of the pending tool call
    pub tool_call_id: String,
    /// Tool arguments
    pub args: Value,
    /// Human-readable description, if the agent supplied one
    pub description: Option<String>,
}

/// Which decisions the host may make for an action
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewConfig {
    pub allowed_decisions: Vec<String>,
}

/// Caller-supplied answer to an action request
///
/// The bridge never inspects a decision; whatever the host sends
/// (`{"type": "approve"}`, `{"type": "edit", ...}`) is passed through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Decision(pub Value);

impl Decision {
    /// Create an approve decision
    pub fn approve() -> Self {
        Decision(serde_json::json!({ "type": "approve" }))
    }

    /// Create a reject decision with an optional message for the agent
    pub fn reject(message: Option<&str>) -> Self {
        match message {
            Some(message) => Decision(serde_json::json!({ "type": "reject", "message": message })),
            None => Decision(serde_json::json!({ "type": "reject" })),
        }
    }

    /// The decision type, if the value carries one
    pub fn kind(&self) -> Option<&str> {
        self.0.get("type").and_then(Value::as_str)
    }
}

impl From<Value> for Decision {
    fn from(value: Value) -> Self {
        Decision(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decision_is_transparent() {
        let decision = Decision::from(json!({"type": "edit", "args": {"path": "a.py"}}));
        assert_eq!(
            serde_json::to_value(&decision).unwrap(),
            json!({"type": "edit", "args": {"path": "a.py"}})
        );
        assert_eq!(decision.kind(), Some("edit"));
    }

    #[test]
    fn test_decision_helpers() {
        assert_eq!(Decision::approve().kind(), Some("approve"));
        assert_eq!(
            Decision::reject(Some("no")).0,
            json!({"type": "reject", "message": "no"})
        );
    }

    #[test]
    fn test_interrupt_serialization() {
        let data = InterruptData {
            action_requests: vec![ActionRequest {
                tool: "write_file".into(),
                tool_call_id: "call_0".into(),
                args: json!({"path": "x"}),
                description: None,
            }],
            review_configs: vec![ReviewConfig {
                allowed_decisions: vec!["approve".into(), "reject".into()],
            }],
        };
        assert_eq!(
            serde_json::to_value(&data).unwrap(),
            json!({
                "action_requests": [{
                    "tool": "write_file",
                    "tool_call_id": "call_0",
                    "args": {"path": "x"},
                    "description": null
                }],
                "review_configs": [{"allowed_decisions": ["approve", "reject"]}]
            })
        );
        assert!(!data.is_empty());
        assert!(InterruptData::default().is_empty());
    }
}
