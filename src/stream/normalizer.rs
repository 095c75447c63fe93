//! Update stream normalization
//!
//! Turns the agent's `updates`-mode stream into [`StreamEvent`]s. Each update
//! is either an interrupt (`{"__interrupt__": ...}`) or a map from node name
//! to that node's partial state. Events are produced lazily as the caller
//! polls, and the stream always ends with exactly one terminal event.

use futures::StreamExt;
use serde_json::Value;

use crate::agent::UpdateStream;
use crate::core::{EventStream, StreamEvent};

use super::interrupt::{parse_interrupt, INTERRUPT_KEY};
use super::message::message_events;

/// Convert one update into zero or more events
pub fn update_events(update: &Value) -> Vec<StreamEvent> {
    let Some(nodes) = update.as_object() else {
        tracing::debug!("Skipping non-object update");
        return Vec::new();
    };

    if let Some(payload) = nodes.get(INTERRUPT_KEY) {
        let data = parse_interrupt(payload);
        tracing::info!(
            "Agent interrupted with {} action request(s)",
            data.action_requests.len()
        );
        return vec![StreamEvent::Interrupt(data)];
    }

    let mut events = Vec::new();
    for (node, state) in nodes {
        let last_message = state
            .get("messages")
            .and_then(Value::as_array)
            .and_then(|messages| messages.last());
        if let Some(message) = last_message {
            events.extend(message_events(node, message));
        }
    }
    events
}

/// Normalize an update stream into an event stream
///
/// Ends with `complete` when the updates run out, or with a single `error`
/// as soon as the upstream yields one.
pub fn normalize_updates(mut updates: UpdateStream) -> EventStream {
    Box::pin(async_stream::stream! {
        let mut update_count: usize = 0;
        while let Some(update) = updates.next().await {
            match update {
                Ok(update) => {
                    update_count += 1;
                    for event in update_events(&update) {
                        yield event;
                    }
                }
                Err(e) => {
                    tracing::error!("Agent stream failed after {} update(s): {:#}", update_count, e);
                    yield StreamEvent::error(format!("Error streaming from agent: {}", e));
                    return;
                }
            }
        }
        tracing::debug!("Agent stream complete after {} update(s)", update_count);
        yield StreamEvent::Complete;
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn updates(items: Vec<anyhow::Result<Value>>) -> UpdateStream {
        Box::pin(stream::iter(items))
    }

    async fn collect(items: Vec<anyhow::Result<Value>>) -> Vec<StreamEvent> {
        normalize_updates(updates(items)).collect().await
    }

    #[tokio::test]
    async fn test_empty_stream_completes() {
        assert_eq!(collect(vec![]).await, vec![StreamEvent::Complete]);
    }

    #[tokio::test]
    async fn test_full_turn() {
        let events = collect(vec![
            Ok(json!({"model": {"messages": [
                {"type": "ai", "content": "", "tool_calls": [
                    {"id": "w", "name": "write_todos", "args": {}},
                    {"id": "r", "name": "read_file", "args": {"path": "a"}}
                ]}
            ]}})),
            Ok(json!({"tools": {"messages": [
                {"type": "tool", "name": "write_todos", "content": "Updated todo list to [{'content': 'a', 'status': 'pending'}]"}
            ]}})),
            Ok(json!({"tools": {"messages": [
                {"type": "tool", "name": "read_file", "content": "secret"}
            ]}})),
            Ok(json!({"model": {"messages": [{"type": "ai", "content": "All done"}]}})),
        ])
        .await;

        let json_events: Vec<Value> = events.iter().map(StreamEvent::to_json).collect();
        assert_eq!(
            json_events,
            vec![
                json!({"tool_calls": [{"id": "r", "name": "read_file", "args": {"path": "a"}}], "node": "model"}),
                json!({"todo_list": [{"content": "a", "status": "pending"}]}),
                json!({"chunk": "All done", "node": "model"}),
                json!({"status": "complete"}),
            ]
        );
    }

    #[tokio::test]
    async fn test_interrupt_does_not_terminate() {
        let events = collect(vec![
            Ok(json!({"__interrupt__": [{"value": {
                "action_requests": [{"name": "shell", "args": {"cmd": "rm x"}}],
                "review_configs": [{"allowed_decisions": ["approve", "reject"]}]
            }}]})),
            Ok(json!({"model": {"messages": [{"type": "ai", "content": "waiting"}]}})),
        ])
        .await;

        assert_eq!(events.len(), 3);
        assert!(events[0].is_interrupt());
        assert_eq!(events[1], StreamEvent::chunk("waiting", "model"));
        assert_eq!(events[2], StreamEvent::Complete);
    }

    #[tokio::test]
    async fn test_error_terminates_stream() {
        let events = collect(vec![
            Ok(json!({"model": {"messages": [{"type": "ai", "content": "partial"}]}})),
            Err(anyhow::anyhow!("model overloaded")),
            Ok(json!({"model": {"messages": [{"type": "ai", "content": "never"}]}})),
        ])
        .await;

        assert_eq!(
            events,
            vec![
                StreamEvent::chunk("partial", "model"),
                StreamEvent::error("Error streaming from agent: model overloaded"),
            ]
        );
        assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);
    }

    #[tokio::test]
    async fn test_events_end_with_single_terminal() {
        let events = collect(vec![
            Ok(json!(null)),
            Ok(json!({"model": null})),
            Ok(json!({"model": {"messages": []}})),
            Ok(json!({"model": {"other": 1}})),
        ])
        .await;
        assert_eq!(events, vec![StreamEvent::Complete]);
    }

    #[test]
    fn test_multi_node_update_keeps_node_order() {
        let update = json!({
            "planner": {"messages": [{"type": "ai", "content": "plan"}]},
            "critic": {"messages": [{"type": "ai", "content": "old"}, {"type": "ai", "content": "critique"}]}
        });
        assert_eq!(
            update_events(&update),
            vec![
                StreamEvent::chunk("plan", "planner"),
                StreamEvent::chunk("critique", "critic"),
            ]
        );
    }
}
