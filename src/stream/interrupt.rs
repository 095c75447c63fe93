//! Interrupt payload parsing
//!
//! The framework has surfaced approval requests in three shapes over time:
//!
//! - `Wrapped`: `[ {"value": {"action_requests": [...], ...}, "id": ...} ]`,
//!   a one-element container holding an interrupt object
//! - `Pair`: `[ [action_requests...], [review_configs...] ]`
//! - `Fields`: `{"action_requests": [...], "review_configs": [...]}`
//!
//! Anything else is `Unknown` and yields an empty [`InterruptData`]; a bad
//! payload never fails the stream.

use serde_json::{Map, Value};

use crate::core::{ActionRequest, InterruptData, ReviewConfig};

/// Update key carrying interrupt payloads
pub const INTERRUPT_KEY: &str = "__interrupt__";

/// Recognized raw interrupt shapes
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InterruptShape<'a> {
    /// One interrupt object; fields live on its `value` or on itself
    Wrapped(&'a Map<String, Value>),
    /// `(action_requests, review_configs)`
    Pair(&'a Value, &'a Value),
    /// An object exposing the fields directly
    Fields(&'a Map<String, Value>),
    /// Unrecognized
    Unknown,
}

impl<'a> InterruptShape<'a> {
    /// Classify a raw payload
    pub fn classify(raw: &'a Value) -> Self {
        match raw {
            Value::Array(items) if items.len() == 1 => match &items[0] {
                Value::Object(object) => InterruptShape::Wrapped(object),
                _ => InterruptShape::Unknown,
            },
            Value::Array(items) if items.len() == 2 => InterruptShape::Pair(&items[0], &items[1]),
            Value::Object(object) => InterruptShape::Fields(object),
            _ => InterruptShape::Unknown,
        }
    }
}

/// Parse a raw interrupt payload into normalized data
pub fn parse_interrupt(raw: &Value) -> InterruptData {
    let shape = InterruptShape::classify(raw);
    let (requests, configs) = match shape {
        InterruptShape::Wrapped(object) => {
            let fields = match object.get("value") {
                Some(Value::Object(value)) => value,
                _ => object,
            };
            (fields.get("action_requests"), fields.get("review_configs"))
        }
        InterruptShape::Pair(requests, configs) => (Some(requests), Some(configs)),
        InterruptShape::Fields(object) => {
            let fields = match object.get("value") {
                Some(Value::Object(value)) if !object.contains_key("action_requests") => value,
                _ => object,
            };
            (fields.get("action_requests"), fields.get("review_configs"))
        }
        InterruptShape::Unknown => {
            tracing::debug!("Unrecognized interrupt payload: {}", raw);
            (None, None)
        }
    };

    InterruptData {
        action_requests: normalize_action_requests(requests),
        review_configs: normalize_review_configs(configs),
    }
}

fn as_items(raw: Option<&Value>) -> &[Value] {
    match raw {
        Some(Value::Array(items)) => items,
        _ => &[],
    }
}

fn normalize_action_requests(raw: Option<&Value>) -> Vec<ActionRequest> {
    as_items(raw)
        .iter()
        .enumerate()
        .filter_map(|(index, request)| {
            let request = request.as_object()?;
            let tool = request
                .get("tool")
                .or_else(|| request.get("name"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let tool_call_id = request
                .get("tool_call_id")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("call_{}", index));
            let args = match request.get("args") {
                Some(Value::Null) | None => Value::Object(Map::new()),
                Some(args) => args.clone(),
            };
            let description = request
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string);

            Some(ActionRequest {
                tool,
                tool_call_id,
                args,
                description,
            })
        })
        .collect()
}

fn normalize_review_configs(raw: Option<&Value>) -> Vec<ReviewConfig> {
    as_items(raw)
        .iter()
        .filter_map(Value::as_object)
        .map(|config| ReviewConfig {
            allowed_decisions: as_items(config.get("allowed_decisions"))
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
        })
        .collect()
}
