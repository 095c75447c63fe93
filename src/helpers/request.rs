//! Request normalization
//!
//! Builds the framework input envelope and run configuration from what the
//! host extension sends: a message, optional editor context, and an optional
//! thread id for conversation continuity.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::core::Decision;

/// File extensions that mark a focused widget as a file
const FILE_EXTENSIONS: &[&str] = &[
    "ipynb", "py", "md", "txt", "json", "csv", "tsv", "yaml", "yml", "toml", "js", "ts",
    "tsx", "jsx", "html", "css", "r", "jl", "sql", "sh", "rs", "c", "cpp", "h", "java", "xml",
];

/// Editor state attached to a user message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageContext {
    /// Directory open in the file browser
    pub current_directory: Option<String>,
    /// Identifier of the focused widget (often a file path)
    pub focused_widget: Option<String>,
}

impl MessageContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_current_directory(mut self, dir: impl Into<String>) -> Self {
        self.current_directory = Some(dir.into());
        self
    }

    pub fn with_focused_widget(mut self, widget: impl Into<String>) -> Self {
        self.focused_widget = Some(widget.into());
        self
    }

    fn current_directory(&self) -> Option<&str> {
        self.current_directory.as_deref().filter(|d| !d.is_empty())
    }

    fn focused_widget(&self) -> Option<&str> {
        self.focused_widget.as_deref().filter(|w| !w.is_empty())
    }
}

/// Whether a focused widget identifier names a file
pub fn is_file_like(identifier: &str) -> bool {
    if identifier.contains('/') || identifier.contains('\\') {
        return true;
    }
    Path::new(identifier)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| FILE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Append editor context lines to a message
///
/// Lines are added after a blank line, directory first, then the focused
/// widget. Without any context the message is returned unchanged.
pub fn enrich_message(message: &str, context: Option<&MessageContext>) -> String {
    let Some(context) = context else {
        return message.to_string();
    };

    let mut lines = Vec::new();
    if let Some(dir) = context.current_directory() {
        lines.push(format!("Current directory: {}", dir));
    }
    if let Some(widget) = context.focused_widget() {
        if is_file_like(widget) {
            lines.push(format!("Currently focused file: {}", widget));
        } else {
            lines.push(format!("Currently focused: {}", widget));
        }
    }

    if lines.is_empty() {
        message.to_string()
    } else {
        format!("{}\n\n{}", message, lines.join("\n"))
    }
}

/// Build the `{"messages": [...]}` envelope for a user message
pub fn build_agent_input(text: &str) -> Value {
    json!({ "messages": [{ "role": "user", "content": text }] })
}

/// Build the run configuration, placing the thread id under `configurable`
pub fn build_run_config(config: Option<Value>, thread_id: Option<&str>) -> Value {
    let mut config = match config {
        Some(Value::Object(map)) => map,
        Some(Value::Null) | None => Map::new(),
        Some(other) => {
            tracing::warn!("Ignoring non-object run config: {}", other);
            Map::new()
        }
    };

    if let Some(thread_id) = thread_id {
        let configurable = config
            .entry("configurable")
            .or_insert_with(|| Value::Object(Map::new()));
        if !configurable.is_object() {
            *configurable = Value::Object(Map::new());
        }
        if let Value::Object(configurable) = configurable {
            configurable.insert("thread_id".to_string(), Value::String(thread_id.to_string()));
        }
    }

    Value::Object(config)
}

/// A user message bound for the agent
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    pub message: String,
    pub context: Option<MessageContext>,
    pub thread_id: Option<String>,
    pub config: Option<Value>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_context(mut self, context: MessageContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_thread_id(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }

    pub fn with_config(mut self, config: Value) -> Self {
        self.config = Some(config);
        self
    }

    /// The message text with editor context appended
    pub fn enriched_message(&self) -> String {
        enrich_message(&self.message, self.context.as_ref())
    }

    /// The framework input envelope
    pub fn agent_input(&self) -> Value {
        build_agent_input(&self.enriched_message())
    }

    /// The run configuration
    pub fn run_config(&self) -> Value {
        build_run_config(self.config.clone(), self.thread_id.as_deref())
    }
}

/// Decisions that resume a paused run
#[derive(Debug, Clone, Default)]
pub struct ResumeRequest {
    pub decisions: Vec<Decision>,
    pub config: Option<Value>,
    pub thread_id: Option<String>,
}

impl ResumeRequest {
    pub fn new(decisions: Vec<Decision>) -> Self {
        Self {
            decisions,
            ..Default::default()
        }
    }

    pub fn with_thread_id(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }

    pub fn with_config(mut self, config: Value) -> Self {
        self.config = Some(config);
        self
    }

    /// The run configuration
    pub fn run_config(&self) -> Value {
        build_run_config(self.config.clone(), self.thread_id.as_deref())
    }
}
