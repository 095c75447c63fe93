//! AgentWrapper - the uniform interface the host extension talks to
//!
//! Holds the (possibly absent) agent handle and exposes:
//! - `invoke` - one-shot request/response
//! - `stream` - normalized event stream for a user message
//! - `resume` - continue a paused run with approval decisions
//! - `reload` - rebuild the agent module and bind again
//!
//! None of these fail: problems come back as an error result or a single
//! terminal error event.

use std::path::PathBuf;
use std::sync::Arc;

use futures::stream;
use serde_json::Value;

use crate::core::{BridgeError, BridgeResult, EventStream, InvokeResult, StreamEvent};
use crate::helpers::{ChatRequest, ResumeRequest};
use crate::stream::{content_to_text, normalize_updates};

use super::capability::{Agent, AgentInput, ResumeCommand};
use super::config::BridgeConfig;
use super::loader::{AgentLoader, AgentLocation, ModuleRegistry};

/// Wrapper around a loaded agent
pub struct AgentWrapper {
    config: BridgeConfig,
    loader: AgentLoader,
    agent: Option<Arc<dyn Agent>>,
    diagnostic: Option<String>,
}

impl AgentWrapper {
    /// Create a wrapper and try to load the configured agent
    ///
    /// A failed load leaves the wrapper without an agent; see
    /// [`diagnostic`](Self::diagnostic).
    pub fn new(config: BridgeConfig, registry: ModuleRegistry) -> Self {
        let loader = AgentLoader::new(registry, config.location());
        let mut wrapper = Self {
            config,
            loader,
            agent: None,
            diagnostic: None,
        };
        wrapper.load();
        wrapper
    }

    fn load(&mut self) {
        let result = self.loader.load();
        self.apply_load_result(result);
    }

    fn apply_load_result(&mut self, result: BridgeResult<Arc<dyn Agent>>) {
        match result {
            Ok(agent) => {
                self.agent = Some(agent);
                self.diagnostic = None;
            }
            Err(e) => {
                if e.is_import_error() {
                    tracing::warn!("{}", e);
                    tracing::warn!(
                        "Agent functionality will not be available until the module is created."
                    );
                    if let Some(path) = &self.config.agent_path_override {
                        tracing::warn!("Note: agent path override is set to: {}", path);
                    }
                } else {
                    tracing::error!("Error loading agent: {}", e);
                }
                self.agent = None;
                self.diagnostic = Some(e.to_string());
            }
        }
    }

    /// Rebuild the agent module and bind the agent again
    ///
    /// Returns whether an agent is loaded afterwards.
    pub fn reload(&mut self) -> bool {
        tracing::info!("Reloading agent from {}", self.loader.location());
        let result = self.loader.reload();
        self.apply_load_result(result);
        self.is_loaded()
    }

    /// Check if an agent is loaded
    pub fn is_loaded(&self) -> bool {
        self.agent.is_some()
    }

    /// Why the last load failed, if it did
    pub fn diagnostic(&self) -> Option<&str> {
        self.diagnostic.as_deref()
    }

    /// Where the agent is loaded from
    pub fn location(&self) -> &AgentLocation {
        self.loader.location()
    }

    fn not_loaded_error(&self) -> BridgeError {
        let message = self.config.not_loaded_message();
        BridgeError::AgentNotLoaded(match &self.diagnostic {
            Some(diagnostic) => format!("{} ({})", message, diagnostic),
            None => message,
        })
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Send a message and wait for the final response
    pub async fn invoke(&self, request: ChatRequest) -> InvokeResult {
        let Some(agent) = self.agent.clone() else {
            return InvokeResult::error(self.not_loaded_error().to_string());
        };
        point_backend(&agent, &request);

        let input = AgentInput::State(request.agent_input());
        match agent.invoke(input, request.run_config()).await {
            Ok(state) => InvokeResult::success(response_text(&state)),
            Err(e) => {
                tracing::error!("Agent invoke failed: {:#}", e);
                InvokeResult::error(format!("Error invoking agent: {}", e))
            }
        }
    }

    /// Send a message and stream normalized events
    pub fn stream(&self, request: ChatRequest) -> EventStream {
        let Some(agent) = self.agent.clone() else {
            return self.not_loaded_stream();
        };
        point_backend(&agent, &request);

        let input = AgentInput::State(request.agent_input());
        run_stream(agent, input, request.run_config())
    }

    /// Resume a paused run with the host's decisions
    ///
    /// Nested interrupts surface again as `interrupt` events.
    pub fn resume(&self, request: ResumeRequest) -> EventStream {
        let Some(agent) = self.agent.clone() else {
            return self.not_loaded_stream();
        };
        tracing::info!(
            "Resuming agent with {} decision(s)",
            request.decisions.len()
        );

        let config = request.run_config();
        let input = AgentInput::Resume(ResumeCommand::with_decisions(request.decisions));
        run_stream(agent, input, config)
    }

    fn not_loaded_stream(&self) -> EventStream {
        let error = self.not_loaded_error();
        tracing::warn!("{}", error);
        Box::pin(stream::iter([StreamEvent::error(error.to_string())]))
    }
}

/// Point the agent's filesystem backend at the editor's current directory
fn point_backend(agent: &Arc<dyn Agent>, request: &ChatRequest) {
    let dir = request
        .context
        .as_ref()
        .and_then(|c| c.current_directory.as_deref())
        .filter(|d| !d.is_empty());
    if let (Some(backend), Some(dir)) = (agent.backend(), dir) {
        tracing::debug!("Setting agent backend root to {}", dir);
        backend.set_root_dir(PathBuf::from(dir));
    }
}

fn run_stream(agent: Arc<dyn Agent>, input: AgentInput, config: Value) -> EventStream {
    Box::pin(async_stream::stream! {
        match agent.stream(input, config).await {
            Ok(updates) => {
                let mut events = normalize_updates(updates);
                while let Some(event) = futures::StreamExt::next(&mut events).await {
                    yield event;
                }
            }
            Err(e) => {
                tracing::error!("Agent stream could not start: {:#}", e);
                yield StreamEvent::error(format!("Error streaming from agent: {}", e));
            }
        }
    })
}

/// Text of the final state's last message, or the whole state
fn response_text(state: &Value) -> String {
    let last = state
        .get("messages")
        .and_then(Value::as_array)
        .and_then(|messages| messages.last());

    match last {
        Some(Value::Object(message)) => match message.get("content") {
            Some(content) => content_to_text(content),
            None => Value::Object(message.clone()).to_string(),
        },
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
        None => match state {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        },
    }
}
