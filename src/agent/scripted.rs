//! Scripted agent
//!
//! An [`Agent`] that replays prepared update sequences. Each call to
//! `stream` consumes the next [`ScriptedRun`]; once the script runs out the
//! agent streams nothing. Every call is recorded so callers can check what
//! the bridge sent.
//!
//! Used by the replay binary and by tests.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use anyhow::Result;
use async_trait::async_trait;
use futures::stream;
use serde::Deserialize;
use serde_json::{json, Value};

use super::capability::{Agent, AgentInput, Backend, LocalBackend, UpdateStream};

/// One `stream` call's worth of updates
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScriptedRun {
    /// Updates yielded in order
    #[serde(default)]
    pub updates: Vec<Value>,
    /// Error raised after the updates, if any
    #[serde(default)]
    pub error: Option<String>,
}

impl ScriptedRun {
    pub fn new(updates: Vec<Value>) -> Self {
        Self {
            updates,
            error: None,
        }
    }

    /// Fail with this message after the updates
    pub fn failing_with(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }
}

/// Which trait method was called
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Invoke,
    Stream,
}

/// A recorded call
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub kind: CallKind,
    pub input: AgentInput,
    pub config: Value,
}

/// Agent that replays scripted runs
#[derive(Debug, Default)]
pub struct ScriptedAgent {
    runs: Mutex<VecDeque<ScriptedRun>>,
    invoke_result: Option<Value>,
    invoke_error: Option<String>,
    calls: Mutex<Vec<RecordedCall>>,
    backend: Option<LocalBackend>,
}

impl ScriptedAgent {
    /// Create an agent with an empty script
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a run
    pub fn with_run(self, run: ScriptedRun) -> Self {
        self.lock_runs().push_back(run);
        self
    }

    /// Append a run of plain updates
    pub fn with_updates(self, updates: Vec<Value>) -> Self {
        self.with_run(ScriptedRun::new(updates))
    }

    /// Set the state returned by `invoke`
    pub fn with_invoke_result(mut self, result: Value) -> Self {
        self.invoke_result = Some(result);
        self
    }

    /// Make `invoke` fail
    pub fn with_invoke_error(mut self, message: impl Into<String>) -> Self {
        self.invoke_error = Some(message.into());
        self
    }

    /// Expose a filesystem backend
    pub fn with_backend(mut self) -> Self {
        self.backend = Some(LocalBackend::new());
        self
    }

    /// Calls received so far
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Runs not yet streamed
    pub fn remaining_runs(&self) -> usize {
        self.lock_runs().len()
    }

    fn lock_runs(&self) -> std::sync::MutexGuard<'_, VecDeque<ScriptedRun>> {
        self.runs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, kind: CallKind, input: AgentInput, config: Value) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedCall {
                kind,
                input,
                config,
            });
    }
}

#[async_trait]
impl Agent for ScriptedAgent {
    async fn invoke(&self, input: AgentInput, config: Value) -> Result<Value> {
        self.record(CallKind::Invoke, input, config);
        if let Some(message) = &self.invoke_error {
            anyhow::bail!("{}", message);
        }
        Ok(self
            .invoke_result
            .clone()
            .unwrap_or_else(|| json!({ "messages": [] })))
    }

    async fn stream(&self, input: AgentInput, config: Value) -> Result<UpdateStream> {
        self.record(CallKind::Stream, input, config);
        let run = self.lock_runs().pop_front().unwrap_or_default();
        tracing::debug!(
            "Scripted agent streaming {} update(s){}",
            run.updates.len(),
            if run.error.is_some() { " then failing" } else { "" }
        );

        let mut items: Vec<Result<Value>> = run.updates.into_iter().map(Ok).collect();
        if let Some(message) = run.error {
            items.push(Err(anyhow::anyhow!(message)));
        }
        Ok(Box::pin(stream::iter(items)))
    }

    fn backend(&self) -> Option<&dyn Backend> {
        self.backend.as_ref().map(|b| b as &dyn Backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_runs_are_consumed_in_order() {
        let agent = ScriptedAgent::new()
            .with_updates(vec![json!({"a": 1})])
            .with_run(ScriptedRun::new(vec![json!({"b": 2})]).failing_with("boom"));
        assert_eq!(agent.remaining_runs(), 2);

        let first: Vec<_> = agent
            .stream(AgentInput::State(json!({})), json!({}))
            .await
            .unwrap()
            .collect()
            .await;
        assert_eq!(first.len(), 1);
        assert!(first[0].is_ok());

        let second: Vec<_> = agent
            .stream(AgentInput::State(json!({})), json!({}))
            .await
            .unwrap()
            .collect()
            .await;
        assert_eq!(second.len(), 2);
        assert_eq!(second[1].as_ref().unwrap_err().to_string(), "boom");

        let third: Vec<_> = agent
            .stream(AgentInput::State(json!({})), json!({}))
            .await
            .unwrap()
            .collect()
            .await;
        assert!(third.is_empty());
        assert_eq!(agent.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_invoke_result_and_error() {
        let agent = ScriptedAgent::new().with_invoke_result(json!({"messages": ["x"]}));
        let state = agent
            .invoke(AgentInput::State(json!({})), json!({"k": 1}))
            .await
            .unwrap();
        assert_eq!(state, json!({"messages": ["x"]}));
        assert_eq!(agent.calls()[0].kind, CallKind::Invoke);
        assert_eq!(agent.calls()[0].config, json!({"k": 1}));

        let agent = ScriptedAgent::new().with_invoke_error("offline");
        let err = agent
            .invoke(AgentInput::State(json!({})), json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "offline");
    }

    #[test]
    fn test_run_deserializes() {
        let run: ScriptedRun =
            serde_json::from_value(json!({"updates": [{"n": {}}], "error": "late"})).unwrap();
        assert_eq!(run.updates.len(), 1);
        assert_eq!(run.error.as_deref(), Some("late"));
    }
}
