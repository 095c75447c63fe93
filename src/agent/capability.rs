//! Agent capability trait
//!
//! Abstracts the external graph agent so the bridge only depends on
//! `invoke` and `stream`. Scheduling, tools and persistence stay on the
//! other side of this trait.

use anyhow::Result;
use futures::stream::Stream;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::{PoisonError, RwLock};

use crate::core::Decision;

/// Raw `updates`-mode stream produced by an agent
pub type UpdateStream = Pin<Box<dyn Stream<Item = Result<Value>> + Send>>;

/// Input handed to the agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgentInput {
    /// Fresh state, usually `{"messages": [...]}`
    State(Value),
    /// Continue a paused run
    Resume(ResumeCommand),
}

impl AgentInput {
    /// Check if this input resumes a paused run
    pub fn is_resume(&self) -> bool {
        matches!(self, AgentInput::Resume(_))
    }
}

/// "Resume the paused run with these decisions"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeCommand {
    pub resume: Value,
}

impl ResumeCommand {
    /// Build a resume command carrying `{"decisions": [...]}`
    pub fn with_decisions(decisions: Vec<Decision>) -> Self {
        Self {
            resume: json!({ "decisions": decisions }),
        }
    }

    /// The decisions carried by this command
    pub fn decisions(&self) -> &[Value] {
        self.resume
            .get("decisions")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Root-directory-aware filesystem exposed by some agents
pub trait Backend: Send + Sync {
    /// Current root directory, if set
    fn root_dir(&self) -> Option<PathBuf>;

    /// Point the backend at a new root directory
    fn set_root_dir(&self, dir: PathBuf);
}

/// Backend that only tracks its root directory
#[derive(Debug, Default)]
pub struct LocalBackend {
    root: RwLock<Option<PathBuf>>,
}

impl LocalBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Backend for LocalBackend {
    fn root_dir(&self) -> Option<PathBuf> {
        self.root
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_root_dir(&self, dir: PathBuf) {
        *self.root.write().unwrap_or_else(PoisonError::into_inner) = Some(dir);
    }
}

/// Trait for agents the bridge can drive
///
/// `config` is the run configuration (`{"configurable": {"thread_id": ...}}`).
#[async_trait::async_trait]
pub trait Agent: Send + Sync {
    /// Run to completion and return the final state
    ///
    /// The state is expected to be an object that may hold a `messages` list.
    async fn invoke(&self, input: AgentInput, config: Value) -> Result<Value>;

    /// Stream per-node updates (`updates` stream mode)
    async fn stream(&self, input: AgentInput, config: Value) -> Result<UpdateStream>;

    /// Filesystem backend, for agents that have one
    fn backend(&self) -> Option<&dyn Backend> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resume_command_shape() {
        let command = ResumeCommand::with_decisions(vec![Decision::approve()]);
        assert_eq!(
            serde_json::to_value(AgentInput::Resume(command.clone())).unwrap(),
            json!({"resume": {"decisions": [{"type": "approve"}]}})
        );
        assert_eq!(command.decisions(), &[json!({"type": "approve"})]);
    }

    #[test]
    fn test_state_input_is_transparent() {
        let input = AgentInput::State(json!({"messages": []}));
        assert!(!input.is_resume());
        assert_eq!(serde_json::to_value(&input).unwrap(), json!({"messages": []}));
    }

    #[test]
    fn test_local_backend_root() {
        let backend = LocalBackend::new();
        assert_eq!(backend.root_dir(), None);
        backend.set_root_dir(PathBuf::from("/work"));
        assert_eq!(backend.root_dir(), Some(PathBuf::from("/work")));
    }
}
