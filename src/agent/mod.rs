//! Agent loading and the host-facing wrapper
//!
//! - `Agent` - Capability trait for the external graph agent
//! - `AgentLoader` / `ModuleRegistry` - Resolve `module:variable` to an agent
//! - `AgentWrapper` - `invoke`, `stream`, `resume`, `reload`
//! - `BridgeContext` - Lazily created, resettable wrapper owner
//! - `ScriptedAgent` - Replays prepared update sequences

mod capability;
mod config;
mod context;
mod loader;
mod scripted;
mod wrapper;

pub use capability::{
    Agent, AgentInput, Backend, LocalBackend, ResumeCommand, UpdateStream,
};
pub use config::{BridgeConfig, AGENT_PATH_ENV, DEFAULT_MODULE};
pub use context::BridgeContext;
pub use loader::{
    AgentLoader, AgentLocation, AgentModule, ModuleFactory, ModuleRegistry, DEFAULT_EXPORTS,
};
pub use scripted::{CallKind, RecordedCall, ScriptedAgent, ScriptedRun};
pub use wrapper::AgentWrapper;
