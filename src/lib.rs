//! Bridge between a graph-based conversational agent and an editor extension.
//!
//! The agent is loaded by name, fed user messages, and its loosely shaped
//! `updates` stream is normalized into a small, stable set of events. Paused
//! runs (human approval) are resumed with caller-supplied decisions.

pub mod core;

// Loading and driving the agent
pub mod agent;

// Update normalization
pub mod stream;

// Request building and best-effort parsers
pub mod helpers;

// Optional components
pub mod cli;
pub mod logging;
