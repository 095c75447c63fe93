//! Core types for the bridge
//!
//! This module provides the fundamental types used throughout the crate:
//! - `StreamEvent` / `InvokeResult` - What the host extension receives
//! - `InterruptData` / `Decision` - Approval round-trip types
//! - `BridgeError` - Error types

pub mod error;
pub mod event;
pub mod interrupt;

pub use error::{BridgeError, BridgeResult};
pub use event::{EventStream, InvokeResult, StreamEvent, ToolCall};
pub use interrupt::{ActionRequest, Decision, InterruptData, ReviewConfig};
