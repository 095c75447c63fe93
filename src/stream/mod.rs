//! Stream event normalization
//!
//! - `normalizer` - Drives an update stream and guarantees a terminal event
//! - `message` - Classifies node messages into chunks, tool calls, todos
//! - `interrupt` - Parses approval requests out of interrupt payloads

pub mod interrupt;
pub mod message;
pub mod normalizer;

pub use interrupt::{parse_interrupt, InterruptShape, INTERRUPT_KEY};
pub use message::{content_to_text, MessageKind, THINK_TOOL, WRITE_TODOS_TOOL};
pub use normalizer::{normalize_updates, update_events};
