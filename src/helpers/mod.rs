//! Parsing and request-building helpers
//!
//! - `request` - Input envelope, editor context and run config
//! - `literal` - Python literal reader/writer for leaked `repr()` text
//! - `todo_parser` - Ordered fallback chain for `write_todos` content

pub mod literal;
mod request;
pub mod todo_parser;

pub use literal::{parse_python_literal, python_repr};
pub use request::{
    build_agent_input, build_run_config, enrich_message, is_file_like, ChatRequest,
    MessageContext, ResumeRequest,
};
pub use todo_parser::parse_todos;
