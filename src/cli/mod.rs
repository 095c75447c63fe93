//! Terminal output for replayed event streams

mod renderer;

pub use renderer::{EventRenderer, RenderMode};
