//! Event Renderer - prints normalized events to a terminal or as JSON lines
//!
//! JSON lines are what the host extension consumes; the pretty mode is for
//! people reading a replay.

use colored::*;
use std::io::{self, Write};

use crate::core::{InterruptData, StreamEvent, ToolCall};

/// How events are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// One JSON object per line
    #[default]
    JsonLines,
    /// Colored, human-readable
    Pretty,
}

/// Writes events to any `Write` sink
pub struct EventRenderer<W: Write> {
    out: W,
    mode: RenderMode,
    chunk_color: Color,
    tool_color: Color,
}

impl EventRenderer<io::Stdout> {
    /// Renderer writing to stdout
    pub fn stdout(mode: RenderMode) -> Self {
        Self::new(io::stdout(), mode)
    }
}

impl<W: Write> EventRenderer<W> {
    pub fn new(out: W, mode: RenderMode) -> Self {
        Self {
            out,
            mode,
            chunk_color: Color::Green,
            tool_color: Color::Magenta,
        }
    }

    /// Write a single event
    pub fn render(&mut self, event: &StreamEvent) -> io::Result<()> {
        match self.mode {
            RenderMode::JsonLines => {
                serde_json::to_writer(&mut self.out, event)?;
                writeln!(self.out)?;
            }
            RenderMode::Pretty => self.render_pretty(event)?,
        }
        self.out.flush()
    }

    fn render_pretty(&mut self, event: &StreamEvent) -> io::Result<()> {
        match event {
            StreamEvent::Chunk { content, node } => {
                let label = match node {
                    Some(node) => format!("[{}]", node),
                    None => "[agent]".to_string(),
                };
                writeln!(self.out, "{} {}", label.color(self.chunk_color).bold(), content)
            }
            StreamEvent::ToolCalls { calls, node } => {
                for call in calls {
                    writeln!(
                        self.out,
                        "{} {}",
                        format!("[{}] tool:", node).color(self.tool_color).bold(),
                        describe_call(call)
                    )?;
                }
                Ok(())
            }
            StreamEvent::TodoList(todos) => {
                writeln!(self.out, "{}", "Todos:".cyan().bold())?;
                for todo in todos {
                    let content = todo
                        .get("content")
                        .and_then(|c| c.as_str())
                        .map(str::to_string)
                        .unwrap_or_else(|| todo.to_string());
                    let status = todo.get("status").and_then(|s| s.as_str()).unwrap_or("pending");
                    let marker = match status {
                        "completed" => "[x]".green(),
                        "in_progress" => "[~]".yellow(),
                        _ => "[ ]".normal(),
                    };
                    writeln!(self.out, "  {} {}", marker, content)?;
                }
                Ok(())
            }
            StreamEvent::Interrupt(data) => self.render_interrupt(data),
            StreamEvent::Complete => writeln!(self.out, "{}", "Done.".dimmed()),
            StreamEvent::Error(message) => {
                writeln!(self.out, "{} {}", "Error:".red().bold(), message.red())
            }
        }
    }

    fn render_interrupt(&mut self, data: &InterruptData) -> io::Result<()> {
        writeln!(self.out, "{}", "Approval required:".yellow().bold())?;
        for (i, request) in data.action_requests.iter().enumerate() {
            let allowed = data
                .review_configs
                .get(i)
                .map(|c| c.allowed_decisions.join("/"))
                .unwrap_or_default();
            writeln!(
                self.out,
                "  {} {}({}) {}",
                request.tool_call_id.dimmed(),
                request.tool.yellow(),
                request.args,
                allowed.dimmed()
            )?;
            if let Some(description) = &request.description {
                writeln!(self.out, "    {}", description)?;
            }
        }
        Ok(())
    }

    /// Take back the sink
    pub fn into_inner(self) -> W {
        self.out
    }
}

fn describe_call(call: &ToolCall) -> String {
    format!("{}({})", call.name, call.args)
}
